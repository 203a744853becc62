//! Loading and storing host application configuration artifacts.
//!
//! An artifact is read in full, edited in memory and written back through a
//! temporary file and rename so a host application never observes a partial
//! write. A missing artifact is not an error: callers get `None` and treat
//! it as the empty document.
pub mod json;
pub mod toml_lines;

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::error::ArtifactError;

pub use json::{CommandHook, GroupEntry, HookEntry, HookGroup, SettingsDocument};
pub use toml_lines::ConfigLines;

/// On-disk layout of a host application's configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// JSON object whose `hooks` key maps event names to lists of groups.
    JsonEventGroups,
    /// Line-oriented TOML edited without a full parse-and-reserialize.
    TomlLines,
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonEventGroups => write!(f, "json-event-groups"),
            Self::TomlLines => write!(f, "toml-lines"),
        }
    }
}

/// Read an artifact, returning `None` when it does not exist.
///
/// # Errors
///
/// Returns [`ArtifactError::Read`] if the file exists but cannot be read.
pub fn read_artifact(path: &Path) -> Result<Option<String>, ArtifactError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Links followed before giving up on a symlink chain.
const MAX_LINK_DEPTH: usize = 40;

/// Atomically replace `path` with `contents`, creating parent directories.
///
/// A symlinked artifact is written at its destination so the link survives,
/// and an existing file keeps its permission bits.
///
/// # Errors
///
/// Returns [`ArtifactError::Write`] if the directory, temporary file or
/// rename fails. The temporary file is removed on failure.
pub fn write_artifact(path: &Path, contents: &str) -> Result<(), ArtifactError> {
    let wrap = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    let target = resolve_links(path);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    let permissions = std::fs::metadata(&target).ok().map(|m| m.permissions());
    let temp = temp_path(&target);
    let written = std::fs::File::create(&temp).and_then(|mut file| {
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        permissions.map_or(Ok(()), |permissions| file.set_permissions(permissions))
    });
    if let Err(e) = written.and_then(|()| std::fs::rename(&temp, &target)) {
        std::fs::remove_file(&temp).ok();
        return Err(wrap(e));
    }
    Ok(())
}

/// Follow `path` through any symlinks to the file they finally name.
///
/// Relative link targets resolve against the link's directory. A dangling
/// link resolves to its missing destination.
fn resolve_links(path: &Path) -> PathBuf {
    let mut current = path.to_path_buf();
    for _ in 0..MAX_LINK_DEPTH {
        let Ok(dest) = std::fs::read_link(&current) else {
            break;
        };
        let dir = current.parent().map(Path::to_path_buf).unwrap_or_default();
        current = dir.join(dest);
    }
    current
}

/// Sibling path used while writing `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "artifact".to_string(), |n| n.to_string_lossy().to_string());
    path.with_file_name(format!(".{name}.agentdeck-tmp"))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn read_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_artifact(&dir.path().join("settings.json")).unwrap().is_none());
    }

    #[test]
    fn read_existing_returns_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"x\"\n").unwrap();
        assert_eq!(read_artifact(&path).unwrap().as_deref(), Some("model = \"x\"\n"));
    }

    #[test]
    fn read_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_artifact(dir.path());
        assert!(result.is_err(), "reading a directory should fail");
    }

    #[test]
    fn write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gemini").join("settings.json");
        write_artifact(&path, "{}\n").unwrap();
        write_artifact(&path, "{\"a\": 1}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\": 1}\n");
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write_artifact(&path, "{}\n").unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1, "unexpected entries: {names:?}");
    }

    #[cfg(unix)]
    #[test]
    fn write_through_symlink_keeps_link_and_mode() {
        use std::os::unix::fs::PermissionsExt as _;
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("dotfiles-settings.json");
        std::fs::write(&real, "{}\n").unwrap();
        std::fs::set_permissions(&real, std::fs::Permissions::from_mode(0o600)).unwrap();
        let link = dir.path().join("settings.json");
        std::os::unix::fs::symlink("dotfiles-settings.json", &link).unwrap();

        write_artifact(&link, "{\"a\": 1}\n").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "{\"a\": 1}\n");
        let mode = std::fs::metadata(&real).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn write_through_dangling_symlink_creates_destination() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("store").join("settings.json");
        let link = dir.path().join("settings.json");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_artifact(&link, "{}\n").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "{}\n");
    }

    #[test]
    fn format_display() {
        assert_eq!(ArtifactFormat::JsonEventGroups.to_string(), "json-event-groups");
        assert_eq!(ArtifactFormat::TomlLines.to_string(), "toml-lines");
    }
}
