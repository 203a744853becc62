//! Install command implementation.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, run_tasks_to_completion};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::{Config, TEMPLATES_DIR};
use crate::error::SetupError;
use crate::logging::{Log, Logger};
use crate::platform::{Platform, UNIX_SCRIPT};
use crate::tasks::{self, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the bundle cannot be located or its hook template for
/// this platform is missing. Both are checked before anything is modified.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("agentdeck {}", super::version::version()));

    let setup = CommandSetup::init(global, log.as_ref(), true)?;
    let template = check_template(&setup.config, &setup.platform)?;
    log.debug(&format!("template: {}", template.display()));

    let ctx = setup.into_context(Arc::clone(log) as Arc<dyn Log>, global.dry_run);
    let all_tasks = tasks::all_install_tasks();
    run_tasks_to_completion(filter_tasks(&all_tasks, opts), &ctx, log);
    Ok(())
}

/// Location of the template deployed on `platform`, which must exist.
///
/// # Errors
///
/// Returns [`SetupError::BundleNotFound`] without a bundle, or
/// [`SetupError::TemplateMissing`] when the template file is absent.
pub fn check_template(config: &Config, platform: &Platform) -> Result<PathBuf, SetupError> {
    let path = config
        .template_path(platform.script_name())
        .ok_or(SetupError::BundleNotFound)?;
    if path.is_file() {
        Ok(path)
    } else {
        Err(SetupError::TemplateMissing { path })
    }
}

/// Apply `--only` (takes precedence) or `--skip` to `all_tasks` by
/// case-insensitive name substring.
#[must_use]
pub fn filter_tasks<'a>(all_tasks: &'a [Box<dyn Task>], opts: &InstallOpts) -> Vec<&'a dyn Task> {
    all_tasks
        .iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            if !opts.skip.is_empty() {
                return !opts.skip.iter().any(|s| name.contains(&s.to_lowercase()));
            }
            true
        })
        .map(AsRef::as_ref)
        .collect()
}

/// Resolve the bundle directory from CLI arguments or auto-detection.
///
/// # Errors
///
/// Returns [`SetupError::BundleNotFound`] if no candidate holds the hook
/// templates.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf, SetupError> {
    resolve_root_from(
        global.root.as_deref(),
        std::env::var_os("AGENTDECK_ROOT").map(PathBuf::from),
        std::env::current_exe().ok(),
        std::env::current_dir().ok(),
    )
}

/// [`resolve_root`] with every input explicit.
///
/// An explicit root or `AGENTDECK_ROOT` is trusted as given; it is checked
/// later, when the template is needed. Auto-detected candidates must contain
/// `hooks/agentdeck-hook.sh`.
///
/// # Errors
///
/// Returns [`SetupError::BundleNotFound`] if nothing matches.
pub fn resolve_root_from(
    explicit: Option<&Path>,
    env_root: Option<PathBuf>,
    exe: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Result<PathBuf, SetupError> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    if let Some(root) = env_root {
        return Ok(root);
    }

    let is_bundle = |dir: &Path| dir.join(TEMPLATES_DIR).join(UNIX_SCRIPT).is_file();

    if let Some(exe) = exe
        && let Some(parent) = exe.parent()
    {
        let candidates = [
            parent.to_path_buf(),    // installed next to the bundle
            parent.join(".."),       // bin/ → bundle
            parent.join("../.."),    // target/release/ → repo root
        ];
        for candidate in &candidates {
            if is_bundle(candidate) {
                return Ok(std::fs::canonicalize(candidate).unwrap_or_else(|_| candidate.clone()));
            }
        }
    }

    if let Some(cwd) = cwd
        && is_bundle(&cwd)
    {
        return Ok(cwd);
    }

    Err(SetupError::BundleNotFound)
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use crate::platform::Os;

    fn bundle() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let hooks = dir.path().join("hooks");
        std::fs::create_dir_all(&hooks).unwrap();
        std::fs::write(hooks.join("agentdeck-hook.sh"), "# agentdeck-hook\n").unwrap();
        dir
    }

    fn names(tasks: &[&dyn Task]) -> Vec<String> {
        tasks.iter().map(|t| t.name().to_string()).collect()
    }

    #[test]
    fn explicit_root_wins() {
        let root = resolve_root_from(
            Some(Path::new("/explicit")),
            Some(PathBuf::from("/env")),
            None,
            None,
        )
        .unwrap();
        assert_eq!(root, PathBuf::from("/explicit"));
    }

    #[test]
    fn env_root_before_detection() {
        let root = resolve_root_from(None, Some(PathBuf::from("/env")), None, None).unwrap();
        assert_eq!(root, PathBuf::from("/env"));
    }

    #[test]
    fn executable_relative_bundle_is_found() {
        let dir = bundle();
        let exe = dir.path().join("bin").join("agentdeck");
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        let root = resolve_root_from(None, None, Some(exe), None).unwrap();
        assert_eq!(root, std::fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn current_dir_is_last_resort() {
        let dir = bundle();
        let root = resolve_root_from(None, None, None, Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn nothing_found_is_an_error() {
        let empty = tempfile::tempdir().unwrap();
        let err = resolve_root_from(None, None, None, Some(empty.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, SetupError::BundleNotFound));
    }

    #[test]
    fn missing_template_is_reported_with_its_path() {
        let empty = tempfile::tempdir().unwrap();
        let config = Config::new(
            Path::new("/h"),
            Path::new("/h/.agentdeck"),
            Some(empty.path().to_path_buf()),
            Settings::default(),
        );
        let err = check_template(&config, &Platform::new(Os::Windows, "/tmp")).unwrap_err();
        let SetupError::TemplateMissing { path } = err else {
            panic!("expected TemplateMissing");
        };
        assert!(path.ends_with("hooks/agentdeck-hook.ps1"));
    }

    #[test]
    fn present_template_passes() {
        let dir = bundle();
        let config = Config::new(
            Path::new("/h"),
            Path::new("/h/.agentdeck"),
            Some(dir.path().to_path_buf()),
            Settings::default(),
        );
        let path = check_template(&config, &Platform::new(Os::Unix, "/tmp")).unwrap();
        assert!(path.ends_with("hooks/agentdeck-hook.sh"));
    }

    #[test]
    fn no_bundle_is_not_found() {
        let config = Config::new(Path::new("/h"), Path::new("/h/.agentdeck"), None, Settings::default());
        let err = check_template(&config, &Platform::new(Os::Unix, "/tmp")).unwrap_err();
        assert!(matches!(err, SetupError::BundleNotFound));
    }

    #[test]
    fn only_filter_keeps_matching_tasks() {
        let all = tasks::all_install_tasks();
        let opts = InstallOpts {
            only: vec!["REGISTER".to_string()],
            ..InstallOpts::default()
        };
        assert_eq!(names(&filter_tasks(&all, &opts)), vec!["Register hooks"]);
    }

    #[test]
    fn skip_filter_drops_matching_tasks() {
        let all = tasks::all_install_tasks();
        let opts = InstallOpts {
            skip: vec!["scripts".to_string()],
            ..InstallOpts::default()
        };
        assert_eq!(
            names(&filter_tasks(&all, &opts)),
            vec!["Back up configs", "Register hooks"]
        );
    }

    #[test]
    fn no_filter_keeps_everything() {
        let all = tasks::all_install_tasks();
        assert_eq!(filter_tasks(&all, &InstallOpts::default()).len(), all.len());
    }
}
