//! Timestamped snapshots of everything a run may change.
//!
//! Snapshots are written once and never touched again; agentdeck does not
//! prune old ones.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::BackupError;

/// A file to capture and the name it gets inside the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupItem {
    /// File on disk.
    pub source: PathBuf,
    /// Filename inside the snapshot directory.
    pub name: String,
}

impl BackupItem {
    /// Capture `source` as `name`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// What happened to one item.
#[derive(Debug)]
pub enum CopyOutcome {
    /// Copied into the snapshot.
    Captured,
    /// Source did not exist; nothing to capture.
    Missing,
    /// Copy failed; the rest of the snapshot proceeded.
    Failed(BackupError),
}

/// Result of one snapshot pass.
#[derive(Debug)]
pub struct BackupSnapshot {
    /// Snapshot directory.
    pub dir: PathBuf,
    /// Per-item outcome, in the order items were given.
    pub outcomes: Vec<(BackupItem, CopyOutcome)>,
}

impl BackupSnapshot {
    /// Number of files copied.
    #[must_use]
    pub fn captured(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, CopyOutcome::Captured))
            .count()
    }

    /// Copy failures, in item order.
    pub fn failures(&self) -> impl Iterator<Item = &BackupError> {
        self.outcomes.iter().filter_map(|(_, o)| match o {
            CopyOutcome::Failed(e) => Some(e),
            CopyOutcome::Captured | CopyOutcome::Missing => None,
        })
    }
}

/// Writes snapshots under `<data>/backups/`.
///
/// # Examples
///
/// ```
/// use agentdeck_cli::resources::backup::BackupManager;
/// use chrono::{Local, TimeZone};
///
/// let manager = BackupManager::new("/home/u/.agentdeck/backups");
/// let at = Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap();
/// assert!(manager.snapshot_dir("reset", at).ends_with("reset-20260309-140507"));
/// ```
#[derive(Debug, Clone)]
pub struct BackupManager {
    root: PathBuf,
}

impl BackupManager {
    /// Manage snapshots under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory a snapshot labelled `label` taken at `at` is written to.
    ///
    /// Second resolution: two snapshots in the same second share a directory.
    #[must_use]
    pub fn snapshot_dir(&self, label: &str, at: DateTime<Local>) -> PathBuf {
        self.root
            .join(format!("{label}-{}", at.format("%Y%m%d-%H%M%S")))
    }

    /// Copy every existing item into a new snapshot stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::CreateDir`] if the snapshot directory cannot be
    /// created. Individual copy failures are reported in the result instead.
    pub fn snapshot(&self, label: &str, items: &[BackupItem]) -> Result<BackupSnapshot, BackupError> {
        self.snapshot_at(label, items, Local::now())
    }

    /// [`snapshot`](Self::snapshot) with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::CreateDir`] if the snapshot directory cannot be created.
    pub fn snapshot_at(
        &self,
        label: &str,
        items: &[BackupItem],
        at: DateTime<Local>,
    ) -> Result<BackupSnapshot, BackupError> {
        let dir = self.snapshot_dir(label, at);
        std::fs::create_dir_all(&dir).map_err(|source| BackupError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let outcomes = items
            .iter()
            .map(|item| (item.clone(), copy_item(item, &dir)))
            .collect();
        Ok(BackupSnapshot { dir, outcomes })
    }
}

fn copy_item(item: &BackupItem, dir: &Path) -> CopyOutcome {
    let to = dir.join(&item.name);
    match std::fs::copy(&item.source, &to) {
        Ok(_) => CopyOutcome::Captured,
        Err(e) if e.kind() == ErrorKind::NotFound && !item.source.exists() => CopyOutcome::Missing,
        Err(source) => CopyOutcome::Failed(BackupError::Copy {
            from: item.source.clone(),
            to,
            source,
        }),
    }
}
