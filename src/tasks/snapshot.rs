//! Snapshot every file the run may change before changing anything.
use anyhow::{Context as _, Result};

use super::backup_gate::BackupGate;
use super::{Context, Task, TaskResult};
use crate::resources::backup::{BackupManager, CopyOutcome};

/// Copy host configs, deployed scripts and the session database into
/// `<data>/backups/<label>-<timestamp>/`.
///
/// Opens `gate` once the snapshot directory exists; individual copy failures
/// are warned about and do not keep it closed.
#[derive(Debug)]
pub struct SnapshotConfigs {
    label: &'static str,
    gate: BackupGate,
}

impl SnapshotConfigs {
    /// Snapshot labelled `label`, opening `gate` on success.
    #[must_use]
    pub const fn new(label: &'static str, gate: BackupGate) -> Self {
        Self { label, gate }
    }
}

impl Task for SnapshotConfigs {
    fn name(&self) -> &str {
        "Back up configs"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let items = ctx.config.backup_items();
        let manager = BackupManager::new(ctx.config.backups_dir());

        if ctx.dry_run {
            let existing = items.iter().filter(|i| i.source.exists()).count();
            let dir = manager.snapshot_dir(self.label, chrono::Local::now());
            ctx.log.dry_run(&format!(
                "would copy {existing} file(s) into {}",
                dir.display()
            ));
            return Ok(TaskResult::DryRun);
        }

        let snapshot = manager
            .snapshot(self.label, &items)
            .context("cannot create backup snapshot, refusing to modify configs")?;
        self.gate.open();

        for (item, outcome) in &snapshot.outcomes {
            match outcome {
                CopyOutcome::Captured => ctx.log.report(&format!("+ {}", item.name)),
                CopyOutcome::Missing => {
                    ctx.log.debug(&format!("not present: {}", item.source.display()));
                }
                CopyOutcome::Failed(e) => ctx.log.warn(&format!("backup: {e}")),
            }
        }
        ctx.log.info(&format!(
            "{} file(s) saved to {}",
            snapshot.captured(),
            snapshot.dir.display()
        ));
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{TestHome, make_context_for};

    #[test]
    fn snapshot_copies_existing_files_and_opens_gate() {
        let home = TestHome::new();
        home.write(".claude/settings.json", "{\"theme\":\"dark\"}");
        home.write(".agentdeck/sessions.db", "sqlite");
        let (ctx, log) = make_context_for(&home, false);
        let gate = BackupGate::new();

        let result = SnapshotConfigs::new("reset", gate.clone()).run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::Ok));
        assert!(gate.is_open());
        let backups = home.path().join(".agentdeck/backups");
        let dirs: Vec<_> = std::fs::read_dir(&backups).unwrap().collect();
        assert_eq!(dirs.len(), 1);
        let dir = dirs.into_iter().next().unwrap().unwrap().path();
        assert!(dir.file_name().unwrap().to_string_lossy().starts_with("reset-"));
        assert_eq!(
            std::fs::read_to_string(dir.join("claude-settings.json")).unwrap(),
            "{\"theme\":\"dark\"}"
        );
        assert!(dir.join("sessions.db").exists());
        assert!(log.infos().iter().any(|l| l.starts_with("2 file(s) saved to")));
    }

    #[test]
    fn dry_run_writes_nothing_and_keeps_gate_closed() {
        let home = TestHome::new();
        home.write(".claude/settings.json", "{}");
        let (ctx, log) = make_context_for(&home, true);
        let gate = BackupGate::new();

        let result = SnapshotConfigs::new("install", gate.clone()).run(&ctx).unwrap();

        assert!(matches!(result, TaskResult::DryRun));
        assert!(!gate.is_open());
        assert!(!home.path().join(".agentdeck/backups").exists());
        assert!(log.dry_runs()[0].starts_with("would copy 1 file(s)"));
    }

    #[test]
    fn unwritable_backup_root_fails_and_keeps_gate_closed() {
        let home = TestHome::new();
        home.write(".agentdeck/backups", "a file, not a directory");
        let (ctx, _log) = make_context_for(&home, false);
        let gate = BackupGate::new();

        let err = SnapshotConfigs::new("reset", gate.clone()).run(&ctx).unwrap_err();

        assert!(format!("{err:#}").contains("refusing to modify"));
        assert!(!gate.is_open());
    }
}
