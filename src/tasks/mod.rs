//! Named tasks that orchestrate hook installation and removal.
pub mod backup_gate;
mod context;
pub mod dashboard;
pub mod hooks;
mod processing;
pub mod queue;
pub mod scripts;
pub mod snapshot;

pub use context::Context;
pub use processing::{
    ProcessOpts, TaskResult, TaskStats, process_resources, process_resources_remove,
};

use anyhow::Result;

use crate::logging::TaskStatus;
use backup_gate::BackupGate;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task has anything to do in this run.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot complete, such as when the backup
    /// snapshot cannot be created or the bundled templates are unavailable.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The tasks run by the install command, in execution order.
///
/// Every mutating task shares one [`BackupGate`] with the snapshot task and
/// refuses to run unless that snapshot was taken.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    let gate = BackupGate::new();
    vec![
        Box::new(snapshot::SnapshotConfigs::new("install", gate.clone())),
        Box::new(scripts::DeployHookScripts::new(gate.clone())),
        Box::new(hooks::RegisterHooks::new(gate)),
    ]
}

/// The tasks run by the reset command, in execution order.
///
/// With `signal` unset the dashboard is not contacted.
#[must_use]
pub fn all_reset_tasks(signal: bool) -> Vec<Box<dyn Task>> {
    let gate = BackupGate::new();
    let mut tasks: Vec<Box<dyn Task>> = vec![
        Box::new(snapshot::SnapshotConfigs::new("reset", gate.clone())),
        Box::new(hooks::UnregisterHooks::new(gate.clone())),
        Box::new(scripts::RemoveHookScripts::new(gate)),
        Box::new(queue::ClearEventQueue),
    ];
    if signal {
        tasks.push(Box::new(dashboard::ClearBrowserState));
    }
    tasks
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}


#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_helpers::{TestHome, make_context, make_context_for};

    /// A mock task for testing `execute()`.
    struct MockTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
    }

    impl Task for MockTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn run_one(should_run: bool, result: Result<TaskResult, String>) -> Vec<(String, TaskStatus)> {
        let (ctx, log) = make_context(false);
        let task = MockTask {
            name: "mock",
            should_run,
            result,
        };
        execute(&task, &ctx);
        log.tasks()
    }

    #[test]
    fn execute_skips_non_applicable_task() {
        let tasks = run_one(false, Ok(TaskResult::Ok));
        assert_eq!(tasks, vec![("mock".to_string(), TaskStatus::NotApplicable)]);
    }

    #[test]
    fn execute_records_ok_task() {
        let tasks = run_one(true, Ok(TaskResult::Ok));
        assert_eq!(tasks, vec![("mock".to_string(), TaskStatus::Ok)]);
    }

    #[test]
    fn execute_records_failed_task() {
        let tasks = run_one(true, Err("kaboom".to_string()));
        assert_eq!(tasks, vec![("mock".to_string(), TaskStatus::Failed)]);
    }

    #[test]
    fn execute_records_skipped_task() {
        let tasks = run_one(true, Ok(TaskResult::Skipped("not needed".to_string())));
        assert_eq!(tasks, vec![("mock".to_string(), TaskStatus::Skipped)]);
    }

    #[test]
    fn execute_records_dry_run_task() {
        let tasks = run_one(true, Ok(TaskResult::DryRun));
        assert_eq!(tasks, vec![("mock".to_string(), TaskStatus::DryRun)]);
    }

    #[test]
    fn reset_without_signal_drops_dashboard_task() {
        let with: Vec<String> = all_reset_tasks(true).iter().map(|t| t.name().to_string()).collect();
        let without: Vec<String> = all_reset_tasks(false).iter().map(|t| t.name().to_string()).collect();
        assert_eq!(with.last().map(String::as_str), Some("Clear browser state"));
        assert_eq!(without.len(), with.len() - 1);
    }

    #[test]
    fn install_tasks_share_one_gate() {
        let home = TestHome::new();
        let (ctx, log) = make_context_for(&home, false);
        for task in all_install_tasks() {
            execute(task.as_ref(), &ctx);
        }
        assert!(log.errors().is_empty(), "{:?}", log.errors());
        assert!(home.path().join(".claude/hooks/agentdeck-hook.sh").exists());
        assert!(home.path().join(".claude/settings.json").exists());
        assert_eq!(
            log.stages(),
            vec!["Back up configs", "Deploy hook scripts", "Register hooks"]
        );
    }

    #[test]
    fn reset_after_install_leaves_no_owned_fragments() {
        let home = TestHome::new();
        home.write(
            ".claude/settings.json",
            r#"{"hooks":{"Stop":[{"hooks":[{"type":"command","command":"/bin/other"}]}]}}"#,
        );
        let (ctx, _log) = make_context_for(&home, false);
        for task in all_install_tasks() {
            execute(task.as_ref(), &ctx);
        }
        let (ctx, log) = make_context_for(&home, false);
        for task in all_reset_tasks(false) {
            execute(task.as_ref(), &ctx);
        }

        assert!(log.errors().is_empty(), "{:?}", log.errors());
        assert!(!home.path().join(".claude/hooks/agentdeck-hook.sh").exists());
        let claude: serde_json::Value =
            serde_json::from_str(&home.read(".claude/settings.json")).unwrap();
        assert_eq!(
            claude["hooks"],
            serde_json::json!({"Stop":[{"hooks":[{"type":"command","command":"/bin/other"}]}]})
        );
        let snapshots = std::fs::read_dir(home.path().join(".agentdeck/backups")).unwrap().count();
        assert!(snapshots >= 1);
    }
}
