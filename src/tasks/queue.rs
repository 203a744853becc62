//! Drains events the hook script queued while the dashboard was down.
use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};
use crate::resources::fs::files_with_extension;

/// Delete every queued `*.json` event file.
///
/// Queued events describe sessions that no longer exist once hooks are
/// unregistered, so replaying them into a fresh dashboard would be wrong.
#[derive(Debug)]
pub struct ClearEventQueue;

impl Task for ClearEventQueue {
    fn name(&self) -> &str {
        "Clear event queue"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.queue_dir().is_dir()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let dir = ctx.platform.queue_dir();
        let files = files_with_extension(&dir, "json")
            .with_context(|| format!("listing {}", dir.display()))?;

        if files.is_empty() {
            ctx.log.report(&format!("· {} is empty", dir.display()));
            return Ok(TaskResult::Ok);
        }

        let mut stats = TaskStats::new();
        for file in &files {
            let name = file
                .file_name()
                .map_or_else(|| file.display().to_string(), |n| n.to_string_lossy().to_string());
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would remove {name}"));
                stats.changed += 1;
                continue;
            }
            match std::fs::remove_file(file) {
                Ok(()) => {
                    ctx.log.report(&format!("- {name}"));
                    stats.changed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => stats.already_ok += 1,
                Err(e) => {
                    ctx.log.warn(&format!("cannot remove {}: {e}", file.display()));
                    stats.skipped += 1;
                }
            }
        }
        Ok(stats.finish(ctx))
    }
}
