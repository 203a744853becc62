//! Task that asks a running dashboard to clear its sessions.

use anyhow::Result;

use super::{Context, Task, TaskResult};

/// Ask a running dashboard to forget the sessions it is showing.
///
/// Advisory: a dashboard that is not running is reported, not failed.
#[derive(Debug)]
pub struct ClearBrowserState;

impl Task for ClearBrowserState {
    fn name(&self) -> &str {
        "Clear browser state"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let endpoint = ctx.signal.endpoint();
        if ctx.dry_run {
            ctx.log.dry_run(&format!("would POST {endpoint}"));
            return Ok(TaskResult::DryRun);
        }
        match ctx.signal.send() {
            Ok(()) => ctx.log.report(&format!("- browser state cleared via {endpoint}")),
            Err(e) => {
                ctx.log.debug(&format!("{e}"));
                ctx.log.report("· dashboard not running, nothing to clear");
            }
        }
        Ok(TaskResult::Ok)
    }
}
