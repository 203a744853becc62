//! Reset command implementation.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, run_tasks_to_completion};
use crate::cli::{GlobalOpts, ResetOpts};
use crate::logging::{Log, Logger};
use crate::tasks;

/// Run the reset command.
///
/// The bundle is not needed: removal identifies agentdeck's files by their
/// content, not by comparing them with the templates.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn run(global: &GlobalOpts, opts: &ResetOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("agentdeck {}", super::version::version()));

    let setup = CommandSetup::init(global, log.as_ref(), false)?;
    let ctx = setup.into_context(Arc::clone(log) as Arc<dyn Log>, global.dry_run);
    let tasks = tasks::all_reset_tasks(!opts.no_signal);
    run_tasks_to_completion(tasks.iter().map(Box::as_ref), &ctx, log);
    Ok(())
}
