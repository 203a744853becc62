//! Tasks that deploy and remove the agentdeck hook scripts.

use anyhow::Result;

use super::backup_gate::BackupGate;
use super::{Context, ProcessOpts, Task, TaskResult, process_resources, process_resources_remove};
use crate::error::SetupError;
use crate::platform::Platform;
use crate::resources::hook_script::HookScriptResource;

/// Copy the bundled hook script into every target's hooks directory.
#[derive(Debug)]
pub struct DeployHookScripts {
    gate: BackupGate,
}

impl DeployHookScripts {
    /// Deploy once `gate` is open.
    #[must_use]
    pub const fn new(gate: BackupGate) -> Self {
        Self { gate }
    }
}

impl Task for DeployHookScripts {
    fn name(&self) -> &str {
        "Deploy hook scripts"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.targets.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(refused) = self.gate.refuse(ctx) {
            return Ok(refused);
        }
        let script = ctx.platform.script_name();
        let template = ctx
            .config
            .template_path(script)
            .ok_or(SetupError::BundleNotFound)?;
        let resources = ctx.config.targets.iter().map(|target| {
            HookScriptResource::new(
                template.clone(),
                target.scripts_dir.join(script),
                &ctx.config.ownership,
            )
        });
        process_resources(ctx, resources, &ProcessOpts::apply_all("deploy").no_bail())
    }
}

/// Delete agentdeck's hook scripts (both platform variants) from every known
/// host; files without agentdeck's content markers are kept.
#[derive(Debug)]
pub struct RemoveHookScripts {
    gate: BackupGate,
}

impl RemoveHookScripts {
    /// Remove once `gate` is open.
    #[must_use]
    pub const fn new(gate: BackupGate) -> Self {
        Self { gate }
    }
}

impl Task for RemoveHookScripts {
    fn name(&self) -> &str {
        "Remove hook scripts"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(refused) = self.gate.refuse(ctx) {
            return Ok(refused);
        }
        let targets = ctx.config.known_targets();
        let resources = targets.iter().flat_map(|target| {
            Platform::script_candidates().into_iter().map(|script| {
                HookScriptResource::deployed(target.scripts_dir.join(script), &ctx.config.ownership)
            })
        });
        process_resources_remove(ctx, resources, "remove")
    }
}
