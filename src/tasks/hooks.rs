//! Tasks that register and unregister agentdeck hooks in host configs.

use anyhow::Result;

use super::backup_gate::BackupGate;
use super::{Context, Task, TaskResult, TaskStats};
use crate::config::targets::Target;
use crate::resources::hook_script::HookScriptResource;
use crate::resources::registry::{ReconcileMode, ReconcileReport, ReportDetail};
use crate::resources::{Resource as _, ResourceState};

/// Reconcile each planned target, reporting each action.
///
/// A target whose artifact cannot be read or parsed is warned about and
/// skipped; the remaining targets are still processed.
fn reconcile_targets<'a>(
    ctx: &Context,
    plan: impl IntoIterator<Item = (&'a Target, ReconcileMode<'a>)>,
) -> TaskStats {
    let registry = ctx.registry();
    let mut stats = TaskStats::new();
    for (target, mode) in plan {
        ctx.log
            .info(&format!("{} ({})", target.id, target.artifact.display()));
        match registry.reconcile(target, mode) {
            Ok(report) => {
                log_report(ctx, &report);
                if matches!(report.detail, ReportDetail::InstallUnsupported) {
                    stats.skipped += 1;
                } else if report.changed {
                    stats.changed += 1;
                } else {
                    stats.already_ok += 1;
                }
            }
            Err(e) => {
                ctx.log.warn(&format!("{}: skipped, {e}", target.id));
                stats.skipped += 1;
            }
        }
    }
    stats
}

fn log_report(ctx: &Context, report: &ReconcileReport) {
    for line in report.lines() {
        ctx.log.report(&line);
    }
    if report.changed && !report.written {
        ctx.log
            .dry_run(&format!("would write {}", report.path.display()));
    }
}

/// Why `target`'s hook command must not be registered, if it must not.
///
/// The command runs the script at the deployment path; when that path holds
/// a file agentdeck does not own, registering would make the host run it.
fn script_conflict(ctx: &Context, target: &Target) -> Option<String> {
    let path = target.scripts_dir.join(ctx.platform.script_name());
    let script = HookScriptResource::deployed(path.clone(), &ctx.config.ownership);
    match script.current_state() {
        Ok(ResourceState::Invalid { reason }) => Some(format!("{}: {reason}", path.display())),
        Ok(_) => None,
        Err(e) => Some(format!("{e:#}")),
    }
}

/// Register agentdeck's hook with every enabled host.
#[derive(Debug)]
pub struct RegisterHooks {
    gate: BackupGate,
}

impl RegisterHooks {
    /// Register once `gate` is open.
    #[must_use]
    pub const fn new(gate: BackupGate) -> Self {
        Self { gate }
    }
}

impl Task for RegisterHooks {
    fn name(&self) -> &str {
        "Register hooks"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.targets.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(refused) = self.gate.refuse(ctx) {
            return Ok(refused);
        }
        let is_async = ctx.config.settings.hooks.is_async;
        let mut blocked = 0;
        let mut definitions = Vec::new();
        for target in &ctx.config.targets {
            if let Some(reason) = script_conflict(ctx, target) {
                ctx.log.warn(&format!("{}: not registering, {reason}", target.id));
                blocked += 1;
            } else {
                definitions.push((target, target.hook_definition(&ctx.platform, is_async)));
            }
        }
        let plan = definitions
            .iter()
            .map(|(target, definition)| (*target, ReconcileMode::Install(definition)));
        let mut stats = reconcile_targets(ctx, plan);
        stats.skipped += blocked;
        Ok(stats.finish(ctx))
    }
}

/// Remove agentdeck's hook registrations from every known host, whether or
/// not it is still enabled.
#[derive(Debug)]
pub struct UnregisterHooks {
    gate: BackupGate,
}

impl UnregisterHooks {
    /// Unregister once `gate` is open.
    #[must_use]
    pub const fn new(gate: BackupGate) -> Self {
        Self { gate }
    }
}

impl Task for UnregisterHooks {
    fn name(&self) -> &str {
        "Unregister hooks"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if let Some(refused) = self.gate.refuse(ctx) {
            return Ok(refused);
        }
        let targets = ctx.config.known_targets();
        let plan = targets.iter().map(|target| (target, ReconcileMode::Uninstall));
        Ok(reconcile_targets(ctx, plan).finish(ctx))
    }
}
