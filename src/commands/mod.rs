//! Top-level subcommand orchestration.
pub mod install;
pub mod reset;
pub mod version;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::settings::Settings;
use crate::config::{self, Config};
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::signal::HttpStateSignal;
use crate::tasks::{self, Context, Task};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates platform detection, path resolution and settings loading so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected platform.
    pub platform: Platform,
    /// Run configuration.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the home, data and bundle directories and load settings.
    ///
    /// The bundle is only required when `require_bundle` is set; otherwise a
    /// missing bundle leaves [`Config::bundle_root`] empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown, or if the bundle is
    /// required but cannot be located.
    pub fn init(global: &GlobalOpts, log: &dyn Log, require_bundle: bool) -> Result<Self> {
        let home = config::home_dir()?;
        let data_dir = config::data_dir(&home);
        let bundle = match install::resolve_root(global) {
            Ok(root) => Some(root),
            Err(e) if !require_bundle => {
                log.debug(&format!("no bundle: {e}"));
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::from_paths(&home, &data_dir, bundle, Platform::detect(), log))
    }

    /// Build the setup from explicit locations.
    ///
    /// A settings file that cannot be parsed is warned about and replaced by
    /// defaults; it never stops the run.
    #[must_use]
    pub fn from_paths(
        home: &Path,
        data_dir: &Path,
        bundle: Option<PathBuf>,
        platform: Platform,
        log: &dyn Log,
    ) -> Self {
        let config = Config::load(home, data_dir, bundle.clone()).unwrap_or_else(|e| {
            log.warn(&format!("ignoring settings: {e:#}"));
            Config::new(home, data_dir, bundle, Settings::default())
        });

        log.debug(&format!("home: {}", config.home.display()));
        log.debug(&format!("data: {}", config.data_dir.display()));
        if let Some(root) = &config.bundle_root {
            log.debug(&format!("bundle: {}", root.display()));
        }
        let hosts: Vec<String> = config.targets.iter().map(|t| t.id.to_string()).collect();
        log.info(&format!("targets: {}", hosts.join(", ")));

        Self { platform, config }
    }

    /// Turn the setup into a task [`Context`] signalling the configured
    /// dashboard endpoint.
    #[must_use]
    pub fn into_context(self, log: Arc<dyn Log>, dry_run: bool) -> Context {
        let signal = HttpStateSignal::from_settings(&self.config.settings.server);
        Context::new(
            Arc::new(self.config),
            Arc::new(self.platform),
            log,
            dry_run,
            Arc::new(signal),
        )
    }
}

/// Execute every task in order and print the summary.
///
/// Failed tasks are reported in the summary; they do not change the exit
/// status.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        log.warn(&format!("{count} task(s) failed, see the log for details"));
    }
}
