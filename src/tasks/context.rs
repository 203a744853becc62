use std::sync::Arc;

use crate::config::Config;
use crate::logging::Log;
use crate::platform::Platform;
use crate::resources::registry::HookRegistry;
use crate::signal::StateSignal;

/// Shared context for task execution.
pub struct Context {
    /// Run configuration, built once per invocation.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Channel to the running dashboard.
    pub signal: Arc<dyn StateSignal>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("signal", &self.signal.endpoint())
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        dry_run: bool,
        signal: Arc<dyn StateSignal>,
    ) -> Self {
        Self {
            config,
            platform,
            log,
            dry_run,
            signal,
        }
    }

    /// A [`HookRegistry`] using this run's ownership rules and dry-run flag.
    #[must_use]
    pub fn registry(&self) -> HookRegistry<'_> {
        HookRegistry::new(&self.config.ownership, self.dry_run)
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            platform: Arc::clone(&self.platform),
            log,
            dry_run: self.dry_run,
            signal: Arc::clone(&self.signal),
        }
    }
}
