//! User settings read from `<data>/config.toml`.
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use super::targets::TargetId;
use super::toml_loader;

/// Optional user overrides. Every field has a default, so a missing file or
/// a missing table behaves like an empty one.
///
/// ```toml
/// [server]
/// port = 4820
///
/// [hooks]
/// async = true
/// targets = ["claude", "gemini", "codex"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Local dashboard endpoint.
    pub server: ServerSettings,
    /// Hook registration options.
    pub hooks: HookSettings,
}

/// Where the dashboard listens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Loopback host name or address.
    pub host: String,
    /// TCP port.
    pub port: u16,
    /// Upper bound on the clear-state request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4820,
            timeout_secs: 2,
        }
    }
}

impl ServerSettings {
    /// Endpoint that tells the dashboard to drop its browser-side state.
    #[must_use]
    pub fn clear_state_url(&self) -> String {
        format!("http://{}:{}/api/clear-state", self.host, self.port)
    }

    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which hosts to touch and how the hook descriptor is written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HookSettings {
    /// Value written to each descriptor's `async` flag.
    #[serde(rename = "async")]
    pub is_async: bool,
    /// Hosts to manage.
    pub targets: Vec<TargetId>,
}

impl Default for HookSettings {
    fn default() -> Self {
        Self {
            is_async: true,
            targets: TargetId::ALL.to_vec(),
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self> {
        toml_loader::load_config(path)
    }
}
