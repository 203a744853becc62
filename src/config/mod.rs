//! Run configuration: where things live and which hosts to manage.
//!
//! A [`Config`] is built once per invocation and handed to every task
//! through the task context; nothing reads paths from globals.
pub mod settings;
pub mod targets;
pub mod toml_loader;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::error::SetupError;
use crate::platform::Platform;
use crate::resources::backup::BackupItem;
use crate::resources::ownership::OwnershipClassifier;
use settings::Settings;
use targets::{Target, TargetId};

/// Session database kept by the dashboard in the data directory.
pub const DATABASE_FILE: &str = "sessions.db";

/// User settings file in the data directory.
pub const SETTINGS_FILE: &str = "config.toml";

/// Directory inside the bundle holding the hook script templates.
pub const TEMPLATES_DIR: &str = "hooks";

/// Everything a run needs to know about the machine it is changing.
#[derive(Debug, Clone)]
pub struct Config {
    /// User home directory; host configs live beneath it.
    pub home: PathBuf,
    /// agentdeck's own data directory (backups, database, settings).
    pub data_dir: PathBuf,
    /// Bundle directory shipping the hook templates, when located.
    pub bundle_root: Option<PathBuf>,
    /// Rules for telling agentdeck's fragments from foreign ones.
    pub ownership: OwnershipClassifier,
    /// Hosts `install` registers with, in processing order.
    pub targets: Vec<Target>,
    /// User settings.
    pub settings: Settings,
}

impl Config {
    /// Build a configuration from already-loaded settings.
    #[must_use]
    pub fn new(home: &Path, data_dir: &Path, bundle_root: Option<PathBuf>, settings: Settings) -> Self {
        let mut targets: Vec<Target> = Vec::new();
        for id in &settings.hooks.targets {
            if !targets.iter().any(|t| t.id == *id) {
                targets.push(Target::for_home(*id, home));
            }
        }
        Self {
            home: home.to_path_buf(),
            data_dir: data_dir.to_path_buf(),
            bundle_root,
            ownership: OwnershipClassifier::default(),
            targets,
            settings,
        }
    }

    /// Build a configuration, reading settings from `<data_dir>/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be parsed.
    pub fn load(home: &Path, data_dir: &Path, bundle_root: Option<PathBuf>) -> Result<Self> {
        let settings = Settings::load(&Self::settings_path(data_dir))?;
        Ok(Self::new(home, data_dir, bundle_root, settings))
    }

    /// Location of the settings file for `data_dir`.
    #[must_use]
    pub fn settings_path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE)
    }

    /// Parent of every backup snapshot.
    #[must_use]
    pub fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    /// Session database path.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Bundled template for `script`, if the bundle was located.
    #[must_use]
    pub fn template_path(&self, script: &str) -> Option<PathBuf> {
        self.bundle_root
            .as_ref()
            .map(|root| root.join(TEMPLATES_DIR).join(script))
    }

    /// Every host agentdeck knows about, enabled or not.
    ///
    /// Reset works from this list so that narrowing the enabled targets
    /// after an install cannot strand a registration.
    #[must_use]
    pub fn known_targets(&self) -> Vec<Target> {
        TargetId::ALL
            .into_iter()
            .map(|id| Target::for_home(id, &self.home))
            .collect()
    }

    /// Every file a snapshot should capture: each known host's artifact,
    /// both script candidates per host, and the session database.
    #[must_use]
    pub fn backup_items(&self) -> Vec<BackupItem> {
        let mut items = Vec::new();
        for target in &self.known_targets() {
            items.push(BackupItem::new(&target.artifact, target.backup_name()));
            for script in Platform::script_candidates() {
                items.push(BackupItem::new(
                    target.scripts_dir.join(script),
                    format!("{}-{script}", target.id.prefix()),
                ));
            }
        }
        items.push(BackupItem::new(self.database_path(), DATABASE_FILE));
        items
    }
}

/// Resolve the user's home directory.
///
/// # Errors
///
/// Returns [`SetupError::HomeNotSet`] if neither `HOME` nor `USERPROFILE` is set.
pub fn home_dir() -> Result<PathBuf, SetupError> {
    let home = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME"))
    } else {
        std::env::var("HOME")
    };
    home.map(PathBuf::from).map_err(|_| SetupError::HomeNotSet)
}

/// agentdeck's data directory: `$AGENTDECK_HOME`, else `~/.agentdeck`.
#[must_use]
pub fn data_dir(home: &Path) -> PathBuf {
    std::env::var_os("AGENTDECK_HOME").map_or_else(|| home.join(".agentdeck"), PathBuf::from)
}
