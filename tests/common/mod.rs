// Shared helpers for integration tests.
//
// Provides a temporary home directory, bundle and temp directory so each
// integration test can run the real task lists against an isolated
// filesystem without touching the user's configuration.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use agentdeck_cli::commands::CommandSetup;
use agentdeck_cli::error::SignalError;
use agentdeck_cli::logging::{Log, Logger};
use agentdeck_cli::platform::{Os, Platform};
use agentdeck_cli::signal::StateSignal;
use agentdeck_cli::tasks::{self, Context, Task};

/// Content of both bundled templates in the test bundle.
pub const TEMPLATE: &str =
    "#!/usr/bin/env bash\n# agentdeck-hook\nAGENTDECK_QUEUE_DIR=\"${AGENTDECK_QUEUE_DIR:-/tmp}\"\n";

/// A dashboard that is never running.
#[derive(Debug)]
pub struct OfflineDashboard;

impl StateSignal for OfflineDashboard {
    fn endpoint(&self) -> String {
        "http://127.0.0.1:9/api/clear-state".to_string()
    }

    fn send(&self) -> Result<(), SignalError> {
        Err(SignalError {
            url: self.endpoint(),
            message: "connection refused".to_string(),
        })
    }
}

/// An isolated machine backed by a [`tempfile::TempDir`].
///
/// ```text
/// <root>/home/     user home, data directory at home/.agentdeck
/// <root>/bundle/   hooks/agentdeck-hook.{sh,ps1}
/// <root>/tmp/      platform temp directory (message queue)
/// ```
pub struct TestMachine {
    /// Backing directory, deleted on drop.
    pub root: tempfile::TempDir,
}

impl TestMachine {
    /// Create a machine with an empty home and a complete bundle.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let hooks = root.path().join("bundle").join("hooks");
        std::fs::create_dir_all(&hooks).expect("create bundle");
        std::fs::create_dir_all(root.path().join("home")).expect("create home");
        std::fs::create_dir_all(root.path().join("tmp")).expect("create tmp");
        for script in Platform::script_candidates() {
            std::fs::write(hooks.join(script), TEMPLATE).expect("write template");
        }
        Self { root }
    }

    /// Home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Bundle directory.
    pub fn bundle(&self) -> PathBuf {
        self.root.path().join("bundle")
    }

    /// Message-queue directory.
    pub fn queue(&self) -> PathBuf {
        self.root.path().join("tmp").join("agentdeck-queue")
    }

    /// Write `content` to `rel` under home, creating parents.
    pub fn write(&self, rel: impl AsRef<Path>, content: &str) {
        let path = self.home().join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(path, content).expect("write file");
    }

    /// Read `rel` under home.
    pub fn read(&self, rel: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.home().join(rel)).expect("read file")
    }

    /// Whether `rel` exists under home.
    pub fn exists(&self, rel: impl AsRef<Path>) -> bool {
        self.home().join(rel).exists()
    }

    /// Command setup for this machine on a Unix platform.
    pub fn setup(&self, log: &Logger) -> CommandSetup {
        CommandSetup::from_paths(
            &self.home(),
            &self.home().join(".agentdeck"),
            Some(self.bundle()),
            Platform::new(Os::Unix, self.root.path().join("tmp")),
            log,
        )
    }

    /// Task context for this machine with an offline dashboard.
    pub fn context(&self, log: &Arc<Logger>, dry_run: bool) -> Context {
        let setup = self.setup(log);
        Context::new(
            Arc::new(setup.config),
            Arc::new(setup.platform),
            Arc::clone(log) as Arc<dyn Log>,
            dry_run,
            Arc::new(OfflineDashboard),
        )
    }

    /// Run `tasks` in order, returning the logger that recorded them.
    pub fn run(&self, tasks: &[Box<dyn Task>], dry_run: bool) -> Arc<Logger> {
        let log = Arc::new(Logger::new("integration"));
        let ctx = self.context(&log, dry_run);
        for task in tasks {
            tasks::execute(task.as_ref(), &ctx);
        }
        log
    }

    /// Run the install task list.
    pub fn install(&self) -> Arc<Logger> {
        self.run(&tasks::all_install_tasks(), false)
    }

    /// Run the reset task list, including the offline dashboard signal.
    pub fn reset(&self) -> Arc<Logger> {
        self.run(&tasks::all_reset_tasks(true), false)
    }

    /// Names of the snapshot directories under the data directory.
    pub fn snapshots(&self) -> Vec<String> {
        let dir = self.home().join(".agentdeck").join("backups");
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

/// Parse a JSON file under the machine's home.
pub fn read_json(machine: &TestMachine, rel: &str) -> serde_json::Value {
    serde_json::from_str(&machine.read(rel)).expect("valid JSON")
}
