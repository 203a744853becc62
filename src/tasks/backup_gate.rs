//! Typed signal shared between [`super::snapshot::SnapshotConfigs`] and the
//! tasks that modify host configuration after it.
//!
//! `BackupGate` wraps an `Arc<AtomicBool>` and exposes only the two
//! operations that matter: [`BackupGate::open`] (called once a snapshot
//! directory exists) and [`BackupGate::is_open`] (checked before mutating).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Context, TaskResult};

/// A cheaply-clonable flag recording whether this run's backup snapshot was
/// taken.
///
/// Create one instance per run and clone it into every task that needs it.
#[derive(Debug, Clone)]
pub struct BackupGate {
    open: Arc<AtomicBool>,
}

impl BackupGate {
    /// Create a new gate in the closed state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Record that the snapshot was written.
    pub fn open(&self) {
        self.open.store(true, Ordering::Release);
    }

    /// Returns `true` if [`Self::open`] has been called.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// `Some(Skipped)` when a task must not modify anything: the gate is
    /// closed and this is not a dry run.
    #[must_use]
    pub fn refuse(&self, ctx: &Context) -> Option<TaskResult> {
        (!ctx.dry_run && !self.is_open())
            .then(|| TaskResult::Skipped("no backup snapshot was taken".to_string()))
    }
}

impl Default for BackupGate {
    fn default() -> Self {
        Self::new()
    }
}
