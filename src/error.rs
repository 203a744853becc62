//! Domain-specific error types for the agentdeck hook installer.
//!
//! Internal modules return typed errors built with [`thiserror`]; task and
//! command code converts them to [`anyhow::Error`] at the boundary via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! ArtifactError  reading, parsing or writing a host configuration file
//! SetupError     bundle and environment problems detected before any mutation
//! BackupError    snapshot directory creation and per-file copy failures
//! SignalError    the advisory "clear browser state" request
//! ```
//!
//! Only [`SetupError::TemplateMissing`] is fatal to a run; every other error
//! is reported as a warning against the target or file it concerns.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or storing a host application's configuration artifact.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// The artifact exists but could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or TOML.
    #[error("malformed {}: {message}", .path.display())]
    Parse {
        /// Path of the artifact.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// The artifact parsed but its shape is not one this tool can safely edit.
    #[error("unexpected layout in {}: {reason}", .path.display())]
    Schema {
        /// Path of the artifact.
        path: PathBuf,
        /// What was wrong with the layout.
        reason: String,
    },

    /// Writing the updated artifact failed.
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors detected while preparing a run, before anything is changed.
#[derive(Error, Debug)]
pub enum SetupError {
    /// A hook script template that ships with agentdeck is absent.
    #[error("bundled hook template not found: {}", .path.display())]
    TemplateMissing {
        /// Expected template location.
        path: PathBuf,
    },

    /// The bundle directory could not be located.
    #[error("cannot locate the agentdeck bundle. Use --root or set AGENTDECK_ROOT")]
    BundleNotFound,

    /// Neither `HOME` nor `USERPROFILE` is set.
    #[error("neither HOME nor USERPROFILE environment variable is set")]
    HomeNotSet,
}

/// Errors raised while taking a backup snapshot.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The snapshot directory could not be created.
    #[error("cannot create backup directory {}: {source}", .path.display())]
    CreateDir {
        /// Snapshot directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A single file could not be copied into the snapshot.
    #[error("cannot back up {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        /// File being backed up.
        from: PathBuf,
        /// Destination inside the snapshot.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// The dashboard did not acknowledge the clear-state request.
#[derive(Error, Debug)]
#[error("dashboard at {url} did not respond: {message}")]
pub struct SignalError {
    /// Endpoint that was contacted.
    pub url: String,
    /// Transport or status error.
    pub message: String,
}
