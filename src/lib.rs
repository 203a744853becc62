//! agentdeck hook installer.
//!
//! Registers agentdeck's dashboard hook with AI coding agents (Claude,
//! Gemini, Codex) and removes it again, without disturbing anything the user
//! or other tools put in the same configuration files.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: where host configs live and which hosts to manage
//! - **[`resources`]**: artifact codecs, ownership rules, the hook registry,
//!   backups and deployed scripts
//! - **[`tasks`]**: named units of work wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `reset`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod signal;
pub mod tasks;
