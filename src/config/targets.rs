//! Host applications agentdeck registers hooks with.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::platform::Platform;
use crate::resources::artifact::ArtifactFormat;

/// Events recognised in Claude's `settings.json`.
pub const CLAUDE_EVENTS: &[&str] = &[
    "SessionStart",
    "UserPromptSubmit",
    "PreToolUse",
    "PostToolUse",
    "Notification",
    "Stop",
    "SubagentStop",
    "PreCompact",
    "SessionEnd",
];

/// Events recognised in Gemini's `settings.json`.
pub const GEMINI_EVENTS: &[&str] = &[
    "SessionStart",
    "BeforeAgent",
    "AfterAgent",
    "BeforeTool",
    "AfterTool",
    "Notification",
    "PreCompress",
    "SessionEnd",
];

/// Codex has a single `notify` statement rather than per-event hooks.
pub const CODEX_EVENTS: &[&str] = &[];

/// Identifier of a supported host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetId {
    /// Claude Code.
    Claude,
    /// Gemini CLI.
    Gemini,
    /// Codex CLI.
    Codex,
}

impl TargetId {
    /// Every supported host, in processing order.
    pub const ALL: [Self; 3] = [Self::Claude, Self::Gemini, Self::Codex];

    /// Lowercase prefix used for backup filenames and config keys.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Codex => "codex",
        }
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claude => write!(f, "Claude"),
            Self::Gemini => write!(f, "Gemini"),
            Self::Codex => write!(f, "Codex"),
        }
    }
}

/// One host application's configuration surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Which host this is.
    pub id: TargetId,
    /// Configuration file hooks are registered in.
    pub artifact: PathBuf,
    /// Layout of `artifact`.
    pub format: ArtifactFormat,
    /// Closed set of event names agentdeck manages, in registration order.
    pub events: &'static [&'static str],
    /// Directory hook scripts are deployed into.
    pub scripts_dir: PathBuf,
}

impl Target {
    /// The standard location of `id`'s configuration under `home`.
    #[must_use]
    pub fn for_home(id: TargetId, home: &Path) -> Self {
        let (dir, file, format, events) = match id {
            TargetId::Claude => (
                ".claude",
                "settings.json",
                ArtifactFormat::JsonEventGroups,
                CLAUDE_EVENTS,
            ),
            TargetId::Gemini => (
                ".gemini",
                "settings.json",
                ArtifactFormat::JsonEventGroups,
                GEMINI_EVENTS,
            ),
            TargetId::Codex => (
                ".codex",
                "config.toml",
                ArtifactFormat::TomlLines,
                CODEX_EVENTS,
            ),
        };
        let base = home.join(dir);
        Self {
            id,
            artifact: base.join(file),
            format,
            events,
            scripts_dir: base.join("hooks"),
        }
    }

    /// Filename of the artifact copy inside a backup snapshot.
    #[must_use]
    pub fn backup_name(&self) -> String {
        let file = self
            .artifact
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().to_string());
        format!("{}-{file}", self.id.prefix())
    }

    /// The registration agentdeck wants in this target on `platform`.
    #[must_use]
    pub fn hook_definition(&self, platform: &Platform, is_async: bool) -> HookDefinition {
        let script = self.scripts_dir.join(platform.script_name());
        HookDefinition {
            command: platform.hook_command(&script),
            events: self.events.iter().map(|e| (*e).to_string()).collect(),
            is_async,
        }
    }
}

/// The hook agentdeck installs into a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookDefinition {
    /// Command string the host runs.
    pub command: String,
    /// Events the command is attached to.
    pub events: Vec<String>,
    /// Value of the descriptor's `async` flag.
    pub is_async: bool,
}
