//! Decides which fragments of a shared configuration belong to agentdeck.
//!
//! Anything not positively identified as owned is foreign and must survive
//! every edit untouched.
use super::artifact::GroupEntry;

/// Ownership rules for hook groups, TOML lines and deployed scripts.
///
/// # Examples
///
/// ```
/// use agentdeck_cli::resources::ownership::OwnershipClassifier;
///
/// let owner = OwnershipClassifier::default();
/// assert!(owner.owns_line("# [agentdeck] dashboard notifications"));
/// assert!(owner.owns_line("notify = [\"bash\", \"/h/.codex/hooks/agentdeck-hook.sh\"]"));
/// assert!(!owner.owns_line("model = \"o3\""));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipClassifier {
    /// Value of a group's `source` marker when agentdeck wrote it.
    pub source_id: String,
    /// Substring of every command agentdeck installs; identifies groups
    /// written before the `source` marker existed.
    pub command_pattern: String,
    /// Literals present in every script agentdeck ships.
    pub content_markers: Vec<String>,
}

impl Default for OwnershipClassifier {
    fn default() -> Self {
        Self {
            source_id: "agentdeck".to_string(),
            command_pattern: "agentdeck-hook".to_string(),
            content_markers: vec!["AGENTDECK_QUEUE_DIR".to_string(), "agentdeck-hook".to_string()],
        }
    }
}

impl OwnershipClassifier {
    /// Whether a hook group was written by agentdeck.
    ///
    /// The `source` marker is authoritative and checked first; the command
    /// pattern only applies to unmarked groups. Opaque groups are foreign.
    #[must_use]
    pub fn owns_group(&self, entry: &GroupEntry) -> bool {
        let Some(group) = entry.view() else {
            return false;
        };
        if group.source.as_deref() == Some(self.source_id.as_str()) {
            return true;
        }
        group
            .commands()
            .any(|command| command.contains(&self.command_pattern))
    }

    /// Whether a TOML line was written by agentdeck.
    #[must_use]
    pub fn owns_line(&self, line: &str) -> bool {
        if line.contains(&format!("[{}]", self.source_id)) {
            return true;
        }
        line.trim_start().starts_with("notify") && line.contains(&self.command_pattern)
    }

    /// Whether a script's content identifies it as agentdeck's.
    #[must_use]
    pub fn owns_script(&self, content: &str) -> bool {
        self.content_markers
            .iter()
            .any(|marker| content.contains(marker.as_str()))
    }
}
