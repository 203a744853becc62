//! Typed view of a JSON settings document whose `hooks` key maps event names
//! to ordered lists of hook groups.
//!
//! Every group keeps its original [`Value`] so foreign groups are written
//! back exactly as they were read. Alongside it sits an optional typed
//! [`HookGroup`] view; groups whose shape the view cannot describe stay
//! opaque and are never classified as owned.
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ArtifactError;

/// Top-level key holding the event map.
pub const HOOKS_KEY: &str = "hooks";

/// A parsed settings document.
///
/// Top-level keys keep their original order; only the `hooks` subtree is
/// ever edited.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettingsDocument {
    root: Map<String, Value>,
}

/// What a settings document holds for one event name.
#[derive(Debug, Clone, PartialEq)]
pub enum EventSlot {
    /// No key for this event.
    Absent,
    /// The event's ordered group list.
    Groups(Vec<GroupEntry>),
    /// The key exists but is not a list; left untouched.
    Opaque,
}

impl SettingsDocument {
    /// An empty document (`{}`).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `text` read from `path`. Whitespace-only text is the empty document.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Parse`] for invalid JSON and
    /// [`ArtifactError::Schema`] when the top level or `hooks` is not an object.
    pub fn parse(path: &Path, text: &str) -> Result<Self, ArtifactError> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }
        let value: Value = serde_json::from_str(text).map_err(|e| ArtifactError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let Value::Object(root) = value else {
            return Err(ArtifactError::Schema {
                path: path.to_path_buf(),
                reason: "top level is not an object".to_string(),
            });
        };
        if root.get(HOOKS_KEY).is_some_and(|hooks| !hooks.is_object()) {
            return Err(ArtifactError::Schema {
                path: path.to_path_buf(),
                reason: format!("`{HOOKS_KEY}` is not an object"),
            });
        }
        Ok(Self { root })
    }

    /// Look up the groups registered for `event`.
    #[must_use]
    pub fn event(&self, event: &str) -> EventSlot {
        match self.hooks().and_then(|hooks| hooks.get(event)) {
            None => EventSlot::Absent,
            Some(Value::Array(items)) => {
                EventSlot::Groups(items.iter().cloned().map(GroupEntry::from_value).collect())
            }
            Some(_) => EventSlot::Opaque,
        }
    }

    /// Replace the group list for `event`, creating `hooks` if needed.
    pub fn set_groups(&mut self, event: &str, groups: Vec<GroupEntry>) {
        let items = Value::Array(groups.into_iter().map(GroupEntry::into_raw).collect());
        let hooks = self
            .root
            .entry(HOOKS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = hooks {
            map.insert(event.to_string(), items);
        }
    }

    /// Remove the key for `event`, keeping the order of the remaining events.
    pub fn remove_event(&mut self, event: &str) {
        if let Some(Value::Object(hooks)) = self.root.get_mut(HOOKS_KEY) {
            hooks.retain(|name, _| name != event);
        }
    }

    /// Names of every top-level key, in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// Serialize as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(&self.root)?;
        text.push('\n');
        Ok(text)
    }

    fn hooks(&self) -> Option<&Map<String, Value>> {
        self.root.get(HOOKS_KEY).and_then(Value::as_object)
    }
}

/// One element of an event's group list.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    raw: Value,
    view: Option<HookGroup>,
}

impl GroupEntry {
    /// Wrap a value read from disk, deriving the typed view when it fits.
    #[must_use]
    pub fn from_value(raw: Value) -> Self {
        let view = HookGroup::deserialize(&raw).ok();
        Self { raw, view }
    }

    /// Build an entry from a group this tool is about to write.
    #[must_use]
    pub fn from_group(group: HookGroup) -> Self {
        Self {
            raw: group.to_value(),
            view: Some(group),
        }
    }

    /// Typed view, or `None` for shapes it cannot describe.
    #[must_use]
    pub const fn view(&self) -> Option<&HookGroup> {
        self.view.as_ref()
    }

    /// The value as read (or as it will be written).
    #[must_use]
    pub const fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume the entry, returning its value.
    #[must_use]
    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Point an owned group at `hook` without disturbing anything else in it.
    ///
    /// Sets `source`, then rewrites `command` and `async` on the first hook
    /// whose command contains `pattern` (else the first command hook, else
    /// appends `hook`). Other keys, such as `matcher` or `timeout`, are kept.
    /// Returns whether the group changed.
    pub fn retarget(&mut self, source: &str, pattern: &str, hook: &CommandHook) -> bool {
        let Value::Object(group) = &mut self.raw else {
            return false;
        };
        let mut changed = set_if_different(group, "source", Value::String(source.to_string()));

        let hooks = group
            .entry(HOOKS_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !hooks.is_array() {
            *hooks = Value::Array(Vec::new());
            changed = true;
        }
        if let Value::Array(entries) = hooks {
            let matches = |entry: &Value| {
                entry
                    .get("command")
                    .and_then(Value::as_str)
                    .is_some_and(|c| c.contains(pattern))
            };
            let slot = entries
                .iter()
                .position(matches)
                .or_else(|| entries.iter().position(|e| e.get("command").is_some_and(Value::is_string)));
            let index = slot.unwrap_or(entries.len());
            if index == entries.len() {
                entries.push(hook.to_value());
                changed = true;
            }
            if let Some(entry) = entries.get_mut(index).and_then(Value::as_object_mut) {
                changed |= set_if_different(entry, "command", Value::String(hook.command.clone()));
                if let Some(is_async) = hook.is_async {
                    changed |= set_if_different(entry, "async", Value::Bool(is_async));
                }
            }
        }

        if changed {
            self.view = HookGroup::deserialize(&self.raw).ok();
        }
        changed
    }
}

/// Insert `key` unless it already holds `value`; returns whether it changed.
fn set_if_different(map: &mut Map<String, Value>, key: &str, value: Value) -> bool {
    if map.get(key) == Some(&value) {
        return false;
    }
    map.insert(key.to_string(), value);
    true
}

/// `{source?, hooks: [...]}`: one registration group under an event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HookGroup {
    /// Ownership marker written by the tool that created the group.
    #[serde(default)]
    pub source: Option<String>,
    /// Hook descriptors in order.
    #[serde(default)]
    pub hooks: Vec<HookEntry>,
}

impl HookGroup {
    /// Every command string in the group.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.hooks.iter().filter_map(|hook| match hook {
            HookEntry::Command(cmd) => Some(cmd.command.as_str()),
            HookEntry::Opaque(_) => None,
        })
    }

    /// Serialize with keys in `source`, `hooks` order.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(source) = &self.source {
            map.insert("source".to_string(), Value::String(source.clone()));
        }
        map.insert(
            "hooks".to_string(),
            Value::Array(self.hooks.iter().map(HookEntry::to_value).collect()),
        );
        Value::Object(map)
    }
}

/// A single hook descriptor inside a group.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HookEntry {
    /// A descriptor carrying a command string.
    Command(CommandHook),
    /// Anything else, carried through untouched.
    Opaque(Value),
}

impl HookEntry {
    /// Serialize the descriptor.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Command(cmd) => cmd.to_value(),
            Self::Opaque(value) => value.clone(),
        }
    }
}

/// `{type, command, async}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandHook {
    /// Descriptor kind; hosts only define `command`.
    #[serde(rename = "type", default = "command_kind")]
    pub kind: String,
    /// Shell command the host runs.
    pub command: String,
    /// Whether the host may run the hook without waiting for it.
    #[serde(rename = "async", default)]
    pub is_async: Option<bool>,
}

impl CommandHook {
    /// A `command` descriptor.
    #[must_use]
    pub fn new(command: impl Into<String>, is_async: bool) -> Self {
        Self {
            kind: command_kind(),
            command: command.into(),
            is_async: Some(is_async),
        }
    }

    fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(self.kind.clone()));
        map.insert("command".to_string(), Value::String(self.command.clone()));
        if let Some(is_async) = self.is_async {
            map.insert("async".to_string(), Value::Bool(is_async));
        }
        Value::Object(map)
    }
}

fn command_kind() -> String {
    "command".to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(text: &str) -> Result<SettingsDocument, ArtifactError> {
        SettingsDocument::parse(Path::new("settings.json"), text)
    }

    #[test]
    fn whitespace_is_empty_document() {
        assert_eq!(parse("  \n").unwrap(), SettingsDocument::empty());
    }

    #[test]
    fn invalid_json_is_parse_error() {
        assert!(matches!(parse("{not json"), Err(ArtifactError::Parse { .. })));
    }

    #[test]
    fn array_root_is_schema_error() {
        assert!(matches!(parse("[]"), Err(ArtifactError::Schema { .. })));
    }

    #[test]
    fn non_object_hooks_is_schema_error() {
        let err = parse(r#"{"hooks": []}"#).unwrap_err();
        assert!(err.to_string().contains("`hooks` is not an object"), "{err}");
    }

    #[test]
    fn event_slots() {
        let doc = parse(r#"{"hooks": {"Stop": [], "Odd": "x"}}"#).unwrap();
        assert_eq!(doc.event("Stop"), EventSlot::Groups(vec![]));
        assert_eq!(doc.event("Odd"), EventSlot::Opaque);
        assert_eq!(doc.event("SessionStart"), EventSlot::Absent);
    }

    #[test]
    fn group_without_type_still_exposes_command() {
        let entry = GroupEntry::from_value(json!({"hooks": [{"command": "/bin/other-tool"}]}));
        let view = entry.view().expect("view");
        assert_eq!(view.commands().collect::<Vec<_>>(), vec!["/bin/other-tool"]);
        assert_eq!(view.source, None);
    }

    #[test]
    fn non_string_source_makes_group_opaque() {
        let entry = GroupEntry::from_value(json!({"source": 7, "hooks": []}));
        assert!(entry.view().is_none());
    }

    #[test]
    fn odd_hook_entries_are_carried_through() {
        let raw = json!({"matcher": "Bash", "hooks": [42, {"type": "prompt"}]});
        let entry = GroupEntry::from_value(raw.clone());
        let view = entry.view().expect("view");
        assert_eq!(view.commands().count(), 0);
        assert_eq!(entry.into_raw(), raw);
    }

    #[test]
    fn owned_group_serializes_in_schema_order() {
        let group = HookGroup {
            source: Some("agentdeck".to_string()),
            hooks: vec![HookEntry::Command(CommandHook::new("bash \"/h/agentdeck-hook.sh\"", true))],
        };
        let text = serde_json::to_string(&group.to_value()).unwrap();
        assert_eq!(
            text,
            r#"{"source":"agentdeck","hooks":[{"type":"command","command":"bash \"/h/agentdeck-hook.sh\"","async":true}]}"#
        );
    }

    #[test]
    fn set_groups_creates_hooks_and_keeps_key_order() {
        let mut doc = parse(r#"{"theme": "dark", "model": "opus"}"#).unwrap();
        doc.set_groups("Stop", vec![GroupEntry::from_value(json!({"hooks": []}))]);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["theme", "model", "hooks"]);
    }

    #[test]
    fn remove_event_keeps_sibling_order() {
        let mut doc = parse(r#"{"hooks": {"A": [], "B": [], "C": []}}"#).unwrap();
        doc.remove_event("B");
        let text = doc.render().unwrap();
        assert!(text.find("\"A\"").unwrap() < text.find("\"C\"").unwrap());
        assert!(!text.contains("\"B\""));
    }

    #[test]
    fn render_preserves_unknown_keys_and_order() {
        let text = "{\n  \"zeta\": 1,\n  \"alpha\": {\n    \"nested\": [\n      true\n    ]\n  }\n}\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.render().unwrap(), text);
    }
}
