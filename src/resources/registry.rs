//! Reconciles agentdeck's hook registration against a host artifact.
//!
//! Only event names in the target's vocabulary are read or written, only
//! owned groups and lines are added, replaced or removed, and an artifact is
//! rewritten only when something actually changed.
use std::fmt;
use std::path::PathBuf;

use super::artifact::{
    ArtifactFormat, CommandHook, ConfigLines, GroupEntry, HookEntry, HookGroup, SettingsDocument,
    json::EventSlot, read_artifact, write_artifact,
};
use super::ownership::OwnershipClassifier;
use crate::config::targets::{HookDefinition, Target, TargetId};
use crate::error::ArtifactError;

/// Whether to register or unregister.
#[derive(Debug, Clone, Copy)]
pub enum ReconcileMode<'a> {
    /// Ensure exactly one owned group per event carries this definition.
    Install(&'a HookDefinition),
    /// Remove every owned group or line.
    Uninstall,
}

/// Outcome for one event name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventAction {
    /// No owned group existed; one was appended.
    Added,
    /// An owned group differed and was updated in place.
    Updated,
    /// The owned group already matched.
    AlreadyRegistered,
    /// This many owned groups were dropped.
    Removed(usize),
    /// Nothing owned was registered for the event.
    NotPresent,
    /// The event's value had an unexpected shape and was left alone.
    Skipped(String),
}

impl EventAction {
    /// Whether the action modified the document.
    #[must_use]
    pub const fn is_change(&self) -> bool {
        matches!(self, Self::Added | Self::Updated | Self::Removed(_))
    }

    /// Single-character marker shown before the report line.
    #[must_use]
    pub const fn marker(&self) -> &'static str {
        match self {
            Self::Added => "+",
            Self::Updated => "~",
            Self::AlreadyRegistered => "=",
            Self::Removed(_) => "-",
            Self::NotPresent => "·",
            Self::Skipped(_) => "○",
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Updated => write!(f, "updated"),
            Self::AlreadyRegistered => write!(f, "already registered"),
            Self::Removed(n) => write!(f, "removed {n}"),
            Self::NotPresent => write!(f, "not registered"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

/// Per-event line of a JSON reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    /// Event name.
    pub event: String,
    /// What happened to agentdeck's group.
    pub action: EventAction,
    /// Foreign groups left in place under this event.
    pub preserved: usize,
}

impl EventReport {
    /// Human-readable report line with its marker.
    #[must_use]
    pub fn line(&self) -> String {
        let mut line = format!("{} {}: {}", self.action.marker(), self.event, self.action);
        if self.preserved > 0 {
            let noun = if self.preserved == 1 { "group" } else { "groups" };
            line.push_str(&format!(", kept {} foreign {noun}", self.preserved));
        }
        line
    }
}

/// Outcome of a TOML uninstall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineReport {
    /// Owned lines dropped.
    pub removed: usize,
    /// Non-blank lines left in the file.
    pub preserved: usize,
}

/// Format-specific body of a [`ReconcileReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDetail {
    /// One entry per vocabulary event (JSON targets).
    Events(Vec<EventReport>),
    /// Line counts (TOML targets).
    Lines(LineReport),
    /// Nothing to uninstall: the artifact does not exist.
    ArtifactMissing,
    /// The format does not support installation.
    InstallUnsupported,
}

/// Result of reconciling one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Host the report is about.
    pub target: TargetId,
    /// Artifact path.
    pub path: PathBuf,
    /// What happened.
    pub detail: ReportDetail,
    /// Whether the artifact's content changed (or would change, in a dry run).
    pub changed: bool,
    /// Whether the artifact was rewritten on disk.
    pub written: bool,
}

impl ReconcileReport {
    /// One report line per action, each starting with its marker.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match &self.detail {
            ReportDetail::Events(events) => events.iter().map(EventReport::line).collect(),
            ReportDetail::Lines(report) => vec![
                format!("- removed {} owned line(s)", report.removed),
                format!("· preserved {} line(s)", report.preserved),
            ],
            ReportDetail::ArtifactMissing => vec![format!("· {} not found, nothing to do", self.path.display())],
            ReportDetail::InstallUnsupported => {
                vec!["○ notify registration is managed outside agentdeck".to_string()]
            }
        }
    }
}

/// Applies a [`ReconcileMode`] to each target's artifact.
#[derive(Debug, Clone, Copy)]
pub struct HookRegistry<'a> {
    owner: &'a OwnershipClassifier,
    dry_run: bool,
}

impl<'a> HookRegistry<'a> {
    /// A registry classifying with `owner`; with `dry_run` nothing is written.
    #[must_use]
    pub const fn new(owner: &'a OwnershipClassifier, dry_run: bool) -> Self {
        Self { owner, dry_run }
    }

    /// Reconcile `target` in `mode`.
    ///
    /// # Errors
    ///
    /// Returns an [`ArtifactError`] when the artifact cannot be read, parsed
    /// or written. The artifact is left untouched in every error case except
    /// a failed write, which never leaves a partial file behind.
    pub fn reconcile(
        &self,
        target: &Target,
        mode: ReconcileMode<'_>,
    ) -> Result<ReconcileReport, ArtifactError> {
        match target.format {
            ArtifactFormat::JsonEventGroups => self.reconcile_json(target, mode),
            ArtifactFormat::TomlLines => self.reconcile_toml(target, mode),
        }
    }

    fn reconcile_json(
        &self,
        target: &Target,
        mode: ReconcileMode<'_>,
    ) -> Result<ReconcileReport, ArtifactError> {
        let path = &target.artifact;
        let mut doc = match read_artifact(path)? {
            Some(text) => SettingsDocument::parse(path, &text)?,
            None if matches!(mode, ReconcileMode::Uninstall) => {
                return Ok(self.report(target, ReportDetail::ArtifactMissing, false));
            }
            None => SettingsDocument::empty(),
        };

        let events = reconcile_events(&mut doc, target.events, mode, self.owner);
        let changed = events.iter().any(|e| e.action.is_change());
        let report = self.report(target, ReportDetail::Events(events), changed);
        if report.written {
            let text = doc.render().map_err(|e| ArtifactError::Write {
                path: path.clone(),
                source: e.into(),
            })?;
            write_artifact(path, &text)?;
        }
        Ok(report)
    }

    fn reconcile_toml(
        &self,
        target: &Target,
        mode: ReconcileMode<'_>,
    ) -> Result<ReconcileReport, ArtifactError> {
        if matches!(mode, ReconcileMode::Install(_)) {
            return Ok(self.report(target, ReportDetail::InstallUnsupported, false));
        }
        let path = &target.artifact;
        let Some(text) = read_artifact(path)? else {
            return Ok(self.report(target, ReportDetail::ArtifactMissing, false));
        };
        let mut lines = ConfigLines::parse(path, &text)?;
        let counts = strip_owned_lines(&mut lines, self.owner);
        let report = self.report(target, ReportDetail::Lines(counts), counts.removed > 0);
        if report.written {
            write_artifact(path, &lines.render())?;
        }
        Ok(report)
    }

    fn report(&self, target: &Target, detail: ReportDetail, changed: bool) -> ReconcileReport {
        ReconcileReport {
            target: target.id,
            path: target.artifact.clone(),
            detail,
            changed,
            written: changed && !self.dry_run,
        }
    }
}

/// The group agentdeck wants under every event of `definition`.
#[must_use]
pub fn desired_group(definition: &HookDefinition, owner: &OwnershipClassifier) -> GroupEntry {
    GroupEntry::from_group(HookGroup {
        source: Some(owner.source_id.clone()),
        hooks: vec![HookEntry::Command(CommandHook::new(
            definition.command.clone(),
            definition.is_async,
        ))],
    })
}

/// Reconcile every event in `vocabulary` within `doc`, returning one report
/// per event in vocabulary order.
///
/// When installing, events the definition does not list are left alone.
pub fn reconcile_events(
    doc: &mut SettingsDocument,
    vocabulary: &[&str],
    mode: ReconcileMode<'_>,
    owner: &OwnershipClassifier,
) -> Vec<EventReport> {
    let mut reports = Vec::new();
    for &event in vocabulary {
        let report = match mode {
            ReconcileMode::Install(definition) => {
                if !definition.events.iter().any(|e| e == event) {
                    continue;
                }
                install_event(doc, event, definition, owner)
            }
            ReconcileMode::Uninstall => uninstall_event(doc, event, owner),
        };
        reports.push(report);
    }
    reports
}

fn install_event(
    doc: &mut SettingsDocument,
    event: &str,
    definition: &HookDefinition,
    owner: &OwnershipClassifier,
) -> EventReport {
    let mut groups = match doc.event(event) {
        EventSlot::Groups(groups) => groups,
        EventSlot::Absent => Vec::new(),
        EventSlot::Opaque => return skipped(event),
    };
    let owned: Vec<usize> = groups
        .iter()
        .enumerate()
        .filter(|(_, g)| owner.owns_group(g))
        .map(|(i, _)| i)
        .collect();
    let preserved = groups.len() - owned.len();

    let action = match owned.split_first() {
        None => {
            groups.push(desired_group(definition, owner));
            doc.set_groups(event, groups);
            EventAction::Added
        }
        Some((&first, duplicates)) => {
            let hook = CommandHook::new(definition.command.clone(), definition.is_async);
            let retargeted = groups
                .get_mut(first)
                .is_some_and(|g| g.retarget(&owner.source_id, &owner.command_pattern, &hook));
            if !retargeted && duplicates.is_empty() {
                EventAction::AlreadyRegistered
            } else {
                let kept = groups
                    .into_iter()
                    .enumerate()
                    .filter(|(i, g)| *i == first || !owner.owns_group(g))
                    .map(|(_, g)| g)
                    .collect();
                doc.set_groups(event, kept);
                EventAction::Updated
            }
        }
    };
    EventReport {
        event: event.to_string(),
        action,
        preserved,
    }
}

fn uninstall_event(doc: &mut SettingsDocument, event: &str, owner: &OwnershipClassifier) -> EventReport {
    let groups = match doc.event(event) {
        EventSlot::Groups(groups) => groups,
        EventSlot::Absent => Vec::new(),
        EventSlot::Opaque => return skipped(event),
    };
    let before = groups.len();
    let kept: Vec<GroupEntry> = groups.into_iter().filter(|g| !owner.owns_group(g)).collect();
    let removed = before - kept.len();
    let preserved = kept.len();

    let action = if removed == 0 {
        EventAction::NotPresent
    } else {
        if kept.is_empty() {
            doc.remove_event(event);
        } else {
            doc.set_groups(event, kept);
        }
        EventAction::Removed(removed)
    };
    EventReport {
        event: event.to_string(),
        action,
        preserved,
    }
}

fn skipped(event: &str) -> EventReport {
    EventReport {
        event: event.to_string(),
        action: EventAction::Skipped("value is not a list".to_string()),
        preserved: 0,
    }
}

/// Drop owned lines from `lines`.
pub fn strip_owned_lines(lines: &mut ConfigLines, owner: &OwnershipClassifier) -> LineReport {
    let removed = lines.remove_where(|line| owner.owns_line(line));
    LineReport {
        removed,
        preserved: lines.non_blank_count(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::{Os, Platform};
    use serde_json::{Value, json};
    use std::path::Path;

    fn owner() -> OwnershipClassifier {
        OwnershipClassifier::default()
    }

    fn definition(events: &[&str]) -> HookDefinition {
        HookDefinition {
            command: "bash \"/h/.claude/hooks/agentdeck-hook.sh\"".to_string(),
            events: events.iter().map(|e| (*e).to_string()).collect(),
            is_async: true,
        }
    }

    fn doc(value: &Value) -> SettingsDocument {
        SettingsDocument::parse(Path::new("settings.json"), &value.to_string()).unwrap()
    }

    fn as_json(doc: &SettingsDocument) -> Value {
        serde_json::from_str(&doc.render().unwrap()).unwrap()
    }

    #[test]
    fn install_into_empty_adds_every_event() {
        let mut d = SettingsDocument::empty();
        let def = definition(&["SessionStart", "Stop", "Notification"]);
        let reports = reconcile_events(
            &mut d,
            &["SessionStart", "Stop", "Notification"],
            ReconcileMode::Install(&def),
            &owner(),
        );
        assert!(reports.iter().all(|r| r.action == EventAction::Added));
        let hooks = as_json(&d)["hooks"].as_object().unwrap().clone();
        assert_eq!(hooks.len(), 3);
    }

    #[test]
    fn install_appends_after_foreign_group() {
        let foreign = json!({"hooks": [{"command": "/bin/other-tool"}]});
        let mut d = doc(&json!({"hooks": {"SessionStart": [foreign.clone()]}}));
        let def = definition(&["SessionStart"]);
        let reports = reconcile_events(&mut d, &["SessionStart"], ReconcileMode::Install(&def), &owner());
        assert_eq!(reports[0].action, EventAction::Added);
        assert_eq!(reports[0].preserved, 1);
        let groups = as_json(&d)["hooks"]["SessionStart"].as_array().unwrap().clone();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], foreign);
        assert_eq!(groups[1]["source"], "agentdeck");
    }

    #[test]
    fn install_twice_is_already_registered() {
        let mut d = SettingsDocument::empty();
        let def = definition(&["Stop"]);
        reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        let first = d.render().unwrap();
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        assert_eq!(reports[0].action, EventAction::AlreadyRegistered);
        assert_eq!(d.render().unwrap(), first);
    }

    #[test]
    fn legacy_group_is_updated_in_place() {
        let legacy = json!({"hooks": [{"type": "command", "command": "bash ~/old/agentdeck-hook.sh"}]});
        let before = json!({"matcher": "*", "hooks": [{"command": "/bin/a"}]});
        let after = json!({"hooks": [{"command": "/bin/b"}]});
        let mut d = doc(&json!({"hooks": {"Stop": [before.clone(), legacy, after.clone()]}}));
        let def = definition(&["Stop"]);
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        assert_eq!(reports[0].action, EventAction::Updated);
        let groups = as_json(&d)["hooks"]["Stop"].as_array().unwrap().clone();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0], before);
        assert_eq!(groups[1], desired_group(&def, &owner()).into_raw());
        assert_eq!(groups[2], after);
    }

    #[test]
    fn duplicate_owned_groups_collapse_to_first_position() {
        let owned = json!({"source": "agentdeck", "hooks": []});
        let foreign = json!({"hooks": [{"command": "/bin/x"}]});
        let mut d = doc(&json!({"hooks": {"Stop": [owned.clone(), foreign.clone(), owned]}}));
        let def = definition(&["Stop"]);
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        assert_eq!(reports[0].action, EventAction::Updated);
        let groups = as_json(&d)["hooks"]["Stop"].as_array().unwrap().clone();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["source"], "agentdeck");
        assert_eq!(groups[1], foreign);
    }

    #[test]
    fn update_keeps_owned_group_extra_keys() {
        let legacy = json!({"matcher": "Bash", "hooks": [{"command": "bash /old/agentdeck-hook.sh", "timeout": 30}]});
        let mut d = doc(&json!({"hooks": {"PreToolUse": [legacy]}}));
        let def = definition(&["PreToolUse"]);
        let reports = reconcile_events(&mut d, &["PreToolUse"], ReconcileMode::Install(&def), &owner());
        assert_eq!(reports[0].action, EventAction::Updated);
        let group = as_json(&d)["hooks"]["PreToolUse"][0].clone();
        assert_eq!(group["matcher"], "Bash");
        assert_eq!(group["source"], "agentdeck");
        assert_eq!(group["hooks"].as_array().unwrap().len(), 1);
        assert_eq!(group["hooks"][0]["timeout"], json!(30));
        assert_eq!(group["hooks"][0]["command"], def.command.as_str());
        assert_eq!(group["hooks"][0]["async"], true);
    }

    #[test]
    fn owned_group_with_extra_keys_is_already_registered() {
        let def = definition(&["PreToolUse"]);
        let current = json!({
            "matcher": "Bash",
            "source": "agentdeck",
            "hooks": [{"type": "command", "command": def.command, "async": true, "timeout": 30}]
        });
        let mut d = doc(&json!({"hooks": {"PreToolUse": [current]}}));
        let before = d.render().unwrap();
        let reports = reconcile_events(&mut d, &["PreToolUse"], ReconcileMode::Install(&def), &owner());
        assert_eq!(reports[0].action, EventAction::AlreadyRegistered);
        assert_eq!(d.render().unwrap(), before);
    }

    #[test]
    fn update_rewrites_only_the_pattern_hook() {
        let group = json!({"hooks": [
            {"command": "/bin/log-everything"},
            {"command": "bash /old/agentdeck-hook.sh", "async": false}
        ]});
        let mut d = doc(&json!({"hooks": {"Stop": [group]}}));
        let def = definition(&["Stop"]);
        reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        let hooks = as_json(&d)["hooks"]["Stop"][0]["hooks"].clone();
        assert_eq!(hooks[0], json!({"command": "/bin/log-everything"}));
        assert_eq!(hooks[1]["command"], def.command.as_str());
        assert_eq!(hooks[1]["async"], true);
    }

    #[test]
    fn rewrite_keeps_number_literals_as_written() {
        let text = r#"{"big": 18446744073709551616123, "f": 1e3, "hooks": {"Stop": [{"hooks": [{"command": "/bin/x", "timeout": 1.50}]}, {"source": "agentdeck", "hooks": []}]}}"#;
        let mut d = SettingsDocument::parse(Path::new("settings.json"), text).unwrap();
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Uninstall, &owner());
        assert_eq!(reports[0].action, EventAction::Removed(1));
        let rendered = d.render().unwrap();
        assert!(rendered.contains("\"big\": 18446744073709551616123"), "{rendered}");
        assert!(rendered.contains("\"f\": 1e3"), "{rendered}");
        assert!(rendered.contains("\"timeout\": 1.50"), "{rendered}");
    }

    #[test]
    fn uninstall_restores_original_and_keeps_key() {
        let original = json!({"hooks": {"SessionStart": [{"hooks": [{"command": "/bin/other-tool"}]}]}});
        let mut d = doc(&original);
        let def = definition(&["SessionStart"]);
        reconcile_events(&mut d, &["SessionStart"], ReconcileMode::Install(&def), &owner());
        let reports = reconcile_events(&mut d, &["SessionStart"], ReconcileMode::Uninstall, &owner());
        assert_eq!(reports[0].action, EventAction::Removed(1));
        assert_eq!(as_json(&d), original);
    }

    #[test]
    fn uninstall_drops_key_when_list_empties() {
        let mut d = doc(&json!({"hooks": {"Stop": [{"source": "agentdeck", "hooks": []}], "Other": []}}));
        reconcile_events(&mut d, &["Stop"], ReconcileMode::Uninstall, &owner());
        assert_eq!(as_json(&d), json!({"hooks": {"Other": []}}));
    }

    #[test]
    fn uninstall_leaves_already_empty_list() {
        let mut d = doc(&json!({"hooks": {"Stop": []}}));
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Uninstall, &owner());
        assert_eq!(reports[0].action, EventAction::NotPresent);
        assert_eq!(as_json(&d), json!({"hooks": {"Stop": []}}));
    }

    #[test]
    fn events_outside_vocabulary_are_untouched() {
        let custom = json!([{"source": "agentdeck", "hooks": []}]);
        let mut d = doc(&json!({"hooks": {"CustomEvent": custom.clone()}}));
        reconcile_events(&mut d, &["Stop"], ReconcileMode::Uninstall, &owner());
        let def = definition(&["Stop"]);
        reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        assert_eq!(as_json(&d)["hooks"]["CustomEvent"], custom);
    }

    #[test]
    fn non_list_event_is_skipped() {
        let mut d = doc(&json!({"hooks": {"Stop": {"weird": true}}}));
        let def = definition(&["Stop"]);
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Install(&def), &owner());
        assert!(matches!(reports[0].action, EventAction::Skipped(_)));
        assert_eq!(as_json(&d)["hooks"]["Stop"], json!({"weird": true}));
    }

    #[test]
    fn marker_group_with_foreign_command_is_removed() {
        let mut d = doc(&json!({"hooks": {"Stop": [{"source": "agentdeck", "hooks": [{"command": "/usr/bin/true"}]}]}}));
        let reports = reconcile_events(&mut d, &["Stop"], ReconcileMode::Uninstall, &owner());
        assert_eq!(reports[0].action, EventAction::Removed(1));
    }

    #[test]
    fn strip_owned_lines_counts() {
        let mut lines = ConfigLines::parse(
            Path::new("config.toml"),
            "notify = [\"bash\", \"/h/.codex/hooks/agentdeck-hook.sh\"]\nmodel = \"x\"\n",
        )
        .unwrap();
        let report = strip_owned_lines(&mut lines, &owner());
        assert_eq!(report, LineReport { removed: 1, preserved: 1 });
        assert_eq!(lines.render(), "model = \"x\"\n");
    }

    #[test]
    fn report_lines_carry_markers() {
        let report = EventReport {
            event: "Stop".to_string(),
            action: EventAction::Added,
            preserved: 2,
        };
        assert_eq!(report.line(), "+ Stop: added, kept 2 foreign groups");
        let removed = EventReport {
            event: "Stop".to_string(),
            action: EventAction::Removed(1),
            preserved: 0,
        };
        assert_eq!(removed.line(), "- Stop: removed 1");
    }

    // -----------------------------------------------------------------------
    // HookRegistry against the filesystem
    // -----------------------------------------------------------------------

    fn target(home: &Path, id: TargetId) -> Target {
        Target::for_home(id, home)
    }

    #[test]
    fn registry_uninstall_without_owned_groups_does_not_rewrite() {
        let home = tempfile::tempdir().unwrap();
        let t = target(home.path(), TargetId::Claude);
        std::fs::create_dir_all(t.artifact.parent().unwrap()).unwrap();
        let text = "{\"theme\":\"dark\",\"hooks\":{\"Stop\":[{\"hooks\":[{\"command\":\"x\"}]}]}}";
        std::fs::write(&t.artifact, text).unwrap();
        let owner = owner();
        let report = HookRegistry::new(&owner, false)
            .reconcile(&t, ReconcileMode::Uninstall)
            .unwrap();
        assert!(!report.written);
        assert_eq!(std::fs::read_to_string(&t.artifact).unwrap(), text);
    }

    #[test]
    fn registry_install_creates_missing_artifact() {
        let home = tempfile::tempdir().unwrap();
        let t = target(home.path(), TargetId::Gemini);
        let def = t.hook_definition(&Platform::new(Os::Unix, "/tmp"), true);
        let owner = owner();
        let report = HookRegistry::new(&owner, false)
            .reconcile(&t, ReconcileMode::Install(&def))
            .unwrap();
        assert!(report.written);
        let written: Value = serde_json::from_str(&std::fs::read_to_string(&t.artifact).unwrap()).unwrap();
        assert_eq!(written["hooks"].as_object().unwrap().len(), t.events.len());
    }

    #[test]
    fn registry_dry_run_reports_without_writing() {
        let home = tempfile::tempdir().unwrap();
        let t = target(home.path(), TargetId::Claude);
        let def = t.hook_definition(&Platform::new(Os::Unix, "/tmp"), true);
        let owner = owner();
        let report = HookRegistry::new(&owner, true)
            .reconcile(&t, ReconcileMode::Install(&def))
            .unwrap();
        assert!(report.changed);
        assert!(!report.written);
        assert!(!t.artifact.exists());
    }

    #[test]
    fn registry_uninstall_missing_artifact() {
        let home = tempfile::tempdir().unwrap();
        let owner = owner();
        let registry = HookRegistry::new(&owner, false);
        for id in TargetId::ALL {
            let report = registry.reconcile(&target(home.path(), id), ReconcileMode::Uninstall).unwrap();
            assert_eq!(report.detail, ReportDetail::ArtifactMissing);
        }
    }

    #[test]
    fn registry_malformed_json_is_error_and_untouched() {
        let home = tempfile::tempdir().unwrap();
        let t = target(home.path(), TargetId::Claude);
        std::fs::create_dir_all(t.artifact.parent().unwrap()).unwrap();
        std::fs::write(&t.artifact, "{ nope").unwrap();
        let owner = owner();
        let result = HookRegistry::new(&owner, false).reconcile(&t, ReconcileMode::Uninstall);
        assert!(matches!(result, Err(ArtifactError::Parse { .. })));
        assert_eq!(std::fs::read_to_string(&t.artifact).unwrap(), "{ nope");
    }

    #[test]
    fn registry_toml_install_is_unsupported() {
        let home = tempfile::tempdir().unwrap();
        let t = target(home.path(), TargetId::Codex);
        let def = t.hook_definition(&Platform::new(Os::Unix, "/tmp"), true);
        let owner = owner();
        let report = HookRegistry::new(&owner, false)
            .reconcile(&t, ReconcileMode::Install(&def))
            .unwrap();
        assert_eq!(report.detail, ReportDetail::InstallUnsupported);
        assert!(!t.artifact.exists());
    }

    #[test]
    fn registry_toml_uninstall_rewrites() {
        let home = tempfile::tempdir().unwrap();
        let t = target(home.path(), TargetId::Codex);
        std::fs::create_dir_all(t.artifact.parent().unwrap()).unwrap();
        std::fs::write(
            &t.artifact,
            "# [agentdeck]\nnotify = [\"bash\", \"/h/agentdeck-hook.sh\"]\nmodel = \"x\"\n",
        )
        .unwrap();
        let owner = owner();
        let report = HookRegistry::new(&owner, false)
            .reconcile(&t, ReconcileMode::Uninstall)
            .unwrap();
        assert_eq!(report.detail, ReportDetail::Lines(LineReport { removed: 2, preserved: 1 }));
        assert_eq!(std::fs::read_to_string(&t.artifact).unwrap(), "model = \"x\"\n");
    }
}
