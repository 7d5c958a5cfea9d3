//! Alias storage, resolution and the list edit session.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::action::ExecutableAction;
use crate::matcher;

/// One stored pattern → action mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTrigger {
    pub id: String,
    pub name: String,
    /// Text that must occur (ASCII-case-insensitive) in a parsed payload
    /// for this alias to fire.
    pub input_text: String,
    /// Ordered steps to run on a match.
    #[serde(default)]
    pub output_actions: Vec<ExecutableAction>,
    #[serde(default = "enabled_true")]
    pub enabled: bool,
}

const fn enabled_true() -> bool {
    true
}

/// First enabled alias whose pattern occurs in the payload wins; no
/// scoring, stored order decides ties. The returned actions are clones so
/// callers can never mutate stored state. `None` means authorized but
/// nothing configured for this payload — distinct from a permission
/// denial.
#[must_use]
pub fn resolve(payload: &str, aliases: &[AliasTrigger]) -> Option<Vec<ExecutableAction>> {
    aliases
        .iter()
        .find(|alias| {
            alias.enabled
                && !alias.input_text.is_empty()
                && matcher::contains_ignore_ascii_case(payload, &alias.input_text)
        })
        .map(|alias| {
            debug!(alias = %alias.id, name = %alias.name, "Alias matched payload");
            alias.output_actions.clone()
        })
}

/// Ordered alias lists keyed by the owning user id. Committed state is
/// only ever replaced wholesale through [`AliasEditSession`]s, so readers
/// never observe a half-edited list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasStorage {
    by_owner: HashMap<String, Vec<AliasTrigger>>,
}

impl AliasStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed alias list for an owner, empty when none exists.
    #[must_use]
    pub fn list(&self, owner: &str) -> &[AliasTrigger] {
        self.by_owner.get(owner).map_or(&[], Vec::as_slice)
    }

    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.by_owner.keys().map(String::as_str)
    }

    pub fn insert_list(&mut self, owner: impl Into<String>, list: Vec<AliasTrigger>) {
        self.by_owner.insert(owner.into(), list);
    }

    pub fn remove_owner(&mut self, owner: &str) -> Option<Vec<AliasTrigger>> {
        self.by_owner.remove(owner)
    }

    /// Begin editing one owner's list. All further edits go to the
    /// session's scratch copy; committed state stays untouched until
    /// [`Self::save_modified_list`]. Single writer: the host must keep at
    /// most one session per storage open.
    #[must_use]
    pub fn start_editing_list(&self, owner: &str) -> AliasEditSession {
        AliasEditSession {
            owner: owner.to_owned(),
            scratch: self.list(owner).to_vec(),
        }
    }

    /// Replace the committed list with the session's scratch in one move.
    pub fn save_modified_list(&mut self, session: AliasEditSession) {
        let AliasEditSession { owner, scratch } = session;
        debug!(owner = %owner, entries = scratch.len(), "Committing edited alias list");
        self.by_owner.insert(owner, scratch);
    }
}

/// Scratch copy of one owner's alias list while it is being edited.
///
/// The session is consumed on save or cancel, so the only transitions out
/// of the editing state are the two the storage understands.
#[derive(Debug, Clone)]
pub struct AliasEditSession {
    owner: String,
    pub scratch: Vec<AliasTrigger>,
}

impl AliasEditSession {
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Discard all edits without touching committed state.
    pub fn cancel(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alias(id: &str, pattern: &str, enabled: bool) -> AliasTrigger {
        AliasTrigger {
            id: id.to_owned(),
            name: id.to_owned(),
            input_text: pattern.to_owned(),
            output_actions: vec![ExecutableAction::Chat {
                text: format!("ran {id}"),
            }],
            enabled,
        }
    }

    #[test]
    fn first_match_wins_in_stored_order() {
        let aliases = vec![alias("a", "sit", true), alias("b", "sit down", true)];
        let actions = resolve("sit down please", &aliases).unwrap();
        assert_eq!(
            actions,
            vec![ExecutableAction::Chat {
                text: "ran a".into()
            }]
        );

        // Reordering flips the winner.
        let reordered = vec![aliases[1].clone(), aliases[0].clone()];
        let actions = resolve("sit down please", &reordered).unwrap();
        assert_eq!(
            actions,
            vec![ExecutableAction::Chat {
                text: "ran b".into()
            }]
        );
    }

    #[test]
    fn disabled_and_empty_patterns_never_match() {
        let aliases = vec![alias("off", "dance", false), alias("blank", "", true)];
        assert_eq!(resolve("dance", &aliases), None);
    }

    #[test]
    fn match_is_case_insensitive_substring() {
        let aliases = vec![alias("d", "DanCe", true)];
        assert!(resolve("please dance for me", &aliases).is_some());
        assert_eq!(resolve("no moves here", &aliases), None);
    }

    #[test]
    fn resolved_actions_are_independent_of_storage() {
        let aliases = vec![alias("a", "sit", true)];
        let mut actions = resolve("sit", &aliases).unwrap();
        actions.clear();
        assert_eq!(aliases[0].output_actions.len(), 1);
    }

    #[test]
    fn cancel_leaves_committed_state_untouched() {
        let mut storage = AliasStorage::new();
        storage.insert_list("pair-a", vec![alias("a", "sit", true)]);
        let before = storage.clone();

        let mut session = storage.start_editing_list("pair-a");
        session.scratch.clear();
        session.scratch.push(alias("z", "zap", true));
        session.cancel();

        assert_eq!(storage, before);
    }

    #[test]
    fn save_commits_the_scratch_wholesale() {
        let mut storage = AliasStorage::new();
        storage.insert_list("pair-a", vec![alias("a", "sit", true)]);

        let mut session = storage.start_editing_list("pair-a");
        session.scratch.push(alias("b", "dance", true));
        storage.save_modified_list(session);

        let ids: Vec<&str> = storage.list("pair-a").iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn editing_an_unknown_owner_starts_from_empty() {
        let mut storage = AliasStorage::new();
        let mut session = storage.start_editing_list("new-pair");
        assert!(session.scratch.is_empty());
        session.scratch.push(alias("a", "sit", true));
        storage.save_modified_list(session);
        assert_eq!(storage.list("new-pair").len(), 1);
    }
}
