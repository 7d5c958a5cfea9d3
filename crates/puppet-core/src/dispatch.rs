//! The inbound message pipeline: phrase match → authorize → resolve.

use tracing::debug;

use crate::action::ExecutableAction;
use crate::alias::{self, AliasTrigger};
use crate::matcher;
use crate::perms::{self, Category, PermissionSet};

/// Outcome of feeding one inbound message through the engine. Every
/// variant is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Phrase or bracket parsing failed; frequent and silently ignorable.
    NoMatch,
    /// Parsed fine, but the speaker lacks the permission for this class.
    /// The caller may notify but must not execute.
    Unauthorized(Category),
    /// Authorized, but no enabled alias matched the payload.
    NoAliasFound,
    /// Actions selected for the host to run.
    Matched(Vec<ExecutableAction>),
}

/// Run one message through phrase matching, authorization and alias
/// resolution. Selection only — nothing is executed here, so the whole
/// pipeline stays pure and testable without a host.
#[must_use]
pub fn dispatch(
    message: &str,
    perms: &PermissionSet,
    aliases: &[AliasTrigger],
) -> DispatchResult {
    let Some(payload) = matcher::match_trigger(
        message,
        &perms.trigger_phrase,
        perms.start_char,
        perms.end_char,
    ) else {
        return DispatchResult::NoMatch;
    };

    let category = Category::classify(&payload);
    debug!(payload = %payload, category = ?category, "Parsed command payload");
    if !perms::authorize(category, perms) {
        return DispatchResult::Unauthorized(category);
    }

    match alias::resolve(&payload, aliases) {
        Some(actions) => DispatchResult::Matched(actions),
        None => DispatchResult::NoAliasFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sit_alias() -> AliasTrigger {
        AliasTrigger {
            id: "sit-alias".into(),
            name: "sit".into(),
            input_text: "sit".into(),
            output_actions: vec![ExecutableAction::Emote { name: "sit".into() }],
            enabled: true,
        }
    }

    fn perms(sit: bool, motion: bool, all: bool) -> PermissionSet {
        PermissionSet {
            trigger_phrase: "Kitty".into(),
            allow_sit_requests: sit,
            allow_motion_requests: motion,
            allow_all_requests: all,
            ..PermissionSet::default()
        }
    }

    #[test]
    fn sit_request_without_brackets_matches_sit_alias() {
        let result = dispatch("Kitty, sit", &perms(true, false, false), &[sit_alias()]);
        assert_eq!(
            result,
            DispatchResult::Matched(vec![ExecutableAction::Emote { name: "sit".into() }])
        );
    }

    #[test]
    fn authorized_payload_without_alias_is_no_alias_found() {
        let result = dispatch("Kitty, sit", &perms(true, false, false), &[]);
        assert_eq!(result, DispatchResult::NoAliasFound);
    }

    #[test]
    fn motion_request_with_sit_only_grant_is_unauthorized() {
        let mut p = perms(true, false, false);
        p.start_char = Some('<');
        p.end_char = Some('>');
        let result = dispatch("Kitty <dance>", &p, &[sit_alias()]);
        assert_eq!(result, DispatchResult::Unauthorized(Category::Motion));
    }

    #[test]
    fn message_without_phrase_is_no_match() {
        let result = dispatch("please sit", &perms(true, true, true), &[sit_alias()]);
        assert_eq!(result, DispatchResult::NoMatch);
    }

    #[test]
    fn other_category_needs_the_all_grant() {
        let aliases = [AliasTrigger {
            id: "say".into(),
            name: "say".into(),
            input_text: "say hello".into(),
            output_actions: vec![ExecutableAction::Chat {
                text: "hello".into(),
            }],
            enabled: true,
        }];
        assert_eq!(
            dispatch("Kitty say hello", &perms(true, true, false), &aliases),
            DispatchResult::Unauthorized(Category::Other)
        );
        assert!(matches!(
            dispatch("Kitty say hello", &perms(false, false, true), &aliases),
            DispatchResult::Matched(_)
        ));
    }
}
