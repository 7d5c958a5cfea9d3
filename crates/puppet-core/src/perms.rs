//! Permission snapshots and payload authorization.

use serde::{Deserialize, Serialize};

/// What one listener has granted to one speaker: the permission flags plus
/// the trigger phrase and optional bracket characters the speaker's
/// messages are parsed with. Treated as an immutable snapshot per
/// dispatch; updates go through [`PermissionChange`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    #[serde(default)]
    pub trigger_phrase: String,
    #[serde(default)]
    pub start_char: Option<char>,
    #[serde(default)]
    pub end_char: Option<char>,
    #[serde(default)]
    pub allow_sit_requests: bool,
    #[serde(default)]
    pub allow_motion_requests: bool,
    #[serde(default)]
    pub allow_all_requests: bool,
}

/// Command classes the permission flags gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Sit,
    Motion,
    Other,
}

const SIT_VERBS: &[&str] = &["sit", "groundsit", "cpose", "changepose"];

// Emote-only commands a motion grant covers.
const MOTION_VERBS: &[&str] = &[
    "dance", "wave", "hug", "bow", "kneel", "point", "clap", "cheer", "doze", "laugh", "cry",
    "stretch", "salute", "beckon", "pat", "shrug", "nod", "blush", "pose", "grovel",
];

impl Category {
    /// Classify a payload by its leading verb token. Surrounding
    /// punctuation is trimmed, so `, sit` and `/sit` classify like `sit`.
    #[must_use]
    pub fn classify(payload: &str) -> Self {
        let verb = payload
            .split_whitespace()
            .filter_map(|token| {
                let token = token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
                (!token.is_empty()).then_some(token)
            })
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if SIT_VERBS.contains(&verb.as_str()) {
            Self::Sit
        } else if MOTION_VERBS.contains(&verb.as_str()) {
            Self::Motion
        } else {
            Self::Other
        }
    }
}

/// Pure authorization decision. An all-requests grant covers every
/// category; otherwise sit and motion need their own flags and anything
/// else is denied.
#[must_use]
pub const fn authorize(category: Category, perms: &PermissionSet) -> bool {
    if perms.allow_all_requests {
        return true;
    }
    match category {
        Category::Sit => perms.allow_sit_requests,
        Category::Motion => perms.allow_motion_requests,
        Category::Other => false,
    }
}

/// Typed permission update, one field per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionChange {
    SetTriggerPhrase(String),
    SetStartChar(Option<char>),
    SetEndChar(Option<char>),
    SetAllowSit(bool),
    SetAllowMotion(bool),
    SetAllowAll(bool),
}

impl PermissionChange {
    pub fn apply(self, perms: &mut PermissionSet) {
        match self {
            Self::SetTriggerPhrase(phrase) => perms.trigger_phrase = phrase,
            Self::SetStartChar(c) => perms.start_char = c,
            Self::SetEndChar(c) => perms.end_char = c,
            Self::SetAllowSit(v) => perms.allow_sit_requests = v,
            Self::SetAllowMotion(v) => perms.allow_motion_requests = v,
            Self::SetAllowAll(v) => perms.allow_all_requests = v,
        }
    }
}
