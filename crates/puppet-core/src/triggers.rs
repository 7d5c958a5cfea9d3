//! State-change triggers: definitions, validation and the evaluator.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::action::ExecutableAction;

/// Kinds of observed entities that can drive state triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    RestraintSet,
    Gag,
}

/// States an observed entity can transition into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityState {
    Enabled,
    Disabled,
    Locked,
    Unlocked,
}

/// One observed transition. Ephemeral; the engine never stores these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeEvent {
    pub entity_id: String,
    pub kind: EntityKind,
    pub new_state: EntityState,
    pub at: OffsetDateTime,
}

/// What a trigger definition watches. Closed set; each variant carries
/// its own match predicate. A `None` watched id is a wildcard over every
/// entity of that variant's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TriggerSource {
    RestraintState {
        #[serde(default)]
        set_id: Option<String>,
        state: EntityState,
    },
    GagState {
        #[serde(default)]
        gag_id: Option<String>,
        state: EntityState,
    },
}

impl TriggerSource {
    #[must_use]
    pub fn matches(&self, event: &StateChangeEvent) -> bool {
        match self {
            Self::RestraintState { set_id, state } => {
                event.kind == EntityKind::RestraintSet
                    && *state == event.new_state
                    && set_id.as_deref().is_none_or(|id| id == event.entity_id)
            }
            Self::GagState { gag_id, state } => {
                event.kind == EntityKind::Gag
                    && *state == event.new_state
                    && gag_id.as_deref().is_none_or(|id| id == event.entity_id)
            }
        }
    }
}

/// A named rule firing one action when its watched entity transitions
/// into the watched state. `Clone` yields a fully independent copy for
/// edit-preview workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    pub id: String,
    #[serde(default = "enabled_true")]
    pub enabled: bool,
    /// Lower fires first; ties break on ascending id.
    #[serde(default)]
    pub priority: i32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub source: TriggerSource,
    #[serde(default)]
    pub action: ExecutableAction,
}

const fn enabled_true() -> bool {
    true
}

/// Fan one event out over the definitions. Every enabled definition whose
/// source matches fires exactly once, ordered by (priority asc, id asc).
/// An event nothing watches yields an empty sequence, never an error.
/// Stateless: call once per event, in event order.
#[must_use]
pub fn evaluate(
    event: &StateChangeEvent,
    definitions: &[TriggerDefinition],
) -> Vec<ExecutableAction> {
    let mut fired: Vec<&TriggerDefinition> = definitions
        .iter()
        .filter(|def| def.enabled && def.source.matches(event))
        .collect();
    fired.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
    for def in &fired {
        debug!(trigger = %def.id, name = %def.name, priority = def.priority, "Trigger fired");
    }
    fired.into_iter().map(|def| def.action.clone()).collect()
}

/// Configuration-integrity faults in trigger definitions, surfaced at
/// load time. [`evaluate`] assumes validated input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidDefinition {
    #[error("trigger definition has an empty identifier")]
    EmptyId,
    #[error("duplicate trigger identifier `{0}`")]
    DuplicateId(String),
    #[error("trigger `{0}` has no executable action")]
    MissingAction(String),
}

pub fn validate_definitions(
    definitions: &[TriggerDefinition],
) -> Result<(), InvalidDefinition> {
    let mut seen = HashSet::new();
    for def in definitions {
        if def.id.is_empty() {
            return Err(InvalidDefinition::EmptyId);
        }
        if !seen.insert(def.id.as_str()) {
            return Err(InvalidDefinition::DuplicateId(def.id.clone()));
        }
        if !def.action.is_configured() {
            return Err(InvalidDefinition::MissingAction(def.id.clone()));
        }
    }
    Ok(())
}
