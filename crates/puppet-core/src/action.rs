use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::triggers::EntityState;

/// A single executable step attached to an alias or trigger definition.
///
/// The engine only ever selects and clones these; interpreting them is the
/// host's job via [`ActionInvoker`]. Every variant owns its data, so
/// `Clone` always yields a fully independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutableAction {
    /// A definition whose action has not been configured yet.
    #[default]
    None,
    /// Send a chat line as the listener's character.
    Chat { text: String },
    /// Perform a named emote.
    Emote { name: String },
    /// Flip a restraint set into the given state.
    ToggleRestraint { set_id: String, state: EntityState },
}

impl ExecutableAction {
    /// Whether the action carries anything to run.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// External collaborator that runs selected actions.
///
/// The engine never calls this itself; hosts hand it the action sequences
/// pulled out of [`crate::DispatchResult::Matched`] or returned by
/// [`crate::evaluate`].
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    async fn invoke(&self, actions: &[ExecutableAction]) -> Result<()>;
}
