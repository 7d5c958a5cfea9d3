//! Command-matching and trigger-dispatch engine for the puppet listener.
//!
//! Everything in here is pure and synchronous: a chat message plus a
//! permission snapshot goes in, a [`DispatchResult`] comes out; a state
//! change event plus trigger definitions go in, fired actions come out.
//! Running the selected actions, moving messages over the wire and
//! persisting configuration all belong to the host.

pub mod action;
pub mod alias;
pub mod dispatch;
pub mod matcher;
pub mod perms;
pub mod triggers;

pub use action::{ActionInvoker, ExecutableAction};
pub use alias::{AliasEditSession, AliasStorage, AliasTrigger, resolve};
pub use dispatch::{DispatchResult, dispatch};
pub use matcher::match_trigger;
pub use perms::{Category, PermissionChange, PermissionSet, authorize};
pub use triggers::{
    EntityKind, EntityState, InvalidDefinition, StateChangeEvent, TriggerDefinition,
    TriggerSource, evaluate, validate_definitions,
};

#[must_use]
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Collapse whitespace and cap length for one-line log output.
#[must_use]
pub fn sanitize_line(s: &str, max: usize) -> String {
    let compact = s.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&compact, max)
}
