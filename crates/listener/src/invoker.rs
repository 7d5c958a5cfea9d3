use anyhow::Result;
use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::info;

use puppet_core::{ActionInvoker, EntityKind, ExecutableAction, StateChangeEvent};

/// Runs selected actions against the console: chat lines go to stdout the
/// way a client would send them, everything else is reported as a
/// structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleInvoker;

#[async_trait]
impl ActionInvoker for ConsoleInvoker {
    async fn invoke(&self, actions: &[ExecutableAction]) -> Result<()> {
        for action in actions {
            match action {
                ExecutableAction::None => {}
                ExecutableAction::Chat { text } => println!("{text}"),
                ExecutableAction::Emote { name } => {
                    info!(emote = %name, "Performing emote");
                }
                ExecutableAction::ToggleRestraint { set_id, state } => {
                    info!(set = %set_id, state = ?state, "Toggling restraint set");
                }
            }
        }
        Ok(())
    }
}

/// State transitions the given actions cause once run, for feeding back
/// through the trigger evaluator.
pub fn state_transitions(actions: &[ExecutableAction]) -> Vec<StateChangeEvent> {
    actions
        .iter()
        .filter_map(|action| match action {
            ExecutableAction::ToggleRestraint { set_id, state } => Some(StateChangeEvent {
                entity_id: set_id.clone(),
                kind: EntityKind::RestraintSet,
                new_state: *state,
                at: OffsetDateTime::now_utc(),
            }),
            ExecutableAction::None
            | ExecutableAction::Chat { .. }
            | ExecutableAction::Emote { .. } => None,
        })
        .collect()
}
