//! End-to-end flow: YAML-configured aliases and triggers, one inbound
//! message dispatched, the selected restraint toggle fed back through the
//! evaluator as a state-change event.

use puppet_core::{
    AliasTrigger, Category, DispatchResult, EntityKind, EntityState, ExecutableAction,
    PermissionSet, StateChangeEvent, TriggerDefinition, dispatch, evaluate,
    validate_definitions,
};
use time::OffsetDateTime;

const ALIASES_YAML: &str = r"
- id: bind
  name: Bind me
  input_text: tie me up
  output_actions:
    - kind: toggle_restraint
      set_id: restraint-7
      state: enabled
- id: sit
  name: Sit
  input_text: sit
  output_actions:
    - kind: emote
      name: sit
";

const TRIGGERS_YAML: &str = r"
- id: on-bind
  name: Announce binding
  priority: 0
  source:
    source: restraint_state
    set_id: restraint-7
    state: enabled
  action:
    kind: chat
    text: The set is on.
- id: on-any-release
  name: Announce release
  priority: 1
  source:
    source: restraint_state
    state: disabled
  action:
    kind: chat
    text: Free again.
";

#[test]
fn message_to_dispatch_to_trigger_fanout() {
    let aliases: Vec<AliasTrigger> = serde_yaml::from_str(ALIASES_YAML).unwrap();
    let definitions: Vec<TriggerDefinition> = serde_yaml::from_str(TRIGGERS_YAML).unwrap();
    validate_definitions(&definitions).unwrap();

    let perms = PermissionSet {
        trigger_phrase: "Kitty".into(),
        start_char: Some('<'),
        end_char: Some('>'),
        allow_all_requests: true,
        ..PermissionSet::default()
    };

    // Speaker asks for the restraint alias.
    let result = dispatch("Kitty <tie me up>", &perms, &aliases);
    let DispatchResult::Matched(actions) = result else {
        panic!("expected a match, got {result:?}");
    };
    assert_eq!(
        actions,
        vec![ExecutableAction::ToggleRestraint {
            set_id: "restraint-7".into(),
            state: EntityState::Enabled,
        }]
    );

    // The host runs the toggle and reports the transition back.
    let event = StateChangeEvent {
        entity_id: "restraint-7".into(),
        kind: EntityKind::RestraintSet,
        new_state: EntityState::Enabled,
        at: OffsetDateTime::UNIX_EPOCH,
    };
    let fired = evaluate(&event, &definitions);
    assert_eq!(
        fired,
        vec![ExecutableAction::Chat {
            text: "The set is on.".into()
        }]
    );

    // The wildcard release trigger only cares about disabled transitions.
    let release = StateChangeEvent {
        new_state: EntityState::Disabled,
        ..event
    };
    assert_eq!(
        evaluate(&release, &definitions),
        vec![ExecutableAction::Chat {
            text: "Free again.".into()
        }]
    );
}

#[test]
fn unauthorized_speaker_selects_nothing() {
    let aliases: Vec<AliasTrigger> = serde_yaml::from_str(ALIASES_YAML).unwrap();
    let perms = PermissionSet {
        trigger_phrase: "Kitty".into(),
        allow_sit_requests: true,
        ..PermissionSet::default()
    };

    // Sit is fine without brackets configured.
    assert!(matches!(
        dispatch("Kitty sit", &perms, &aliases),
        DispatchResult::Matched(_)
    ));
    // The restraint request classifies as Other and needs the all grant.
    assert_eq!(
        dispatch("Kitty tie me up", &perms, &aliases),
        DispatchResult::Unauthorized(Category::Other)
    );
}
