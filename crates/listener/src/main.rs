mod config;
mod invoker;
mod logging;

use std::{io::IsTerminal as _, path::PathBuf};

use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tracing::{debug, info, warn};

use crate::invoker::ConsoleInvoker;
use crate::logging::init_tracing;
use puppet_core::{
    ActionInvoker as _, AliasEditSession, AliasStorage, AliasTrigger, DispatchResult, EntityKind,
    EntityState, ExecutableAction, PermissionChange, PermissionSet, StateChangeEvent,
    TriggerDefinition, dispatch, evaluate, sanitize_line,
};

#[derive(Parser, Debug)]
#[command(
    name = "puppet-listener",
    version,
    about = "Console host for the puppet command-matching engine"
)]
struct Args {
    /// Path to the YAML config with speaker, permissions, aliases and triggers
    #[arg(long, env = "PUPPET_CONFIG", default_value = "./config.yaml")]
    config: PathBuf,

    /// Override the speaker id from the config
    #[arg(long, env = "PUPPET_SPEAKER")]
    speaker: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    // Load .env if present so clap can pick up env vars.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let cfg = config::load_config(&args.config)?;
    let speaker = args.speaker.unwrap_or(cfg.speaker);
    let mut perms = cfg.permissions;
    let mut storage = cfg.aliases;
    let definitions = cfg.triggers;

    print_listener_banner(&speaker, &perms);
    info!(
        speaker = %speaker,
        aliases = storage.list(&speaker).len(),
        triggers = definitions.len(),
        "Listening on stdin. Plain lines are chat; /perm, /event and /alias are control commands."
    );

    let invoker = ConsoleInvoker;
    let mut edit: Option<AliasEditSession> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(control) = line.strip_prefix('/') {
            if let Err(e) = handle_control(
                control,
                &mut perms,
                &mut storage,
                &mut edit,
                &definitions,
                invoker,
                &speaker,
            )
            .await
            {
                warn!(error = %e, "Control command failed");
            }
            continue;
        }

        info!(speaker = %speaker, body = %sanitize_line(line, 200), "Incoming message");
        match dispatch(line, &perms, storage.list(&speaker)) {
            DispatchResult::NoMatch => debug!("No trigger phrase match"),
            DispatchResult::Unauthorized(category) => {
                warn!(category = ?category, "Command denied by permissions");
            }
            DispatchResult::NoAliasFound => info!("Authorized, but no alias matched"),
            DispatchResult::Matched(actions) => {
                run_actions(invoker, &definitions, &actions).await?;
            }
        }
    }
    Ok(())
}

/// Run selected actions, then feed any state transitions they caused back
/// through the evaluator. One cascade level only: actions fired by a
/// transition do not re-enter the evaluator.
async fn run_actions(
    invoker: ConsoleInvoker,
    definitions: &[TriggerDefinition],
    actions: &[ExecutableAction],
) -> Result<()> {
    invoker.invoke(actions).await?;
    for event in invoker::state_transitions(actions) {
        info!(entity = %event.entity_id, state = ?event.new_state, "State change observed");
        let fired = evaluate(&event, definitions);
        if !fired.is_empty() {
            invoker.invoke(&fired).await?;
        }
    }
    Ok(())
}

async fn handle_control(
    line: &str,
    perms: &mut PermissionSet,
    storage: &mut AliasStorage,
    edit: &mut Option<AliasEditSession>,
    definitions: &[TriggerDefinition],
    invoker: ConsoleInvoker,
    speaker: &str,
) -> Result<()> {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    match cmd {
        "perm" => apply_perm_change(rest.trim(), perms),
        "event" => {
            let mut args = rest.split_whitespace();
            let usage = "usage: /event <restraint_set|gag> <entity-id> <state>";
            let kind = parse_kind(args.next().context(usage)?)?;
            let entity_id = args.next().context(usage)?.to_owned();
            let new_state = parse_state(args.next().context(usage)?)?;
            let event = StateChangeEvent {
                entity_id,
                kind,
                new_state,
                at: OffsetDateTime::now_utc(),
            };
            info!(entity = %event.entity_id, kind = ?event.kind, state = ?event.new_state, "State change observed");
            let fired = evaluate(&event, definitions);
            if fired.is_empty() {
                info!("No trigger fired");
            } else {
                invoker.invoke(&fired).await?;
            }
            Ok(())
        }
        "alias" => handle_alias_command(rest.trim(), storage, edit, speaker),
        other => Err(anyhow!("unknown control command `/{other}`")),
    }
}

fn apply_perm_change(rest: &str, perms: &mut PermissionSet) -> Result<()> {
    let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
    let value = value.trim();
    let change = match field {
        "trigger_phrase" => PermissionChange::SetTriggerPhrase(value.to_owned()),
        "start_char" => PermissionChange::SetStartChar(parse_char(value)?),
        "end_char" => PermissionChange::SetEndChar(parse_char(value)?),
        "allow_sit" => PermissionChange::SetAllowSit(parse_bool(value)?),
        "allow_motion" => PermissionChange::SetAllowMotion(parse_bool(value)?),
        "allow_all" => PermissionChange::SetAllowAll(parse_bool(value)?),
        other => return Err(anyhow!("unknown permission field `{other}`")),
    };
    info!(change = ?change, "Applying permission change");
    change.apply(perms);
    Ok(())
}

fn handle_alias_command(
    rest: &str,
    storage: &mut AliasStorage,
    edit: &mut Option<AliasEditSession>,
    speaker: &str,
) -> Result<()> {
    let (sub, args) = rest.split_once(' ').unwrap_or((rest, ""));
    match sub {
        "edit" => {
            if edit.is_some() {
                return Err(anyhow!("an edit session is already open"));
            }
            *edit = Some(storage.start_editing_list(speaker));
            info!(owner = %speaker, "Editing alias list");
            Ok(())
        }
        "save" => {
            let session = edit.take().context("no edit session to save")?;
            storage.save_modified_list(session);
            info!(owner = %speaker, "Alias list saved");
            Ok(())
        }
        "cancel" => {
            edit.take().context("no edit session to cancel")?.cancel();
            info!(owner = %speaker, "Alias edits discarded");
            Ok(())
        }
        "add" => {
            let session = edit.as_mut().context("start with /alias edit first")?;
            let usage = "usage: /alias add <id> <pattern> => <chat text>";
            let (id, spec) = args.split_once(' ').context(usage)?;
            let (pattern, text) = spec.split_once("=>").context(usage)?;
            session.scratch.push(AliasTrigger {
                id: id.to_owned(),
                name: id.to_owned(),
                input_text: pattern.trim().to_owned(),
                output_actions: vec![ExecutableAction::Chat {
                    text: text.trim().to_owned(),
                }],
                enabled: true,
            });
            Ok(())
        }
        "remove" => {
            let session = edit.as_mut().context("start with /alias edit first")?;
            let id = args.trim();
            let before = session.scratch.len();
            session.scratch.retain(|alias| alias.id != id);
            if session.scratch.len() == before {
                return Err(anyhow!("no alias with id `{id}` in the edit scratch"));
            }
            Ok(())
        }
        "list" => {
            let committed = storage.list(speaker);
            let shown = edit.as_ref().map_or(committed, |s| s.scratch.as_slice());
            info!(owner = %speaker, editing = edit.is_some(), entries = shown.len(), "Alias list");
            for alias in shown {
                info!(id = %alias.id, pattern = %alias.input_text, enabled = alias.enabled, "Alias");
            }
            Ok(())
        }
        other => Err(anyhow!(
            "unknown alias subcommand `{other}` (edit|add|remove|save|cancel|list)"
        )),
    }
}

fn parse_char(value: &str) -> Result<Option<char>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value
        .chars()
        .next()
        .map(Some)
        .context("expected a character or `none`")
}

fn parse_bool(value: &str) -> Result<bool> {
    value
        .parse()
        .with_context(|| format!("expected true or false, got `{value}`"))
}

fn parse_kind(value: &str) -> Result<EntityKind> {
    match value.to_ascii_lowercase().as_str() {
        "restraint_set" | "restraint" => Ok(EntityKind::RestraintSet),
        "gag" => Ok(EntityKind::Gag),
        other => Err(anyhow!("unknown entity kind `{other}`")),
    }
}

fn parse_state(value: &str) -> Result<EntityState> {
    match value.to_ascii_lowercase().as_str() {
        "enabled" => Ok(EntityState::Enabled),
        "disabled" => Ok(EntityState::Disabled),
        "locked" => Ok(EntityState::Locked),
        "unlocked" => Ok(EntityState::Unlocked),
        other => Err(anyhow!("unknown entity state `{other}`")),
    }
}

// Loud banner so the granted surface is obvious at startup.
fn print_listener_banner(speaker: &str, perms: &PermissionSet) {
    let is_tty = std::io::stderr().is_terminal()
        || std::env::var("FORCE_COLOR").is_ok_and(|v| !v.is_empty());
    let grants = format!(
        "sit={} motion={} all={}",
        perms.allow_sit_requests, perms.allow_motion_requests, perms.allow_all_requests
    );
    let (title, sub, color) = if perms.trigger_phrase.is_empty() {
        (
            "NO TRIGGER PHRASE SET".to_owned(),
            format!("{speaker} cannot issue commands until /perm trigger_phrase is set"),
            "\x1b[1;33m", // bold yellow
        )
    } else {
        (
            format!("LISTENING FOR \"{}\"", perms.trigger_phrase),
            format!("speaker {speaker} — {grants}"),
            "\x1b[1;32m", // bold green
        )
    };
    if is_tty {
        eprintln!(
            "{color}==============================\n  {title}\n  {sub}\n==============================\x1b[0m"
        );
    } else {
        eprintln!(
            "==============================\n  {title}\n  {sub}\n=============================="
        );
    }
}
