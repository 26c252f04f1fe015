//! `motordesk transition` command - apply a status transition to a workflow record
//!
//! This is the only write path for `estado` and `historial_estados`. The
//! record is locked, re-read, validated against its transition table and the
//! team roster, and saved with one appended audit entry.

use clap::Args;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_project, resolve_reference};
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::store::EntityStore;
use crate::core::team::TeamRoster;
use crate::core::workflow::{WorkflowEngine, WorkflowItem, WorkflowStatus};
use crate::entities::asesoria::Asesoria;
use crate::entities::devolucion::Devolucion;
use crate::entities::reparacion::Reparacion;

#[derive(Args, Debug)]
pub struct TransitionArgs {
    /// Record reference (ID, fragment, or @N alias). Must be REP, DEV or ASE.
    pub reference: String,

    /// Target status (as shown by `history` and `list --estado`)
    pub estado: String,

    /// Audit note attached to the history entry
    #[arg(long, short = 'm')]
    pub message: Option<String>,

    /// Only apply if the record is still in this status
    #[arg(long)]
    pub from: Option<String>,

    /// Acting user (default: configured author)
    #[arg(long)]
    pub actor: Option<String>,

    /// Validate and show the outcome without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: TransitionArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let id = resolve_reference(&project, &args.reference)?;

    if !id.prefix().is_workflow() {
        return Err(miette::miette!(
            "{} records have no status workflow. Only REP, DEV and ASE records can be transitioned.",
            id.prefix().as_str()
        ));
    }

    let roster = TeamRoster::load(&project).map_err(|e| miette::miette!("{}", e))?;
    let store = EntityStore::new(project);
    let engine = WorkflowEngine::new(&store, roster);

    let actor = args
        .actor
        .clone()
        .unwrap_or_else(|| Config::load().author());

    match id.prefix() {
        EntityPrefix::Rep => transition_one::<Reparacion>(&store, &engine, &id, &args, &actor, global),
        EntityPrefix::Dev => transition_one::<Devolucion>(&store, &engine, &id, &args, &actor, global),
        EntityPrefix::Ase => transition_one::<Asesoria>(&store, &engine, &id, &args, &actor, global),
        _ => unreachable!("is_workflow() covers exactly these prefixes"),
    }
}

fn transition_one<T: Entity + WorkflowItem>(
    store: &EntityStore,
    engine: &WorkflowEngine,
    id: &EntityId,
    args: &TransitionArgs,
    actor: &str,
    global: &GlobalOpts,
) -> Result<()> {
    let nuevo: T::Status = args
        .estado
        .parse()
        .map_err(|e: String| miette::miette!("{}", e))?;

    if args.dry_run {
        let item: T = store.load(id).map_err(|e| miette::miette!("{}", e))?;
        let allowed = item.estado().next_states();

        println!(
            "{} is {} (no changes written)",
            style(id.to_string()).cyan(),
            style(item.estado().to_string()).bold()
        );
        if allowed.is_empty() {
            println!("The record is in a terminal state. No transitions are possible.");
        } else if allowed.contains(&nuevo) {
            println!(
                "{} {} -> {} would be applied by {}",
                style("ok:").green(),
                item.estado(),
                nuevo,
                actor
            );
        } else {
            let listed = allowed
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "{} {} -> {} is not allowed. Legal next states: {}",
                style("refused:").red(),
                item.estado(),
                nuevo,
                listed
            );
        }
        return Ok(());
    }

    let result: Result<T, _> = match &args.from {
        Some(from) => {
            let expected: T::Status = from
                .parse()
                .map_err(|e: String| miette::miette!("{}", e))?;
            engine.apply_transition_from(
                id,
                expected,
                nuevo,
                Some(actor),
                args.message.as_deref(),
            )
        }
        None => engine.apply_transition(id, nuevo, Some(actor), args.message.as_deref()),
    };

    let item = result.map_err(|e| miette::miette!("{}", e))?;

    let anterior = item
        .history()
        .latest()
        .map(|c| c.estado_anterior.to_string())
        .unwrap_or_else(|| "?".to_string());

    if !global.quiet {
        println!(
            "{} {}: {} -> {}",
            style("✓").green().bold(),
            style(id.to_string()).cyan(),
            anterior,
            style(item.estado().to_string()).bold()
        );
        if item.estado().is_terminal() {
            println!("  The record is now closed.");
        } else {
            let next = item
                .estado()
                .next_states()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  Next: {}", style(next).dim());
        }
    }

    Ok(())
}
