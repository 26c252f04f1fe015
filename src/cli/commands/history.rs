//! `motordesk history` command - show the audit trail of a workflow record

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_project, resolve_reference};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::core::workflow::{WorkflowItem, WorkflowStatus};
use crate::entities::asesoria::Asesoria;
use crate::entities::devolucion::Devolucion;
use crate::entities::reparacion::Reparacion;
use crate::core::identity::EntityPrefix;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Record reference (ID, fragment, or @N alias). Must be REP, DEV or ASE.
    pub reference: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "auto")]
    pub format: OutputFormat,
}

pub fn run(args: HistoryArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let id = resolve_reference(&project, &args.reference)?;

    if !id.prefix().is_workflow() {
        return Err(miette::miette!(
            "{} records have no status workflow, so no history either.",
            id.prefix().as_str()
        ));
    }

    let store = EntityStore::new(project);

    if matches!(args.format, OutputFormat::Json) {
        let doc = crate::api::workflow_item_detail(&store, &id)
            .map_err(|e| miette::miette!("{}", e))?;
        println!(
            "{}",
            serde_json::to_string_pretty(&doc["historial_estados"]).into_diagnostic()?
        );
        return Ok(());
    }

    match id.prefix() {
        EntityPrefix::Rep => print_history::<Reparacion>(&store, &id),
        EntityPrefix::Dev => print_history::<Devolucion>(&store, &id),
        EntityPrefix::Ase => print_history::<Asesoria>(&store, &id),
        _ => unreachable!("is_workflow() covers exactly these prefixes"),
    }
}

fn print_history<T: WorkflowItem>(
    store: &EntityStore,
    id: &crate::core::identity::EntityId,
) -> Result<()> {
    let item: T = store.load(id).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{}  {}",
        style(id.to_string()).cyan().bold(),
        item.summary()
    );
    println!(
        "estado actual: {}{}",
        style(item.estado().to_string()).bold(),
        if item.estado().is_terminal() {
            " (terminal)"
        } else {
            ""
        }
    );
    println!();

    if item.history().is_empty() {
        println!("No transitions recorded yet.");
        return Ok(());
    }

    println!(
        "{:<20} {:<14} {:<14} {:<14} NOTAS",
        style("FECHA").bold(),
        style("DE").bold(),
        style("A").bold(),
        style("USUARIO").bold()
    );
    println!("{}", "-".repeat(86));

    for change in item.history().latest_first() {
        println!(
            "{:<20} {:<14} {:<14} {:<14} {}",
            change.fecha_cambio.format("%Y-%m-%d %H:%M"),
            change.estado_anterior.to_string(),
            style(change.estado_nuevo.to_string()).bold(),
            change.usuario.as_deref().unwrap_or("-"),
            change.notas.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
