//! `motordesk api` command - JSON documents over the workflow records
//!
//! Output is always pretty-printed JSON on stdout, meant for piping into
//! `jq` or other tooling.

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::api::{self, WorkflowKind};
use crate::cli::helpers::{open_project, resolve_reference};
use crate::cli::GlobalOpts;
use crate::core::store::EntityStore;

#[derive(Subcommand, Debug)]
pub enum ApiCommands {
    /// List every workflow item as summary rows, newest first
    Items(ItemsArgs),

    /// Full document for one workflow item, history and derived fields included
    Item(ItemArgs),
}

#[derive(clap::Args, Debug)]
pub struct ItemsArgs {
    /// Restrict to one workflow kind (rep, dev, ase)
    #[arg(long, short = 't')]
    pub tipo: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ItemArgs {
    /// Record reference (ID, fragment, or @N alias)
    pub id: String,
}

pub fn run(cmd: ApiCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    match cmd {
        ApiCommands::Items(args) => {
            let kind: Option<WorkflowKind> = args
                .tipo
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(|e| miette::miette!("{}", e))?;

            let store = EntityStore::new(project);
            let rows = api::workflow_items(&store, kind).map_err(|e| miette::miette!("{}", e))?;
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
            Ok(())
        }
        ApiCommands::Item(args) => {
            let id = resolve_reference(&project, &args.id)?;
            let store = EntityStore::new(project);
            let doc =
                api::workflow_item_detail(&store, &id).map_err(|e| miette::miette!("{}", e))?;
            println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
            Ok(())
        }
    }
}
