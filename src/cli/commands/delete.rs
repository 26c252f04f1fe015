//! `motordesk delete` command - remove a record

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_project, resolve_reference};
use crate::cli::GlobalOpts;
use crate::core::store::{EntityStore, StoreError};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record reference (ID, fragment, or @N alias)
    pub reference: String,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let id = resolve_reference(&project, &args.reference)?;
    let store = EntityStore::new(project);

    if !store.exists(&id) {
        return Err(miette::miette!("No record found with ID {}", id));
    }

    if !args.force && !global.quiet {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete {}? This cannot be undone", id))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    match store.delete(&id) {
        Ok(()) => {
            if !global.quiet {
                println!("{} Deleted {}", style("✓").green().bold(), style(id).cyan());
            }
            Ok(())
        }
        Err(StoreError::StillReferenced { id, referrers }) => Err(miette::miette!(
            "Cannot delete {}: still referenced by {}. Delete or edit those records first.",
            id,
            referrers
        )),
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
