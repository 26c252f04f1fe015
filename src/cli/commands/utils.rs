//! Shared building blocks for the per-entity commands

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;

use crate::cli::helpers::resolve_reference;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::entity::Entity;
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::core::store::EntityStore;

/// Refresh the short-ID index from a fresh listing and persist it
pub fn refresh_short_ids(project: &Project, ids: impl IntoIterator<Item = String>) -> ShortIdIndex {
    let mut short_ids = ShortIdIndex::load(project);
    short_ids.rebuild(ids);
    let _ = short_ids.save(project);
    short_ids
}

/// Resolve the effective list format (auto becomes tsv)
pub fn list_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        OutputFormat::Tsv
    } else {
        format
    }
}

/// `show` for any record type: resolve the reference and print the record
pub fn run_show<T: Entity>(store: &EntityStore, reference: &str, format: OutputFormat) -> Result<()> {
    let id = resolve_reference(store.project(), reference)?;
    if id.prefix() != T::PREFIX {
        return Err(miette::miette!(
            "{} is a {} record, not {}",
            id,
            id.prefix(),
            T::PREFIX
        ));
    }

    let path = store.path_for(&id);
    let content = fs::read_to_string(&path).into_diagnostic()?;

    match format {
        OutputFormat::Json => {
            let item: T = serde_yml::from_str(&content).into_diagnostic()?;
            let json = serde_json::to_string_pretty(&item).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            print!("{}", content);
        }
    }

    Ok(())
}

/// `edit` for any record type: open the file in the editor, then re-parse
/// to catch YAML damage early
pub fn run_edit<T: Entity>(store: &EntityStore, reference: &str) -> Result<()> {
    let id = resolve_reference(store.project(), reference)?;
    if id.prefix() != T::PREFIX {
        return Err(miette::miette!(
            "{} is a {} record, not {}",
            id,
            id.prefix(),
            T::PREFIX
        ));
    }

    let path = store.path_for(&id);
    let config = Config::load();

    let status = config.run_editor(&path).into_diagnostic()?;
    if !status.success() {
        return Err(miette::miette!("editor exited with an error"));
    }

    let content = fs::read_to_string(&path).into_diagnostic()?;
    match serde_yml::from_str::<T>(&content) {
        Ok(_) => {
            println!("{} Updated {}", style("✓").green(), style(&id).cyan());
        }
        Err(e) => {
            println!(
                "{} {} no longer parses: {}",
                style("!").red().bold(),
                style(&id).cyan(),
                e
            );
        }
    }

    Ok(())
}

/// Confirmation line after creating a record
pub fn announce_created(id: &crate::core::identity::EntityId, summary: &str, short_id: u32) {
    println!(
        "{} Created {} {}",
        style("✓").green(),
        style(format!("@{}", short_id)).cyan(),
        style(id).cyan()
    );
    println!("   {}", style(summary).white());
}

/// Register a freshly created record in the short-ID index
pub fn register_short_id(project: &Project, id: &crate::core::identity::EntityId) -> u32 {
    let mut short_ids = ShortIdIndex::load(project);
    let short = short_ids.add(id.to_string());
    let _ = short_ids.save(project);
    short
}
