//! `motordesk status` command - project dashboard

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::open_project;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::cache::EntityCache;
use crate::core::identity::EntityPrefix;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(long, short = 'o', default_value = "auto")]
    pub format: OutputFormat,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let root = project.root().to_path_buf();
    let cache = EntityCache::open(&project)?;

    let stats = cache.statistics()?;

    if matches!(args.format, OutputFormat::Json) {
        let mut workflows = serde_json::Map::new();
        for prefix in EntityPrefix::workflows() {
            let counts = cache.counts_by_estado(*prefix)?;
            workflows.insert(prefix.as_str().to_string(), json!(counts));
        }
        let doc = json!({
            "project": root,
            "total_entities": stats.total_entities,
            "by_prefix": stats.by_prefix,
            "workflows": workflows,
        });
        println!("{}", serde_json::to_string_pretty(&doc).into_diagnostic()?);
        return Ok(());
    }

    println!("{}", style("Motordesk project status").bold());
    println!("project: {}", root.display());
    println!(
        "records: {} ({} KB cached)",
        style(stats.total_entities).cyan(),
        stats.db_size_bytes / 1024
    );
    println!();

    println!("{}", style("Inventory and people").bold());
    for prefix in EntityPrefix::all() {
        if prefix.is_workflow() {
            continue;
        }
        let count = stats.by_prefix.get(prefix.as_str()).copied().unwrap_or(0);
        println!("  {:<4} {:>5}", prefix.as_str(), count);
    }
    println!();

    println!("{}", style("Workflows").bold());
    for prefix in EntityPrefix::workflows() {
        let counts = cache.counts_by_estado(*prefix)?;
        let total: usize = counts.values().sum();
        println!("  {} ({} total)", style(prefix.as_str()).bold(), total);

        let mut estados: Vec<_> = counts.into_iter().collect();
        estados.sort();
        for (estado, n) in estados {
            let shown = match estado.as_str() {
                "PENDIENTE" => style(estado).white(),
                "EN_PROCESO" => style(estado).yellow(),
                "COMPLETADO" | "COMPLETADA" | "APROBADA" | "PROGRAMADA" => style(estado).green(),
                "CANCELADO" | "CANCELADA" | "RECHAZADA" => style(estado).red(),
                _ => style(estado),
            };
            println!("    {:<12} {:>5}", shown, n);
        }
    }

    Ok(())
}
