//! `motordesk cache` command - metadata cache maintenance

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::cache::EntityCache;

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Synchronize the cache with the record files on disk
    Sync {
        /// Drop everything and re-scan from scratch
        #[arg(long)]
        full: bool,
    },

    /// Show cache statistics
    Stats,

    /// Remove every cached row (the next command re-populates)
    Clear,
}

pub fn run(cmd: CacheCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    match cmd {
        CacheCommands::Sync { full } => {
            let mut cache = EntityCache::open_without_sync(&project)?;
            let stats = if full { cache.rebuild()? } else { cache.sync()? };

            if !global.quiet {
                println!(
                    "{} Cache synced in {} ms",
                    style("✓").green().bold(),
                    stats.duration_ms
                );
                println!(
                    "  scanned {}, added {}, updated {}, removed {}",
                    stats.files_scanned,
                    style(stats.entities_added).green(),
                    style(stats.entities_updated).yellow(),
                    style(stats.entities_removed).red()
                );
            }
            Ok(())
        }
        CacheCommands::Stats => {
            let cache = EntityCache::open_without_sync(&project)?;
            let stats = cache.statistics()?;

            println!("{}", style("Cache statistics").bold());
            println!("entities: {}", stats.total_entities);
            println!("size:     {} KB", stats.db_size_bytes / 1024);

            let mut by_prefix: Vec<_> = stats.by_prefix.into_iter().collect();
            by_prefix.sort();
            for (prefix, count) in by_prefix {
                println!("  {:<4} {:>5}", prefix, count);
            }
            Ok(())
        }
        CacheCommands::Clear => {
            let mut cache = EntityCache::open_without_sync(&project)?;
            cache.clear()?;
            if !global.quiet {
                println!("{} Cache cleared", style("✓").green().bold());
            }
            Ok(())
        }
    }
}
