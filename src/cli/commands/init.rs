//! `motordesk init` command - Initialize a new project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    match Project::init(&path) {
        Ok(project) => {
            println!(
                "{} Initialized Motordesk project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created record directories:");
            for prefix in EntityPrefix::all() {
                println!("  {}/", Project::entity_directory(*prefix));
            }
            println!();
            println!("Next steps:");
            println!(
                "  {} Add a vehicle to the inventory",
                style("motordesk carro new").yellow()
            );
            println!(
                "  {} Register a customer",
                style("motordesk cliente new").yellow()
            );
            println!(
                "  {} Open a repair order",
                style("motordesk rep new").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => Err(miette::miette!(
            "Motordesk project already exists at {}",
            path.display()
        )),
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
