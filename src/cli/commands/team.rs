//! `motordesk team` command - roster management
//!
//! Without a roster every actor may transition everything. Creating one
//! turns on role checks for all three workflows at once.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::open_project;
use crate::cli::GlobalOpts;
use crate::core::team::{Role, TeamMember, TeamRoster};

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// Create an empty roster (this enables authorization checks)
    Init,

    /// List roster members and their roles
    List,

    /// Add a member to the roster
    Add(AddArgs),

    /// Deactivate a member (kept in the file for audit attribution)
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub nombre: String,

    #[arg(long)]
    pub email: String,

    /// Login name matched against the transition actor
    #[arg(long)]
    pub usuario: String,

    /// Roles: admin, taller, ventas, atencion (repeatable)
    #[arg(long, short = 'r', required = true)]
    pub roles: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Login name of the member to deactivate
    pub usuario: String,
}

pub fn run(cmd: TeamCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;

    match cmd {
        TeamCommands::Init => {
            if TeamRoster::load(&project)
                .map_err(|e| miette::miette!("{}", e))?
                .is_some()
            {
                return Err(miette::miette!("A roster already exists at .motordesk/equipo.yaml"));
            }
            TeamRoster::default()
                .save(&project)
                .map_err(|e| miette::miette!("{}", e))?;
            println!(
                "{} Created .motordesk/equipo.yaml",
                style("✓").green().bold()
            );
            println!("Authorization is now enforced. Add members with:");
            println!(
                "  {}",
                style("motordesk team add --nombre ... --email ... --usuario ... -r taller").yellow()
            );
            Ok(())
        }
        TeamCommands::List => {
            let roster = TeamRoster::load(&project)
                .map_err(|e| miette::miette!("{}", e))?
                .ok_or_else(|| {
                    miette::miette!("No roster configured. Create one with `motordesk team init`.")
                })?;

            if roster.members.is_empty() {
                println!("The roster is empty.");
                return Ok(());
            }

            println!(
                "{:<14} {:<24} {:<28} ROLES",
                style("USUARIO").bold(),
                style("NOMBRE").bold(),
                style("EMAIL").bold()
            );
            println!("{}", "-".repeat(86));
            for m in &roster.members {
                let roles = m
                    .roles
                    .iter()
                    .map(|r| r.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                let usuario = if m.activo {
                    style(m.usuario.clone()).cyan()
                } else {
                    style(format!("{} (inactivo)", m.usuario)).dim()
                };
                println!("{:<14} {:<24} {:<28} {}", usuario, m.nombre, m.email, roles);
            }
            Ok(())
        }
        TeamCommands::Add(args) => {
            let mut roster = TeamRoster::load(&project)
                .map_err(|e| miette::miette!("{}", e))?
                .ok_or_else(|| {
                    miette::miette!("No roster configured. Create one with `motordesk team init`.")
                })?;

            if roster.members.iter().any(|m| m.usuario == args.usuario) {
                return Err(miette::miette!(
                    "A member with usuario '{}' already exists",
                    args.usuario
                ));
            }

            let roles: Vec<Role> = args
                .roles
                .iter()
                .map(|r| r.parse())
                .collect::<Result<_, String>>()
                .map_err(|e| miette::miette!("{}", e))?;

            roster.members.push(TeamMember {
                nombre: args.nombre,
                email: args.email,
                usuario: args.usuario.clone(),
                roles,
                activo: true,
            });
            roster
                .save(&project)
                .map_err(|e| miette::miette!("{}", e))?;

            if !global.quiet {
                println!(
                    "{} Added {} to the roster",
                    style("✓").green().bold(),
                    style(args.usuario).cyan()
                );
            }
            Ok(())
        }
        TeamCommands::Remove(args) => {
            let mut roster = TeamRoster::load(&project)
                .map_err(|e| miette::miette!("{}", e))?
                .ok_or_else(|| {
                    miette::miette!("No roster configured. Create one with `motordesk team init`.")
                })?;

            let member = roster
                .members
                .iter_mut()
                .find(|m| m.usuario == args.usuario)
                .ok_or_else(|| miette::miette!("No member with usuario '{}'", args.usuario))?;

            member.activo = false;
            roster
                .save(&project)
                .map_err(|e| miette::miette!("{}", e))?;

            if !global.quiet {
                println!(
                    "{} Deactivated {}",
                    style("✓").green().bold(),
                    style(args.usuario).cyan()
                );
            }
            Ok(())
        }
    }
}
