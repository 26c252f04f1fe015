//! `motordesk empleado` command - staff management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::entities::empleado::Empleado;

#[derive(Subcommand, Debug)]
pub enum EmpleadoCommands {
    /// List staff members
    List(ListArgs),

    /// Register a staff member
    New(NewArgs),

    /// Show a staff record
    Show(ShowArgs),

    /// Edit a staff record in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by job title
    #[arg(long)]
    pub cargo: Option<String>,

    /// Search in name and email
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,

    /// Output format
    #[arg(long, short = 'o', default_value = "auto")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long)]
    pub nombre: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub cargo: Option<String>,

    #[arg(long)]
    pub especialidad: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Staff ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Staff ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: EmpleadoCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        EmpleadoCommands::List(args) => run_list(&store, args),
        EmpleadoCommands::New(args) => run_new(&store, args),
        EmpleadoCommands::Show(args) => utils::run_show::<Empleado>(&store, &args.id, args.format),
        EmpleadoCommands::Edit(args) => utils::run_edit::<Empleado>(&store, &args.id),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let mut empleados: Vec<Empleado> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|e: &Empleado| {
            args.cargo
                .as_ref()
                .map_or(true, |c| e.cargo.eq_ignore_ascii_case(c))
        })
        .filter(|e| {
            if let Some(ref search) = args.search {
                let needle = search.to_lowercase();
                e.nombre.to_lowercase().contains(&needle)
                    || e.email.to_lowercase().contains(&needle)
            } else {
                true
            }
        })
        .collect();

    empleados.sort_by_key(|e| e.fecha_creacion);

    if let Some(limit) = args.limit {
        empleados.truncate(limit);
    }

    if args.count {
        println!("{}", empleados.len());
        return Ok(());
    }

    if empleados.is_empty() {
        println!("No staff members found.");
        return Ok(());
    }

    let short_ids =
        utils::refresh_short_ids(store.project(), empleados.iter().map(|e| e.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&empleados).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&empleados).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,nombre,email,cargo,fecha_contratacion");
            for e in &empleados {
                println!(
                    "{},{},{},{},{},{}",
                    short_ids.get_short_id(&e.id.to_string()).unwrap_or_default(),
                    e.id,
                    escape_csv(&e.nombre),
                    escape_csv(&e.email),
                    escape_csv(&e.cargo),
                    e.fecha_contratacion
                );
            }
        }
        OutputFormat::Id => {
            for e in &empleados {
                println!("{}", e.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<24} {:<16} {:<12}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NOMBRE").bold(),
                style("CARGO").bold(),
                style("CONTRATADO").bold()
            );
            println!("{}", "-".repeat(78));

            for e in &empleados {
                let short = short_ids
                    .get_short_id(&e.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<24} {:<16} {:<12}",
                    style(short).cyan(),
                    format_short_id(&e.id),
                    truncate_str(&e.nombre, 22),
                    truncate_str(&e.cargo, 14),
                    e.fecha_contratacion
                );
            }
        }
    }

    Ok(())
}

fn run_new(store: &EntityStore, args: NewArgs) -> Result<()> {
    let (nombre, email, cargo);

    if args.interactive || args.nombre.is_none() {
        use dialoguer::Input;

        nombre = Input::new()
            .with_prompt("Nombre")
            .interact_text()
            .into_diagnostic()?;
        email = Input::new()
            .with_prompt("Email")
            .interact_text()
            .into_diagnostic()?;
        cargo = Input::new()
            .with_prompt("Cargo")
            .interact_text()
            .into_diagnostic()?;
    } else {
        nombre = args
            .nombre
            .ok_or_else(|| miette::miette!("--nombre is required"))?;
        email = args
            .email
            .ok_or_else(|| miette::miette!("--email is required"))?;
        cargo = args
            .cargo
            .ok_or_else(|| miette::miette!("--cargo is required"))?;
    }

    let mut empleado = Empleado::new(nombre, email, cargo);
    empleado.especialidad = args.especialidad;

    store
        .create(&empleado)
        .map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), empleado.id());
    utils::announce_created(empleado.id(), &empleado.summary(), short);

    Ok(())
}
