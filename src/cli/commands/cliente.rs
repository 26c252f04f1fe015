//! `motordesk cliente` command - customer management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::entities::cliente::Cliente;

#[derive(Subcommand, Debug)]
pub enum ClienteCommands {
    /// List customers
    List(ListArgs),

    /// Register a customer
    New(NewArgs),

    /// Show a customer record
    Show(ShowArgs),

    /// Edit a customer record in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
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
    pub telefono: Option<String>,

    #[arg(long)]
    pub direccion: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Customer ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Customer ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: ClienteCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        ClienteCommands::List(args) => run_list(&store, args),
        ClienteCommands::New(args) => run_new(&store, args),
        ClienteCommands::Show(args) => utils::run_show::<Cliente>(&store, &args.id, args.format),
        ClienteCommands::Edit(args) => utils::run_edit::<Cliente>(&store, &args.id),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let mut clientes: Vec<Cliente> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|c: &Cliente| {
            if let Some(ref search) = args.search {
                let needle = search.to_lowercase();
                c.nombre.to_lowercase().contains(&needle)
                    || c.email.to_lowercase().contains(&needle)
            } else {
                true
            }
        })
        .collect();

    clientes.sort_by_key(|c| c.fecha_creacion);

    if let Some(limit) = args.limit {
        clientes.truncate(limit);
    }

    if args.count {
        println!("{}", clientes.len());
        return Ok(());
    }

    if clientes.is_empty() {
        println!("No customers found.");
        return Ok(());
    }

    let short_ids =
        utils::refresh_short_ids(store.project(), clientes.iter().map(|c| c.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&clientes).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&clientes).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,nombre,email,telefono,puntos_fidelidad");
            for c in &clientes {
                println!(
                    "{},{},{},{},{},{}",
                    short_ids.get_short_id(&c.id.to_string()).unwrap_or_default(),
                    c.id,
                    escape_csv(&c.nombre),
                    escape_csv(&c.email),
                    escape_csv(c.telefono.as_deref().unwrap_or("")),
                    c.puntos_fidelidad
                );
            }
        }
        OutputFormat::Id => {
            for c in &clientes {
                println!("{}", c.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<24} {:<28} {:>7}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NOMBRE").bold(),
                style("EMAIL").bold(),
                style("PUNTOS").bold()
            );
            println!("{}", "-".repeat(86));

            for c in &clientes {
                let short = short_ids
                    .get_short_id(&c.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<24} {:<28} {:>7}",
                    style(short).cyan(),
                    format_short_id(&c.id),
                    truncate_str(&c.nombre, 22),
                    truncate_str(&c.email, 26),
                    c.puntos_fidelidad
                );
            }
        }
    }

    Ok(())
}

fn run_new(store: &EntityStore, args: NewArgs) -> Result<()> {
    let (nombre, email);

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
    } else {
        nombre = args
            .nombre
            .ok_or_else(|| miette::miette!("--nombre is required"))?;
        email = args
            .email
            .ok_or_else(|| miette::miette!("--email is required"))?;
    }

    let mut cliente = Cliente::new(nombre, email);
    cliente.telefono = args.telefono;
    cliente.direccion = args.direccion;

    store.create(&cliente).map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), cliente.id());
    utils::announce_created(cliente.id(), &cliente.summary(), short);

    Ok(())
}
