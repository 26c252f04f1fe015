//! `motordesk accesorio` command - accessory inventory management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::entities::accesorio::Accesorio;

#[derive(Subcommand, Debug)]
pub enum AccesorioCommands {
    /// List accessories
    List(ListArgs),

    /// Add an accessory
    New(NewArgs),

    /// Show an accessory record
    Show(ShowArgs),

    /// Edit an accessory record in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by category
    #[arg(long, short = 'c')]
    pub categoria: Option<String>,

    /// Search in name and description
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
    pub descripcion: Option<String>,

    #[arg(long)]
    pub precio: Option<f64>,

    #[arg(long, default_value_t = 0)]
    pub stock: u32,

    #[arg(long)]
    pub categoria: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Accessory ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Accessory ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: AccesorioCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        AccesorioCommands::List(args) => run_list(&store, args),
        AccesorioCommands::New(args) => run_new(&store, args),
        AccesorioCommands::Show(args) => utils::run_show::<Accesorio>(&store, &args.id, args.format),
        AccesorioCommands::Edit(args) => utils::run_edit::<Accesorio>(&store, &args.id),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let mut accesorios: Vec<Accesorio> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|a: &Accesorio| {
            args.categoria
                .as_ref()
                .map_or(true, |c| a.categoria.as_deref() == Some(c.as_str()))
        })
        .filter(|a| {
            if let Some(ref search) = args.search {
                let needle = search.to_lowercase();
                a.nombre.to_lowercase().contains(&needle)
                    || a.descripcion.to_lowercase().contains(&needle)
            } else {
                true
            }
        })
        .collect();

    accesorios.sort_by_key(|a| a.fecha_creacion);

    if let Some(limit) = args.limit {
        accesorios.truncate(limit);
    }

    if args.count {
        println!("{}", accesorios.len());
        return Ok(());
    }

    if accesorios.is_empty() {
        println!("No accessories found.");
        return Ok(());
    }

    let short_ids =
        utils::refresh_short_ids(store.project(), accesorios.iter().map(|a| a.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&accesorios).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&accesorios).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,nombre,precio,stock,categoria");
            for a in &accesorios {
                println!(
                    "{},{},{},{},{},{}",
                    short_ids.get_short_id(&a.id.to_string()).unwrap_or_default(),
                    a.id,
                    escape_csv(&a.nombre),
                    a.precio,
                    a.stock,
                    escape_csv(a.categoria.as_deref().unwrap_or(""))
                );
            }
        }
        OutputFormat::Id => {
            for a in &accesorios {
                println!("{}", a.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<26} {:>10} {:>6}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NOMBRE").bold(),
                style("PRECIO").bold(),
                style("STOCK").bold()
            );
            println!("{}", "-".repeat(70));

            for a in &accesorios {
                let short = short_ids
                    .get_short_id(&a.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<26} {:>10.2} {:>6}",
                    style(short).cyan(),
                    format_short_id(&a.id),
                    truncate_str(&a.nombre, 24),
                    a.precio,
                    a.stock
                );
            }
        }
    }

    Ok(())
}

fn run_new(store: &EntityStore, args: NewArgs) -> Result<()> {
    let (nombre, descripcion, precio);

    if args.interactive || args.nombre.is_none() {
        use dialoguer::Input;

        nombre = Input::new()
            .with_prompt("Nombre")
            .interact_text()
            .into_diagnostic()?;
        descripcion = Input::new()
            .with_prompt("Descripción")
            .interact_text()
            .into_diagnostic()?;
        precio = Input::<f64>::new()
            .with_prompt("Precio")
            .interact_text()
            .into_diagnostic()?;
    } else {
        nombre = args
            .nombre
            .ok_or_else(|| miette::miette!("--nombre is required"))?;
        descripcion = args.descripcion.unwrap_or_default();
        precio = args
            .precio
            .ok_or_else(|| miette::miette!("--precio is required"))?;
    }

    let mut accesorio = Accesorio::new(nombre, descripcion, precio, args.stock);
    accesorio.categoria = args.categoria;

    store
        .create(&accesorio)
        .map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), accesorio.id());
    utils::announce_created(accesorio.id(), &accesorio.summary(), short);

    Ok(())
}
