//! `motordesk pieza` command - spare part inventory management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::entities::pieza::Pieza;

#[derive(Subcommand, Debug)]
pub enum PiezaCommands {
    /// List spare parts
    List(ListArgs),

    /// Add a spare part
    New(NewArgs),

    /// Show a spare part record
    Show(ShowArgs),

    /// Edit a spare part record in your editor
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

    /// Only parts with stock below this threshold
    #[arg(long)]
    pub low_stock: Option<u32>,

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

    #[arg(long, default_value_t = 0)]
    pub garantia_meses: u32,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: PiezaCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        PiezaCommands::List(args) => run_list(&store, args),
        PiezaCommands::New(args) => run_new(&store, args),
        PiezaCommands::Show(args) => utils::run_show::<Pieza>(&store, &args.id, args.format),
        PiezaCommands::Edit(args) => utils::run_edit::<Pieza>(&store, &args.id),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let mut piezas: Vec<Pieza> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|p: &Pieza| {
            args.categoria
                .as_ref()
                .map_or(true, |c| p.categoria.as_deref() == Some(c.as_str()))
        })
        .filter(|p| args.low_stock.map_or(true, |n| p.stock < n))
        .filter(|p| {
            if let Some(ref search) = args.search {
                let needle = search.to_lowercase();
                p.nombre.to_lowercase().contains(&needle)
                    || p.descripcion.to_lowercase().contains(&needle)
            } else {
                true
            }
        })
        .collect();

    piezas.sort_by_key(|p| p.fecha_creacion);

    if let Some(limit) = args.limit {
        piezas.truncate(limit);
    }

    if args.count {
        println!("{}", piezas.len());
        return Ok(());
    }

    if piezas.is_empty() {
        println!("No spare parts found.");
        return Ok(());
    }

    let short_ids = utils::refresh_short_ids(store.project(), piezas.iter().map(|p| p.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&piezas).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&piezas).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,nombre,precio,stock,categoria");
            for p in &piezas {
                println!(
                    "{},{},{},{},{},{}",
                    short_ids.get_short_id(&p.id.to_string()).unwrap_or_default(),
                    p.id,
                    escape_csv(&p.nombre),
                    p.precio,
                    p.stock,
                    escape_csv(p.categoria.as_deref().unwrap_or(""))
                );
            }
        }
        OutputFormat::Id => {
            for p in &piezas {
                println!("{}", p.id);
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

            for p in &piezas {
                let short = short_ids
                    .get_short_id(&p.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                let stock_styled = if p.stock == 0 {
                    style(p.stock.to_string()).red().bold()
                } else {
                    style(p.stock.to_string()).white()
                };
                println!(
                    "{:<6} {:<17} {:<26} {:>10.2} {:>6}",
                    style(short).cyan(),
                    format_short_id(&p.id),
                    truncate_str(&p.nombre, 24),
                    p.precio,
                    stock_styled
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

    let mut pieza = Pieza::new(nombre, descripcion, precio, args.stock);
    pieza.categoria = args.categoria;
    pieza.garantia_meses = args.garantia_meses;

    store.create(&pieza).map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), pieza.id());
    utils::announce_created(pieza.id(), &pieza.summary(), short);

    Ok(())
}
