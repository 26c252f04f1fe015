//! `motordesk carro` command - vehicle inventory management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::entities::carro::{Carro, Combustible, Condicion, Transmision};

#[derive(Subcommand, Debug)]
pub enum CarroCommands {
    /// List vehicles with filtering
    List(ListArgs),

    /// Add a vehicle to the inventory
    New(NewArgs),

    /// Show a vehicle's record
    Show(ShowArgs),

    /// Edit a vehicle record in your editor
    Edit(EditArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CondicionFilter {
    Nuevo,
    Usado,
    Reacondicionado,
    All,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortField {
    Marca,
    Anio,
    Precio,
    Created,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by condition
    #[arg(long, short = 'c', default_value = "all")]
    pub condicion: CondicionFilter,

    /// Search in make, model and description
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by field
    #[arg(long, default_value = "created")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

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
    pub marca: Option<String>,

    #[arg(long)]
    pub modelo: Option<String>,

    #[arg(long)]
    pub anio: Option<i32>,

    #[arg(long)]
    pub precio: Option<f64>,

    #[arg(long, default_value = "manual")]
    pub transmision: String,

    #[arg(long, default_value = "gasolina")]
    pub combustible: String,

    #[arg(long, default_value = "usado")]
    pub condicion: String,

    #[arg(long, default_value_t = 0)]
    pub kilometraje: u32,

    #[arg(long)]
    pub descripcion: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Vehicle ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Vehicle ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: CarroCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        CarroCommands::List(args) => run_list(&store, args),
        CarroCommands::New(args) => run_new(&store, args),
        CarroCommands::Show(args) => utils::run_show::<Carro>(&store, &args.id, args.format),
        CarroCommands::Edit(args) => utils::run_edit::<Carro>(&store, &args.id),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let mut carros: Vec<Carro> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|c: &Carro| match args.condicion {
            CondicionFilter::Nuevo => c.condicion == Condicion::Nuevo,
            CondicionFilter::Usado => c.condicion == Condicion::Usado,
            CondicionFilter::Reacondicionado => c.condicion == Condicion::Reacondicionado,
            CondicionFilter::All => true,
        })
        .filter(|c| {
            if let Some(ref search) = args.search {
                let needle = search.to_lowercase();
                c.marca.to_lowercase().contains(&needle)
                    || c.modelo.to_lowercase().contains(&needle)
                    || c.descripcion
                        .as_ref()
                        .map_or(false, |d| d.to_lowercase().contains(&needle))
            } else {
                true
            }
        })
        .collect();

    match args.sort {
        SortField::Marca => carros.sort_by(|a, b| a.marca.cmp(&b.marca)),
        SortField::Anio => carros.sort_by_key(|c| c.anio),
        SortField::Precio => {
            carros.sort_by(|a, b| a.precio.partial_cmp(&b.precio).unwrap_or(std::cmp::Ordering::Equal))
        }
        SortField::Created => carros.sort_by_key(|c| c.fecha_creacion),
    }

    if args.reverse {
        carros.reverse();
    }

    if let Some(limit) = args.limit {
        carros.truncate(limit);
    }

    if args.count {
        println!("{}", carros.len());
        return Ok(());
    }

    if carros.is_empty() {
        println!("No vehicles found.");
        return Ok(());
    }

    let short_ids = utils::refresh_short_ids(store.project(), carros.iter().map(|c| c.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&carros).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&carros).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,marca,modelo,anio,precio,condicion,kilometraje");
            for c in &carros {
                println!(
                    "{},{},{},{},{},{},{},{}",
                    short_ids.get_short_id(&c.id.to_string()).unwrap_or_default(),
                    c.id,
                    escape_csv(&c.marca),
                    escape_csv(&c.modelo),
                    c.anio,
                    c.precio,
                    c.condicion,
                    c.kilometraje
                );
            }
        }
        OutputFormat::Id => {
            for c in &carros {
                println!("{}", c.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<22} {:<6} {:>10} {:<16}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("VEHICULO").bold(),
                style("ANIO").bold(),
                style("PRECIO").bold(),
                style("CONDICION").bold()
            );
            println!("{}", "-".repeat(82));

            for c in &carros {
                let short = short_ids
                    .get_short_id(&c.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<22} {:<6} {:>10.2} {:<16}",
                    style(short).cyan(),
                    format_short_id(&c.id),
                    truncate_str(&format!("{} {}", c.marca, c.modelo), 20),
                    c.anio,
                    c.precio,
                    c.condicion
                );
            }

            println!();
            println!(
                "{} vehicle(s) found. Use {} to reference by alias.",
                style(carros.len()).cyan(),
                style("@N").cyan()
            );
        }
    }

    Ok(())
}

fn run_new(store: &EntityStore, args: NewArgs) -> Result<()> {
    let (marca, modelo, anio, precio);
    let (transmision, combustible, condicion);

    if args.interactive || args.marca.is_none() {
        use dialoguer::{Input, Select};

        marca = Input::new()
            .with_prompt("Marca")
            .interact_text()
            .into_diagnostic()?;
        modelo = Input::new()
            .with_prompt("Modelo")
            .interact_text()
            .into_diagnostic()?;
        anio = Input::<i32>::new()
            .with_prompt("Año")
            .interact_text()
            .into_diagnostic()?;
        precio = Input::<f64>::new()
            .with_prompt("Precio")
            .interact_text()
            .into_diagnostic()?;

        let opciones = ["manual", "automatica", "semiautomatica"];
        let idx = Select::new()
            .with_prompt("Transmisión")
            .items(&opciones)
            .default(0)
            .interact()
            .into_diagnostic()?;
        transmision = opciones[idx].to_string();

        let opciones = ["gasolina", "diesel", "electrico", "hibrido"];
        let idx = Select::new()
            .with_prompt("Combustible")
            .items(&opciones)
            .default(0)
            .interact()
            .into_diagnostic()?;
        combustible = opciones[idx].to_string();

        let opciones = ["nuevo", "usado", "reacondicionado"];
        let idx = Select::new()
            .with_prompt("Condición")
            .items(&opciones)
            .default(1)
            .interact()
            .into_diagnostic()?;
        condicion = opciones[idx].to_string();
    } else {
        marca = args
            .marca
            .ok_or_else(|| miette::miette!("--marca is required"))?;
        modelo = args
            .modelo
            .ok_or_else(|| miette::miette!("--modelo is required"))?;
        anio = args
            .anio
            .ok_or_else(|| miette::miette!("--anio is required"))?;
        precio = args
            .precio
            .ok_or_else(|| miette::miette!("--precio is required"))?;
        transmision = args.transmision;
        combustible = args.combustible;
        condicion = args.condicion;
    }

    let transmision: Transmision = transmision.parse().map_err(|e| miette::miette!("{}", e))?;
    let combustible: Combustible = combustible.parse().map_err(|e| miette::miette!("{}", e))?;
    let condicion: Condicion = condicion.parse().map_err(|e| miette::miette!("{}", e))?;

    let mut carro = Carro::new(marca, modelo, anio, precio, transmision, combustible, condicion);
    carro.kilometraje = args.kilometraje;
    carro.descripcion = args.descripcion;

    store.create(&carro).map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), carro.id());
    utils::announce_created(carro.id(), &carro.summary(), short);

    Ok(())
}
