//! `motordesk servicio` command - workshop service catalog

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::EntityStore;
use crate::entities::servicio::Servicio;

#[derive(Subcommand, Debug)]
pub enum ServicioCommands {
    /// List catalog services
    List(ListArgs),

    /// Add a service to the catalog
    New(NewArgs),

    /// Show a service record
    Show(ShowArgs),

    /// Edit a service record in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
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

    /// Estimated duration in minutes
    #[arg(long, default_value_t = 60)]
    pub duracion: u32,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Service ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Service ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: ServicioCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        ServicioCommands::List(args) => run_list(&store, args),
        ServicioCommands::New(args) => run_new(&store, args),
        ServicioCommands::Show(args) => utils::run_show::<Servicio>(&store, &args.id, args.format),
        ServicioCommands::Edit(args) => utils::run_edit::<Servicio>(&store, &args.id),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let mut servicios: Vec<Servicio> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|s: &Servicio| {
            if let Some(ref search) = args.search {
                let needle = search.to_lowercase();
                s.nombre.to_lowercase().contains(&needle)
                    || s.descripcion.to_lowercase().contains(&needle)
            } else {
                true
            }
        })
        .collect();

    servicios.sort_by_key(|s| s.fecha_creacion);

    if let Some(limit) = args.limit {
        servicios.truncate(limit);
    }

    if args.count {
        println!("{}", servicios.len());
        return Ok(());
    }

    if servicios.is_empty() {
        println!("No services found.");
        return Ok(());
    }

    let short_ids =
        utils::refresh_short_ids(store.project(), servicios.iter().map(|s| s.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&servicios).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&servicios).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,nombre,precio,duracion_estimada_min");
            for s in &servicios {
                println!(
                    "{},{},{},{},{}",
                    short_ids.get_short_id(&s.id.to_string()).unwrap_or_default(),
                    s.id,
                    escape_csv(&s.nombre),
                    s.precio,
                    s.duracion_estimada_min
                );
            }
        }
        OutputFormat::Id => {
            for s in &servicios {
                println!("{}", s.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<28} {:>10} {:>8}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NOMBRE").bold(),
                style("PRECIO").bold(),
                style("MINUTOS").bold()
            );
            println!("{}", "-".repeat(74));

            for s in &servicios {
                let short = short_ids
                    .get_short_id(&s.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<28} {:>10.2} {:>8}",
                    style(short).cyan(),
                    format_short_id(&s.id),
                    truncate_str(&s.nombre, 26),
                    s.precio,
                    s.duracion_estimada_min
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

    let servicio = Servicio::new(nombre, descripcion, precio, args.duracion);

    store
        .create(&servicio)
        .map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), servicio.id());
    utils::announce_created(servicio.id(), &servicio.summary(), short);

    Ok(())
}
