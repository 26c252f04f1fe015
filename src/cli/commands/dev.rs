//! `motordesk dev` command - return request management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, resolve_reference, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::store::EntityStore;
use crate::entities::devolucion::{Devolucion, EstadoDevolucion, TipoDevolucion};

#[derive(Subcommand, Debug)]
pub enum DevCommands {
    /// List return requests
    List(ListArgs),

    /// File a return request
    New(NewArgs),

    /// Show a return request
    Show(ShowArgs),

    /// Edit a return request in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (PENDIENTE, APROBADA, RECHAZADA, EN_PROCESO, COMPLETADA)
    #[arg(long, short = 'e')]
    pub estado: Option<String>,

    /// Filter by return type (PRODUCTO, VEHICULO, SERVICIO)
    #[arg(long, short = 't')]
    pub tipo: Option<String>,

    /// Search in the stated reason
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
    /// Customer reference (ID, fragment, or @N)
    #[arg(long)]
    pub cliente: String,

    /// Return type (PRODUCTO, VEHICULO, SERVICIO)
    #[arg(long, short = 't')]
    pub tipo: String,

    /// Reason for the return
    #[arg(long, short = 'm')]
    pub motivo: String,

    /// Returned product reference (PZA or ACC record)
    #[arg(long)]
    pub producto: Option<String>,

    /// Returned vehicle reference (CAR record)
    #[arg(long)]
    pub vehiculo: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Return ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Return ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: DevCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        DevCommands::List(args) => run_list(&store, args),
        DevCommands::New(args) => run_new(&store, args),
        DevCommands::Show(args) => utils::run_show::<Devolucion>(&store, &args.id, args.format),
        DevCommands::Edit(args) => utils::run_edit::<Devolucion>(&store, &args.id),
    }
}

fn estado_styled(estado: EstadoDevolucion) -> console::StyledObject<String> {
    match estado {
        EstadoDevolucion::Pendiente => style(estado.to_string()).white(),
        EstadoDevolucion::Aprobada => style(estado.to_string()).cyan(),
        EstadoDevolucion::EnProceso => style(estado.to_string()).yellow(),
        EstadoDevolucion::Completada => style(estado.to_string()).green(),
        EstadoDevolucion::Rechazada => style(estado.to_string()).red(),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let estado_filter: Option<EstadoDevolucion> = args
        .estado
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let tipo_filter: Option<TipoDevolucion> = args
        .tipo
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let mut devs: Vec<Devolucion> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|d: &Devolucion| estado_filter.map_or(true, |e| d.estado == e))
        .filter(|d| tipo_filter.map_or(true, |t| d.tipo == t))
        .filter(|d| {
            if let Some(ref search) = args.search {
                d.motivo.to_lowercase().contains(&search.to_lowercase())
            } else {
                true
            }
        })
        .collect();

    devs.sort_by_key(|d| d.fecha_solicitud);
    devs.reverse();

    if let Some(limit) = args.limit {
        devs.truncate(limit);
    }

    if args.count {
        println!("{}", devs.len());
        return Ok(());
    }

    if devs.is_empty() {
        println!("No return requests found.");
        return Ok(());
    }

    let short_ids = utils::refresh_short_ids(store.project(), devs.iter().map(|d| d.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&devs).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&devs).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,estado,tipo,motivo,fecha_solicitud");
            for d in &devs {
                println!(
                    "{},{},{},{},{},{}",
                    short_ids.get_short_id(&d.id.to_string()).unwrap_or_default(),
                    d.id,
                    d.estado,
                    d.tipo,
                    escape_csv(&d.motivo),
                    d.fecha_solicitud.format("%Y-%m-%d")
                );
            }
        }
        OutputFormat::Id => {
            for d in &devs {
                println!("{}", d.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<12} {:<10} {:<26} {:<12}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("ESTADO").bold(),
                style("TIPO").bold(),
                style("MOTIVO").bold(),
                style("SOLICITUD").bold()
            );
            println!("{}", "-".repeat(88));

            for d in &devs {
                let short = short_ids
                    .get_short_id(&d.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<12} {:<10} {:<26} {:<12}",
                    style(short).cyan(),
                    format_short_id(&d.id),
                    estado_styled(d.estado),
                    d.tipo,
                    truncate_str(&d.motivo, 24),
                    d.fecha_solicitud.format("%Y-%m-%d")
                );
            }

            println!();
            println!(
                "{} return request(s). Transition with {}.",
                style(devs.len()).cyan(),
                style("motordesk transition <REF> <ESTADO>").yellow()
            );
        }
    }

    Ok(())
}

fn run_new(store: &EntityStore, args: NewArgs) -> Result<()> {
    let cliente = resolve_reference(store.project(), &args.cliente)?;
    if cliente.prefix() != EntityPrefix::Cli {
        return Err(miette::miette!("--cliente must reference a CLI record"));
    }

    let tipo: TipoDevolucion = args.tipo.parse().map_err(|e| miette::miette!("{}", e))?;

    let mut dev = Devolucion::new(cliente, tipo, args.motivo);

    if let Some(producto_ref) = args.producto {
        let producto = resolve_reference(store.project(), &producto_ref)?;
        if !matches!(producto.prefix(), EntityPrefix::Pza | EntityPrefix::Acc) {
            return Err(miette::miette!(
                "--producto must reference a PZA or ACC record"
            ));
        }
        dev.producto_devuelto = Some(producto);
    }

    if let Some(vehiculo_ref) = args.vehiculo {
        let vehiculo = resolve_reference(store.project(), &vehiculo_ref)?;
        if vehiculo.prefix() != EntityPrefix::Car {
            return Err(miette::miette!("--vehiculo must reference a CAR record"));
        }
        dev.vehiculo_devuelto = Some(vehiculo);
    }

    store.create(&dev).map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), dev.id());
    utils::announce_created(dev.id(), &dev.summary(), short);
    println!(
        "   estado {} (next: {})",
        style(dev.estado.to_string()).white(),
        style("APROBADA, RECHAZADA").dim()
    );

    Ok(())
}
