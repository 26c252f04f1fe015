//! `motordesk rep` command - repair order management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, resolve_reference, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::store::EntityStore;
use crate::entities::reparacion::{EstadoReparacion, Reparacion};

#[derive(Subcommand, Debug)]
pub enum RepCommands {
    /// List repair orders
    List(ListArgs),

    /// Open a repair order
    New(NewArgs),

    /// Show a repair order
    Show(ShowArgs),

    /// Edit a repair order in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (PENDIENTE, EN_PROCESO, COMPLETADO, CANCELADO)
    #[arg(long, short = 'e')]
    pub estado: Option<String>,

    /// Search in the problem description
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

    /// Vehicle reference (ID, fragment, or @N)
    #[arg(long)]
    pub vehiculo: String,

    /// Problem description
    #[arg(long, short = 'p')]
    pub problema: String,

    /// Assigned technician reference
    #[arg(long)]
    pub tecnico: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Repair ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Repair ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: RepCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        RepCommands::List(args) => run_list(&store, args),
        RepCommands::New(args) => run_new(&store, args),
        RepCommands::Show(args) => utils::run_show::<Reparacion>(&store, &args.id, args.format),
        RepCommands::Edit(args) => utils::run_edit::<Reparacion>(&store, &args.id),
    }
}

fn estado_styled(estado: EstadoReparacion) -> console::StyledObject<String> {
    match estado {
        EstadoReparacion::Pendiente => style(estado.to_string()).white(),
        EstadoReparacion::EnProceso => style(estado.to_string()).yellow(),
        EstadoReparacion::Completado => style(estado.to_string()).green(),
        EstadoReparacion::Cancelado => style(estado.to_string()).red(),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let estado_filter: Option<EstadoReparacion> = args
        .estado
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let mut reps: Vec<Reparacion> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|r: &Reparacion| estado_filter.map_or(true, |e| r.estado == e))
        .filter(|r| {
            if let Some(ref search) = args.search {
                r.descripcion_problema
                    .to_lowercase()
                    .contains(&search.to_lowercase())
            } else {
                true
            }
        })
        .collect();

    reps.sort_by_key(|r| r.fecha_ingreso);
    reps.reverse();

    if let Some(limit) = args.limit {
        reps.truncate(limit);
    }

    if args.count {
        println!("{}", reps.len());
        return Ok(());
    }

    if reps.is_empty() {
        println!("No repair orders found.");
        return Ok(());
    }

    let short_ids = utils::refresh_short_ids(store.project(), reps.iter().map(|r| r.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reps).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&reps).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,estado,problema,fecha_ingreso,costo_total");
            for r in &reps {
                println!(
                    "{},{},{},{},{},{}",
                    short_ids.get_short_id(&r.id.to_string()).unwrap_or_default(),
                    r.id,
                    r.estado,
                    escape_csv(&r.descripcion_problema),
                    r.fecha_ingreso.format("%Y-%m-%d"),
                    r.costo_total.map(|c| c.to_string()).unwrap_or_default()
                );
            }
        }
        OutputFormat::Id => {
            for r in &reps {
                println!("{}", r.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<12} {:<30} {:<12}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("ESTADO").bold(),
                style("PROBLEMA").bold(),
                style("INGRESO").bold()
            );
            println!("{}", "-".repeat(80));

            for r in &reps {
                let short = short_ids
                    .get_short_id(&r.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<12} {:<30} {:<12}",
                    style(short).cyan(),
                    format_short_id(&r.id),
                    estado_styled(r.estado),
                    truncate_str(&r.descripcion_problema, 28),
                    r.fecha_ingreso.format("%Y-%m-%d")
                );
            }

            println!();
            println!(
                "{} repair order(s). Transition with {}.",
                style(reps.len()).cyan(),
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

    let vehiculo = resolve_reference(store.project(), &args.vehiculo)?;
    if vehiculo.prefix() != EntityPrefix::Car {
        return Err(miette::miette!("--vehiculo must reference a CAR record"));
    }

    let mut rep = Reparacion::new(cliente, vehiculo, args.problema);

    if let Some(tecnico_ref) = args.tecnico {
        let tecnico = resolve_reference(store.project(), &tecnico_ref)?;
        if tecnico.prefix() != EntityPrefix::Emp {
            return Err(miette::miette!("--tecnico must reference an EMP record"));
        }
        rep.tecnico_asignado = Some(tecnico);
    }

    store.create(&rep).map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), rep.id());
    utils::announce_created(rep.id(), &rep.summary(), short);
    println!(
        "   estado {} (next: {})",
        style(rep.estado.to_string()).white(),
        style("EN_PROCESO, CANCELADO").dim()
    );

    Ok(())
}
