//! `motordesk ase` command - advisory session management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils;
use crate::cli::helpers::{escape_csv, format_short_id, resolve_reference, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::store::EntityStore;
use crate::entities::asesoria::{Asesoria, EstadoAsesoria};

#[derive(Subcommand, Debug)]
pub enum AseCommands {
    /// List advisory sessions
    List(ListArgs),

    /// Request an advisory session
    New(NewArgs),

    /// Show an advisory session
    Show(ShowArgs),

    /// Edit an advisory session in your editor
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status (PENDIENTE, PROGRAMADA, EN_PROCESO, COMPLETADA, CANCELADA)
    #[arg(long, short = 'e')]
    pub estado: Option<String>,

    /// Filter by session topic
    #[arg(long, short = 't')]
    pub tipo: Option<String>,

    /// Search in the description
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

    /// Session topic (financiamiento, seguros, mantenimiento, ...)
    #[arg(long, short = 't')]
    pub tipo: String,

    /// What the customer wants to discuss
    #[arg(long, short = 'd')]
    pub descripcion: String,

    /// Assigned advisor reference
    #[arg(long)]
    pub asesor: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Session ID, fragment, or @N alias
    pub id: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "yaml")]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Session ID, fragment, or @N alias
    pub id: String,
}

pub fn run(cmd: AseCommands, global: &GlobalOpts) -> Result<()> {
    let project = crate::cli::helpers::open_project(global)?;
    let store = EntityStore::new(project);

    match cmd {
        AseCommands::List(args) => run_list(&store, args),
        AseCommands::New(args) => run_new(&store, args),
        AseCommands::Show(args) => utils::run_show::<Asesoria>(&store, &args.id, args.format),
        AseCommands::Edit(args) => utils::run_edit::<Asesoria>(&store, &args.id),
    }
}

fn estado_styled(estado: EstadoAsesoria) -> console::StyledObject<String> {
    match estado {
        EstadoAsesoria::Pendiente => style(estado.to_string()).white(),
        EstadoAsesoria::Programada => style(estado.to_string()).cyan(),
        EstadoAsesoria::EnProceso => style(estado.to_string()).yellow(),
        EstadoAsesoria::Completada => style(estado.to_string()).green(),
        EstadoAsesoria::Cancelada => style(estado.to_string()).red(),
    }
}

fn run_list(store: &EntityStore, args: ListArgs) -> Result<()> {
    let estado_filter: Option<EstadoAsesoria> = args
        .estado
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e| miette::miette!("{}", e))?;

    let mut sesiones: Vec<Asesoria> = store
        .list()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|a: &Asesoria| estado_filter.map_or(true, |e| a.estado == e))
        .filter(|a| {
            args.tipo
                .as_ref()
                .map_or(true, |t| a.tipo_asesoria.eq_ignore_ascii_case(t))
        })
        .filter(|a| {
            if let Some(ref search) = args.search {
                a.descripcion
                    .to_lowercase()
                    .contains(&search.to_lowercase())
            } else {
                true
            }
        })
        .collect();

    sesiones.sort_by_key(|a| a.fecha_solicitud);
    sesiones.reverse();

    if let Some(limit) = args.limit {
        sesiones.truncate(limit);
    }

    if args.count {
        println!("{}", sesiones.len());
        return Ok(());
    }

    if sesiones.is_empty() {
        println!("No advisory sessions found.");
        return Ok(());
    }

    let short_ids =
        utils::refresh_short_ids(store.project(), sesiones.iter().map(|a| a.id.to_string()));

    match utils::list_format(args.format) {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&sesiones).into_diagnostic()?
            );
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&sesiones).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            println!("short_id,id,estado,tipo_asesoria,descripcion,fecha_solicitud,duracion_real_min");
            for a in &sesiones {
                println!(
                    "{},{},{},{},{},{},{}",
                    short_ids.get_short_id(&a.id.to_string()).unwrap_or_default(),
                    a.id,
                    a.estado,
                    escape_csv(&a.tipo_asesoria),
                    escape_csv(&a.descripcion),
                    a.fecha_solicitud.format("%Y-%m-%d"),
                    a.duracion_real_min
                        .map(|m| m.to_string())
                        .unwrap_or_default()
                );
            }
        }
        OutputFormat::Id => {
            for a in &sesiones {
                println!("{}", a.id);
            }
        }
        _ => {
            println!(
                "{:<6} {:<17} {:<12} {:<16} {:<24} {:<12}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("ESTADO").bold(),
                style("TIPO").bold(),
                style("DESCRIPCION").bold(),
                style("SOLICITUD").bold()
            );
            println!("{}", "-".repeat(92));

            for a in &sesiones {
                let short = short_ids
                    .get_short_id(&a.id.to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                println!(
                    "{:<6} {:<17} {:<12} {:<16} {:<24} {:<12}",
                    style(short).cyan(),
                    format_short_id(&a.id),
                    estado_styled(a.estado),
                    truncate_str(&a.tipo_asesoria, 14),
                    truncate_str(&a.descripcion, 22),
                    a.fecha_solicitud.format("%Y-%m-%d")
                );
            }

            println!();
            println!(
                "{} advisory session(s). Transition with {}.",
                style(sesiones.len()).cyan(),
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

    let mut ase = Asesoria::new(cliente, args.tipo, args.descripcion);

    if let Some(asesor_ref) = args.asesor {
        let asesor = resolve_reference(store.project(), &asesor_ref)?;
        if asesor.prefix() != EntityPrefix::Emp {
            return Err(miette::miette!("--asesor must reference an EMP record"));
        }
        ase.asesor = Some(asesor);
    }

    store.create(&ase).map_err(|e| miette::miette!("{}", e))?;

    let short = utils::register_short_id(store.project(), ase.id());
    utils::announce_created(ase.id(), &ase.summary(), short);
    println!(
        "   estado {} (next: {})",
        style(ase.estado.to_string()).white(),
        style("PROGRAMADA, CANCELADA").dim()
    );

    Ok(())
}
