//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    accesorio::AccesorioCommands,
    api::ApiCommands,
    ase::AseCommands,
    cache::CacheCommands,
    carro::CarroCommands,
    cliente::ClienteCommands,
    completions::CompletionsArgs,
    delete::DeleteArgs,
    dev::DevCommands,
    empleado::EmpleadoCommands,
    history::HistoryArgs,
    init::InitArgs,
    pieza::PiezaCommands,
    rep::RepCommands,
    servicio::ServicioCommands,
    status::StatusArgs,
    team::TeamCommands,
    transition::TransitionArgs,
};

#[derive(Parser)]
#[command(name = "motordesk")]
#[command(author, version, about = "Car-dealership back office on plain text files")]
#[command(
    long_about = "Manages a dealership's inventory, people, repairs, returns and advisory \
sessions as YAML records with an auditable status workflow."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .motordesk/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new Motordesk project
    Init(InitArgs),

    /// Vehicle inventory management
    #[command(subcommand)]
    Carro(CarroCommands),

    /// Spare part inventory management
    #[command(subcommand)]
    Pieza(PiezaCommands),

    /// Accessory inventory management
    #[command(subcommand)]
    Accesorio(AccesorioCommands),

    /// Customer management
    #[command(subcommand)]
    Cliente(ClienteCommands),

    /// Staff management
    #[command(subcommand)]
    Empleado(EmpleadoCommands),

    /// Workshop service catalog
    #[command(subcommand)]
    Servicio(ServicioCommands),

    /// Repair order management
    #[command(subcommand)]
    Rep(RepCommands),

    /// Return request management
    #[command(subcommand)]
    Dev(DevCommands),

    /// Advisory session management
    #[command(subcommand)]
    Ase(AseCommands),

    /// Apply a status transition to a workflow record
    Transition(TransitionArgs),

    /// Show the audit history of a workflow record
    History(HistoryArgs),

    /// Delete a record (refused while other records reference it)
    Delete(DeleteArgs),

    /// Read-only JSON documents over the workflow records
    #[command(subcommand)]
    Api(ApiCommands),

    /// Show project status dashboard
    Status(StatusArgs),

    /// Manage the metadata cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Manage the team roster
    #[command(subcommand)]
    Team(TeamCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Just IDs, one per line
    Id,
}
