use clap::Parser;
use miette::Result;
use motordesk::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => motordesk::cli::commands::init::run(args),
        Commands::Carro(cmd) => motordesk::cli::commands::carro::run(cmd, &global),
        Commands::Pieza(cmd) => motordesk::cli::commands::pieza::run(cmd, &global),
        Commands::Accesorio(cmd) => motordesk::cli::commands::accesorio::run(cmd, &global),
        Commands::Cliente(cmd) => motordesk::cli::commands::cliente::run(cmd, &global),
        Commands::Empleado(cmd) => motordesk::cli::commands::empleado::run(cmd, &global),
        Commands::Servicio(cmd) => motordesk::cli::commands::servicio::run(cmd, &global),
        Commands::Rep(cmd) => motordesk::cli::commands::rep::run(cmd, &global),
        Commands::Dev(cmd) => motordesk::cli::commands::dev::run(cmd, &global),
        Commands::Ase(cmd) => motordesk::cli::commands::ase::run(cmd, &global),
        Commands::Transition(args) => motordesk::cli::commands::transition::run(args, &global),
        Commands::History(args) => motordesk::cli::commands::history::run(args, &global),
        Commands::Delete(args) => motordesk::cli::commands::delete::run(args, &global),
        Commands::Api(cmd) => motordesk::cli::commands::api::run(cmd, &global),
        Commands::Status(args) => motordesk::cli::commands::status::run(args, &global),
        Commands::Cache(cmd) => motordesk::cli::commands::cache::run(cmd, &global),
        Commands::Team(cmd) => motordesk::cli::commands::team::run(cmd, &global),
        Commands::Completions(args) => motordesk::cli::commands::completions::run(args, &global),
    }
}
