//! `motordesk completions` command - shell completion generation

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use miette::Result;

use crate::cli::{Cli, GlobalOpts};

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs, _global: &GlobalOpts) -> Result<()> {
    let mut cmd = Cli::command();
    generate(args.shell, &mut cmd, "motordesk", &mut std::io::stdout());
    Ok(())
}
