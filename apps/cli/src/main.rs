//! benchtable CLI — summarize desktop-agent benchmark runs.
//!
//! Reads an experiment config and a results tree, then writes one markdown
//! table row of per-domain success rates per experiment.

mod commands;

use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let spinner = commands::progress_bar();
    commands::init_tracing(&cli, &spinner);
    commands::run(cli, spinner).await
}
