mod cli;
mod logging;
mod parse;
mod query;
mod render;

use anyhow::{Context, Result};
use buildlog::config::Settings;
use clap::Parser;

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let basic_tracing = logging::init_basic();
    let settings = Settings::load().context("Failed to load configuration")?;
    drop(basic_tracing);
    logging::init_from_config(&settings.logging);

    match cli.command {
        Command::Parse(args) => parse::run(&args, &settings),
        Command::Query(args) => query::run(&args, &settings),
    }
}
