//! fpdev CLI - build settings for the py_fp FrontPanel extension

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("fpdev=debug")
    } else {
        EnvFilter::new("fpdev=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Flags(args) => commands::flags::execute(args, &config),
        Commands::Module(args) => commands::module::execute(args, &config),
        Commands::Commands(args) => commands::plan::execute(args, &config),
        Commands::Cargo(args) => commands::cargo::execute(args, &config),
    }
}
