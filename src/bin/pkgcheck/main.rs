//! pkgcheck CLI - verify a packaged library by building and running a consumer example

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
        EnvFilter::new("pkgcheck=debug")
    } else {
        EnvFilter::new("pkgcheck=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Verify(args) => commands::verify::execute(args, config, cli.verbose),
        Commands::Imports(args) => commands::imports::execute(args, config),
        Commands::Build(args) => commands::build::execute(args, config),
        Commands::Test(args) => commands::test::execute(args, config),
        Commands::Settings(args) => commands::settings::execute(args, config),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
