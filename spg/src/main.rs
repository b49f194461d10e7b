// spg/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use spg_common::config::Config;
use spg_common::error::{Result as spgResult, SpgError};
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn init_logging(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("SPG_LOG")
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();
}

fn main() -> spgResult<()> {
    let cli_args = CliArgs::parse();
    init_logging(cli_args.verbose);

    let config = Config::load()
        .map_err(|e| SpgError::Config(format!("Could not load config: {e}")))?;
    debug!("Using configuration: {:?}", config);

    if let Err(e) = cli_args.command.run(&config) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }
    Ok(())
}
