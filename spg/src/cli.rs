// spg/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use spg_common::error::Result;
use spg_common::Config;

// Module declarations
pub mod inspect;
pub mod platform;

use crate::cli::inspect::Inspect;
use crate::cli::platform::PlatformInfo;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "spg", bin_name = "spg")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Inspect(Inspect),
    Platform(PlatformInfo),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Inspect(command) => command.run(config),
            Self::Platform(command) => command.run(config),
        }
    }
}
