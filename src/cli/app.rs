//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{info, register, run_cmd};
use crate::domain::RunMode;
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "value-invert")]
#[command(author, version, about = "A value-inversion plug-in for grid-data dumps")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the plug-in descriptor for the host's registration scan
    Register,

    /// Invert the values under /0/data in a dump and persist the result
    Run {
        /// Run mode the host invoked the plug-in with
        mode: RunMode,

        /// Path to the dump file to transform
        file: PathBuf,

        /// Write the result here instead of back to the input file
        #[arg(long, short = 'o', env = "VALUE_INVERT_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Inspect a dump file without modifying it
    Info {
        /// Path to the dump file
        file: PathBuf,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Registration is pure output: no config load, no file I/O.
        Commands::Register => {
            let output = Output::new(cli.format, cli.verbose);
            register::run(&output)
        }

        Commands::Run { mode, file, output: redirect } => {
            let config = Config::load()?;
            let output = Output::new(cli.format, cli.verbose || config.verbose);
            output.verbose("value-invert starting");

            run_cmd::run(&output, mode, &file, redirect.or(config.output))
        }

        Commands::Info { file } => {
            let config = Config::load()?;
            let output = Output::new(cli.format, cli.verbose || config.verbose);

            info::run(&output, &file)
        }
    }
}
