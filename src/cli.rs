//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Multiedit - Batch-edit domain records through a diff/merge edit session
#[derive(Parser, Debug)]
#[command(name = "multiedit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the collapsed baseline of a record selection
    Show(commands::show::ShowArgs),

    /// Batch-edit (or delete) selected records in a JSON records file
    Edit(commands::edit::EditArgs),

    /// Show the sparse patch between two JSON record files
    Diff(commands::diff::DiffArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&self.log_level),
        )
        .init();

        match self.command {
            Commands::Show(args) => commands::show::execute(args),
            Commands::Edit(args) => commands::edit::execute(args),
            Commands::Diff(args) => {
                let changed = commands::diff::execute(args)?;
                if changed {
                    std::process::exit(1);
                }
                Ok(())
            }
        }
    }
}
