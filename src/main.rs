//! objlink
//!
//! Inspects the marker symbols of firmware objects and replays the archive
//! extraction that decides which units end up in an image.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "objlink")]
#[command(version)]
#[command(about = "Firmware object marker inspection", long_about = None)]
struct Cli {
    /// Log scan and resolution steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List object, need and debug-level symbols of an object file or image
    Markers {
        /// ELF object file or linked image
        file: PathBuf,
    },

    /// Resolve root objects against an archive of units
    Resolve {
        /// Object that is always linked
        #[arg(short, long = "root", required = true)]
        roots: Vec<PathBuf>,

        /// Object that is linked only if something needs it
        #[arg(short, long = "archive")]
        archive: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if cli.verbose {
        println!(
            "{}",
            concat!("objlink v", env!("CARGO_PKG_VERSION")).cyan().bold()
        );
    }

    match cli.command {
        Commands::Markers { file } => commands::markers::show_markers(&file),
        Commands::Resolve { roots, archive } => commands::resolve::resolve(&roots, &archive),
    }
}
