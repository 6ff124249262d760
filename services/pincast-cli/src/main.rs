//! `pincast` command line tool.
//!
//! Inspects and imports PINCAST NetCDF rain-rate composites through the
//! importer registry: list importers, summarize a file, run a full import,
//! or scan a directory of candidate files.

mod commands;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "pincast")]
#[command(about = "Inspect and import PINCAST NetCDF rain-rate composites")]
struct Args {
    /// Log level
    #[arg(long, env = "PINCAST_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered importers
    Importers,

    /// Import a file and print a metadata summary
    Info {
        /// Composite file to inspect
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a full import and report the outcome
    Import {
        /// Composite file to import
        file: PathBuf,

        /// NetCDF variable holding the precipitation samples
        #[arg(long, default_value = "RATE")]
        precip_var: String,

        /// Quality variable to read alongside
        #[arg(long)]
        quality_var: Option<String>,

        /// Output sample precision: single or double
        #[arg(long, default_value = "double")]
        precision: String,

        /// Replace non-finite samples with this value
        #[arg(long)]
        fill_value: Option<f64>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Walk a directory and try to import every candidate file
    Scan {
        /// Directory to scan
        dir: PathBuf,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let registry = pincast_netcdf::default_registry();

    match args.command {
        Command::Importers => commands::importers(&registry),
        Command::Info { file, json } => commands::info(&registry, &file, json),
        Command::Import {
            file,
            precip_var,
            quality_var,
            precision,
            fill_value,
            json,
        } => commands::import(
            &registry,
            &file,
            &precip_var,
            quality_var.as_deref(),
            &precision,
            fill_value,
            json,
        ),
        Command::Scan { dir } => commands::scan(&registry, &dir),
    }
}

fn init_tracing(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
