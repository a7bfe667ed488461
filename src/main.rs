/// Command-line front end for the trajectory cleaner
///
/// With no subcommand a trajectory is read from stdin and the cleaned
/// trajectory is written to stdout. `batch` cleans a whole folder.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gps_track_cleaner::batch_processor::{clean_directory, BatchOptions};
use gps_track_cleaner::cleaning_report::save_audit_csv;
use gps_track_cleaner::gpx_export::save_gpx;
use gps_track_cleaner::{CleanerConfig, TrajectoryCleaner};

#[derive(Parser, Debug)]
#[command(name = "gps-track-cleaner", version, about = "Repairs impossible jumps in GPS trajectories")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write a per-fix audit CSV of the stdin run
    #[arg(long)]
    audit_csv: Option<PathBuf>,

    /// Write the cleaned stdin trajectory as GPX
    #[arg(long)]
    gpx: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean every *.json file in a folder
    Batch {
        input_folder: PathBuf,
        output_folder: PathBuf,
        /// Write <name>_audit.csv for each file
        #[arg(long = "audit")]
        write_audit: bool,
        /// Write <name>.gpx for each file
        #[arg(long = "gpx")]
        write_gpx: bool,
    },
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// Logs go to stderr so stdout only ever carries the cleaned trajectory.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gps_track_cleaner=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => CleanerConfig::load(path)?,
        None => CleanerConfig::default(),
    };
    let cleaner = TrajectoryCleaner::new(config)?;

    match cli.command {
        Some(Command::Batch { input_folder, output_folder, write_audit, write_gpx }) => {
            let options = BatchOptions { write_audit, write_gpx };
            let results = clean_directory(&cleaner, &input_folder, &output_folder, options)?;
            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                bail!("{} of {} files failed", failed, results.len());
            }
            Ok(())
        }
        None => clean_stdin(&cleaner, cli.audit_csv.as_deref(), cli.gpx.as_deref()),
    }
}

fn clean_stdin(
    cleaner: &TrajectoryCleaner,
    audit_csv: Option<&Path>,
    gpx: Option<&Path>,
) -> anyhow::Result<()> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let run = cleaner.run(&input)?;
    if !run.report.is_clean() {
        warn!(report = ?run.report, "cleaned trajectory still has violations");
    }

    if let Some(path) = audit_csv {
        save_audit_csv(&run.audit, path)?;
    }
    if let Some(path) = gpx {
        save_gpx(&run.audit, "trajectory", path)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", run.output)?;
    out.flush()?;
    Ok(())
}
