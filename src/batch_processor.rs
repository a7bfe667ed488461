/// Batch cleaning of a directory of trajectory files
///
/// Every `*.json` file directly inside the input folder is cleaned in
/// parallel. One file failing never stops the others; its error ends up in
/// the summary CSV instead.

use std::fs::{self, create_dir_all, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context};
use csv::Writer;
use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use crate::cleaning_report::{save_audit_csv, CleaningReport};
use crate::gpx_export::save_gpx;
use crate::pipeline::TrajectoryCleaner;

pub const SUMMARY_FILENAME: &str = "cleaning_summary.csv";

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Also write `<stem>_audit.csv` next to each cleaned file
    pub write_audit: bool,
    /// Also write `<stem>.gpx` next to each cleaned file
    pub write_gpx: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFileResult {
    pub filename: String,
    pub status: String,
    pub total_fixes: usize,
    pub flagged_fixes: usize,
    pub repaired_fixes: usize,
    pub skipped_zero_interval: usize,
    pub remaining_violations: usize,
    pub time_reversals: usize,
    pub max_speed_before_mps: f64,
    pub max_speed_after_mps: f64,
    pub error: String,
}

impl BatchFileResult {
    fn cleaned(filename: String, report: &CleaningReport) -> Self {
        BatchFileResult {
            filename,
            status: "cleaned".to_string(),
            total_fixes: report.total_fixes,
            flagged_fixes: report.flagged_fixes,
            repaired_fixes: report.repaired_fixes,
            skipped_zero_interval: report.skipped_zero_interval,
            remaining_violations: report.remaining_violations,
            time_reversals: report.time_reversals,
            max_speed_before_mps: report.max_speed_before_mps,
            max_speed_after_mps: report.max_speed_after_mps,
            error: String::new(),
        }
    }

    fn failed(filename: String, error: &anyhow::Error) -> Self {
        BatchFileResult {
            filename,
            status: "failed".to_string(),
            total_fixes: 0,
            flagged_fixes: 0,
            repaired_fixes: 0,
            skipped_zero_interval: 0,
            remaining_violations: 0,
            time_reversals: 0,
            max_speed_before_mps: 0.0,
            max_speed_after_mps: 0.0,
            error: format!("{:#}", error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == "cleaned"
    }
}

/// `*.json` files directly inside `folder`, sorted by name.
pub fn find_trajectory_files(folder: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.path().to_path_buf())
        .collect();
    files.sort();
    files
}

pub fn clean_directory(
    cleaner: &TrajectoryCleaner,
    input_folder: &Path,
    output_folder: &Path,
    options: BatchOptions,
) -> anyhow::Result<Vec<BatchFileResult>> {
    if !input_folder.is_dir() {
        bail!("input folder {} does not exist", input_folder.display());
    }
    create_dir_all(output_folder)
        .with_context(|| format!("failed to create output folder {}", output_folder.display()))?;
    if fs::canonicalize(input_folder)? == fs::canonicalize(output_folder)? {
        bail!("output folder must differ from input folder");
    }

    let files = find_trajectory_files(input_folder);
    println!("\n🧹 TRAJECTORY BATCH CLEANING");
    println!("============================");
    println!("📁 Found {} trajectory files in {}", files.len(), input_folder.display());
    println!("⚡ Using parallel processing on {} cores", num_cpus::get());

    let start_time = Instant::now();
    let processed = AtomicUsize::new(0);
    let total_files = files.len();

    let results: Vec<BatchFileResult> = files
        .par_iter()
        .map(|path| {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown.json")
                .to_string();

            let result = match clean_file(cleaner, path, output_folder, options) {
                Ok(report) => BatchFileResult::cleaned(filename, &report),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "trajectory file failed");
                    eprintln!("❌ Error processing {}: {:#}", path.display(), e);
                    BatchFileResult::failed(filename, &e)
                }
            };

            let count = processed.fetch_add(1, Ordering::Relaxed) + 1;
            println!("  [{}/{}] {}: {}", count, total_files, result.filename, result.status);
            result
        })
        .collect();

    write_summary_csv(&results, &output_folder.join(SUMMARY_FILENAME))?;

    let cleaned = results.iter().filter(|r| r.is_success()).count();
    let repaired: usize = results.iter().map(|r| r.repaired_fixes).sum();
    println!("\n✅ BATCH COMPLETE!");
    println!(
        "📊 {} of {} files cleaned, {} fixes repaired in {:.2} seconds",
        cleaned,
        total_files,
        repaired,
        start_time.elapsed().as_secs_f64()
    );

    Ok(results)
}

fn clean_file(
    cleaner: &TrajectoryCleaner,
    path: &Path,
    output_folder: &Path,
    options: BatchOptions,
) -> anyhow::Result<CleaningReport> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let run = cleaner.run(&input)?;

    let filename = path.file_name().context("path has no file name")?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("trajectory");

    fs::write(output_folder.join(filename), format!("{}\n", run.output))
        .with_context(|| format!("failed to write cleaned {}", path.display()))?;

    if options.write_audit {
        save_audit_csv(&run.audit, &output_folder.join(format!("{}_audit.csv", stem)))?;
    }
    if options.write_gpx {
        save_gpx(&run.audit, stem, &output_folder.join(format!("{}.gpx", stem)))?;
    }

    Ok(run.report)
}

pub fn write_summary_csv(results: &[BatchFileResult], path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create summary {}", path.display()))?;
    let mut writer = Writer::from_writer(file);
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;
    Ok(())
}
