/// Before/after comparison of a cleaning run
///
/// Counts what changed, checks that timestamps survived, and re-measures the
/// cleaned track for speed violations and non-increasing time steps. The
/// per-fix audit can be exported as CSV for inspection in a spreadsheet.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use csv::Writer;
use serde::Serialize;

use crate::anomaly_detector::{segment_speeds, DetectorConfig};
use crate::interpolation_repair::RepairSummary;
use crate::trajectory::{Coordinate, Trajectory};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub total_fixes: usize,
    pub flagged_fixes: usize,
    pub repaired_fixes: usize,
    pub skipped_zero_interval: usize,
    pub changed_fixes: usize,
    pub unchanged_fixes: usize,
    /// Fixes whose timestamp differs between input and output. Always 0.
    pub timestamp_mismatches: usize,
    /// Changed interior fixes whose original edges were both within the limit
    pub unjustified_changes: usize,
    pub max_speed_before_mps: f64,
    pub max_speed_after_mps: f64,
    /// Segments of the cleaned track still above the speed limit
    pub remaining_violations: usize,
    /// Segments of the cleaned track with zero or negative elapsed time
    pub time_reversals: usize,
}

impl CleaningReport {
    /// `original` and `cleaned` must be the same trajectory before and after
    /// cleaning (same length, same order).
    pub fn compare<C: Coordinate>(
        original: &Trajectory<C>,
        cleaned: &Trajectory<C>,
        config: &DetectorConfig,
        repair: RepairSummary,
    ) -> Self {
        let speeds_before = segment_speeds(original, config.earth_radius_m);
        let speeds_after = segment_speeds(cleaned, config.earth_radius_m);
        let n = original.len().min(cleaned.len());

        let mut report = CleaningReport {
            total_fixes: cleaned.len(),
            flagged_fixes: cleaned.anomaly_count(),
            repaired_fixes: repair.repaired,
            skipped_zero_interval: repair.skipped_zero_interval,
            max_speed_before_mps: max_speed(&speeds_before),
            max_speed_after_mps: max_speed(&speeds_after),
            ..Default::default()
        };

        for (i, (before, after)) in original.fixes().iter().zip(cleaned.fixes()).enumerate() {
            if before.timestamp != after.timestamp {
                report.timestamp_mismatches += 1;
            }

            if before.latitude == after.latitude && before.longitude == after.longitude {
                report.unchanged_fixes += 1;
                continue;
            }

            report.changed_fixes += 1;
            if i > 0 && i + 1 < n {
                let edges_ok = speeds_before[i - 1] <= config.max_speed_mps
                    && speeds_before[i] <= config.max_speed_mps;
                if edges_ok {
                    report.unjustified_changes += 1;
                }
            }
        }

        for (pair, speed) in cleaned.fixes().windows(2).zip(&speeds_after) {
            if pair[1].timestamp <= pair[0].timestamp {
                report.time_reversals += 1;
            } else if *speed > config.max_speed_mps {
                report.remaining_violations += 1;
            }
        }

        report
    }

    /// True when the cleaned track has no speed violations, no time
    /// reversals, untouched timestamps and no unnecessary edits.
    pub fn is_clean(&self) -> bool {
        self.remaining_violations == 0
            && self.time_reversals == 0
            && self.timestamp_mismatches == 0
            && self.unjustified_changes == 0
    }
}

fn max_speed(speeds: &[f64]) -> f64 {
    speeds.iter().copied().fold(0.0, f64::max)
}

/// One row of the per-fix audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixAudit {
    pub index: usize,
    pub time: i64,
    /// RFC 3339 rendering of `time` read as Unix seconds; empty when out of range
    pub time_utc: String,
    pub original_lat: f64,
    pub original_lon: f64,
    pub cleaned_lat: f64,
    pub cleaned_lon: f64,
    pub incoming_speed_mps: Option<f64>,
    pub outgoing_speed_mps: Option<f64>,
    pub anomalous: bool,
    pub repaired: bool,
}

/// Builds the per-fix audit; speeds are those of the original track.
pub fn audit_rows<C: Coordinate>(
    original: &Trajectory<C>,
    cleaned: &Trajectory<C>,
    earth_radius_m: f64,
) -> Vec<FixAudit> {
    let speeds = segment_speeds(original, earth_radius_m);

    original
        .fixes()
        .iter()
        .zip(cleaned.fixes())
        .enumerate()
        .map(|(i, (before, after))| FixAudit {
            index: i,
            time: after.timestamp,
            time_utc: format_unix_time(after.timestamp),
            original_lat: before.latitude.to_degrees(),
            original_lon: before.longitude.to_degrees(),
            cleaned_lat: after.latitude.to_degrees(),
            cleaned_lon: after.longitude.to_degrees(),
            incoming_speed_mps: if i > 0 { speeds.get(i - 1).copied() } else { None },
            outgoing_speed_mps: speeds.get(i).copied(),
            anomalous: after.anomalous,
            repaired: before.latitude != after.latitude || before.longitude != after.longitude,
        })
        .collect()
}

fn format_unix_time(seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

pub fn write_audit_csv<W: Write>(rows: &[FixAudit], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_audit_csv(rows: &[FixAudit], path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create audit file {}", path.display()))?;
    write_audit_csv(rows, file)
}
