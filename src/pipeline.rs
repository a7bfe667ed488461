/// Trajectory cleaning pipeline
///
/// parse -> flag anomalies -> repair -> serialize, on a fully buffered
/// input string. Nothing is kept between runs.

use tracing::info;

use crate::anomaly_detector::flag_anomalies;
use crate::cleaning_report::{audit_rows, CleaningReport, FixAudit};
use crate::config::CleanerConfig;
use crate::error::{CleanError, Result};
use crate::interpolation_repair::{repair_anomalies, RepairSummary};
use crate::parser::{RecordArrayReader, TrajectoryReader};
use crate::serializer::serialize_trajectory;
use crate::trajectory::{Coordinate, CoordinateFormat, Degrees, Microdegrees, Trajectory};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningRun {
    /// Serialized cleaned trajectory, without a trailing newline
    pub output: String,
    pub report: CleaningReport,
    pub audit: Vec<FixAudit>,
}

#[derive(Debug, Clone)]
pub struct TrajectoryCleaner<R = RecordArrayReader> {
    config: CleanerConfig,
    reader: R,
}

impl TrajectoryCleaner<RecordArrayReader> {
    pub fn new(config: CleanerConfig) -> Result<Self> {
        Self::with_reader(config, RecordArrayReader)
    }
}

impl<R: TrajectoryReader> TrajectoryCleaner<R> {
    pub fn with_reader(config: CleanerConfig, reader: R) -> Result<Self> {
        config.validate()?;
        Ok(TrajectoryCleaner { config, reader })
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Flags and repairs `trajectory` in place.
    pub fn clean<C: Coordinate>(&self, trajectory: &mut Trajectory<C>) -> Result<RepairSummary> {
        flag_anomalies(trajectory, &self.config.detector());
        repair_anomalies(trajectory)
    }

    /// Cleans a serialized trajectory and returns the serialized result.
    pub fn clean_str(&self, input: &str) -> Result<String> {
        Ok(self.run(input)?.output)
    }

    pub fn run(&self, input: &str) -> Result<CleaningRun> {
        match self.config.coordinate_format {
            CoordinateFormat::Degrees => self.run_as::<Degrees>(input),
            CoordinateFormat::Microdegrees => self.run_as::<Microdegrees>(input),
        }
    }

    fn run_as<C: Coordinate>(&self, input: &str) -> Result<CleaningRun> {
        let original: Trajectory<C> = self.reader.read(input)?;
        if original.is_empty() && self.config.reject_empty_trajectory {
            return Err(CleanError::EmptyTrajectory);
        }

        let mut cleaned = original.clone();
        let summary = self.clean(&mut cleaned)?;

        let detector = self.config.detector();
        let report = CleaningReport::compare(&original, &cleaned, &detector, summary);
        let audit = audit_rows(&original, &cleaned, detector.earth_radius_m);

        info!(
            format = %self.config.coordinate_format,
            fixes = report.total_fixes,
            flagged = report.flagged_fixes,
            repaired = report.repaired_fixes,
            skipped = report.skipped_zero_interval,
            "trajectory cleaned"
        );

        Ok(CleaningRun {
            output: serialize_trajectory(&cleaned),
            report,
            audit,
        })
    }
}

/// One-shot helper with the default configuration.
pub fn clean_trajectory_str(input: &str) -> Result<String> {
    TrajectoryCleaner::new(CleanerConfig::default())?.clean_str(input)
}
