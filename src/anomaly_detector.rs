/// Speed-based anomaly detection
///
/// An interior fix is anomalous when the speed implied by either its
/// incoming or its outgoing segment exceeds the configured limit. The first
/// and last fix anchor the repair and are never flagged.

use tracing::debug;

use crate::geodesy::{haversine_distance, DEFAULT_EARTH_RADIUS_M};
use crate::trajectory::{Coordinate, Fix, Trajectory};

pub const DEFAULT_MAX_SPEED_MPS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Speeds strictly above this are implausible (m/s)
    pub max_speed_mps: f64,
    /// Sphere radius for the haversine distance (m)
    pub earth_radius_m: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            max_speed_mps: DEFAULT_MAX_SPEED_MPS,
            earth_radius_m: DEFAULT_EARTH_RADIUS_M,
        }
    }
}

/// Speed in m/s needed to travel from `from` to `to`.
///
/// Zero or negative elapsed time yields 0.0, so such a segment never
/// triggers on its own.
pub fn implied_speed<C: Coordinate>(from: &Fix<C>, to: &Fix<C>, earth_radius_m: f64) -> f64 {
    let elapsed = to.timestamp.saturating_sub(from.timestamp);
    if elapsed <= 0 {
        return 0.0;
    }
    haversine_distance(from.point(), to.point(), earth_radius_m) / elapsed as f64
}

/// Implied speed of every consecutive pair; `speeds[i]` is the segment `i -> i+1`.
pub fn segment_speeds<C: Coordinate>(trajectory: &Trajectory<C>, earth_radius_m: f64) -> Vec<f64> {
    trajectory
        .fixes()
        .windows(2)
        .map(|pair| implied_speed(&pair[0], &pair[1], earth_radius_m))
        .collect()
}

/// Annotates `trajectory` in place and returns the number of flagged fixes.
///
/// Any earlier annotation is discarded. Trajectories shorter than three
/// fixes are left unflagged.
pub fn flag_anomalies<C: Coordinate>(trajectory: &mut Trajectory<C>, config: &DetectorConfig) -> usize {
    trajectory.clear_anomalies();

    let n = trajectory.len();
    if n < 3 {
        return 0;
    }

    let speeds = segment_speeds(trajectory, config.earth_radius_m);
    let fixes = trajectory.fixes_mut();
    let mut flagged = 0;

    for i in 1..n - 1 {
        let incoming = speeds[i - 1];
        let outgoing = speeds[i];

        if incoming > config.max_speed_mps || outgoing > config.max_speed_mps {
            fixes[i].anomalous = true;
            flagged += 1;
            debug!(
                index = i,
                time = fixes[i].timestamp,
                incoming_mps = incoming,
                outgoing_mps = outgoing,
                "fix flagged"
            );
        }
    }

    flagged
}
