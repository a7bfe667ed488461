/// Time-linear interpolation repair for flagged fixes
///
/// Each flagged fix gets coordinates interpolated between the nearest
/// unflagged fix before it and the nearest unflagged fix after it, at its own
/// timestamp. Anchors are always unflagged originals, so the result does not
/// depend on the order flagged fixes are visited in. Timestamps are never
/// touched.

use tracing::{debug, warn};

use crate::error::{CleanError, Result};
use crate::trajectory::{Coordinate, Fix, Trajectory};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub repaired: usize,
    /// Flagged fixes whose anchors share a timestamp; left as they were.
    pub skipped_zero_interval: usize,
}

/// Rewrites every flagged fix of `trajectory` in place.
///
/// Fails with `ProcessingFailure` if the first or last fix is flagged, which
/// the detector never does.
pub fn repair_anomalies<C: Coordinate>(trajectory: &mut Trajectory<C>) -> Result<RepairSummary> {
    let mut summary = RepairSummary::default();
    let n = trajectory.len();
    if n < 3 {
        return Ok(summary);
    }

    let fixes = trajectory.fixes_mut();
    if fixes[0].anomalous || fixes[n - 1].anomalous {
        return Err(CleanError::ProcessingFailure(
            "trajectory endpoints are flagged; no interpolation anchor available".to_string(),
        ));
    }

    for i in 1..n - 1 {
        if !fixes[i].anomalous {
            continue;
        }

        let before = fixes[previous_anchor(fixes, i)];
        let after = fixes[next_anchor(fixes, i)];

        match interpolation_fraction(before.timestamp, fixes[i].timestamp, after.timestamp) {
            Some(alpha) => {
                let fix = &mut fixes[i];
                fix.latitude = C::interpolate(before.latitude, after.latitude, alpha);
                fix.longitude = C::interpolate(before.longitude, after.longitude, alpha);
                summary.repaired += 1;
                debug!(index = i, alpha, "fix repaired");
            }
            None => {
                summary.skipped_zero_interval += 1;
                warn!(index = i, time = fixes[i].timestamp, "anchors share a timestamp; fix left unrepaired");
            }
        }
    }

    Ok(summary)
}

// Index 0 is never flagged, so the walk stops there at the latest.
fn previous_anchor<C>(fixes: &[Fix<C>], index: usize) -> usize {
    let mut j = index - 1;
    while fixes[j].anomalous {
        j -= 1;
    }
    j
}

fn next_anchor<C>(fixes: &[Fix<C>], index: usize) -> usize {
    let mut j = index + 1;
    while fixes[j].anomalous {
        j += 1;
    }
    j
}

/// `(t - t_prev) / (t_next - t_prev)` clamped to `[0, 1]`; `None` when the
/// anchors share a timestamp.
pub fn interpolation_fraction(t_prev: i64, t: i64, t_next: i64) -> Option<f64> {
    let span = i128::from(t_next) - i128::from(t_prev);
    if span == 0 {
        return None;
    }
    let elapsed = i128::from(t) - i128::from(t_prev);
    Some((elapsed as f64 / span as f64).clamp(0.0, 1.0))
}
