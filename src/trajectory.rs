/// Trajectory data model
///
/// A trajectory is an ordered list of fixes. Coordinates are generic over
/// their storage so the whole pipeline can run on either decimal degrees
/// (`Degrees`) or integer microdegrees (`Microdegrees`); one run always
/// uses a single representation, interpolation arithmetic included.

use std::fmt;

use geo::{point, Point};
use serde::{Deserialize, Serialize};

/// Storage format of latitude/longitude values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFormat {
    #[default]
    Degrees,
    Microdegrees,
}

impl fmt::Display for CoordinateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateFormat::Degrees => write!(f, "degrees"),
            CoordinateFormat::Microdegrees => write!(f, "microdegrees"),
        }
    }
}

/// One latitude or longitude value.
pub trait Coordinate: Copy + fmt::Debug + PartialEq {
    /// Builds a value from a lexically valid number token (`-?[0-9]+(\.[0-9]+)?`).
    /// Returns `None` when the token is outside what this representation accepts.
    fn from_token(token: &str) -> Option<Self>;

    fn to_degrees(self) -> f64;

    /// `from + alpha * (to - from)`, in this representation's arithmetic.
    fn interpolate(from: Self, to: Self, alpha: f64) -> Self;

    /// Appends the canonical rendering of this value.
    fn write_json(self, out: &mut String);
}

/// Decimal degrees, rendered with `Degrees::DECIMAL_PLACES` fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Degrees(pub f64);

impl Degrees {
    pub const DECIMAL_PLACES: usize = 8;
}

impl Coordinate for Degrees {
    fn from_token(token: &str) -> Option<Self> {
        token.parse::<f64>().ok().filter(|v| v.is_finite()).map(Degrees)
    }

    fn to_degrees(self) -> f64 {
        self.0
    }

    fn interpolate(from: Self, to: Self, alpha: f64) -> Self {
        Degrees(from.0 + alpha * (to.0 - from.0))
    }

    fn write_json(self, out: &mut String) {
        out.push_str(&format!("{:.*}", Self::DECIMAL_PLACES, self.0));
    }
}

/// Fixed-point degrees scaled by 1e6.
///
/// Only integer tokens are accepted. Interpolated values are rounded half away
/// from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Microdegrees(pub i64);

impl Microdegrees {
    pub const PER_DEGREE: f64 = 1e6;
}

impl Coordinate for Microdegrees {
    fn from_token(token: &str) -> Option<Self> {
        if token.contains('.') {
            return None;
        }
        token.parse::<i64>().ok().map(Microdegrees)
    }

    fn to_degrees(self) -> f64 {
        self.0 as f64 / Self::PER_DEGREE
    }

    fn interpolate(from: Self, to: Self, alpha: f64) -> Self {
        let delta = to.0 as f64 - from.0 as f64;
        Microdegrees((from.0 as f64 + alpha * delta).round() as i64)
    }

    fn write_json(self, out: &mut String) {
        out.push_str(&self.0.to_string());
    }
}

/// One GPS sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix<C> {
    pub latitude: C,
    pub longitude: C,
    pub timestamp: i64,
    /// Set by the anomaly detector, read by the repairer. Not part of the encoding.
    pub anomalous: bool,
}

impl<C: Coordinate> Fix<C> {
    pub fn new(latitude: C, longitude: C, timestamp: i64) -> Self {
        Fix {
            latitude,
            longitude,
            timestamp,
            anomalous: false,
        }
    }

    /// Position in decimal degrees (x = longitude, y = latitude).
    pub fn point(&self) -> Point<f64> {
        point!(x: self.longitude.to_degrees(), y: self.latitude.to_degrees())
    }
}

/// Ordered sequence of fixes; insertion order is temporal order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory<C> {
    fixes: Vec<Fix<C>>,
}

impl<C: Coordinate> Default for Trajectory<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Coordinate> Trajectory<C> {
    pub fn new() -> Self {
        Trajectory { fixes: Vec::new() }
    }

    pub fn from_fixes(fixes: Vec<Fix<C>>) -> Self {
        Trajectory { fixes }
    }

    pub fn push(&mut self, fix: Fix<C>) {
        self.fixes.push(fix);
    }

    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    pub fn fixes(&self) -> &[Fix<C>] {
        &self.fixes
    }

    pub fn fixes_mut(&mut self) -> &mut [Fix<C>] {
        &mut self.fixes
    }

    pub fn anomaly_flags(&self) -> Vec<bool> {
        self.fixes.iter().map(|f| f.anomalous).collect()
    }

    pub fn anomaly_count(&self) -> usize {
        self.fixes.iter().filter(|f| f.anomalous).count()
    }

    pub fn clear_anomalies(&mut self) {
        for fix in &mut self.fixes {
            fix.anomalous = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_degrees_token_parsing() {
        assert_eq!(Degrees::from_token("48.5"), Some(Degrees(48.5)));
        assert_eq!(Degrees::from_token("-0.0002"), Some(Degrees(-0.0002)));
        assert_eq!(Degrees::from_token("10"), Some(Degrees(10.0)));
    }

    #[test]
    fn test_degrees_rejects_overflowing_token() {
        let huge = format!("1{}", "0".repeat(400));
        assert_eq!(Degrees::from_token(&huge), None);
    }

    #[test]
    fn test_microdegrees_accept_integers_only() {
        assert_eq!(Microdegrees::from_token("48480512"), Some(Microdegrees(48480512)));
        assert_eq!(Microdegrees::from_token("-32271152"), Some(Microdegrees(-32271152)));
        assert_eq!(Microdegrees::from_token("48.480512"), None);
        assert_eq!(Microdegrees::from_token("99999999999999999999"), None);
    }

    #[test]
    fn test_microdegrees_interpolation_rounds_half_away_from_zero() {
        assert_eq!(Microdegrees::interpolate(Microdegrees(0), Microdegrees(1), 0.5), Microdegrees(1));
        assert_eq!(Microdegrees::interpolate(Microdegrees(0), Microdegrees(-1), 0.5), Microdegrees(-1));
        assert_eq!(Microdegrees::interpolate(Microdegrees(10), Microdegrees(13), 1.0 / 3.0), Microdegrees(11));
    }

    #[test]
    fn test_degrees_interpolation_is_linear() {
        let mid = Degrees::interpolate(Degrees(0.0), Degrees(0.0002), 0.5);
        assert_approx_eq!(mid.0, 0.0001, 1e-12);
        assert_eq!(Degrees::interpolate(Degrees(3.0), Degrees(7.0), 0.0), Degrees(3.0));
        assert_eq!(Degrees::interpolate(Degrees(3.0), Degrees(7.0), 1.0), Degrees(7.0));
    }

    #[test]
    fn test_rendering() {
        let mut out = String::new();
        Degrees(0.0001).write_json(&mut out);
        out.push(' ');
        Degrees(-12.5).write_json(&mut out);
        out.push(' ');
        Microdegrees(-48480512).write_json(&mut out);
        assert_eq!(out, "0.00010000 -12.50000000 -48480512");
    }

    #[test]
    fn test_fix_point_uses_lon_as_x() {
        let fix = Fix::new(Microdegrees(48_000_000), Microdegrees(32_500_000), 0);
        let p = fix.point();
        assert_approx_eq!(p.x(), 32.5, 1e-12);
        assert_approx_eq!(p.y(), 48.0, 1e-12);
    }

    #[test]
    fn test_anomaly_bookkeeping() {
        let mut trajectory = Trajectory::from_fixes(vec![
            Fix::new(Degrees(0.0), Degrees(0.0), 0),
            Fix::new(Degrees(1.0), Degrees(1.0), 1),
        ]);
        trajectory.fixes_mut()[1].anomalous = true;
        assert_eq!(trajectory.anomaly_flags(), vec![false, true]);
        assert_eq!(trajectory.anomaly_count(), 1);

        trajectory.clear_anomalies();
        assert_eq!(trajectory.anomaly_count(), 0);
    }
}
