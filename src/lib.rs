//! GPS trajectory cleaner
//!
//! Finds fixes that imply impossible speeds and replaces their coordinates
//! with values interpolated in time between trusted neighbours.
//!
//! Usage:
//! ```rust
//! use gps_track_cleaner::{CleanerConfig, TrajectoryCleaner};
//!
//! let cleaner = TrajectoryCleaner::new(CleanerConfig::default()).unwrap();
//! let output = cleaner
//!     .clean_str(r#"[{"lat":0,"lon":0,"time":0},{"lat":10,"lon":10,"time":1},{"lat":0.0002,"lon":0.0002,"time":2}]"#)
//!     .unwrap();
//! assert!(output.contains(r#"{"lat":0.00010000,"lon":0.00010000,"time":1}"#));
//! ```

pub mod anomaly_detector;
pub mod batch_processor;
pub mod cleaning_report;
pub mod config;
pub mod error;
pub mod geodesy;
pub mod gpx_export;
pub mod interpolation_repair;
pub mod parser;
pub mod pipeline;
pub mod serializer;
pub mod trajectory;

pub use config::CleanerConfig;
pub use error::CleanError;
pub use pipeline::{clean_trajectory_str, CleaningRun, TrajectoryCleaner};
pub use trajectory::{Coordinate, CoordinateFormat, Degrees, Fix, Microdegrees, Trajectory};
