/// GPX export of a cleaned trajectory
///
/// Writes one track with one segment. Fix timestamps are read as Unix
/// seconds; a timestamp `time` cannot represent leaves the waypoint undated.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use geo::point;
use gpx::{write, Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use time::OffsetDateTime;

use crate::cleaning_report::FixAudit;

pub fn build_gpx(audit: &[FixAudit], track_name: &str) -> Gpx {
    let mut gpx = Gpx::default();
    gpx.version = GpxVersion::Gpx11;
    gpx.creator = Some(concat!("gps-track-cleaner ", env!("CARGO_PKG_VERSION")).to_string());

    let mut track = Track::new();
    track.name = Some(track_name.to_string());
    track.description = Some(format!(
        "{} fixes, {} repaired",
        audit.len(),
        audit.iter().filter(|row| row.repaired).count()
    ));

    let mut segment = TrackSegment::new();
    for row in audit {
        let mut waypoint = Waypoint::new(point!(x: row.cleaned_lon, y: row.cleaned_lat));
        waypoint.time = OffsetDateTime::from_unix_timestamp(row.time).ok().map(Into::into);
        segment.points.push(waypoint);
    }

    track.segments.push(segment);
    gpx.tracks.push(track);
    gpx
}

pub fn write_gpx<W: Write>(gpx: &Gpx, writer: W) -> anyhow::Result<()> {
    write(gpx, writer).map_err(|e| anyhow::anyhow!("failed to write GPX: {}", e))
}

pub fn save_gpx(audit: &[FixAudit], track_name: &str, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create GPX file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_gpx(&build_gpx(audit, track_name), &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CleanerConfig;
    use crate::pipeline::TrajectoryCleaner;
    use std::io::BufReader;

    fn spike_audit() -> Vec<FixAudit> {
        let cleaner = TrajectoryCleaner::new(CleanerConfig::default()).unwrap();
        cleaner
            .run(r#"[{"lat":0,"lon":0,"time":1743465601},{"lat":10,"lon":10,"time":1743465602},{"lat":0.0002,"lon":0.0002,"time":1743465603}]"#)
            .unwrap()
            .audit
    }

    #[test]
    fn test_build_gpx_uses_cleaned_coordinates() {
        let gpx = build_gpx(&spike_audit(), "spike");

        assert_eq!(gpx.version, GpxVersion::Gpx11);
        assert_eq!(gpx.tracks.len(), 1);
        let track = &gpx.tracks[0];
        assert_eq!(track.name.as_deref(), Some("spike"));
        assert_eq!(track.description.as_deref(), Some("3 fixes, 1 repaired"));

        let points = &track.segments[0].points;
        assert_eq!(points.len(), 3);
        assert!((points[1].point().y() - 0.0001).abs() < 1e-12);
        assert!((points[1].point().x() - 0.0001).abs() < 1e-12);
        assert!(points.iter().all(|p| p.time.is_some()));
    }

    #[test]
    fn test_unrepresentable_time_left_empty() {
        let mut audit = spike_audit();
        audit[0].time = i64::MAX;
        let gpx = build_gpx(&audit, "far future");
        let points = &gpx.tracks[0].segments[0].points;
        assert!(points[0].time.is_none());
        assert!(points[1].time.is_some());
    }

    #[test]
    fn test_saved_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.gpx");
        save_gpx(&spike_audit(), "spike", &path).unwrap();

        let reader = BufReader::new(File::open(&path).unwrap());
        let gpx = gpx::read(reader).unwrap();
        let points = &gpx.tracks[0].segments[0].points;
        assert_eq!(points.len(), 3);
        assert!((points[2].point().y() - 0.0002).abs() < 1e-9);
    }
}
