/// Record array serializer
///
/// Output shape: `[{"lat":<c>,"lon":<c>,"time":<i>},...]` with no whitespace
/// and no trailing separator. Coordinate rendering is owned by the
/// coordinate type (8 fractional digits for degrees, exact integers for
/// microdegrees).

use crate::trajectory::{Coordinate, Fix, Trajectory};

pub fn serialize_trajectory<C: Coordinate>(trajectory: &Trajectory<C>) -> String {
    // Roughly 50 bytes per record
    let mut out = String::with_capacity(2 + trajectory.len() * 50);
    out.push('[');
    for (i, fix) in trajectory.fixes().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_record(&mut out, fix);
    }
    out.push(']');
    out
}

fn write_record<C: Coordinate>(out: &mut String, fix: &Fix<C>) {
    out.push_str("{\"lat\":");
    fix.latitude.write_json(out);
    out.push_str(",\"lon\":");
    fix.longitude.write_json(out);
    out.push_str(",\"time\":");
    out.push_str(&fix.timestamp.to_string());
    out.push('}');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_trajectory;
    use crate::trajectory::{Degrees, Microdegrees};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_empty_array() {
        let trajectory: Trajectory<Degrees> = Trajectory::new();
        assert_eq!(serialize_trajectory(&trajectory), "[]");
    }

    #[test]
    fn test_degrees_layout() {
        let trajectory = Trajectory::from_fixes(vec![
            Fix::new(Degrees(48.480512), Degrees(-32.271152), 1743465601),
            Fix::new(Degrees(0.0001), Degrees(0.0), -1),
        ]);
        assert_eq!(
            serialize_trajectory(&trajectory),
            r#"[{"lat":48.48051200,"lon":-32.27115200,"time":1743465601},{"lat":0.00010000,"lon":0.00000000,"time":-1}]"#
        );
    }

    #[test]
    fn test_microdegrees_are_exact() {
        let trajectory = Trajectory::from_fixes(vec![Fix::new(Microdegrees(48480512), Microdegrees(-32271152), 7)]);
        assert_eq!(
            serialize_trajectory(&trajectory),
            r#"[{"lat":48480512,"lon":-32271152,"time":7}]"#
        );
    }

    #[test]
    fn test_output_parses_back_within_precision() {
        let input = r#"[ {"lon": 2.123456789012, "lat": -1.5, "time": 10}, {"lat": 3, "lon": 4, "time": 11} ]"#;
        let original: Trajectory<Degrees> = parse_trajectory(input).unwrap();
        let reparsed: Trajectory<Degrees> = parse_trajectory(&serialize_trajectory(&original)).unwrap();

        assert_eq!(reparsed.len(), original.len());
        for (a, b) in original.fixes().iter().zip(reparsed.fixes()) {
            assert_approx_eq!(a.latitude.0, b.latitude.0, 5e-9);
            assert_approx_eq!(a.longitude.0, b.longitude.0, 5e-9);
            assert_eq!(a.timestamp, b.timestamp);
        }
    }

    #[test]
    fn test_anomaly_flag_is_not_serialized() {
        let mut trajectory = Trajectory::from_fixes(vec![Fix::new(Microdegrees(1), Microdegrees(2), 3)]);
        trajectory.fixes_mut()[0].anomalous = true;
        assert_eq!(serialize_trajectory(&trajectory), r#"[{"lat":1,"lon":2,"time":3}]"#);
    }
}
