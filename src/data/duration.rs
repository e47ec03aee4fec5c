use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to seconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ms", 0.001),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
    ("d", 86400.0),
];

/// Parse duration strings like "90s", "30m", "6h", "1.5d"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if val < 0.0 {
                bail!("Negative duration: {}", s);
            }
            return Ok(Duration::from_secs_f64(val * multiplier));
        }
    }

    // Bare number is taken as seconds
    if let Ok(val) = s.parse::<f64>() {
        if val >= 0.0 {
            return Ok(Duration::from_secs_f64(val));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a number of seconds for display ("45s", "12m", "2h 30m", "3d 4h").
///
/// Negative values (overdue remaining times) are prefixed with "-".
pub fn format_seconds(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let secs = seconds.unsigned_abs();

    if secs < 60 {
        format!("{}{}s", sign, secs)
    } else if secs < 3600 {
        format!("{}{}m", sign, secs / 60)
    } else if secs < 86400 {
        let hours = secs / 3600;
        let minutes = (secs % 3600) / 60;
        if minutes == 0 {
            format!("{}{}h", sign, hours)
        } else {
            format!("{}{}h {}m", sign, hours, minutes)
        }
    } else {
        let days = secs / 86400;
        let hours = (secs % 86400) / 3600;
        if hours == 0 {
            format!("{}{}d", sign, days)
        } else {
            format!("{}{}d {}h", sign, days, hours)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("90s").unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn test_parse_minutes_and_hours() {
        assert_eq!(parse_duration("30m").unwrap().as_secs(), 1800);
        assert_eq!(parse_duration("6h").unwrap().as_secs(), 21600);
    }

    #[test]
    fn test_parse_fractional_days() {
        assert_eq!(parse_duration("1.5d").unwrap().as_secs(), 129600);
    }

    #[test]
    fn test_parse_bare_number_is_seconds() {
        assert_eq!(parse_duration("45").unwrap().as_secs(), 45);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5m").is_err());
    }

    #[test]
    fn test_format_ranges() {
        assert_eq!(format_seconds(45), "45s");
        assert_eq!(format_seconds(1800), "30m");
        assert_eq!(format_seconds(9000), "2h 30m");
        assert_eq!(format_seconds(21600), "6h");
        assert_eq!(format_seconds(273600), "3d 4h");
    }

    #[test]
    fn test_format_overdue() {
        assert_eq!(format_seconds(-5400), "-1h 30m");
    }
}
