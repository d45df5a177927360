//! Time parsing utilities

use crate::error::MergeError;

/// Parse seconds, `MM:SS(.ms)` or `HH:MM:SS(.ms)` into seconds
pub fn parse_time(time_str: &str) -> Result<f64, MergeError> {
    let trimmed = time_str.trim();
    let invalid = || {
        MergeError::validation(format!(
            "Invalid time format: {}. Expected seconds, MM:SS.ms or HH:MM:SS.ms",
            trimmed
        ))
    };

    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(invalid());
        }
        return Ok(seconds);
    }

    let parts: Vec<&str> = trimmed.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => (0u32, m.parse::<u32>().map_err(|_| invalid())?, *s),
        [h, m, s] => (
            h.parse::<u32>().map_err(|_| invalid())?,
            m.parse::<u32>().map_err(|_| invalid())?,
            *s,
        ),
        _ => return Err(invalid()),
    };
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
    if !(0.0..60.0).contains(&seconds) || (parts.len() == 3 && minutes >= 60) {
        return Err(invalid());
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_time("90.5").unwrap(), 90.5);
        assert_eq!(parse_time(" 0 ").unwrap(), 0.0);
    }

    #[test]
    fn test_parse_clock_formats() {
        assert_eq!(parse_time("01:30").unwrap(), 90.0);
        assert_eq!(parse_time("01:30.5").unwrap(), 90.5);
        assert_eq!(parse_time("00:01:30.25").unwrap(), 90.25);
        assert_eq!(parse_time("1:00:00").unwrap(), 3600.0);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_time("invalid").is_err());
        assert!(parse_time("-3").is_err());
        assert!(parse_time("00:60").is_err());
        assert!(parse_time("1:60:00").is_err());
        assert!(parse_time("1:2:3:4").is_err());
    }
}
