// Parsing and formatting helpers.
//
// This module centralizes the "dirty" field handling for the tab-separated
// source files so the loader and the views can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like field into `f64` while being forgiving about
/// formatting issues common in exported tables.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values containing alphabetic characters.
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_field(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// Parse an hour-of-day field. The hour column sometimes arrives
/// float-formatted (`"7.0"`), so we go through `f64` and require an
/// integral value in 0..=23.
pub fn parse_hour_field(s: Option<&str>) -> Option<u8> {
    let v = parse_f64_field(s)?;
    if v.fract() != 0.0 || !(0.0..=23.0).contains(&v) {
        return None;
    }
    Some(v as u8)
}

/// Arithmetic mean. Returns 0 for an empty slice; aggregate operations check
/// for empty input before calling this.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().sum::<f64>() / values.len() as f64
}

/// Fixed-decimal rendering for AQI values shown in tables and metrics.
pub fn format_aqi(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Render a 0..1 fraction as a percentage with one decimal, e.g. `33.3%`.
pub fn format_pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Locale-aware integer formatting for row and city counts in console
/// messages (e.g. `1,234 rows loaded`).
pub fn format_count<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_f64_field_handles_common_junk() {
        assert_eq!(parse_f64_field(Some("155.2")), Some(155.2));
        assert_eq!(parse_f64_field(Some(" 1,250.5 ")), Some(1250.5));
        assert_eq!(parse_f64_field(Some("")), None);
        assert_eq!(parse_f64_field(Some("n/a")), None);
        assert_eq!(parse_f64_field(None), None);
    }

    #[test]
    fn parse_hour_field_requires_integral_clock_values() {
        assert_eq!(parse_hour_field(Some("0")), Some(0));
        assert_eq!(parse_hour_field(Some("23")), Some(23));
        assert_eq!(parse_hour_field(Some("7.0")), Some(7));
        assert_eq!(parse_hour_field(Some("7.5")), None);
        assert_eq!(parse_hour_field(Some("24")), None);
        assert_eq!(parse_hour_field(Some("-1")), None);
    }

    #[test]
    fn formatting_helpers() {
        assert_eq!(format_aqi(138.333, 1), "138.3");
        assert_eq!(format_aqi(45.0, 2), "45.00");
        assert_eq!(format_pct(1.0 / 3.0), "33.3%");
        assert_eq!(format_count(1_234_567usize), "1,234,567");
    }
}
