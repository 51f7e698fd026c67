//! Resource metric text parsing
//!
//! Engines report metrics as display strings (`"0.48%"`, `"1.2kB / 850B"`).
//! These helpers turn them into numbers for sorting. Every function is total:
//! unparseable input yields `0.0`.
//!
//! All size units use a decimal scale, so `KiB` is treated the same as `kB`
//! (1000 bytes). Values are returned unrounded.

/// Byte multipliers keyed by lower-cased unit suffix
const UNIT_TABLE: &[(&str, f64)] = &[
    ("", 1.0),
    ("b", 1.0),
    ("byte", 1.0),
    ("bytes", 1.0),
    ("kb", 1e3),
    ("kib", 1e3),
    ("mb", 1e6),
    ("mib", 1e6),
    ("gb", 1e9),
    ("gib", 1e9),
];

/// Parse a percentage such as `"12.5%"`
pub fn parse_percent(s: &str) -> f64 {
    let s = s.trim();
    let s = s.strip_suffix('%').unwrap_or(s);
    s.trim().parse().unwrap_or(0.0)
}

/// Parse a human readable size such as `"1.2kB"` or `"850 B"` into bytes.
///
/// An unknown unit leaves the numeric part unscaled.
pub fn parse_size(s: &str) -> f64 {
    let cleaned = s.trim().replace(',', "");
    if cleaned.is_empty() {
        return 0.0;
    }

    let split = cleaned
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(cleaned.len());
    let (number, unit) = cleaned.split_at(split);
    if number.is_empty() {
        return 0.0;
    }
    let Ok(value) = number.parse::<f64>() else {
        return 0.0;
    };

    let unit = unit.trim().to_lowercase();
    UNIT_TABLE
        .iter()
        .find(|(suffix, _)| *suffix == unit)
        .map(|(_, multiplier)| value * multiplier)
        .unwrap_or(value)
}

/// Parse an I/O pair such as `"1.2kB / 850B"` by summing both sides
pub fn parse_io_pair(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() || s == "─" {
        return 0.0;
    }
    s.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_size)
        .sum()
}
