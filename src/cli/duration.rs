use std::time::Duration;

use regex::Regex;

use crate::errors::{GatorError, GatorResult};

/// `1h30m`, `2.5s`, `500ms`: one or more number+unit pairs, no separators.
const DURATION_PATTERN: &str = r"^(?:(?:\d+(?:\.\d*)?|\.\d+)(?:ns|us|µs|μs|ms|s|m|h))+$";
const COMPONENT_PATTERN: &str = r"(\d+(?:\.\d*)?|\.\d+)(ns|us|µs|μs|ms|s|m|h)";

fn unit_nanos(unit: &str) -> f64 {
    match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1e3,
        "ms" => 1e6,
        "s" => 1e9,
        "m" => 60.0 * 1e9,
        _ => 3600.0 * 1e9,
    }
}

/// Parse a polling interval written the way `agg` accepts it (`10s`,
/// `1m`, `1h30m`). Zero and negative intervals are rejected.
pub fn parse_interval(raw: &str) -> GatorResult<Duration> {
    let input = raw.trim();
    let invalid = || GatorError::InvalidDuration(raw.to_string());

    let whole = Regex::new(DURATION_PATTERN).map_err(|_| invalid())?;
    let component = Regex::new(COMPONENT_PATTERN).map_err(|_| invalid())?;

    if !whole.is_match(input) {
        return Err(invalid());
    }

    let mut nanos = 0f64;
    for caps in component.captures_iter(input) {
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        nanos += value * unit_nanos(&caps[2]);
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(invalid());
    }

    let duration = Duration::from_nanos(nanos.round() as u64);
    if duration.is_zero() {
        return Err(invalid());
    }
    Ok(duration)
}
