// src/config/duration.rs

//! Duration strings used in watch files: `<digits><unit>` with unit `ms`,
//! `s`, `m` or `h`.

use std::time::Duration;

/// Parse durations like `"250ms"`, `"3s"`, `"5m"` or `"1h"`.
///
/// Values whose length in seconds does not fit in a `u64` are rejected.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{}' is missing a unit suffix", s))?;

    let (digits, unit) = s.split_at(idx);
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", digits, e))?;

    let seconds_per_unit = match unit.trim().to_lowercase().as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        other => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                other
            ));
        }
    };

    value
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
