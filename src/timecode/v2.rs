//! Timecode format v2: one timestamp per line

use crate::error::{TrimcodeError, TrimcodeResult};

use super::Timestamps;

/// Parse the lines following a v2 header.
///
/// Blank lines and `#` comments are skipped. Values must be non-decreasing.
pub fn parse_body(body: &str) -> TrimcodeResult<Timestamps> {
    let mut values: Vec<f64> = Vec::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let value: f64 = line
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| TrimcodeError::format("timecode v2 line", line))?;

        if let Some(&previous) = values.last() {
            if value < previous {
                return Err(TrimcodeError::format("decreasing timecode v2 line", line));
            }
        }
        values.push(value);
    }

    Ok(Timestamps::new(values))
}
