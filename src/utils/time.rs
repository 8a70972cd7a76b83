//! Chapter time parsing and formatting

use crate::error::{TrimcodeError, TrimcodeResult};

const NANOS_PER_MS: f64 = 1_000_000.0;

/// Parse a Matroska chapter time `HH:MM:SS[.fraction]` into milliseconds.
///
/// The fraction may have up to nine digits.
pub fn parse_chapter_time(time_str: &str) -> TrimcodeResult<f64> {
    let trimmed = time_str.trim();
    let invalid = || TrimcodeError::format("chapter time", trimmed);

    let parts: Vec<&str> = trimmed.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    let whole: u64 = whole.parse().map_err(|_| invalid())?;

    if minutes >= 60 || whole >= 60 {
        return Err(invalid());
    }
    if fraction.len() > 9 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let nanos: u64 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<9}", fraction).parse().map_err(|_| invalid())?
    };

    let total_seconds = hours
        .checked_mul(3600)
        .and_then(|seconds| seconds.checked_add(minutes * 60 + whole))
        .ok_or_else(invalid)?;
    Ok(total_seconds as f64 * 1000.0 + nanos as f64 / NANOS_PER_MS)
}

/// Format milliseconds as a Matroska chapter time `HH:MM:SS.nnnnnnnnn`
pub fn format_chapter_time(ms: f64) -> String {
    let total_nanos = (ms.max(0.0) * NANOS_PER_MS).round() as u64;
    let nanos = total_nanos % 1_000_000_000;
    let total_seconds = total_nanos / 1_000_000_000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}.{:09}", hours, minutes, seconds, nanos)
}
