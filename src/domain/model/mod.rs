// Domain models - Core types and data structures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{TrimcodeError, TrimcodeResult};

/// NTSC film rate, used when a v1 timecode has no `assume` line
pub const NTSC_FILM: f64 = 24000.0 / 1001.0;
/// NTSC video rate
pub const NTSC_VIDEO: f64 = 30000.0 / 1001.0;
/// NTSC double rate
pub const NTSC_DOUBLE: f64 = 60000.0 / 1001.0;

/// Frame rate in frames per second
///
/// Accepts decimals (`25`, `23.976`), fractions (`24000/1001`, `30000:1001`)
/// and the aliases `ntsc_film`, `ntsc_video` and `ntsc_double`. The usual
/// rounded NTSC labels (`23.976`, `29.970`, `59.940`) resolve to the exact
/// fractional rates.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FrameRate(f64);

impl FrameRate {
    /// Create a frame rate, rejecting zero, negative and non-finite values
    pub fn new(fps: f64) -> TrimcodeResult<Self> {
        if fps.is_finite() && fps > 0.0 {
            Ok(Self(fps))
        } else {
            Err(TrimcodeError::InvalidFrameRate {
                value: fps.to_string(),
            })
        }
    }

    /// 24000/1001
    pub fn ntsc_film() -> Self {
        Self(NTSC_FILM)
    }

    /// Frames per second
    pub fn fps(&self) -> f64 {
        self.0
    }

    /// Duration of one frame in milliseconds
    pub fn frame_duration_ms(&self) -> f64 {
        1000.0 / self.0
    }

    /// Parse a frame rate string
    pub fn parse(value: &str) -> TrimcodeResult<Self> {
        let trimmed = value.trim();
        let invalid = || TrimcodeError::InvalidFrameRate {
            value: value.to_string(),
        };

        match trimmed.to_ascii_lowercase().as_str() {
            "ntsc_film" | "23.976" => return Ok(Self(NTSC_FILM)),
            "ntsc_video" | "29.97" | "29.970" => return Ok(Self(NTSC_VIDEO)),
            "ntsc_double" | "59.94" | "59.940" => return Ok(Self(NTSC_DOUBLE)),
            _ => {}
        }

        let parts: Vec<&str> = trimmed.split(|c| c == '/' || c == ':').collect();
        let fps = match parts.as_slice() {
            [single] => single.trim().parse::<f64>().map_err(|_| invalid())?,
            [num, den] => {
                let num: f64 = num.trim().parse().map_err(|_| invalid())?;
                let den: f64 = den.trim().parse().map_err(|_| invalid())?;
                if den == 0.0 {
                    return Err(invalid());
                }
                num / den
            }
            _ => return Err(invalid()),
        };

        Self::new(fps).map_err(|_| invalid())
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::ntsc_film()
    }
}

impl FromStr for FrameRate {
    type Err = TrimcodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FrameRate {
    type Error = TrimcodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FrameRate> for String {
    fn from(rate: FrameRate) -> Self {
        rate.to_string()
    }
}

impl fmt::Display for FrameRate {
    /// Exact NTSC rates print as fractions so they survive a round trip
    /// through the preferences file.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == NTSC_FILM {
            write!(f, "24000/1001")
        } else if self.0 == NTSC_VIDEO {
            write!(f, "30000/1001")
        } else if self.0 == NTSC_DOUBLE {
            write!(f, "60000/1001")
        } else {
            write!(f, "{}", format_significant(self.0, 12))
        }
    }
}

/// Format a value with at most `digits` significant digits, dropping
/// trailing zeros (`23.976023976`, `25`).
pub fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    let formatted = format!("{:.*}", decimals, value);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// Inclusive range of frames, `Trim(start,end)` in script terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: u64,
    pub end: u64,
}

/// A trim is a frame range selected in the script
pub type TrimRange = FrameRange;

impl FrameRange {
    /// Create a new range, rejecting `end < start`
    pub fn new(start: u64, end: u64) -> TrimcodeResult<Self> {
        if end < start {
            return Err(TrimcodeError::format(
                "frame range",
                &format!("{},{}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// Resolve the two `Trim()` arguments as the script engine does: a
    /// negative end `e` means a length of `-e` frames, i.e. the absolute end
    /// frame `start - e - 1`.
    pub fn from_trim_args(start: u64, end: i64) -> TrimcodeResult<Self> {
        let raw = || format!("Trim({},{})", start, end);
        match end {
            0 => Err(TrimcodeError::format("open-ended trim", &raw())),
            e if e > 0 => Self::new(start, e as u64).map_err(|_| TrimcodeError::format("trim", &raw())),
            e => {
                let length = e.unsigned_abs();
                start
                    .checked_add(length)
                    .map(|after| Self { start, end: after - 1 })
                    .ok_or_else(|| TrimcodeError::format("trim", &raw()))
            }
        }
    }

    /// Number of frames in the range
    pub fn frame_count(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// Whether `frame` falls inside the range
    pub fn contains(&self, frame: u64) -> bool {
        self.start <= frame && frame <= self.end
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trim({},{})", self.start, self.end)
    }
}
