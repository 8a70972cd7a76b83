//! Timecode files and the frame boundary timeline
//!
//! Both timecode formats are normalised to [`Timestamps`]: one millisecond
//! value per frame start, plus a final value for the end of the last frame.
//! A range of N frames therefore has N + 1 boundaries.

use std::fs;
use std::ops::Index;
use std::path::Path;

use tracing::{debug, info};

use crate::domain::model::{FrameRange, FrameRate};
use crate::error::{TrimcodeError, TrimcodeResult};

pub mod builder;
pub mod cutter;
pub mod v1;
pub mod v2;

pub use builder::{build_timecode, SegmentRate};
pub use cutter::cut_timecode;
pub use v1::{TimecodeV1, V1Record};

/// Header line of a v1 timecode file
pub const V1_HEADER: &str = "# timecode format v1";
/// Header line of a v2 timecode file
pub const V2_HEADER: &str = "# timecode format v2";

/// Largest number of frames a generated timeline may hold (about 46 hours
/// at 60 fps)
pub const MAX_FRAMES: u64 = 10_000_000;

/// Reject timelines longer than [`MAX_FRAMES`]
pub(crate) fn check_frame_count(frames: u64, what: &dyn std::fmt::Display) -> TrimcodeResult<()> {
    if frames > MAX_FRAMES {
        return Err(TrimcodeError::range(format!(
            "{} spans {} frames, more than the limit of {}",
            what, frames, MAX_FRAMES
        )));
    }
    Ok(())
}

/// Frame boundary timestamps in milliseconds
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Timestamps(Vec<f64>);

impl Timestamps {
    /// Wrap a list of boundaries
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of frames whose start and end are both known
    pub fn frame_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn last(&self) -> Option<f64> {
        self.0.last().copied()
    }

    pub fn push(&mut self, value: f64) {
        self.0.push(value);
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Make sure at least `count` boundaries exist.
    ///
    /// A list that is exactly one short is completed by repeating the last
    /// frame duration (`2 * last - second_last`); anything shorter is a
    /// range error.
    pub fn ensure_boundaries(&mut self, count: usize) -> TrimcodeResult<()> {
        if self.0.len() >= count {
            return Ok(());
        }
        if self.0.len() + 1 == count && self.0.len() >= 2 {
            let last = self.0[self.0.len() - 1];
            let second_last = self.0[self.0.len() - 2];
            let extrapolated = 2.0 * last - second_last;
            debug!(
                "Extrapolating missing final boundary {} as {:.3} ms",
                self.0.len(),
                extrapolated
            );
            self.0.push(extrapolated);
            return Ok(());
        }
        Err(TrimcodeError::range(format!(
            "{} timestamps needed but the timecode only has {}",
            count,
            self.0.len()
        )))
    }

    /// Serialize as a v2 timecode file
    pub fn to_v2_text(&self) -> String {
        let mut text = String::with_capacity(self.0.len() * 12 + V2_HEADER.len() + 1);
        text.push_str(V2_HEADER);
        text.push('\n');
        for value in &self.0 {
            text.push_str(&format!("{:.3}\n", value));
        }
        text
    }
}

impl Index<usize> for Timestamps {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<Vec<f64>> for Timestamps {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// A parsed timecode file of either format
#[derive(Debug, Clone, PartialEq)]
pub enum Timecode {
    V1(TimecodeV1),
    V2(Timestamps),
}

impl Timecode {
    /// Parse timecode text, dispatching on its header line.
    ///
    /// `fallback_fps` is the default rate of a v1 file without `assume`.
    pub fn parse(text: &str, fallback_fps: FrameRate) -> TrimcodeResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let (header, body) = match text.find('\n') {
            Some(pos) => (&text[..pos], &text[pos + 1..]),
            None => (text, ""),
        };
        let header = header.trim();

        if header.eq_ignore_ascii_case(V1_HEADER) {
            Ok(Timecode::V1(TimecodeV1::parse_body(body, fallback_fps)?))
        } else if header.eq_ignore_ascii_case(V2_HEADER) {
            Ok(Timecode::V2(v2::parse_body(body)?))
        } else {
            Err(TrimcodeError::format("timecode header", header))
        }
    }

    /// Read and parse a timecode file
    pub fn read(path: &Path, fallback_fps: FrameRate) -> TrimcodeResult<Self> {
        info!("Reading timecode file: {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::parse(&text, fallback_fps)
    }

    /// Frame boundaries from frame 0.
    ///
    /// A v2 timecode is returned as is. A v1 timecode is expanded up to
    /// `last_frame`, or up to its last record when no frame is given.
    pub fn to_timestamps(&self, last_frame: Option<u64>) -> TrimcodeResult<Timestamps> {
        match self {
            Timecode::V2(timestamps) => Ok(timestamps.clone()),
            Timecode::V1(v1) => {
                let end = last_frame.or_else(|| v1.last_frame()).ok_or_else(|| {
                    TrimcodeError::range("v1 timecode has no records and no end frame was given")
                })?;
                v1.to_timestamps(FrameRange { start: 0, end }, 0.0)
            }
        }
    }

    /// Serialize in the file's own format
    pub fn to_text(&self) -> String {
        match self {
            Timecode::V1(v1) => v1.to_text(),
            Timecode::V2(timestamps) => timestamps.to_v2_text(),
        }
    }
}
