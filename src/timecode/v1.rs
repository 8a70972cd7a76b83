//! Timecode format v1: constant frame rate intervals
//!
//! ```text
//! # timecode format v1
//! assume 29.970030
//! 0,2499,23.976024
//! 2700,3499,59.940060
//! ```
//!
//! Frames not covered by any record play at the `assume` rate.

use serde::Serialize;
use tracing::debug;

use crate::domain::model::{format_significant, FrameRange, FrameRate};
use crate::error::{TrimcodeError, TrimcodeResult};

use super::{check_frame_count, Timestamps, V1_HEADER};

/// One `start,end,fps` record, frames inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct V1Record {
    pub start: u64,
    pub end: u64,
    pub fps: FrameRate,
}

impl V1Record {
    pub fn frame_count(&self) -> u64 {
        self.end - self.start + 1
    }

    fn parse(line: &str) -> TrimcodeResult<Self> {
        let bad_line = || TrimcodeError::format("timecode v1 line", line);

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let [start, end, fps] = fields.as_slice() else {
            return Err(bad_line());
        };

        let start: u64 = start.parse().map_err(|_| bad_line())?;
        let end: u64 = end.parse().map_err(|_| bad_line())?;
        let fps: f64 = fps.parse().map_err(|_| bad_line())?;
        let fps = FrameRate::new(fps).map_err(|_| bad_line())?;

        if end < start {
            return Err(bad_line());
        }

        Ok(Self { start, end, fps })
    }
}

/// Where a default-rate interval was synthesized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    Leading,
    Gap,
    Trailing,
}

/// A v1 timecode: default rate plus ordered, non-overlapping records
#[derive(Debug, Clone, PartialEq)]
pub struct TimecodeV1 {
    pub default_fps: FrameRate,
    records: Vec<V1Record>,
}

impl TimecodeV1 {
    /// Create a timecode, validating record order
    pub fn new(default_fps: FrameRate, records: Vec<V1Record>) -> TrimcodeResult<Self> {
        for pair in records.windows(2) {
            if pair[1].start <= pair[0].end {
                return Err(TrimcodeError::format(
                    "overlapping timecode v1 line",
                    &format!("{},{},{}", pair[1].start, pair[1].end, pair[1].fps),
                ));
            }
        }
        Ok(Self { default_fps, records })
    }

    /// Parse a full v1 file, header included
    pub fn parse(text: &str, fallback_fps: FrameRate) -> TrimcodeResult<Self> {
        let text = text.trim_start_matches('\u{feff}');
        let mut lines = text.splitn(2, '\n');
        let header = lines.next().unwrap_or_default().trim();
        if !header.eq_ignore_ascii_case(V1_HEADER) {
            return Err(TrimcodeError::format("timecode v1 header", header));
        }
        Self::parse_body(lines.next().unwrap_or_default(), fallback_fps)
    }

    /// Parse the lines following the header.
    ///
    /// An `assume <fps>` line before the first record sets the default rate;
    /// otherwise `fallback_fps` is used.
    pub fn parse_body(body: &str, fallback_fps: FrameRate) -> TrimcodeResult<Self> {
        let mut default_fps = fallback_fps;
        let mut records: Vec<V1Record> = Vec::new();

        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut words = line.split_whitespace();
            if words
                .next()
                .is_some_and(|word| word.eq_ignore_ascii_case("assume"))
            {
                let value = words.next().unwrap_or_default();
                if !records.is_empty() || words.next().is_some() {
                    return Err(TrimcodeError::format("timecode v1 assume line", line));
                }
                default_fps = FrameRate::parse(value)
                    .map_err(|_| TrimcodeError::format("timecode v1 assume line", line))?;
                continue;
            }

            let record = V1Record::parse(line)?;
            if let Some(previous) = records.last() {
                if record.start <= previous.end {
                    return Err(TrimcodeError::format("overlapping timecode v1 line", line));
                }
            }
            records.push(record);
        }

        Ok(Self { default_fps, records })
    }

    pub fn records(&self) -> &[V1Record] {
        &self.records
    }

    /// Last frame covered by an explicit record
    pub fn last_frame(&self) -> Option<u64> {
        self.records.last().map(|record| record.end)
    }

    /// Intervals covering exactly `range`.
    ///
    /// Records are clipped to the range. Frames before the first record,
    /// between records and after the last record get the default rate.
    pub fn intervals(&self, range: FrameRange) -> Vec<V1Record> {
        let mut intervals = Vec::with_capacity(self.records.len() * 2 + 1);
        // First frame not yet covered; None once range.end is covered.
        let mut next = Some(range.start);

        for record in &self.records {
            let Some(cursor) = next else { break };
            if record.end < cursor {
                continue;
            }
            if record.start > range.end {
                break;
            }

            let start = record.start.max(cursor);
            let end = record.end.min(range.end);
            if start > cursor {
                let kind = if intervals.is_empty() { Fill::Leading } else { Fill::Gap };
                intervals.push(self.fill(kind, cursor, start - 1));
            }
            intervals.push(V1Record {
                start,
                end,
                fps: record.fps,
            });
            next = if end == range.end { None } else { Some(end + 1) };
        }

        if let Some(cursor) = next {
            let kind = if intervals.is_empty() { Fill::Leading } else { Fill::Trailing };
            intervals.push(self.fill(kind, cursor, range.end));
        }

        intervals
    }

    fn fill(&self, kind: Fill, start: u64, end: u64) -> V1Record {
        debug!(
            "{:?} frames {}-{} use the default rate {}",
            kind, start, end, self.default_fps
        );
        V1Record {
            start,
            end,
            fps: self.default_fps,
        }
    }

    /// Convert `range` to frame boundaries starting at `offset` ms.
    ///
    /// The result holds `range.frame_count() + 1` values. Ranges longer than
    /// [`MAX_FRAMES`](super::MAX_FRAMES) are a range error.
    pub fn to_timestamps(&self, range: FrameRange, offset: f64) -> TrimcodeResult<Timestamps> {
        check_frame_count(range.frame_count(), &format!("frames {}-{}", range.start, range.end))?;
        let mut values = Vec::with_capacity(range.frame_count() as usize + 1);
        values.push(offset);

        let mut base = offset;
        for interval in self.intervals(range) {
            let step = interval.fps.frame_duration_ms();
            for i in 1..=interval.frame_count() {
                values.push(base + step * i as f64);
            }
            base = values[values.len() - 1];
        }

        Ok(Timestamps::new(values))
    }

    /// Boundaries from frame 0 through the last record, then extended at the
    /// last record's rate until the final boundary reaches `end_ms`.
    pub fn to_timestamps_until(&self, end_ms: f64) -> TrimcodeResult<Timestamps> {
        let mut timestamps = match self.last_frame() {
            Some(end) => self.to_timestamps(FrameRange { start: 0, end }, 0.0)?,
            None => Timestamps::new(vec![0.0]),
        };

        let fps = self
            .records
            .last()
            .map(|record| record.fps)
            .unwrap_or(self.default_fps);
        let step = fps.frame_duration_ms();
        let base = timestamps.last().unwrap_or(0.0);

        if !end_ms.is_finite() {
            return Err(TrimcodeError::range(format!("{} ms is not a usable time", end_ms)));
        }
        let missing = ((end_ms - base) / step).ceil().max(0.0);
        check_frame_count(
            timestamps.frame_count() as u64 + missing as u64,
            &format!("the timecode up to {:.3} ms", end_ms),
        )?;

        let mut i = 1u64;
        while timestamps.last().unwrap_or(0.0) < end_ms {
            timestamps.push(base + step * i as f64);
            i += 1;
        }

        Ok(timestamps)
    }

    /// Serialize as a v1 timecode file
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "{}\nassume {}\n",
            V1_HEADER,
            format_significant(self.default_fps.fps(), 12)
        );
        for record in &self.records {
            text.push_str(&format!(
                "{},{},{}\n",
                record.start,
                record.end,
                format_significant(record.fps.fps(), 12)
            ));
        }
        text
    }
}
