//! Create or join a timecode from a trims line
//!
//! Each trim gets its own rate: either a constant frame rate or an existing
//! timecode (for sections that are already VFR). Optionally the frames
//! outside the trims play at a default rate and are kept in the output.

use tracing::{debug, info};

use crate::domain::model::{FrameRange, FrameRate, TrimRange};
use crate::error::{NotFoundKind, TrimcodeError, TrimcodeResult};
use crate::trims::ensure_ordered;

use super::{check_frame_count, Timecode, TimecodeV1, Timestamps, V1Record};

/// Rate source for one trim
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentRate {
    /// Constant frame rate
    Fps(FrameRate),
    /// Boundaries of an input timecode, used relative to its first value
    Timecode(Timestamps),
}

/// Build a timecode for `trims`.
///
/// `rates` must hold one entry per trim. With `default_fps` the output spans
/// frame 0 through the last trim and the untrimmed frames use that rate;
/// without it only the trimmed frames are kept, back to back.
///
/// The result is v2 when any segment comes from a timecode, v1 otherwise.
pub fn build_timecode(
    trims: &[TrimRange],
    rates: &[SegmentRate],
    default_fps: Option<FrameRate>,
) -> TrimcodeResult<Timecode> {
    if rates.len() != trims.len() {
        return Err(TrimcodeError::format(
            "frame rate list",
            &format!("{} rates for {} trims", rates.len(), trims.len()),
        ));
    }
    if trims.is_empty() {
        return Err(TrimcodeError::NotFound(NotFoundKind::NoTrims));
    }
    ensure_ordered(trims)?;

    let segments: Vec<(TrimRange, SegmentRate)> =
        trims.iter().copied().zip(rates.iter().cloned()).collect();

    if segments
        .iter()
        .any(|(_, rate)| matches!(rate, SegmentRate::Timecode(_)))
    {
        let segments = match default_fps {
            Some(fps) => fill_gaps(segments, fps),
            None => segments,
        };
        info!("Building v2 timecode from {} segments", segments.len());
        join_v2(&segments).map(Timecode::V2)
    } else {
        let constant: Vec<(TrimRange, FrameRate)> = segments
            .iter()
            .filter_map(|(trim, rate)| match rate {
                SegmentRate::Fps(fps) => Some((*trim, *fps)),
                SegmentRate::Timecode(_) => None,
            })
            .collect();
        info!("Building v1 timecode from {} trims", constant.len());
        build_v1(&constant, default_fps).map(Timecode::V1)
    }
}

/// Insert default-rate segments before and between trims
fn fill_gaps(segments: Vec<(TrimRange, SegmentRate)>, fps: FrameRate) -> Vec<(TrimRange, SegmentRate)> {
    let mut filled = Vec::with_capacity(segments.len() * 2);
    let mut next = 0u64;
    for (trim, rate) in segments {
        if trim.start > next {
            debug!("Frames {}-{} use the default rate {}", next, trim.start - 1, fps);
            filled.push((
                FrameRange {
                    start: next,
                    end: trim.start - 1,
                },
                SegmentRate::Fps(fps),
            ));
        }
        next = trim.end + 1;
        filled.push((trim, rate));
    }
    filled
}

fn join_v2(segments: &[(TrimRange, SegmentRate)]) -> TrimcodeResult<Timestamps> {
    let total = segments
        .iter()
        .try_fold(0u64, |total, (range, _)| total.checked_add(range.frame_count()))
        .unwrap_or(u64::MAX);
    check_frame_count(total, &"the joined timecode")?;
    let mut output = Timestamps::new(Vec::with_capacity(total as usize + 1));
    output.push(0.0);

    for (range, rate) in segments {
        let frames = range.frame_count() as usize;
        let base = output.last().unwrap_or(0.0);
        match rate {
            SegmentRate::Fps(fps) => {
                let step = fps.frame_duration_ms();
                for j in 1..=frames {
                    output.push(base + step * j as f64);
                }
            }
            SegmentRate::Timecode(source) => {
                let mut source = source.clone();
                source.ensure_boundaries(frames + 1).map_err(|_| {
                    TrimcodeError::range(format!(
                        "the timecode for {} covers only {} frames",
                        range,
                        source.frame_count()
                    ))
                })?;
                let origin = source[0];
                for j in 1..=frames {
                    output.push(base + source[j] - origin);
                }
            }
        }
    }

    Ok(output)
}

fn build_v1(
    segments: &[(TrimRange, FrameRate)],
    default_fps: Option<FrameRate>,
) -> TrimcodeResult<TimecodeV1> {
    let mut records = Vec::with_capacity(segments.len());
    // Frames removed so far when only the trims are kept
    let mut shift = match default_fps {
        Some(_) => 0,
        None => segments.first().map(|(trim, _)| trim.start).unwrap_or(0),
    };
    let mut previous_end: Option<u64> = None;

    for (trim, fps) in segments {
        if default_fps.is_none() {
            if let Some(end) = previous_end {
                shift += trim.start - end - 1;
            }
        }
        records.push(V1Record {
            start: trim.start - shift,
            end: trim.end - shift,
            fps: *fps,
        });
        previous_end = Some(trim.end);
    }

    TimecodeV1::new(default_fps.unwrap_or_default(), records)
}
