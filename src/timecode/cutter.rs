//! Cut a timecode down to the frames kept by a list of trims

use tracing::{debug, info};

use crate::domain::model::TrimRange;
use crate::error::{NotFoundKind, TrimcodeError, TrimcodeResult};
use crate::trims::ensure_ordered;

use super::Timestamps;

/// Re-base `timestamps` onto the concatenation of `trims`.
///
/// The output starts at 0 and holds one boundary per kept frame plus the end
/// of the last kept frame. The time removed between two trims is subtracted
/// from every later boundary, so the result stays monotonic.
///
/// Trims must be ascending and non-overlapping. Contiguous trims may be
/// merged beforehand with [`crate::trims::join_contiguous`]; the result is
/// the same either way.
pub fn cut_timecode(timestamps: &Timestamps, trims: &[TrimRange]) -> TrimcodeResult<Timestamps> {
    if trims.is_empty() {
        return Err(TrimcodeError::NotFound(NotFoundKind::NoTrims));
    }
    ensure_ordered(trims)?;

    // The end of frame `end` is boundary `end + 1`; at most one boundary may
    // be extrapolated, so `end` must be below the number of known boundaries.
    if let Some(trim) = trims.iter().find(|trim| trim.end >= timestamps.len() as u64) {
        return Err(past_end(trim, timestamps));
    }

    let mut source = timestamps.clone();
    let kept: u64 = trims.iter().map(|trim| trim.frame_count()).sum();
    let mut output = Vec::with_capacity(kept as usize + 1);
    output.push(0.0);

    let mut prev_end = 0.0;
    for trim in trims {
        let first = trim.start as usize;
        let last = trim.end as usize + 1;
        source
            .ensure_boundaries(last + 1)
            .map_err(|_| past_end(trim, timestamps))?;

        let start_time = source[first];
        let end_time = source[last];
        let gap = start_time - prev_end;
        prev_end = end_time - gap;
        debug!("{}: shifting by {:.3} ms", trim, gap);

        output.extend(source.as_slice()[first + 1..=last].iter().map(|t| t - gap));
    }

    info!(
        "Cut timecode to {} frames from {} trims",
        kept,
        trims.len()
    );
    Ok(Timestamps::new(output))
}

fn past_end(trim: &TrimRange, timestamps: &Timestamps) -> TrimcodeError {
    TrimcodeError::range(format!(
        "{} ends past the timecode, which covers {} frames",
        trim,
        timestamps.frame_count()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::FrameRange;

    fn trim(start: u64, end: u64) -> TrimRange {
        FrameRange::new(start, end).unwrap()
    }

    #[test]
    fn test_cut_removes_gaps() {
        let ts = Timestamps::new(vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let cut = cut_timecode(&ts, &[trim(0, 1), trim(3, 4)]).unwrap();
        assert_eq!(cut.as_slice(), &[0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_cut_whole_timecode_is_identity() {
        let ts = Timestamps::new(vec![0.0, 41.708, 83.417, 125.125, 166.833]);
        let cut = cut_timecode(&ts, &[trim(0, 3)]).unwrap();
        assert_eq!(cut, ts);
    }

    #[test]
    fn test_cut_rebases_to_zero() {
        let ts = Timestamps::new(vec![0.0, 40.0, 80.0, 100.0, 120.0]);
        let cut = cut_timecode(&ts, &[trim(2, 3)]).unwrap();
        assert_eq!(cut.as_slice(), &[0.0, 20.0, 40.0]);
    }

    #[test]
    fn test_cut_keeps_variable_durations() {
        // 40 ms frames, then 20 ms frames
        let ts = Timestamps::new(vec![0.0, 40.0, 80.0, 100.0, 120.0, 140.0]);
        let cut = cut_timecode(&ts, &[trim(0, 0), trim(3, 4)]).unwrap();
        assert_eq!(cut.as_slice(), &[0.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_cut_extrapolates_missing_last_duration() {
        // four frame starts, end of the last frame unknown
        let ts = Timestamps::new(vec![0.0, 40.0, 80.0, 120.0]);
        let cut = cut_timecode(&ts, &[trim(2, 3)]).unwrap();
        assert_eq!(cut.as_slice(), &[0.0, 40.0, 80.0]);
    }

    #[test]
    fn test_cut_past_end_is_range_error() {
        let ts = Timestamps::new(vec![0.0, 40.0, 80.0]);
        assert!(matches!(
            cut_timecode(&ts, &[trim(0, 5)]),
            Err(TrimcodeError::Range { .. })
        ));
    }

    #[test]
    fn test_cut_huge_trim_is_range_error() {
        let ts = Timestamps::new(vec![0.0, 10.0, 20.0]);
        let trims = crate::trims::scan_line("Trim(0,-100000000000000)").unwrap();
        assert!(matches!(
            cut_timecode(&ts, &trims),
            Err(TrimcodeError::Range { .. })
        ));
    }

    #[test]
    fn test_cut_rejects_unordered_trims() {
        let ts = Timestamps::new(vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert!(matches!(
            cut_timecode(&ts, &[trim(2, 3), trim(0, 1)]),
            Err(TrimcodeError::Range { .. })
        ));
    }

    #[test]
    fn test_cut_without_trims() {
        let ts = Timestamps::new(vec![0.0, 10.0]);
        assert!(matches!(
            cut_timecode(&ts, &[]),
            Err(TrimcodeError::NotFound(NotFoundKind::NoTrims))
        ));
    }
}
