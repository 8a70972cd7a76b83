//! Trim lists: merging, validation and script formatting

use serde::Serialize;

use crate::domain::model::{FrameRange, TrimRange};
use crate::error::{TrimcodeError, TrimcodeResult};

pub mod parser;

pub use parser::{find_trim_line, scan_line, ScanOrder, TrimLine, TrimSelector};

/// Merge trims where one starts right after the previous one ends
pub fn join_contiguous(trims: &[TrimRange]) -> Vec<TrimRange> {
    let mut joined: Vec<TrimRange> = Vec::with_capacity(trims.len());
    for trim in trims {
        match joined.last_mut() {
            Some(previous) if previous.end.checked_add(1) == Some(trim.start) => {
                previous.end = trim.end;
            }
            _ => joined.push(*trim),
        }
    }
    joined
}

/// Check that trims are ascending and do not overlap
pub fn ensure_ordered(trims: &[TrimRange]) -> TrimcodeResult<()> {
    for pair in trims.windows(2) {
        if pair[1].start <= pair[0].end {
            return Err(TrimcodeError::range(format!(
                "{} overlaps or precedes {}",
                pair[1], pair[0]
            )));
        }
    }
    Ok(())
}

/// Render trims as a single script line, `Trim(0,99)++Trim(200,299)`
pub fn format_trim_line(trims: &[TrimRange]) -> String {
    trims
        .iter()
        .map(|trim| trim.to_string())
        .collect::<Vec<_>>()
        .join("++")
}

/// Trims built from pairs of bookmarked frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkTrims {
    pub trims: Vec<TrimRange>,
    /// Last bookmark when the count is odd
    pub unpaired: Option<u64>,
}

/// Pair sorted bookmarks into trims: `[a, b, c, d]` → `Trim(a,b)++Trim(c,d)`
pub fn trims_from_bookmarks(frames: &[u64]) -> BookmarkTrims {
    let mut sorted = frames.to_vec();
    sorted.sort_unstable();

    let trims = sorted
        .chunks_exact(2)
        .map(|pair| FrameRange {
            start: pair[0],
            end: pair[1],
        })
        .collect();
    let unpaired = if sorted.len() % 2 == 1 {
        sorted.last().copied()
    } else {
        None
    };

    BookmarkTrims { trims, unpaired }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(start: u64, end: u64) -> TrimRange {
        FrameRange::new(start, end).unwrap()
    }

    #[test]
    fn test_join_contiguous() {
        let joined = join_contiguous(&[trim(0, 9), trim(10, 19), trim(30, 39), trim(40, 49), trim(60, 69)]);
        assert_eq!(joined, vec![trim(0, 19), trim(30, 49), trim(60, 69)]);
    }

    #[test]
    fn test_join_contiguous_keeps_separate_trims() {
        let trims = vec![trim(0, 9), trim(11, 19)];
        assert_eq!(join_contiguous(&trims), trims);
        assert!(join_contiguous(&[]).is_empty());
    }

    #[test]
    fn test_ensure_ordered() {
        assert!(ensure_ordered(&[trim(0, 9), trim(10, 19)]).is_ok());
        assert!(ensure_ordered(&[trim(0, 9), trim(9, 19)]).is_err());
        assert!(ensure_ordered(&[trim(10, 19), trim(0, 9)]).is_err());
    }

    #[test]
    fn test_format_trim_line() {
        assert_eq!(
            format_trim_line(&[trim(0, 99), trim(200, 299)]),
            "Trim(0,99)++Trim(200,299)"
        );
    }

    #[test]
    fn test_trims_from_bookmarks_sorts_and_pairs() {
        let result = trims_from_bookmarks(&[300, 0, 200, 99]);
        assert_eq!(result.trims, vec![trim(0, 99), trim(200, 300)]);
        assert_eq!(result.unpaired, None);
    }

    #[test]
    fn test_trims_from_bookmarks_odd_count() {
        let result = trims_from_bookmarks(&[10, 20, 30]);
        assert_eq!(result.trims, vec![trim(10, 20)]);
        assert_eq!(result.unpaired, Some(30));
    }
}
