//! Locate the `Trim()` line of a script
//!
//! A trims line is any line whose code part (everything before the first
//! `#`) calls `Trim(<start>,<end>)` at least once, e.g.
//!
//! ```text
//! Trim(0,99)++Trim(200,-100)  # tc
//! ```
//!
//! The keyword is case-insensitive and whitespace is allowed around the
//! parentheses and arguments. Anything else on the line (`++`, `+`, a
//! `clip.` prefix) is ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::model::{FrameRange, TrimRange};
use crate::error::{NotFoundKind, TrimcodeError, TrimcodeResult};

/// Direction in which the script is scanned for a trims line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanOrder {
    #[default]
    TopDown,
    BottomUp,
}

/// How the trims line is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrimSelector {
    /// First line with trims in scan order, optionally one carrying a
    /// `# label` comment
    Scan {
        order: ScanOrder,
        label: Option<String>,
    },
    /// Explicit 1-based line number
    Line(usize),
}

impl Default for TrimSelector {
    fn default() -> Self {
        TrimSelector::Scan {
            order: ScanOrder::TopDown,
            label: None,
        }
    }
}

impl TrimSelector {
    fn not_found(&self) -> TrimcodeError {
        let kind = match self {
            TrimSelector::Scan { label: Some(label), .. } => NotFoundKind::Label(label.clone()),
            TrimSelector::Scan { label: None, .. } => NotFoundKind::NoTrims,
            TrimSelector::Line(line) => NotFoundKind::Line(*line),
        };
        TrimcodeError::NotFound(kind)
    }
}

/// The selected line and its trims, left to right
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrimLine {
    pub line_number: usize,
    pub trims: Vec<TrimRange>,
}

/// A syntactic `Trim(a,b)` call before its arguments are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RawTrim<'a> {
    start: &'a str,
    end: &'a str,
}

impl RawTrim<'_> {
    fn resolve(&self) -> TrimcodeResult<TrimRange> {
        let raw = || format!("Trim({},{})", self.start, self.end);
        let start: u64 = self
            .start
            .parse()
            .map_err(|_| TrimcodeError::format("trim", &raw()))?;
        let end: i64 = self
            .end
            .parse()
            .map_err(|_| TrimcodeError::format("trim", &raw()))?;
        FrameRange::from_trim_args(start, end)
    }
}

/// Byte cursor over the code part of a line
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self { text, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        self.skip_whitespace();
        if self.peek() == Some(byte) {
            self.pos += 1;
            Some(())
        } else {
            None
        }
    }

    fn integer(&mut self, signed: bool) -> Option<&'a str> {
        self.skip_whitespace();
        let begin = self.pos;
        if signed && self.peek() == Some(b'-') {
            self.pos += 1;
        }
        let digits = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == digits {
            return None;
        }
        Some(&self.text[begin..self.pos])
    }

    /// `( <uint> , <int> )` after the keyword
    fn call_arguments(&mut self) -> Option<RawTrim<'a>> {
        self.expect(b'(')?;
        let start = self.integer(false)?;
        self.expect(b',')?;
        let end = self.integer(true)?;
        self.expect(b')')?;
        Some(RawTrim { start, end })
    }
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Position of the next `trim` keyword that starts a word
fn find_keyword(code: &str, from: usize) -> Option<usize> {
    const KEYWORD: &[u8] = b"trim";
    let bytes = code.as_bytes();
    if bytes.len() < KEYWORD.len() {
        return None;
    }
    (from..=bytes.len() - KEYWORD.len()).find(|&i| {
        bytes[i..i + KEYWORD.len()].eq_ignore_ascii_case(KEYWORD)
            && (i == 0 || !is_word_byte(bytes[i - 1]))
    })
}

fn code_part(line: &str) -> &str {
    line.split('#').next().unwrap_or_default()
}

fn raw_trims(line: &str) -> Vec<RawTrim<'_>> {
    let code = code_part(line);
    let mut trims = Vec::new();
    let mut from = 0;

    while let Some(at) = find_keyword(code, from) {
        let mut scanner = Scanner::new(code, at + 4);
        match scanner.call_arguments() {
            Some(raw) => {
                trims.push(raw);
                from = scanner.pos;
            }
            None => from = at + 4,
        }
    }
    trims
}

/// Whether a comment on the line starts with `label` (case-insensitive)
fn has_label(line: &str, label: &str) -> bool {
    let label = label.to_lowercase();
    line.split('#')
        .skip(1)
        .any(|comment| comment.trim_start().to_lowercase().starts_with(&label))
}

/// Resolve every trim on a single line, left to right
pub fn scan_line(line: &str) -> TrimcodeResult<Vec<TrimRange>> {
    raw_trims(line).iter().map(RawTrim::resolve).collect()
}

/// Find the trims line selected by `selector`
pub fn find_trim_line(text: &str, selector: &TrimSelector) -> TrimcodeResult<TrimLine> {
    let lines: Vec<&str> = text.lines().collect();

    let candidate = match selector {
        TrimSelector::Line(number) => number
            .checked_sub(1)
            .and_then(|index| lines.get(index))
            .filter(|line| !raw_trims(line).is_empty())
            .map(|line| (*number, *line)),
        TrimSelector::Scan { order, label } => {
            let matches = |line: &str| {
                !raw_trims(line).is_empty()
                    && label.as_deref().map_or(true, |label| has_label(line, label))
            };
            let found = match order {
                ScanOrder::TopDown => lines.iter().position(|line| matches(*line)),
                ScanOrder::BottomUp => lines.iter().rposition(|line| matches(*line)),
            };
            found.map(|index| (index + 1, lines[index]))
        }
    };

    let (line_number, line) = candidate.ok_or_else(|| selector.not_found())?;
    let trims = scan_line(line)?;
    debug!("Line {}: {} trims", line_number, trims.len());

    Ok(TrimLine { line_number, trims })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trim(start: u64, end: u64) -> TrimRange {
        FrameRange::new(start, end).unwrap()
    }

    const SCRIPT: &str = "\
LoadPlugin(\"ffms2.dll\")
FFVideoSource(\"video.mkv\")
#Trim(0,10)
Trim(0,99)++Trim(200,299)  # tc
trim( 400 , -100 ) + Trim(600,699) # chapters
";

    #[test]
    fn test_scan_line_left_to_right() {
        assert_eq!(
            scan_line("Trim(0,99)++Trim(200,299)").unwrap(),
            vec![trim(0, 99), trim(200, 299)]
        );
    }

    #[test]
    fn test_scan_line_negative_end() {
        assert_eq!(scan_line("Trim(100,-50)").unwrap(), vec![trim(100, 149)]);
    }

    #[test]
    fn test_scan_line_whitespace_and_case() {
        assert_eq!(
            scan_line("v.TRIM  ( 5 ,\t9 )").unwrap(),
            vec![trim(5, 9)]
        );
    }

    #[test]
    fn test_scan_line_ignores_comments_and_other_words() {
        assert!(scan_line("# Trim(0,10)").unwrap().is_empty());
        assert!(scan_line("MyTrim(0,10)").unwrap().is_empty());
        assert!(scan_line("Trimmed(0,10)").unwrap().is_empty());
        assert!(scan_line("Trim(a,b)").unwrap().is_empty());
        assert_eq!(
            scan_line("Trim(0,10) # Trim(20,30)").unwrap(),
            vec![trim(0, 10)]
        );
    }

    #[test]
    fn test_scan_line_open_ended_trim_is_format_error() {
        assert!(matches!(
            scan_line("Trim(10,0)"),
            Err(TrimcodeError::Format { .. })
        ));
    }

    #[test]
    fn test_find_top_down() {
        let line = find_trim_line(SCRIPT, &TrimSelector::default()).unwrap();
        assert_eq!(line.line_number, 4);
        assert_eq!(line.trims, vec![trim(0, 99), trim(200, 299)]);
    }

    #[test]
    fn test_find_bottom_up() {
        let selector = TrimSelector::Scan {
            order: ScanOrder::BottomUp,
            label: None,
        };
        let line = find_trim_line(SCRIPT, &selector).unwrap();
        assert_eq!(line.line_number, 5);
        assert_eq!(line.trims, vec![trim(400, 499), trim(600, 699)]);
    }

    #[test]
    fn test_find_by_label() {
        let selector = TrimSelector::Scan {
            order: ScanOrder::TopDown,
            label: Some("Chapters".to_string()),
        };
        let line = find_trim_line(SCRIPT, &selector).unwrap();
        assert_eq!(line.line_number, 5);
    }

    #[test]
    fn test_find_by_line_number() {
        let line = find_trim_line(SCRIPT, &TrimSelector::Line(4)).unwrap();
        assert_eq!(line.trims.len(), 2);
    }

    #[test]
    fn test_not_found_kinds() {
        let plain = "FFVideoSource(\"video.mkv\")\n";
        assert!(matches!(
            find_trim_line(plain, &TrimSelector::default()),
            Err(TrimcodeError::NotFound(NotFoundKind::NoTrims))
        ));

        let selector = TrimSelector::Scan {
            order: ScanOrder::TopDown,
            label: Some("audio".to_string()),
        };
        match find_trim_line(SCRIPT, &selector) {
            Err(TrimcodeError::NotFound(NotFoundKind::Label(label))) => assert_eq!(label, "audio"),
            other => panic!("expected label not found, got {:?}", other),
        }

        assert!(matches!(
            find_trim_line(SCRIPT, &TrimSelector::Line(3)),
            Err(TrimcodeError::NotFound(NotFoundKind::Line(3)))
        ));
        assert!(matches!(
            find_trim_line(SCRIPT, &TrimSelector::Line(40)),
            Err(TrimcodeError::NotFound(NotFoundKind::Line(40)))
        ));
        assert!(matches!(
            find_trim_line(SCRIPT, &TrimSelector::Line(0)),
            Err(TrimcodeError::NotFound(NotFoundKind::Line(0)))
        ));
    }
}
