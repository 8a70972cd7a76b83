//! Error handling module for trimcode

use std::fmt;
use thiserror::Error;

/// Which lookup failed when no usable `Trim()` line was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundKind {
    /// The script has no line with uncommented trims
    NoTrims,
    /// No trims line carries the requested `# label` comment
    Label(String),
    /// The requested line has no trims (or does not exist)
    Line(usize),
}

impl fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundKind::NoTrims => write!(f, "No Trims found in the script"),
            NotFoundKind::Label(label) => write!(f, "No Trims found with label '{}'", label),
            NotFoundKind::Line(line) => write!(f, "No Trims found in the specified line: {}", line),
        }
    }
}

/// Main error type for trimcode operations
#[derive(Error, Debug)]
pub enum TrimcodeError {
    /// Malformed timecode, trim or chapter syntax
    #[error("Invalid {context}: '{content}'")]
    Format { context: String, content: String },

    /// Expected pattern absent
    #[error("{0}")]
    NotFound(NotFoundKind),

    /// Frame or timestamp index outside the known data
    #[error("Out of range: {message}")]
    Range { message: String },

    /// Frame rate that is not a positive number, fraction or known alias
    #[error("Invalid frame rate: '{value}'")]
    InvalidFrameRate { value: String },

    /// Chapter XML could not be read or written
    #[error("Chapter XML error: {message}")]
    Xml { message: String },

    /// Preferences file error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrimcodeError {
    pub(crate) fn format(context: &str, content: &str) -> Self {
        TrimcodeError::Format {
            context: context.to_string(),
            content: content.to_string(),
        }
    }

    pub(crate) fn range(message: impl Into<String>) -> Self {
        TrimcodeError::Range {
            message: message.into(),
        }
    }

    pub(crate) fn xml(e: impl fmt::Display) -> Self {
        TrimcodeError::Xml {
            message: e.to_string(),
        }
    }
}

/// Result type alias for trimcode operations
pub type TrimcodeResult<T> = std::result::Result<T, TrimcodeError>;
