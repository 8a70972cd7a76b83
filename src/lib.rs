//! trimcode library
//!
//! Timecode v1/v2 handling for Avisynth workflows: converting v1 timecodes to
//! v2, cutting a timecode by the `Trim()` calls of a script, creating
//! timecodes per trim, and mapping Matroska chapters to frames.

pub mod chapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod timecode;
pub mod trims;
pub mod utils;

// Re-export commonly used types
pub use config::Preferences;
pub use domain::model::{FrameRange, FrameRate, TrimRange};
pub use error::{NotFoundKind, TrimcodeError, TrimcodeResult};
pub use timecode::{cut_timecode, Timecode, TimecodeV1, Timestamps};
pub use trims::{find_trim_line, TrimLine, TrimSelector};
