//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::config::TrimPreferences;
use crate::domain::model::FrameRate;
use crate::trims::{ScanOrder, TrimSelector};

fn line_number(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 1, usize::MAX)
}

/// How the trims line is picked from a script
#[derive(Args, Debug, Clone)]
pub struct TrimSelectionArgs {
    /// Avisynth script containing the trims
    #[arg(short, long)]
    pub script: PathBuf,

    /// Search the script from the bottom up
    #[arg(long)]
    pub reverse: bool,

    /// Only use a trims line carrying this `# label` comment
    #[arg(long, conflicts_with = "line")]
    pub label: Option<String>,

    /// Use the trims on this line (1-based)
    #[arg(long, value_parser = line_number)]
    pub line: Option<usize>,
}

impl TrimSelectionArgs {
    /// Selector for this run; anything given on the command line replaces the
    /// saved preference.
    pub fn selector(&self, prefs: &TrimPreferences) -> TrimSelector {
        if let Some(line) = self.line {
            return TrimSelector::Line(line);
        }
        if !self.reverse && self.label.is_none() {
            return prefs.selector();
        }
        TrimSelector::Scan {
            order: if self.reverse {
                ScanOrder::BottomUp
            } else {
                prefs.order
            },
            label: self
                .label
                .clone()
                .or_else(|| prefs.label.clone())
                .filter(|label| !label.trim().is_empty()),
        }
    }
}

/// Arguments for the convert command
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Timecode v1 file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file, `-` for stdout (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// First frame to convert
    #[arg(long, default_value_t = 0)]
    pub start: u64,

    /// Last frame to convert (default: end of the last record)
    #[arg(long)]
    pub end: Option<u64>,

    /// Time of the first boundary in ms
    #[arg(long, default_value_t = 0.0)]
    pub offset: f64,

    /// Rate of frames outside the records when the file has no `assume` line
    #[arg(long)]
    pub default_fps: Option<FrameRate>,
}

/// Arguments for the trims command
#[derive(Args, Debug)]
pub struct TrimsArgs {
    #[command(flatten)]
    pub selection: TrimSelectionArgs,

    /// Merge contiguous trims before printing
    #[arg(long)]
    pub join: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    #[command(flatten)]
    pub selection: TrimSelectionArgs,

    /// Input timecode, v1 or v2 (default: found next to the script)
    #[arg(short, long)]
    pub timecode: Option<PathBuf>,

    /// Output file, `-` for stdout (default: `<script>.otc.txt`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rate of frames outside v1 records when the file has no `assume` line
    #[arg(long)]
    pub default_fps: Option<FrameRate>,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub selection: TrimSelectionArgs,

    /// One rate per trim separated by `;`; `itc` takes the next `--itc` file
    #[arg(long)]
    pub fps: String,

    /// Input timecodes consumed by `itc` entries, in order
    #[arg(long)]
    pub itc: Vec<PathBuf>,

    /// Keep the frames between trims at this rate
    #[arg(long)]
    pub default_fps: Option<FrameRate>,

    /// Output file, `-` for stdout (default: `<script>.tc.txt`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Frame timing source for chapter conversions
#[derive(Args, Debug, Clone)]
pub struct ClockArgs {
    /// Constant frame rate of the video
    #[arg(long, conflicts_with = "timecode")]
    pub fps: Option<FrameRate>,

    /// Timecode of the video, v1 or v2
    #[arg(short, long)]
    pub timecode: Option<PathBuf>,
}

/// Where the chapter file comes from
#[derive(Args, Debug, Clone)]
pub struct ChapterSourceArgs {
    /// Matroska chapter file (default: found next to the script)
    #[arg(short, long, required_unless_present = "script")]
    pub chapters: Option<PathBuf>,

    /// Script whose sibling chapter file is used
    #[arg(short, long)]
    pub script: Option<PathBuf>,
}

/// Arguments for the qpfile command
#[derive(Args, Debug)]
pub struct QpfileArgs {
    #[command(flatten)]
    pub source: ChapterSourceArgs,

    #[command(flatten)]
    pub clock: ClockArgs,

    /// Output file, `-` for stdout (default: script, else chapter file, with `.qpf`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the chapter-trims command
#[derive(Args, Debug)]
pub struct ChapterTrimsArgs {
    #[command(flatten)]
    pub source: ChapterSourceArgs,

    #[command(flatten)]
    pub clock: ClockArgs,

    /// Number of frames in the video
    #[arg(long)]
    pub frame_count: u64,
}

/// Arguments for the chapters command
#[derive(Args, Debug)]
pub struct ChaptersArgs {
    #[command(flatten)]
    pub selection: TrimSelectionArgs,

    #[command(flatten)]
    pub clock: ClockArgs,

    /// Chapter names, in trim order
    #[arg(long = "name")]
    pub names: Vec<String>,

    /// Chapter language code
    #[arg(long, default_value = "eng")]
    pub language: String,

    /// Output file, `-` for stdout (default: `<script>.chapters.xml`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the bookmarks command
#[derive(Args, Debug)]
pub struct BookmarksArgs {
    /// Bookmarked frames, in any order
    #[arg(required = true, value_delimiter = ',')]
    pub frames: Vec<u64>,
}
