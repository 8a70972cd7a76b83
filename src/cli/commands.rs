//! Command implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use crate::chapters::{
    chapters_for_trims, keyframes_for_chapters, parse_chapter_starts, qpfile as qpfile_text,
    trims_from_chapters, write_chapters, FrameClock,
};
use crate::cli::args::{
    BookmarksArgs, ChapterSourceArgs, ChapterTrimsArgs, ChaptersArgs, ClockArgs, ConvertArgs,
    CreateArgs, CutArgs, QpfileArgs, TrimSelectionArgs, TrimsArgs,
};
use crate::config::Preferences;
use crate::domain::model::{FrameRange, FrameRate, TrimRange};
use crate::timecode::{build_timecode, cut_timecode, SegmentRate, Timecode};
use crate::trims::{find_trim_line, format_trim_line, join_contiguous, trims_from_bookmarks, TrimLine};
use crate::utils::path::{find_sibling, with_suffix};

/// Execute the convert command
pub fn convert(args: ConvertArgs, prefs: &Preferences) -> Result<()> {
    let fallback = args.default_fps.unwrap_or(prefs.default_fps);
    let timecode = Timecode::read(&args.input, fallback)
        .with_context(|| format!("Failed to read timecode {}", args.input.display()))?;

    let Timecode::V1(v1) = timecode else {
        bail!("{} is already a v2 timecode", args.input.display());
    };

    let Some(end) = args.end.or_else(|| v1.last_frame()) else {
        bail!("{} has no records, pass --end", args.input.display());
    };
    let range = FrameRange::new(args.start, end)?;
    info!(
        "Converting frames {}-{} at offset {} ms (default {} fps)",
        range.start, range.end, args.offset, v1.default_fps
    );

    let timestamps = v1.to_timestamps(range, args.offset)?;
    write_output(&timestamps.to_v2_text(), args.output.as_deref().unwrap_or(Path::new("-")))
}

/// Execute the trims command
pub fn trims(args: TrimsArgs, prefs: &mut Preferences) -> Result<()> {
    let mut line = select_trims(&args.selection, prefs)?;
    if args.join {
        line.trims = join_contiguous(&line.trims);
    }

    if args.json {
        let json = serde_json::to_string_pretty(&line).context("Failed to serialize trims to JSON")?;
        println!("{}", json);
    } else {
        println!("{}", format_trim_line(&line.trims));
    }
    Ok(())
}

/// Execute the cut command
pub fn cut(args: CutArgs, prefs: &mut Preferences) -> Result<()> {
    let script = args.selection.script.clone();
    let line = select_trims(&args.selection, prefs)?;
    let trims = join_contiguous(&line.trims);

    let timecode_path = match args.timecode {
        Some(path) => path,
        None => find_sibling(&script, &prefs.timecode_suffixes)
            .ok_or_else(|| anyhow!("No timecode found next to {}, pass --timecode", script.display()))?,
    };
    info!("Input timecode: {}", timecode_path.display());

    let fallback = args.default_fps.unwrap_or(prefs.default_fps);
    let timecode = Timecode::read(&timecode_path, fallback)
        .with_context(|| format!("Failed to read timecode {}", timecode_path.display()))?;
    let timestamps = timecode.to_timestamps(trims.last().map(|trim| trim.end))?;

    let cut = cut_timecode(&timestamps, &trims).context("Failed to cut timecode")?;
    info!(
        "Kept {} of {} frames in {} trims",
        cut.frame_count(),
        timestamps.frame_count(),
        trims.len()
    );

    let output = args
        .output
        .unwrap_or_else(|| with_suffix(&script, ".otc.txt"));
    write_output(&cut.to_v2_text(), &output)
}

/// Execute the create command
pub fn create(args: CreateArgs, prefs: &mut Preferences) -> Result<()> {
    let line = select_trims(&args.selection, prefs)?;
    let rates = segment_rates(&args.fps, &args.itc, &line.trims, prefs.default_fps)?;

    let timecode = build_timecode(&line.trims, &rates, args.default_fps)
        .context("Failed to create timecode")?;

    let output = args
        .output
        .unwrap_or_else(|| with_suffix(&args.selection.script, ".tc.txt"));
    write_output(&timecode.to_text(), &output)
}

/// Execute the qpfile command
pub fn qpfile(args: QpfileArgs, prefs: &Preferences) -> Result<()> {
    let chapters = chapter_file(&args.source, prefs)?;
    let starts = read_chapter_starts(&chapters)?;
    let last_ms = starts.last().copied().unwrap_or(0.0);
    let clock = chapter_clock(&args.clock, prefs, last_ms)?;

    let frames = keyframes_for_chapters(&starts, &clock)?;
    info!("Forcing {} keyframes", frames.len());

    let output = args.output.unwrap_or_else(|| {
        with_suffix(args.source.script.as_deref().unwrap_or(&chapters), ".qpf")
    });
    write_output(&qpfile_text(&frames), &output)
}

/// Execute the chapter-trims command
pub fn chapter_trims(args: ChapterTrimsArgs, prefs: &Preferences) -> Result<()> {
    let chapters = chapter_file(&args.source, prefs)?;
    let starts = read_chapter_starts(&chapters)?;
    if starts.is_empty() {
        bail!("No chapters in {}", chapters.display());
    }
    let last_ms = starts.last().copied().unwrap_or(0.0);
    let clock = chapter_clock(&args.clock, prefs, last_ms)?;

    let frames = starts
        .iter()
        .map(|&ms| clock.frame_at(ms))
        .collect::<Result<Vec<u64>, _>>()?;
    let trims = trims_from_chapters(&frames, args.frame_count)?;

    println!("{}", format_trim_line(&trims));
    Ok(())
}

/// Execute the chapters command
pub fn chapters(args: ChaptersArgs, prefs: &mut Preferences) -> Result<()> {
    let line = select_trims(&args.selection, prefs)?;

    let clock = match &args.clock.timecode {
        Some(path) => {
            let timecode = Timecode::read(path, prefs.default_fps)
                .with_context(|| format!("Failed to read timecode {}", path.display()))?;
            let timestamps = timecode.to_timestamps(line.trims.last().map(|trim| trim.end))?;
            FrameClock::Timecode(cut_timecode(&timestamps, &line.trims)?)
        }
        None => FrameClock::Constant(args.clock.fps.unwrap_or(prefs.default_fps)),
    };

    let entries = chapters_for_trims(&line.trims, &clock, &args.names)?;
    let xml = write_chapters(&entries, &args.language)?;

    let output = args
        .output
        .unwrap_or_else(|| with_suffix(&args.selection.script, ".chapters.xml"));
    write_output(&xml, &output)
}

/// Execute the bookmarks command
pub fn bookmarks(args: BookmarksArgs) -> Result<()> {
    let result = trims_from_bookmarks(&args.frames);
    if let Some(frame) = result.unpaired {
        warn!("Ignoring unpaired bookmark at frame {}", frame);
    }
    if result.trims.is_empty() {
        bail!("At least two bookmarks are needed");
    }

    println!("{}", format_trim_line(&result.trims));
    Ok(())
}

/// Find the trims line of a script and remember how it was chosen
fn select_trims(selection: &TrimSelectionArgs, prefs: &mut Preferences) -> Result<TrimLine> {
    let bytes = fs::read(&selection.script)
        .with_context(|| format!("Failed to read script {}", selection.script.display()))?;
    let text = String::from_utf8_lossy(&bytes);

    let selector = selection.selector(&prefs.trims);
    let line = find_trim_line(&text, &selector)
        .with_context(|| format!("Failed to find trims in {}", selection.script.display()))?;
    info!(
        "Using {} trims from line {}",
        line.trims.len(),
        line.line_number
    );

    prefs.trims.remember(&selector);
    Ok(line)
}

/// One rate per `;`-separated entry; `itc` reads the next input timecode.
///
/// A v1 input timecode is expanded to cover the whole trim it is paired
/// with, frames past its last record playing at its `assume` rate.
fn segment_rates(
    list: &str,
    itc: &[PathBuf],
    trims: &[TrimRange],
    fallback: FrameRate,
) -> Result<Vec<SegmentRate>> {
    let mut itc = itc.iter();
    list.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .enumerate()
        .map(|(i, entry)| -> Result<SegmentRate> {
            if entry.eq_ignore_ascii_case("itc") {
                let path = itc
                    .next()
                    .ok_or_else(|| anyhow!("More `itc` entries than --itc files"))?;
                let timestamps = Timecode::read(path, fallback)
                    .and_then(|timecode| {
                        timecode.to_timestamps(trims.get(i).map(|trim| trim.frame_count() - 1))
                    })
                    .with_context(|| format!("Failed to read input timecode {}", path.display()))?;
                Ok(SegmentRate::Timecode(timestamps))
            } else {
                Ok(SegmentRate::Fps(FrameRate::parse(entry)?))
            }
        })
        .collect()
}

/// The chapter file given on the command line, else the first one found next
/// to the script
fn chapter_file(source: &ChapterSourceArgs, prefs: &Preferences) -> Result<PathBuf> {
    if let Some(path) = &source.chapters {
        return Ok(path.clone());
    }
    let Some(script) = &source.script else {
        bail!("Pass --chapters or --script");
    };
    let path = find_sibling(script, &prefs.chapter_suffixes)
        .ok_or_else(|| anyhow!("No chapter file found next to {}, pass --chapters", script.display()))?;
    info!("Chapter file: {}", path.display());
    Ok(path)
}

fn read_chapter_starts(path: &Path) -> Result<Vec<f64>> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read chapter file {}", path.display()))?;
    parse_chapter_starts(&xml).with_context(|| format!("Failed to parse chapter file {}", path.display()))
}

/// Clock of the whole video; a v1 timecode is expanded to cover `until_ms`
fn chapter_clock(args: &ClockArgs, prefs: &Preferences, until_ms: f64) -> Result<FrameClock> {
    let Some(path) = &args.timecode else {
        return Ok(FrameClock::Constant(args.fps.unwrap_or(prefs.default_fps)));
    };

    let timecode = Timecode::read(path, prefs.default_fps)
        .with_context(|| format!("Failed to read timecode {}", path.display()))?;
    Ok(match timecode {
        Timecode::V1(v1) => FrameClock::Timecode(v1.to_timestamps_until(until_ms)?),
        Timecode::V2(timestamps) => FrameClock::Timecode(timestamps),
    })
}

/// Write to `path`, or to stdout when it is `-`
fn write_output(text: &str, path: &Path) -> Result<()> {
    if path == Path::new("-") {
        print!("{}", text);
        return Ok(());
    }
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}
