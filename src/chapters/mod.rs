//! Matroska chapter files
//!
//! Reading chapter start times, mapping them to frames (for x264 QP files
//! and trim lines), and writing a chapter file for a trimmed video.

use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::model::{FrameRange, FrameRate, TrimRange};
use crate::error::{TrimcodeError, TrimcodeResult};
use crate::timecode::Timestamps;
use crate::utils::time::{format_chapter_time, parse_chapter_time};

const TIME_START: &[u8] = b"ChapterTimeStart";

/// Every `<ChapterTimeStart>` in the file, in ms, sorted and deduplicated
pub fn parse_chapter_starts(xml: &str) -> TrimcodeResult<Vec<f64>> {
    let mut reader = Reader::from_str(xml);
    let mut starts: Vec<f64> = Vec::new();
    let mut in_start = false;

    loop {
        match reader.read_event().map_err(TrimcodeError::xml)? {
            Event::Start(e) if e.name().as_ref() == TIME_START => in_start = true,
            Event::End(e) if e.name().as_ref() == TIME_START => in_start = false,
            Event::Text(text) if in_start => {
                let text = text.unescape().map_err(TrimcodeError::xml)?;
                if !text.trim().is_empty() {
                    starts.push(parse_chapter_time(&text)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    starts.sort_by(|a, b| a.total_cmp(b));
    starts.dedup();
    info!("Found {} chapter start times", starts.len());
    Ok(starts)
}

/// Maps between milliseconds and frame numbers
#[derive(Debug, Clone, PartialEq)]
pub enum FrameClock {
    /// Constant frame rate
    Constant(FrameRate),
    /// Frame boundaries of a (possibly variable rate) timecode
    Timecode(Timestamps),
}

impl FrameClock {
    /// Frame whose start is nearest to `ms`; ties go to the earlier frame
    pub fn frame_at(&self, ms: f64) -> TrimcodeResult<u64> {
        match self {
            FrameClock::Constant(fps) => Ok((ms.max(0.0) * fps.fps() / 1000.0).round() as u64),
            FrameClock::Timecode(timestamps) => {
                let values = timestamps.as_slice();
                let index = values.iter().position(|&t| t >= ms).ok_or_else(|| {
                    TrimcodeError::range(format!(
                        "{:.3} ms is past the end of the timecode ({:.3} ms)",
                        ms,
                        timestamps.last().unwrap_or(0.0)
                    ))
                })?;
                if index > 0 && (values[index] - ms).abs() >= (values[index - 1] - ms).abs() {
                    Ok(index as u64 - 1)
                } else {
                    Ok(index as u64)
                }
            }
        }
    }

    /// Start time of `frame` in ms
    pub fn time_of(&self, frame: u64) -> TrimcodeResult<f64> {
        match self {
            FrameClock::Constant(fps) => Ok(frame as f64 * fps.frame_duration_ms()),
            FrameClock::Timecode(timestamps) => usize::try_from(frame)
                .ok()
                .and_then(|index| timestamps.get(index))
                .ok_or_else(|| {
                    TrimcodeError::range(format!(
                        "frame {} is past the end of the timecode ({} frames)",
                        frame,
                        timestamps.frame_count()
                    ))
                }),
        }
    }
}

/// Frames to force as keyframes: one per chapter start after 0 ms
pub fn keyframes_for_chapters(starts_ms: &[f64], clock: &FrameClock) -> TrimcodeResult<Vec<u64>> {
    let mut frames = starts_ms
        .iter()
        .filter(|&&ms| ms > 0.0)
        .map(|&ms| clock.frame_at(ms))
        .collect::<TrimcodeResult<Vec<u64>>>()?;
    frames.dedup();
    Ok(frames)
}

/// x264 QP file forcing a keyframe at each frame
pub fn qpfile(frames: &[u64]) -> String {
    frames.iter().map(|frame| format!("{} K\n", frame)).collect()
}

/// Split `[first chapter, frame_count)` into one trim per chapter
pub fn trims_from_chapters(chapter_frames: &[u64], frame_count: u64) -> TrimcodeResult<Vec<TrimRange>> {
    let mut frames = chapter_frames.to_vec();
    frames.sort_unstable();
    frames.dedup();

    if let Some(&last) = frames.last() {
        if last >= frame_count {
            return Err(TrimcodeError::range(format!(
                "chapter at frame {} is past the last frame {}",
                last,
                frame_count.saturating_sub(1)
            )));
        }
    }

    let ends = frames
        .iter()
        .skip(1)
        .map(|next| next - 1)
        .chain(std::iter::once(frame_count.saturating_sub(1)));

    Ok(frames
        .iter()
        .zip(ends)
        .map(|(&start, end)| FrameRange { start, end })
        .collect())
}

/// One chapter of a generated chapter file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterEntry {
    pub name: String,
    pub start_ms: f64,
    pub end_ms: Option<f64>,
}

/// One chapter per trim, timed on the trimmed video.
///
/// `clock` must describe the trimmed video (e.g. a cut timecode). Names are
/// taken from `names` in order; missing ones become `Chapter NN`.
pub fn chapters_for_trims(
    trims: &[TrimRange],
    clock: &FrameClock,
    names: &[String],
) -> TrimcodeResult<Vec<ChapterEntry>> {
    let mut entries = Vec::with_capacity(trims.len());
    let mut position = 0u64;

    for (i, trim) in trims.iter().enumerate() {
        let start_ms = clock.time_of(position)?;
        position += trim.frame_count();
        let end_ms = clock.time_of(position)?;
        let name = names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("Chapter {:02}", i + 1));
        debug!("{} -> {} at {:.3} ms", trim, name, start_ms);
        entries.push(ChapterEntry {
            name,
            start_ms,
            end_ms: Some(end_ms),
        });
    }

    Ok(entries)
}

/// Render a Matroska chapter XML file
pub fn write_chapters(entries: &[ChapterEntry], language: &str) -> TrimcodeResult<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(TrimcodeError::xml)?;
    writer
        .write_event(Event::DocType(BytesText::from_escaped(
            "Chapters SYSTEM \"matroskachapters.dtd\"",
        )))
        .map_err(TrimcodeError::xml)?;
    open(&mut writer, "Chapters")?;
    open(&mut writer, "EditionEntry")?;

    for entry in entries {
        open(&mut writer, "ChapterAtom")?;
        text_element(&mut writer, "ChapterTimeStart", &format_chapter_time(entry.start_ms))?;
        if let Some(end_ms) = entry.end_ms {
            text_element(&mut writer, "ChapterTimeEnd", &format_chapter_time(end_ms))?;
        }
        open(&mut writer, "ChapterDisplay")?;
        text_element(&mut writer, "ChapterString", &entry.name)?;
        text_element(&mut writer, "ChapterLanguage", language)?;
        close(&mut writer, "ChapterDisplay")?;
        close(&mut writer, "ChapterAtom")?;
    }

    close(&mut writer, "EditionEntry")?;
    close(&mut writer, "Chapters")?;

    let mut xml = String::from_utf8(writer.into_inner().into_inner()).map_err(TrimcodeError::xml)?;
    xml.push('\n');
    Ok(xml)
}

fn open(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str) -> TrimcodeResult<()> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(TrimcodeError::xml)
}

fn close(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str) -> TrimcodeResult<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(TrimcodeError::xml)
}

fn text_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, text: &str) -> TrimcodeResult<()> {
    open(writer, name)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(TrimcodeError::xml)?;
    close(writer, name)
}
