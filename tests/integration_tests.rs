use trimcode::chapters::{
    chapters_for_trims, keyframes_for_chapters, parse_chapter_starts, qpfile, trims_from_chapters,
    write_chapters, FrameClock,
};
use trimcode::timecode::{build_timecode, SegmentRate};
use trimcode::trims::{format_trim_line, join_contiguous, ScanOrder};
use trimcode::*;

/// Test fixtures shared by the workflow tests
mod test_utils {
    use super::*;

    pub const SCRIPT: &str = "\
FFVideoSource(\"episode.mkv\")
#Trim(0,50)++Trim(60,70)
Trim(0,1)++Trim(3,4) # tc
Trim(0,99)++Trim(100,199)++Trim(400,-100) # final
";

    pub fn v2(values: &[f64]) -> Timecode {
        let mut text = String::from("# timecode format v2\n");
        for value in values {
            text.push_str(&format!("{}\n", value));
        }
        Timecode::parse(&text, FrameRate::ntsc_film()).unwrap()
    }

    pub fn fps(value: f64) -> FrameRate {
        FrameRate::new(value).unwrap()
    }

    pub fn assert_steps(timestamps: &Timestamps, step: f64) {
        for pair in timestamps.as_slice().windows(2) {
            assert!(
                (pair[1] - pair[0] - step).abs() < 0.001,
                "step {} != {}",
                pair[1] - pair[0],
                step
            );
        }
    }
}

use test_utils::*;

#[test]
fn test_constant_v1_has_constant_steps() {
    for (assume, step) in [("25", 40.0), ("24000/1001", 1001.0 / 24.0), ("59.94", 1001.0 / 60.0)] {
        let text = format!("# timecode format v1\nassume {}\n", assume);
        let Timecode::V1(v1) = Timecode::parse(&text, FrameRate::ntsc_film()).unwrap() else {
            panic!("expected v1");
        };
        let timestamps = v1.to_timestamps(FrameRange::new(0, 240).unwrap(), 0.0).unwrap();
        assert_eq!(timestamps.len(), 242);
        assert_steps(&timestamps, step);
    }
}

#[test]
fn test_v1_records_and_gaps() {
    let text = "# timecode format v1\nassume 25\n0,9,50\n20,29,50\n";
    let timecode = Timecode::parse(text, FrameRate::ntsc_film()).unwrap();
    let timestamps = timecode.to_timestamps(None).unwrap();

    assert_eq!(timestamps.len(), 31);
    assert!((timestamps[10] - 200.0).abs() < 1e-9);
    assert!((timestamps[20] - 600.0).abs() < 1e-9);
    assert!((timestamps[30] - 800.0).abs() < 1e-9);
}

#[test]
fn test_v1_offset_and_range() {
    let text = "# timecode format v1\nassume 25\n";
    let Timecode::V1(v1) = Timecode::parse(text, FrameRate::ntsc_film()).unwrap() else {
        panic!("expected v1");
    };
    let timestamps = v1.to_timestamps(FrameRange::new(10, 14).unwrap(), 500.0).unwrap();
    assert_eq!(timestamps.as_slice(), &[500.0, 540.0, 580.0, 620.0, 660.0, 700.0]);
}

#[test]
fn test_v1_malformed_line_is_format_error() {
    let result = Timecode::parse("# timecode format v1\nassume 25\na,b,c\n", FrameRate::ntsc_film());
    match result {
        Err(TrimcodeError::Format { content, .. }) => assert_eq!(content, "a,b,c"),
        other => panic!("expected format error, got {:?}", other),
    }
}

#[test]
fn test_cut_removes_gaps() {
    let timestamps = v2(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0])
        .to_timestamps(None)
        .unwrap();
    let line = find_trim_line(SCRIPT, &TrimSelector::Scan {
        order: ScanOrder::TopDown,
        label: Some("tc".to_string()),
    })
    .unwrap();

    assert_eq!(line.line_number, 3);
    let cut = cut_timecode(&timestamps, &line.trims).unwrap();
    assert_eq!(cut.as_slice(), &[0.0, 10.0, 20.0, 30.0, 40.0]);
}

#[test]
fn test_cut_whole_range_is_identity() {
    let text = "# timecode format v1\nassume 24000/1001\n0,47,24\n48,95,29.97\n";
    let timestamps = Timecode::parse(text, FrameRate::ntsc_film())
        .unwrap()
        .to_timestamps(None)
        .unwrap();
    let cut = cut_timecode(&timestamps, &[FrameRange::new(0, 95).unwrap()]).unwrap();
    assert_eq!(cut, timestamps);
}

#[test]
fn test_cut_v1_by_script_trims() {
    let text = "# timecode format v1\nassume 25\n";
    let line = find_trim_line(SCRIPT, &TrimSelector::Scan {
        order: ScanOrder::BottomUp,
        label: None,
    })
    .unwrap();
    assert_eq!(line.line_number, 4);

    let trims = join_contiguous(&line.trims);
    assert_eq!(format_trim_line(&trims), "Trim(0,199)++Trim(400,499)");

    let timestamps = Timecode::parse(text, FrameRate::ntsc_film())
        .unwrap()
        .to_timestamps(trims.last().map(|trim| trim.end))
        .unwrap();
    let cut = cut_timecode(&timestamps, &trims).unwrap();

    assert_eq!(cut.frame_count(), 300);
    assert_steps(&cut, 40.0);
    assert!((cut.last().unwrap() - 12000.0).abs() < 1e-6);
}

#[test]
fn test_trims_not_found_kinds() {
    let script = "Trim(0,10)\n";
    assert!(matches!(
        find_trim_line("Version()\n", &TrimSelector::default()),
        Err(TrimcodeError::NotFound(NotFoundKind::NoTrims))
    ));
    assert!(matches!(
        find_trim_line(script, &TrimSelector::Scan {
            order: ScanOrder::TopDown,
            label: Some("final".to_string()),
        }),
        Err(TrimcodeError::NotFound(NotFoundKind::Label(label))) if label == "final"
    ));
    assert!(matches!(
        find_trim_line(script, &TrimSelector::Line(2)),
        Err(TrimcodeError::NotFound(NotFoundKind::Line(2)))
    ));
}

#[test]
fn test_negative_trim_end() {
    let line = find_trim_line("Trim(100,-50)", &TrimSelector::Line(1)).unwrap();
    assert_eq!(line.trims, vec![FrameRange::new(100, 149).unwrap()]);
}

#[test]
fn test_create_then_cut_matches_per_trim_rates() {
    let trims = [FrameRange::new(0, 9).unwrap(), FrameRange::new(20, 29).unwrap()];
    let created = build_timecode(
        &trims,
        &[SegmentRate::Fps(fps(25.0)), SegmentRate::Fps(fps(50.0))],
        Some(fps(10.0)),
    )
    .unwrap();

    let reparsed = Timecode::parse(&created.to_text(), FrameRate::ntsc_film()).unwrap();
    let timestamps = reparsed.to_timestamps(None).unwrap();
    assert_eq!(timestamps.frame_count(), 30);

    let cut = cut_timecode(&timestamps, &trims).unwrap();
    assert_eq!(cut.frame_count(), 20);
    assert!((cut[10] - 400.0).abs() < 1e-6);
    assert!((cut[20] - 600.0).abs() < 1e-6);
}

#[test]
fn test_chapters_to_qpfile_and_trims() {
    let xml = "<Chapters><EditionEntry>\
        <ChapterAtom><ChapterTimeStart>00:00:00.000</ChapterTimeStart></ChapterAtom>\
        <ChapterAtom><ChapterTimeStart>00:01:00.000</ChapterTimeStart></ChapterAtom>\
        <ChapterAtom><ChapterTimeStart>00:02:30.500</ChapterTimeStart></ChapterAtom>\
        </EditionEntry></Chapters>";
    let starts = parse_chapter_starts(xml).unwrap();
    let clock = FrameClock::Constant(fps(25.0));

    let keyframes = keyframes_for_chapters(&starts, &clock).unwrap();
    assert_eq!(qpfile(&keyframes), "1500 K\n3763 K\n");

    let frames: Vec<u64> = starts.iter().map(|&ms| clock.frame_at(ms).unwrap()).collect();
    let trims = trims_from_chapters(&frames, 5000).unwrap();
    assert_eq!(
        format_trim_line(&trims),
        "Trim(0,1499)++Trim(1500,3762)++Trim(3763,4999)"
    );
}

#[test]
fn test_chapters_follow_cut_timecode() {
    let timestamps = v2(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0])
        .to_timestamps(None)
        .unwrap();
    let trims = [FrameRange::new(0, 1).unwrap(), FrameRange::new(3, 4).unwrap()];
    let clock = FrameClock::Timecode(cut_timecode(&timestamps, &trims).unwrap());

    let entries = chapters_for_trims(&trims, &clock, &[]).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].start_ms, 20.0);
    assert_eq!(entries[1].end_ms, Some(40.0));

    let xml = write_chapters(&entries, "eng").unwrap();
    assert!(xml.contains("<ChapterTimeStart>00:00:00.020000000</ChapterTimeStart>"));
    assert!(xml.contains("<ChapterString>Chapter 02</ChapterString>"));
}
