/*!
 * Tests for subtitle parsing and serialization
 */

use subtitle_translator::errors::SubtitleError;
use subtitle_translator::subtitle_processor::{
    AssDialogue, AssDialogueParts, SubtitleCollection, SubtitleEntry, SubtitleFormat,
};
use crate::common;

fn parse_srt(content: &str) -> SubtitleCollection {
    SubtitleCollection::parse(content, "test.srt", SubtitleFormat::Srt).unwrap()
}

fn parse_ass(content: &str) -> SubtitleCollection {
    SubtitleCollection::parse(content, "test.ass", SubtitleFormat::Ass).unwrap()
}

#[test]
fn test_format_fromPath_withMixedCaseExtension_shouldDetect() {
    assert_eq!(SubtitleFormat::from_path("movie.SRT"), SubtitleFormat::Srt);
    assert_eq!(SubtitleFormat::from_path("dir/movie.Ass"), SubtitleFormat::Ass);
    assert_eq!(SubtitleFormat::from_path("movie.vtt"), SubtitleFormat::Unknown);
    assert_eq!(SubtitleFormat::from_path("movie"), SubtitleFormat::Unknown);
}

#[test]
fn test_parse_withUnknownFormat_shouldFail() {
    let result = SubtitleCollection::parse("anything", "notes.txt", SubtitleFormat::Unknown);
    assert!(matches!(result, Err(SubtitleError::UnsupportedFormat(_))));
}

#[test]
fn test_parseSrt_withSampleFile_shouldReadEveryBlock() {
    let collection = parse_srt(common::SAMPLE_SRT);

    assert_eq!(collection.entries.len(), 3);
    match &collection.entries[1] {
        SubtitleEntry::Srt(entry) => {
            assert_eq!(entry.id, "2");
            assert_eq!(entry.start_time, "00:00:05,000");
            assert_eq!(entry.end_time, "00:00:09,000");
            assert_eq!(entry.text, "It contains multiple entries.\nWith a second line.");
        }
        other => panic!("expected SRT entry, got {:?}", other),
    }
}

#[test]
fn test_parseSrt_withCrlfBomAndExtraBlankLines_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n  \r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nSecond\r\n";
    let collection = parse_srt(content);

    let texts: Vec<&str> = collection.entries.iter().filter_map(|e| e.text()).collect();
    assert_eq!(texts, vec!["First", "Second"]);
}

#[test]
fn test_parseSrt_withMalformedBlocks_shouldSkipThem() {
    let content = "1
00:00:01,000 --> 00:00:02,000
Kept

2
not a timing line
Dropped

3
00:00:05,000 --> 00:00:06,000

4
00:00:07,000 --> 00:00:08,000
Also kept
";
    let collection = parse_srt(content);

    let ids: Vec<String> = collection
        .entries
        .iter()
        .map(|e| match e {
            SubtitleEntry::Srt(entry) => entry.id.clone(),
            SubtitleEntry::Ass(_) => String::new(),
        })
        .collect();
    assert_eq!(ids, vec!["1", "4"]);
}

#[test]
fn test_formatSrt_withParsedSample_shouldReproduceInput() {
    let collection = parse_srt(common::SAMPLE_SRT);
    assert_eq!(collection.format_subtitles().unwrap(), common::SAMPLE_SRT);
}

#[test]
fn test_formatSrt_withNoEntries_shouldProduceSingleNewline() {
    let collection = parse_srt("");
    assert!(collection.entries.is_empty());
    assert_eq!(collection.format_subtitles().unwrap(), "\n");
}

#[test]
fn test_parseAss_withSampleFile_shouldSplitPreambleAndEvents() {
    let collection = parse_ass(common::SAMPLE_ASS);

    let preamble = collection.ass_preamble.as_deref().unwrap();
    assert!(preamble.starts_with("[Script Info]"));
    assert!(preamble.ends_with("[Events]"));
    assert_eq!(
        collection.ass_events_format_line.as_deref(),
        Some("Format: Layer, Start, End, Style, Text")
    );

    // The Comment line is not a dialogue event
    assert_eq!(collection.entries.len(), 2);
    assert_eq!(collection.entries[0].text(), Some("Hello, world"));
    assert_eq!(collection.entries[1].text(), Some("{\\i1}Second{\\i0} line"));
}

#[test]
fn test_parseAss_withLineIndex_shouldRecordSourceLine() {
    let collection = parse_ass(common::SAMPLE_ASS);

    match &collection.entries[0] {
        SubtitleEntry::Ass(entry) => assert_eq!(entry.original_line_index, 10),
        other => panic!("expected ASS entry, got {:?}", other),
    }
}

#[test]
fn test_formatAss_withParsedSample_shouldDropOnlyNonDialogueEvents() {
    let collection = parse_ass(common::SAMPLE_ASS);
    let expected = common::SAMPLE_ASS.replace("Comment: 0,0:00:02.00,0:00:03.00,Default,not carried\n", "");

    assert_eq!(collection.format_subtitles().unwrap(), expected);
}

#[test]
fn test_translateAss_withLayerStartEndText_shouldOnlyChangeText() {
    let content = "[Events]
Format: Layer,Start,End,Text
Dialogue: 0,0:00:01.00,0:00:02.00,One
Dialogue: 1,0:00:03.00,0:00:04.00,Two
Dialogue: 2,0:00:05.00,0:00:06.00,Three
";
    let collection = parse_ass(content);
    assert_eq!(collection.entries.len(), 3);

    let translated: Vec<SubtitleEntry> = collection
        .entries
        .iter()
        .map(|e| e.with_text(format!("X{}", e.text().unwrap())))
        .collect();
    let output = collection.with_entries(translated).format_subtitles().unwrap();

    assert_eq!(
        output,
        "[Events]
Format: Layer,Start,End,Text
Dialogue: 0,0:00:01.00,0:00:02.00,XOne
Dialogue: 1,0:00:03.00,0:00:04.00,XTwo
Dialogue: 2,0:00:05.00,0:00:06.00,XThree
"
    );
}

#[test]
fn test_parseAss_withoutTextKey_shouldKeepRawSentinels() {
    let content = "[Events]
Format: Layer, Start, End
Dialogue: 0,0:00:01.00,0:00:02.00
";
    let collection = parse_ass(content);

    assert_eq!(collection.entries.len(), 1);
    assert!(!collection.entries[0].is_translatable());
    assert_eq!(collection.translatable_count(), 0);
    match &collection.entries[0] {
        SubtitleEntry::Ass(entry) => {
            assert_eq!(entry.dialogue, AssDialogue::Raw("0,0:00:01.00,0:00:02.00".to_string()));
        }
        other => panic!("expected ASS entry, got {:?}", other),
    }

    // Sentinels survive text replacement and are written back verbatim
    let unchanged = collection.entries[0].with_text("ignored".to_string());
    assert_eq!(unchanged, collection.entries[0]);
    assert_eq!(collection.format_subtitles().unwrap(), content);
}

#[test]
fn test_parseAss_withMissingEventsSection_shouldKeepWholeFileAsPreamble() {
    let content = "[Script Info]\nTitle: Nothing";
    let collection = parse_ass(content);

    assert!(collection.entries.is_empty());
    assert_eq!(collection.ass_preamble.as_deref(), Some(content));
    assert_eq!(collection.format_subtitles().unwrap(), "[Script Info]\nTitle: Nothing\n");
}

#[test]
fn test_formatAss_withTrailingBlankLinesAndNoEvents_shouldEndWithOneNewline() {
    let first = parse_ass("[Script Info]\nTitle: x\n\n\n");
    let output = first.format_subtitles().unwrap();

    assert_eq!(output, "[Script Info]\nTitle: x\n");
    let second = parse_ass(&output);
    assert_eq!(second.ass_preamble, first.ass_preamble);
    assert_eq!(second.format_subtitles().unwrap(), output);
}

#[test]
fn test_formatAss_withCrlfInput_shouldWriteLfLines() {
    let content = "[Script Info]\r\nTitle: x\r\n[Events]\r\nFormat: Layer, Text\r\nDialogue: 0,Hello\r\n";
    let collection = parse_ass(content);

    assert_eq!(collection.ass_preamble.as_deref(), Some("[Script Info]\nTitle: x\n[Events]"));
    assert_eq!(collection.entries[0].text(), Some("Hello"));
    assert_eq!(
        collection.format_subtitles().unwrap(),
        "[Script Info]\nTitle: x\n[Events]\nFormat: Layer, Text\nDialogue: 0,Hello\n"
    );
}

#[test]
fn test_parseAss_withEmptyFile_shouldFormatToNewline() {
    let collection = parse_ass("");
    assert!(collection.entries.is_empty());
    assert_eq!(collection.format_subtitles().unwrap(), "\n");
}

#[test]
fn test_assDialogueParts_withShortValues_shouldPadWithEmptyStrings() {
    let keys: Vec<String> = ["Layer", "Start", "End", "Text"].iter().map(|k| k.to_string()).collect();
    let parts = AssDialogueParts::new(&keys, &["0", " 0:00:01.00 "]).unwrap();

    assert_eq!(parts.value("Start"), Some("0:00:01.00"));
    assert_eq!(parts.value("End"), Some(""));
    assert_eq!(parts.text(), "");
    assert_eq!(parts.keys().collect::<Vec<_>>(), vec!["Layer", "Start", "End", "Text"]);

    let no_text: Vec<String> = vec!["Layer".to_string()];
    assert!(AssDialogueParts::new(&no_text, &["0"]).is_none());
}

#[test]
fn test_subtitleEntry_display_shouldRenderSrtBlock() {
    let entry = common::srt_entry(7, "Hello");
    assert_eq!(entry.to_string(), "7\n00:00:07,000 --> 00:00:07,500\nHello");
}
