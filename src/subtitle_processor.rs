use std::fmt;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};
use crate::errors::SubtitleError;

// @module: Subtitle parsing and serialization for SRT and ASS

// @const: Separator between SRT blocks (one or more blank lines)
static BLOCK_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").unwrap()
});

// @const: SRT timing line, times kept as opaque strings
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d+:\d{2}:\d{2},\d{3})\s*-->\s*(\d+:\d{2}:\d{2},\d{3})\s*$").unwrap()
});

const EVENTS_HEADER: &str = "[events]";
const FORMAT_PREFIX: &str = "format:";
const DIALOGUE_PREFIX: &str = "dialogue:";

/// Supported subtitle file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    Srt,
    Ass,
    Unknown,
}

impl SubtitleFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "srt" => Self::Srt,
            "ass" => Self::Ass,
            _ => Self::Unknown,
        }
    }

    /// Detect the format from a file name or path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    // @returns: Upper-case format label
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Srt => "SRT",
            Self::Ass => "ASS",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// @struct: SRT cue; times are never parsed
#[derive(Debug, Clone, PartialEq)]
pub struct SrtEntry {
    // @field: Sequence label as written in the file
    pub id: String,

    // @field: Start time, `HH:MM:SS,mmm`
    pub start_time: String,

    // @field: End time, `HH:MM:SS,mmm`
    pub end_time: String,

    // @field: Subtitle text
    pub text: String,
}

/// Field values of one `Dialogue:` line, paired with the `Format:` keys
///
/// Keys and values live in the same vector so the pairing cannot drift.
#[derive(Debug, Clone, PartialEq)]
pub struct AssDialogueParts {
    fields: Vec<(String, String)>,
    text_index: usize,
}

impl AssDialogueParts {
    /// Pair `values` positionally with `keys`; missing values become empty
    ///
    /// Returns `None` when no key equals "Text" (case-insensitive).
    pub fn new(keys: &[String], values: &[&str]) -> Option<Self> {
        let text_index = find_text_key(keys)?;
        let fields = keys
            .iter()
            .enumerate()
            .map(|(idx, key)| (key.clone(), values.get(idx).map(|v| v.trim().to_string()).unwrap_or_default()))
            .collect();

        Some(Self { fields, text_index })
    }

    /// Field names, in Format order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// Value of a field by exact key
    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// The translatable field
    pub fn text(&self) -> &str {
        &self.fields[self.text_index].1
    }

    /// Copy with the translatable field replaced
    pub fn with_text(&self, text: String) -> Self {
        let mut parts = self.clone();
        parts.fields[parts.text_index].1 = text;
        parts
    }

    fn to_line(&self) -> String {
        let values: Vec<&str> = self.fields.iter().map(|(_, v)| v.as_str()).collect();
        format!("Dialogue: {}", values.join(","))
    }
}

/// Payload of an ASS dialogue line
#[derive(Debug, Clone, PartialEq)]
pub enum AssDialogue {
    /// Parsed against a Format declaration that has a Text key
    Fields(AssDialogueParts),
    /// Sentinel: kept verbatim (text after `Dialogue:`), never translated
    Raw(String),
}

// @struct: ASS dialogue event
#[derive(Debug, Clone, PartialEq)]
pub struct AssEntry {
    // @field: Zero-based line number in the source file
    pub original_line_index: usize,

    // @field: Dialogue payload
    pub dialogue: AssDialogue,
}

impl AssEntry {
    fn to_line(&self) -> String {
        match &self.dialogue {
            AssDialogue::Fields(parts) => parts.to_line(),
            AssDialogue::Raw(raw) => format!("Dialogue: {}", raw),
        }
    }
}

/// A positional unit of subtitle content
#[derive(Debug, Clone, PartialEq)]
pub enum SubtitleEntry {
    Srt(SrtEntry),
    Ass(AssEntry),
}

impl SubtitleEntry {
    /// The translatable text, `None` for sentinel records
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Srt(entry) => Some(&entry.text),
            Self::Ass(AssEntry { dialogue: AssDialogue::Fields(parts), .. }) => Some(parts.text()),
            Self::Ass(AssEntry { dialogue: AssDialogue::Raw(_), .. }) => None,
        }
    }

    /// Whether this entry carries a translatable field
    pub fn is_translatable(&self) -> bool {
        self.text().is_some()
    }

    /// Copy with the translatable field replaced; sentinel records are returned unchanged
    pub fn with_text(&self, text: String) -> Self {
        match self {
            Self::Srt(entry) => Self::Srt(SrtEntry { text, ..entry.clone() }),
            Self::Ass(entry) => match &entry.dialogue {
                AssDialogue::Fields(parts) => Self::Ass(AssEntry {
                    original_line_index: entry.original_line_index,
                    dialogue: AssDialogue::Fields(parts.with_text(text)),
                }),
                AssDialogue::Raw(_) => self.clone(),
            },
        }
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Srt(entry) => write!(f, "{}\n{} --> {}\n{}", entry.id, entry.start_time, entry.end_time, entry.text),
            Self::Ass(entry) => write!(f, "{}", entry.to_line()),
        }
    }
}

/// A parsed subtitle file
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCollection {
    /// Name of the file the content came from
    pub file_name: String,

    /// Format, fixed at parse time
    pub format: SubtitleFormat,

    /// Entries in display order
    pub entries: Vec<SubtitleEntry>,

    /// ASS: every line up to and including `[Events]`
    pub ass_preamble: Option<String>,

    /// ASS: the `Format:` line of the events section, verbatim
    pub ass_events_format_line: Option<String>,
}

impl SubtitleCollection {
    /// Parse raw file content
    pub fn parse(content: &str, file_name: &str, format: SubtitleFormat) -> Result<Self, SubtitleError> {
        let collection = match format {
            SubtitleFormat::Srt => Self {
                file_name: file_name.to_string(),
                format,
                entries: parse_srt(content),
                ass_preamble: None,
                ass_events_format_line: None,
            },
            SubtitleFormat::Ass => {
                let parsed = parse_ass(content);
                Self {
                    file_name: file_name.to_string(),
                    format,
                    entries: parsed.entries,
                    ass_preamble: parsed.preamble,
                    ass_events_format_line: parsed.format_line,
                }
            }
            SubtitleFormat::Unknown => {
                return Err(SubtitleError::UnsupportedFormat(format!(
                    "Unsupported file format for parsing: {}",
                    file_name
                )));
            }
        };

        debug!("Parsed {} {} entries from {}", collection.entries.len(), format, file_name);
        Ok(collection)
    }

    /// Serialize back to file content
    pub fn format_subtitles(&self) -> Result<String, SubtitleError> {
        match self.format {
            SubtitleFormat::Srt => Ok(format_srt(&self.entries)),
            SubtitleFormat::Ass => Ok(self.format_ass()),
            SubtitleFormat::Unknown => Err(SubtitleError::UnsupportedFormat(
                "Unsupported file format for formatting".to_string(),
            )),
        }
    }

    /// Copy of this collection carrying different entries
    pub fn with_entries(&self, entries: Vec<SubtitleEntry>) -> Self {
        Self {
            entries,
            ..self.clone()
        }
    }

    /// Number of entries with a translatable field
    pub fn translatable_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_translatable()).count()
    }

    fn format_ass(&self) -> String {
        let mut output = self.ass_preamble.clone().unwrap_or_default();

        if let Some(format_line) = &self.ass_events_format_line {
            ensure_newline(&mut output);
            output.push_str(format_line);
        }

        for entry in &self.entries {
            if let SubtitleEntry::Ass(ass) = entry {
                ensure_newline(&mut output);
                output.push_str(&ass.to_line());
            }
        }

        output.truncate(output.trim_end_matches('\n').len());
        output.push('\n');
        output
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "File: {}", self.file_name)?;
        writeln!(f, "Format: {}", self.format)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

// Separating newline, only once something has been written
fn ensure_newline(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

fn find_text_key(keys: &[String]) -> Option<usize> {
    keys.iter().position(|key| key.eq_ignore_ascii_case("text"))
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &line[prefix.len()..])
}

fn parse_srt(content: &str) -> Vec<SubtitleEntry> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut entries = Vec::new();

    for block in BLOCK_SEPARATOR_REGEX.split(content) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            continue;
        }

        let id = lines[0].trim();
        if id.is_empty() {
            continue;
        }

        let Some(caps) = TIMESTAMP_REGEX.captures(lines[1]) else {
            continue;
        };

        entries.push(SubtitleEntry::Srt(SrtEntry {
            id: id.to_string(),
            start_time: caps[1].to_string(),
            end_time: caps[2].to_string(),
            text: lines[2..].join("\n").trim().to_string(),
        }));
    }

    entries
}

fn format_srt(entries: &[SubtitleEntry]) -> String {
    let blocks: Vec<String> = entries
        .iter()
        .filter(|entry| matches!(entry, SubtitleEntry::Srt(_)))
        .map(|entry| entry.to_string())
        .collect();

    format!("{}\n", blocks.join("\n\n"))
}

struct ParsedAss {
    entries: Vec<SubtitleEntry>,
    preamble: Option<String>,
    format_line: Option<String>,
}

fn parse_ass(content: &str) -> ParsedAss {
    let lines: Vec<&str> = content.lines().collect();
    let mut entries = Vec::new();
    let mut preamble_lines: Vec<&str> = Vec::new();
    let mut preamble = None;
    let mut format_line = None;
    let mut format_keys: Vec<String> = Vec::new();
    let mut has_text_key = false;
    let mut in_events = false;

    for (idx, raw_line) in lines.iter().enumerate() {
        let line = raw_line.trim();

        if !in_events {
            if line.to_lowercase().starts_with(EVENTS_HEADER) {
                in_events = true;
                preamble_lines.push(line);
                preamble = Some(preamble_lines.join("\n"));
            } else {
                preamble_lines.push(raw_line);
            }
            continue;
        }

        if let Some(rest) = strip_prefix_ignore_case(line, FORMAT_PREFIX) {
            format_line = Some(raw_line.to_string());
            format_keys = rest.split(',').map(|key| key.trim().to_string()).collect();
            has_text_key = find_text_key(&format_keys).is_some();
            if !has_text_key {
                warn!("ASS Format line does not contain a 'Text' field, dialogue lines will be kept untranslated");
            }
            continue;
        }

        if let Some(rest) = strip_prefix_ignore_case(line, DIALOGUE_PREFIX) {
            let parts = if has_text_key {
                let values: Vec<&str> = rest.splitn(format_keys.len(), ',').collect();
                AssDialogueParts::new(&format_keys, &values)
            } else {
                None
            };

            let dialogue = match parts {
                Some(parts) => AssDialogue::Fields(parts),
                None => AssDialogue::Raw(rest.trim().to_string()),
            };

            entries.push(SubtitleEntry::Ass(AssEntry {
                original_line_index: idx,
                dialogue,
            }));
        }
    }

    if !in_events {
        // Trailing blank lines would not survive formatting
        let kept = lines.iter().rposition(|line| !line.trim().is_empty()).map_or(0, |last| last + 1);
        if kept > 0 {
            preamble = Some(lines[..kept].join("\n"));
        }
    }

    ParsedAss {
        entries,
        preamble,
        format_line,
    }
}
