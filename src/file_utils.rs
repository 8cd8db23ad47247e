use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::SubtitleError;
use crate::subtitle_processor::SubtitleFormat;

// @module: File and directory utilities

/// Suffix inserted before the extension of translated files
pub const TRANSLATED_SUFFIX: &str = "_translated_";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @detects: Subtitle format from the file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> SubtitleFormat {
        SubtitleFormat::from_path(path)
    }

    /// Name of the translated file: `{base}_translated_{lang}.{ext}`
    pub fn translated_file_name(file_name: &str, target_language: &str) -> String {
        match file_name.rsplit_once('.') {
            Some((base, extension)) if !base.is_empty() => {
                format!("{}{}{}.{}", base, TRANSLATED_SUFFIX, target_language, extension)
            }
            _ => format!("{}{}{}", file_name, TRANSLATED_SUFFIX, target_language),
        }
    }

    /// Find every supported subtitle file under a directory, sorted by path
    ///
    /// Files that are themselves translation outputs are skipped.
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !path.is_file() || Self::detect_format(path) == SubtitleFormat::Unknown {
                continue;
            }

            let is_output = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().contains(TRANSLATED_SUFFIX))
                .unwrap_or(false);
            if !is_output {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Decode subtitle bytes, rejecting anything that is not UTF-8
    pub fn decode_subtitle_bytes(bytes: Vec<u8>) -> Result<String, SubtitleError> {
        String::from_utf8(bytes)
            .map_err(|e| SubtitleError::Parse(format!("File is not valid UTF-8: {}", e)))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
