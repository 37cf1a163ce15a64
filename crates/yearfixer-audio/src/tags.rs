use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Lofty error: {0}")]
    Lofty(#[from] lofty::error::LoftyError),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("no writable tag in {0}")]
    NoTag(String),
}

/// Year values to mirror into an audio file. `None` leaves the tag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearTags {
    pub year: Option<u32>,
    pub original_year: Option<u32>,
}

impl YearTags {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.original_year.is_none()
    }
}

/// Supported audio formats
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "wav", "aac", "opus", "m4a", "aif", "aiff",
];

/// Check if a file extension is supported
pub fn is_supported_format(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

/// Write `year` / `original_year` into the file's primary tag.
///
/// A file without any tag gets a fresh tag of its primary type. Other
/// fields of an existing tag are preserved.
pub fn write_year_tags(path: &Path, years: YearTags) -> Result<(), TagError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !is_supported_format(&extension) {
        return Err(TagError::UnsupportedFormat(extension));
    }

    if years.is_empty() {
        debug!(path = %path.display(), "no year values to write");
        return Ok(());
    }

    let mut tagged_file = Probe::open(path)?.read()?;

    if tagged_file.primary_tag().is_none() && tagged_file.first_tag().is_none() {
        let tag_type = tagged_file.primary_tag_type();
        tagged_file.insert_tag(Tag::new(tag_type));
    }

    let has_primary = tagged_file.primary_tag().is_some();
    let tag = if has_primary {
        tagged_file.primary_tag_mut()
    } else {
        tagged_file.first_tag_mut()
    }
    .ok_or_else(|| TagError::NoTag(path.display().to_string()))?;

    if let Some(year) = years.year {
        tag.set_year(year);
    }
    if let Some(original_year) = years.original_year {
        tag.insert_text(ItemKey::OriginalReleaseDate, original_year.to_string());
    }

    tag.save_to_path(path, WriteOptions::default())?;
    debug!(
        path = %path.display(),
        year = ?years.year,
        original_year = ?years.original_year,
        "wrote year tags"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Minimal mono 16-bit PCM WAV with a short run of silence.
    fn silent_wav() -> tempfile::NamedTempFile {
        let sample_rate: u32 = 8000;
        let data_len: u32 = 1600;
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend(std::iter::repeat(0u8).take(data_len as usize));

        let mut tmp = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        tmp.write_all(&bytes).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    // ── Format checks ────────────────────────────────────────────────

    #[test]
    fn test_is_supported_format_common() {
        for ext in ["mp3", "flac", "ogg", "wav", "m4a", "aiff"] {
            assert!(is_supported_format(ext), "{ext} should be supported");
        }
    }

    #[test]
    fn test_is_supported_format_case_insensitive() {
        assert!(is_supported_format("MP3"));
        assert!(is_supported_format("Flac"));
    }

    #[test]
    fn test_unsupported_formats() {
        assert!(!is_supported_format("txt"));
        assert!(!is_supported_format(""));
    }

    // ── write_year_tags ──────────────────────────────────────────────

    #[test]
    fn test_write_unsupported_format() {
        let tmp = tempfile::NamedTempFile::with_suffix(".txt").unwrap();
        let result = write_year_tags(
            tmp.path(),
            YearTags {
                year: Some(1990),
                original_year: None,
            },
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Unsupported format"));
    }

    #[test]
    fn test_write_nonexistent_file() {
        let path = Path::new("/tmp/yearfixer_missing_file_4242.mp3");
        let result = write_year_tags(
            path,
            YearTags {
                year: Some(1990),
                original_year: Some(1990),
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_write_empty_years_is_noop() {
        // Nothing to write, so the (missing) file is never opened.
        let path = Path::new("/tmp/yearfixer_missing_file_4243.flac");
        assert!(write_year_tags(path, YearTags::default()).is_ok());
    }

    #[test]
    fn test_write_and_read_back_wav() {
        let wav = silent_wav();
        write_year_tags(
            wav.path(),
            YearTags {
                year: Some(1975),
                original_year: Some(1971),
            },
        )
        .unwrap();

        let tagged = Probe::open(wav.path()).unwrap().read().unwrap();
        let tag = tagged.primary_tag().expect("tag should exist after write");
        assert_eq!(tag.year(), Some(1975));
        let original = tag.get_string(&ItemKey::OriginalReleaseDate).unwrap();
        assert!(original.starts_with("1971"));
    }

    #[test]
    fn test_year_tags_is_empty() {
        assert!(YearTags::default().is_empty());
        assert!(!YearTags {
            year: None,
            original_year: Some(2001)
        }
        .is_empty());
    }
}
