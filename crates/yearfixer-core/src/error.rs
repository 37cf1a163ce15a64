//! Error types shared across the crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YearFixerError {
    #[error("missing tag ({0})! cannot build MusicBrainz url")]
    MissingIdentifier(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tag write error: {0}")]
    Tags(#[from] yearfixer_audio::TagError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    // ── Display messages ──────────────────────────────────────────────

    #[test]
    fn test_display_missing_identifier() {
        let err = YearFixerError::MissingIdentifier("mb_artistid");
        assert_eq!(
            err.to_string(),
            "missing tag (mb_artistid)! cannot build MusicBrainz url"
        );
    }

    #[test]
    fn test_display_config() {
        let err = YearFixerError::Config("max_attempts must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "configuration error: max_attempts must be at least 1"
        );
    }

    // ── From conversions ──────────────────────────────────────────────

    #[test]
    fn test_from_db_error() {
        let db_err = sea_orm::DbErr::Custom("test db error".into());
        let err: YearFixerError = db_err.into();
        assert!(matches!(err, YearFixerError::Database(_)));
        assert!(err.to_string().contains("test db error"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "config missing");
        let err: YearFixerError = io_err.into();
        assert!(matches!(err, YearFixerError::Io(_)));
        assert!(err.to_string().contains("config missing"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Value>("force = = true").unwrap_err();
        let err: YearFixerError = toml_err.into();
        assert!(err.to_string().starts_with("TOML parse error:"));
    }

    #[test]
    fn test_from_tag_error() {
        let tag_err = yearfixer_audio::TagError::UnsupportedFormat("txt".into());
        let err: YearFixerError = tag_err.into();
        assert!(matches!(err, YearFixerError::Tags(_)));
        assert!(err.to_string().contains("Unsupported format: txt"));
    }

    // ── Error trait source chain ──────────────────────────────────────

    #[test]
    fn test_error_source_string_variants() {
        use std::error::Error;
        let err = YearFixerError::MissingIdentifier("title");
        assert!(err.source().is_none());
    }
}
