//! Runtime configuration.
//!
//! Layers, lowest precedence first: built-in defaults, an optional TOML
//! file, then environment variables. The binary applies CLI flags on top.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::about;
use crate::error::YearFixerError;
use crate::musicbrainz::{RetryPolicy, MB_BASE_URL};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Recompute years even for items that already have them.
    pub force: bool,
    /// Write resolved years into audio file tags.
    pub write: bool,
    pub musicbrainz: MusicBrainzConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            force: false,
            write: true,
            musicbrainz: MusicBrainzConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MusicBrainzConfig {
    pub base_url: String,
    pub user_agent: String,
    pub max_attempts: u32,
    /// Sleep after a 503 response
    pub backoff_ms: u64,
}

impl Default for MusicBrainzConfig {
    fn default() -> Self {
        Self {
            base_url: MB_BASE_URL.to_string(),
            user_agent: about::user_agent(),
            max_attempts: 5,
            backoff_ms: 3000,
        }
    }
}

impl MusicBrainzConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self, YearFixerError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, overlaid with `path` (if any) and then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, YearFixerError> {
        let mut config = match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration file");
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override settings from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(force) = lookup("YEARFIXER_FORCE").as_deref().and_then(parse_flag) {
            self.force = force;
        }
        if let Some(write) = lookup("YEARFIXER_WRITE").as_deref().and_then(parse_flag) {
            self.write = write;
        }
        if let Some(url) = lookup("MUSICBRAINZ_BASE_URL").filter(|s| !s.is_empty()) {
            self.musicbrainz.base_url = url;
        }
        if let Some(ua) = lookup("MUSICBRAINZ_USER_AGENT").filter(|s| !s.is_empty()) {
            self.musicbrainz.user_agent = ua;
        }
    }

    pub fn validate(&self) -> Result<(), YearFixerError> {
        if self.musicbrainz.max_attempts == 0 {
            return Err(YearFixerError::Config(
                "musicbrainz.max_attempts must be at least 1".into(),
            ));
        }
        if self.musicbrainz.base_url.trim().is_empty() {
            return Err(YearFixerError::Config(
                "musicbrainz.base_url must not be empty".into(),
            ));
        }
        Ok(())
    }
}
