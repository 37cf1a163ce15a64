//! MusicBrainz recording search used to find an item's original year.
//!
//! One search per item: `arid:<artist-id> AND recording:"<title>"`. The
//! earliest release date across all returned recordings wins.
//!
//! MusicBrainz answers 503 when a client exceeds its rate limit; those
//! responses are retried after a fixed backoff, up to a bounded number of
//! attempts. Every other failure ends the lookup for the item.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::MusicBrainzConfig;
use crate::error::YearFixerError;
use crate::year::{Year, YearFields};

/// MusicBrainz Web Service v2 base URL.
pub const MB_BASE_URL: &str = "https://musicbrainz.org/ws/2/";

/// Per-request transport timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Requests sent before giving up, 503s included.
    pub max_attempts: u32,
    /// Sleep after each 503.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(3),
        }
    }
}

/// What a single HTTP exchange turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseClass {
    /// A non-empty JSON object.
    Usable(Value),
    /// `null` or `{}`: no data, but nothing wrong either.
    Empty,
    RateLimited,
    NotFound,
    Transport(String),
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GiveUpReason {
    #[error("404 - not found")]
    NotFound,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Malformed(String),
    #[error("maximum ({0}) retries reached")]
    RetriesExhausted(u32),
}

/// Retry loop states.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState {
    Requesting { attempt: u32 },
    Backoff { attempt: u32 },
    Succeeded(Value),
    GivenUp(GiveUpReason),
}

impl FetchState {
    pub fn start(policy: &RetryPolicy) -> Self {
        Self::attempt(1, policy)
    }

    fn attempt(attempt: u32, policy: &RetryPolicy) -> Self {
        if attempt > policy.max_attempts {
            FetchState::GivenUp(GiveUpReason::RetriesExhausted(policy.max_attempts))
        } else {
            FetchState::Requesting { attempt }
        }
    }

    /// Next state once the response to `attempt` has been classified.
    pub fn after_response(attempt: u32, class: ResponseClass, policy: &RetryPolicy) -> Self {
        match class {
            ResponseClass::Usable(data) => FetchState::Succeeded(data),
            ResponseClass::Empty => Self::attempt(attempt + 1, policy),
            ResponseClass::RateLimited => FetchState::Backoff { attempt },
            ResponseClass::NotFound => FetchState::GivenUp(GiveUpReason::NotFound),
            ResponseClass::Transport(e) => FetchState::GivenUp(GiveUpReason::Transport(e)),
            ResponseClass::Malformed(e) => FetchState::GivenUp(GiveUpReason::Malformed(e)),
        }
    }

    /// Next state once the backoff sleep following `attempt` is over.
    pub fn after_backoff(attempt: u32, policy: &RetryPolicy) -> Self {
        Self::attempt(attempt + 1, policy)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchState::Succeeded(_) | FetchState::GivenUp(_))
    }
}

/// Result of one retry loop, with counters for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchReport {
    pub outcome: Result<Value, GiveUpReason>,
    /// Requests actually sent
    pub attempts: u32,
    /// Backoff sleeps taken
    pub backoffs: u32,
}

/// Classify a response body that came with a non-503, non-404 status.
pub fn classify_body(body: &str) -> ResponseClass {
    match serde_json::from_str::<Value>(body) {
        Err(e) => ResponseClass::Malformed(e.to_string()),
        Ok(Value::Null) => ResponseClass::Empty,
        Ok(Value::Object(map)) if map.is_empty() => ResponseClass::Empty,
        Ok(data @ Value::Object(_)) => ResponseClass::Usable(data),
        Ok(_) => ResponseClass::Malformed("expected a JSON object".into()),
    }
}

async fn classify_response(result: Result<reqwest::Response, reqwest::Error>) -> ResponseClass {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => return ResponseClass::Transport(e.to_string()),
    };

    match resp.status() {
        StatusCode::SERVICE_UNAVAILABLE => ResponseClass::RateLimited,
        StatusCode::NOT_FOUND => ResponseClass::NotFound,
        _ => match resp.text().await {
            Ok(body) => classify_body(&body),
            Err(e) => ResponseClass::Transport(e.to_string()),
        },
    }
}

/// Lucene query for one recording by one artist.
pub fn build_query(artist_id: &str, title: &str) -> String {
    format!(
        "arid:{} AND recording:\"{}\"",
        artist_id,
        title.replace('"', "")
    )
}

/// Delimiters left as-is when encoding a query.
const QUERY_SAFE: [(&str, &str); 5] = [
    ("%3A", ":"),
    ("%2F", "/"),
    ("%26", "&"),
    ("%3F", "?"),
    ("%3D", "="),
];

/// Percent-encode a query, keeping `: / & ? =` unescaped and spaces as `+`.
pub fn encode_query(query: &str) -> String {
    QUERY_SAFE
        .iter()
        .fold(urlencoding::encode(query).into_owned(), |acc, &(escaped, raw)| {
            acc.replace(escaped, raw)
        })
        .replace("%20", "+")
}

/// Earliest plausible release year anywhere in a recording search result.
///
/// Entries that are not shaped as expected are skipped.
pub fn extract_original_year(data: &Value) -> Option<Year> {
    data.get("recordings")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|recording| recording.get("releases").and_then(Value::as_array))
        .flatten()
        .filter_map(|release| release.get("date").and_then(Value::as_str))
        .filter_map(Year::from_date_prefix)
        .min()
}

/// MusicBrainz client for original-year lookups.
pub struct MusicBrainzClient {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl MusicBrainzClient {
    pub fn new(config: &MusicBrainzConfig) -> Result<Self, YearFixerError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let mut base_url = config.base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            http,
            base_url,
            policy: config.retry_policy(),
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn search_url(&self, artist_id: &str, title: &str) -> String {
        format!(
            "{}recording/?query={}&fmt=json",
            self.base_url,
            encode_query(&build_query(artist_id, title))
        )
    }

    /// GET `url`, retrying on 503 according to the retry policy.
    pub async fn fetch(&self, url: &str) -> FetchReport {
        let mut attempts = 0;
        let mut backoffs = 0;
        let mut state = FetchState::start(&self.policy);

        loop {
            state = match state {
                FetchState::Requesting { attempt } => {
                    attempts = attempt;
                    debug!(attempt, "querying MusicBrainz");
                    let class = classify_response(self.http.get(url).send().await).await;
                    FetchState::after_response(attempt, class, &self.policy)
                }
                FetchState::Backoff { attempt } => {
                    debug!(
                        attempt,
                        backoff_ms = self.policy.backoff.as_millis() as u64,
                        "MusicBrainz rate limit hit, backing off"
                    );
                    backoffs += 1;
                    tokio::time::sleep(self.policy.backoff).await;
                    FetchState::after_backoff(attempt, &self.policy)
                }
                FetchState::Succeeded(data) => {
                    return FetchReport {
                        outcome: Ok(data),
                        attempts,
                        backoffs,
                    };
                }
                FetchState::GivenUp(reason) => {
                    match &reason {
                        GiveUpReason::NotFound => info!("MusicBrainz: no results (404)"),
                        GiveUpReason::RetriesExhausted(_) => {
                            info!("MusicBrainz: {reason}. Abandoning.")
                        }
                        GiveUpReason::Transport(_) | GiveUpReason::Malformed(_) => {
                            error!("MusicBrainz: {reason}")
                        }
                    }
                    return FetchReport {
                        outcome: Err(reason),
                        attempts,
                        backoffs,
                    };
                }
            };
        }
    }

    /// Earliest release year MusicBrainz knows for the item's recording.
    ///
    /// Lookup failures are logged and yield `Ok(None)`; only a missing
    /// artist id or title is reported as an error.
    pub async fn fetch_original_year<I>(&self, item: &I) -> Result<Option<Year>, YearFixerError>
    where
        I: YearFields + ?Sized,
    {
        let artist_id = item
            .mb_artistid()
            .ok_or(YearFixerError::MissingIdentifier("mb_artistid"))?;
        let title = item
            .title()
            .ok_or(YearFixerError::MissingIdentifier("title"))?;

        let url = self.search_url(artist_id, title);
        debug!(%url, "fetching URL");

        let report = self.fetch(&url).await;
        let Ok(data) = report.outcome else {
            return Ok(None);
        };

        let year = extract_original_year(&data);
        match year {
            Some(year) => debug!(%year, attempts = report.attempts, "MusicBrainz original year"),
            None => info!("MusicBrainz: no usable release dates"),
        }
        Ok(year)
    }
}
