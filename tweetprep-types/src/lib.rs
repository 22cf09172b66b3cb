//! Core types for the tweetprep preprocessing pipeline.
//!
//! This crate holds the record shapes and configuration shared by the
//! pipeline stages and by whatever ingests or consumes the records:
//!
//! - **`RawTweet`**: loosely-typed ingestion row, every field optional
//! - **`TweetRecord`**: validated row that the pipeline stages annotate
//! - **`PipelineConfig`**: the fixed parameters of the three stages

#![warn(missing_docs)]

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque author identifier used as the grouping key.
pub type UserId = String;

/// Prefix that marks a retweet in the raw text.
pub const RETWEET_MARKER: &str = "RT";

/// Separator written after every entry of a recent-tweets context.
pub const CONTEXT_DELIMITER: &str = " | ";

/// Default number of tweets (anchor included) combined into one context.
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Rows with this many words or fewer are dropped.
pub const DEFAULT_MIN_WORD_COUNT: usize = 3;

/// Naive timestamp layouts accepted in addition to RFC 3339. Taken as UTC.
const NAIVE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// A single tweet moving through the pipeline.
///
/// Ingestion fills `user_id`, `tweet_time` and `raw_text`. The filter stage
/// adds `clean_text` and `word_count`; the context stage adds
/// `recent_context`. Derived fields stay `None` until their stage runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    /// Author of the tweet.
    pub user_id: UserId,
    /// When the tweet was posted.
    pub tweet_time: DateTime<Utc>,
    /// Text exactly as ingested.
    pub raw_text: String,
    /// Normalized text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_text: Option<String>,
    /// Space count of `clean_text` plus one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    /// This tweet and the author's preceding ones, newest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_context: Option<String>,
}

impl TweetRecord {
    /// Creates a record with no derived fields.
    pub fn new(
        user_id: impl Into<UserId>,
        tweet_time: DateTime<Utc>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tweet_time,
            raw_text: raw_text.into(),
            clean_text: None,
            word_count: None,
            recent_context: None,
        }
    }

    /// Returns the clean text, or `""` if the record was never normalized.
    #[inline]
    pub fn clean_text_or_empty(&self) -> &str {
        self.clean_text.as_deref().unwrap_or("")
    }
}

/// Ingestion row as it arrives from a dataset export.
///
/// Column names of the original tweet dump (`userid`, `tweet_text`) are
/// accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTweet {
    /// Author identifier.
    #[serde(default, alias = "userid")]
    pub user_id: Option<String>,
    /// Post time as text.
    #[serde(default)]
    pub tweet_time: Option<String>,
    /// Tweet body.
    #[serde(default, alias = "tweet_text")]
    pub raw_text: Option<String>,
}

impl TryFrom<RawTweet> for TweetRecord {
    type Error = RecordError;

    fn try_from(raw: RawTweet) -> Result<Self, Self::Error> {
        let user_id = raw
            .user_id
            .ok_or(RecordError::MissingField { field: "user_id" })?;
        let time = raw
            .tweet_time
            .ok_or(RecordError::MissingField { field: "tweet_time" })?;
        let raw_text = raw
            .raw_text
            .ok_or(RecordError::MissingField { field: "raw_text" })?;

        Ok(TweetRecord::new(user_id, parse_tweet_time(&time)?, raw_text))
    }
}

/// Parses a tweet timestamp.
///
/// Accepts RFC 3339 (`2017-01-05T13:45:00Z`) and the dataset layouts
/// `2017-01-05 13:45:00` and `2017-01-05 13:45`, the latter two as UTC.
///
/// # Errors
///
/// Returns `RecordError::InvalidTimestamp` when no layout matches.
pub fn parse_tweet_time(value: &str) -> Result<DateTime<Utc>, RecordError> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| RecordError::InvalidTimestamp {
            value: value.to_owned(),
        })
}

/// Errors raised when an ingestion row cannot become a `TweetRecord`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A required column was absent or null.
    #[error("record is missing required field `{field}`")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// The timestamp matched none of the accepted layouts.
    #[error("invalid tweet_time `{value}`")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
    },
}

/// Fixed parameters of the preprocessing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum number of tweets, anchor included, in one recent context.
    /// Zero yields empty contexts.
    pub window_size: usize,
    /// Rows need strictly more words than this to survive filtering.
    pub min_word_count: usize,
    /// Raw-text prefix identifying retweets.
    pub retweet_marker: &'static str,
    /// Written after every entry of a recent context.
    pub context_delimiter: &'static str,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_word_count: DEFAULT_MIN_WORD_COUNT,
            retweet_marker: RETWEET_MARKER,
            context_delimiter: CONTEXT_DELIMITER,
        }
    }
}

impl PipelineConfig {
    /// Default configuration with a different window size.
    pub const fn with_window(window_size: usize) -> Self {
        Self {
            window_size,
            min_word_count: DEFAULT_MIN_WORD_COUNT,
            retweet_marker: RETWEET_MARKER,
            context_delimiter: CONTEXT_DELIMITER,
        }
    }
}
