//! Row filtering.
//!
//! Annotates each record with its normalized text and word count, then keeps
//! the records that are not retweets and carry enough words. Survivors keep
//! their input order.

use core::fmt;

use tracing::{debug, trace};
use tweetprep_types::{PipelineConfig, TweetRecord};

use crate::analyzer::{word_count, TweetNormalizer};

/// Why a record was dropped. Criteria are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Raw text starts with the retweet marker.
    Retweet,
    /// The record was never normalized.
    MissingCleanText,
    /// Normalization left nothing.
    EmptyCleanText,
    /// Not more words than the configured minimum.
    TooFewWords {
        /// Word count of the record.
        words: usize,
    },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Retweet => write!(f, "retweet"),
            DropReason::MissingCleanText => write!(f, "missing clean text"),
            DropReason::EmptyCleanText => write!(f, "empty clean text"),
            DropReason::TooFewWords { words } => write!(f, "too few words ({})", words),
        }
    }
}

/// Counts from one filter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Records seen.
    pub rows_in: usize,
    /// Records kept.
    pub rows_kept: usize,
    /// Dropped as retweets.
    pub retweets: usize,
    /// Dropped with missing or empty clean text.
    pub empty: usize,
    /// Dropped for having too few words.
    pub too_short: usize,
}

impl FilterStats {
    /// Total records dropped.
    #[inline]
    pub fn rows_dropped(&self) -> usize {
        self.rows_in - self.rows_kept
    }

    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::Retweet => self.retweets += 1,
            DropReason::MissingCleanText | DropReason::EmptyCleanText => self.empty += 1,
            DropReason::TooFewWords { .. } => self.too_short += 1,
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows in, {} kept, {} dropped (retweets: {}, empty: {}, too short: {})",
            self.rows_in,
            self.rows_kept,
            self.rows_dropped(),
            self.retweets,
            self.empty,
            self.too_short
        )
    }
}

/// Drops retweets and short or empty tweets.
#[derive(Debug, Clone)]
pub struct RowFilter {
    normalizer: TweetNormalizer,
    retweet_marker: &'static str,
    min_word_count: usize,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl RowFilter {
    /// Creates a filter with the marker and word threshold from `config`.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            normalizer: TweetNormalizer::default(),
            retweet_marker: config.retweet_marker,
            min_word_count: config.min_word_count,
        }
    }

    /// Fills `clean_text` and `word_count` from `raw_text`.
    pub fn annotate(&self, record: &mut TweetRecord) {
        let clean = self.normalizer.normalize(&record.raw_text);
        record.word_count = Some(word_count(&clean));
        record.clean_text = Some(clean);
    }

    /// Checks an annotated record against every criterion.
    ///
    /// # Errors
    ///
    /// Returns the first criterion the record fails.
    pub fn check(&self, record: &TweetRecord) -> Result<(), DropReason> {
        if record.raw_text.starts_with(self.retweet_marker) {
            return Err(DropReason::Retweet);
        }

        let clean = record
            .clean_text
            .as_deref()
            .ok_or(DropReason::MissingCleanText)?;
        if clean.is_empty() {
            return Err(DropReason::EmptyCleanText);
        }

        let words = record.word_count.unwrap_or_else(|| word_count(clean));
        if words <= self.min_word_count {
            return Err(DropReason::TooFewWords { words });
        }

        Ok(())
    }

    /// Annotates every record and returns the survivors in input order.
    pub fn apply(&self, records: Vec<TweetRecord>) -> Vec<TweetRecord> {
        self.apply_with_stats(records).0
    }

    /// Like [`apply`](Self::apply), also returning pass statistics.
    pub fn apply_with_stats(&self, records: Vec<TweetRecord>) -> (Vec<TweetRecord>, FilterStats) {
        let mut stats = FilterStats {
            rows_in: records.len(),
            ..FilterStats::default()
        };

        let kept: Vec<TweetRecord> = records
            .into_iter()
            .filter_map(|mut record| {
                self.annotate(&mut record);
                match self.check(&record) {
                    Ok(()) => Some(record),
                    Err(reason) => {
                        trace!(user_id = %record.user_id, %reason, "dropping tweet");
                        stats.record(reason);
                        None
                    }
                }
            })
            .collect();

        stats.rows_kept = kept.len();
        debug!(
            rows_in = stats.rows_in,
            rows_kept = stats.rows_kept,
            retweets = stats.retweets,
            empty = stats.empty,
            too_short = stats.too_short,
            "filtered tweets"
        );

        (kept, stats)
    }
}

/// Annotates and filters `records` with the default configuration.
pub fn filter_rows(records: Vec<TweetRecord>) -> Vec<TweetRecord> {
    RowFilter::default().apply(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 10, 1, 12, minute, 0).unwrap()
    }

    fn tweet(user: &str, text: &str) -> TweetRecord {
        TweetRecord::new(user, at(0), text)
    }

    #[test]
    fn annotate_fills_derived_fields() {
        let mut record = tweet("u", "Hello, world! I can't wait");
        RowFilter::default().annotate(&mut record);
        assert_eq!(record.clean_text.as_deref(), Some("Hello world I can not wait"));
        assert_eq!(record.word_count, Some(6));
        assert!(record.recent_context.is_none());
    }

    #[test]
    fn keeps_substantive_tweets() {
        let out = filter_rows(vec![tweet("u", "this is a real tweet")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].clean_text.as_deref(), Some("this is a real tweet"));
        assert_eq!(out[0].word_count, Some(5));
    }

    #[test]
    fn drops_retweets() {
        let f = RowFilter::default();
        let mut record = tweet("u", "RT @bob: this is a long enough retweet");
        f.annotate(&mut record);
        assert_eq!(f.check(&record), Err(DropReason::Retweet));
    }

    #[test]
    fn retweet_marker_is_a_plain_prefix() {
        let f = RowFilter::default();
        let mut record = tweet("u", "RTX cards are finally in stock");
        f.annotate(&mut record);
        assert_eq!(f.check(&record), Err(DropReason::Retweet));

        let mut record = tweet("u", "rt lowercase is not a retweet marker");
        f.annotate(&mut record);
        assert_eq!(f.check(&record), Ok(()));
    }

    #[test]
    fn drops_empty_clean_text() {
        let f = RowFilter::default();
        let mut record = tweet("u", "https://t.co/xyz 123 !!!");
        f.annotate(&mut record);
        assert_eq!(record.clean_text.as_deref(), Some(""));
        assert_eq!(f.check(&record), Err(DropReason::EmptyCleanText));
    }

    #[test]
    fn unannotated_record_is_missing_clean_text() {
        let f = RowFilter::default();
        assert_eq!(
            f.check(&tweet("u", "plenty of words in here")),
            Err(DropReason::MissingCleanText)
        );
    }

    #[test]
    fn word_threshold_is_exclusive() {
        let f = RowFilter::default();

        let mut three = tweet("u", "one two three");
        f.annotate(&mut three);
        assert_eq!(f.check(&three), Err(DropReason::TooFewWords { words: 3 }));

        let mut four = tweet("u", "one two three four");
        f.annotate(&mut four);
        assert_eq!(f.check(&four), Ok(()));
    }

    #[test]
    fn words_counted_after_cleaning() {
        let f = RowFilter::default();
        let mut record = tweet("u", "@a @b @c 1 2 3 hi there");
        f.annotate(&mut record);
        assert_eq!(record.clean_text.as_deref(), Some("hi there"));
        assert_eq!(f.check(&record), Err(DropReason::TooFewWords { words: 2 }));
    }

    #[test]
    fn emoji_residue_does_not_count_as_words() {
        let f = RowFilter::default();

        let mut heart = tweet("u", "this is fun \u{2764}\u{FE0F}");
        f.annotate(&mut heart);
        assert_eq!(heart.clean_text.as_deref(), Some("this is fun"));
        assert_eq!(f.check(&heart), Err(DropReason::TooFewWords { words: 3 }));

        let mut family = tweet("u", "family \u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467} day out");
        f.annotate(&mut family);
        assert_eq!(family.word_count, Some(3));
        assert_eq!(f.check(&family), Err(DropReason::TooFewWords { words: 3 }));
    }

    #[test]
    fn custom_threshold() {
        let config = PipelineConfig {
            min_word_count: 1,
            ..PipelineConfig::default()
        };
        let out = RowFilter::new(&config).apply(vec![tweet("u", "hi there")]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn stats_count_each_reason() {
        let records = vec![
            tweet("a", "RT @x: retweeted text with many words"),
            tweet("a", "!!!"),
            tweet("b", "too short"),
            tweet("b", "this one is long enough"),
            tweet("c", "and so is this one here"),
        ];

        let (kept, stats) = RowFilter::default().apply_with_stats(records);
        assert_eq!(kept.len(), 2);
        assert_eq!(
            stats,
            FilterStats {
                rows_in: 5,
                rows_kept: 2,
                retweets: 1,
                empty: 1,
                too_short: 1,
            }
        );
        assert_eq!(stats.rows_dropped(), 3);
        assert_eq!(
            stats.to_string(),
            "5 rows in, 2 kept, 3 dropped (retweets: 1, empty: 1, too short: 1)"
        );
    }

    #[test]
    fn preserves_input_order() {
        let records = vec![
            tweet("z", "zulu tweet with enough words"),
            tweet("a", "RT dropped"),
            tweet("m", "mike tweet with enough words"),
            tweet("a", "alpha tweet with enough words"),
        ];
        let users: Vec<_> = filter_rows(records)
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(users, ["z", "m", "a"]);
    }

    #[test]
    fn empty_collection() {
        let (kept, stats) = RowFilter::default().apply_with_stats(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(stats, FilterStats::default());
    }

    #[test]
    fn drop_reason_display() {
        assert_eq!(DropReason::Retweet.to_string(), "retweet");
        assert_eq!(
            DropReason::TooFewWords { words: 2 }.to_string(),
            "too few words (2)"
        );
    }

    fn text_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            "RT [a-z ]{0,30}",
            "[a-z]{1,6}( [a-z]{1,6}){0,6}",
            "[ -~]{0,40}",
        ]
    }

    proptest! {
        #[test]
        fn survivors_satisfy_every_criterion(texts in prop::collection::vec(text_strategy(), 0..40)) {
            let records: Vec<_> = texts.iter().map(|t| tweet("u", t)).collect();
            for r in filter_rows(records) {
                prop_assert!(!r.raw_text.starts_with("RT"));
                let clean = r.clean_text.as_deref().unwrap_or("");
                prop_assert!(!clean.is_empty());
                prop_assert!(r.word_count.unwrap_or(0) > 3);
            }
        }

        #[test]
        fn output_is_subsequence_of_input(texts in prop::collection::vec(text_strategy(), 0..40)) {
            let records: Vec<_> = texts
                .iter()
                .enumerate()
                .map(|(i, t)| tweet(&i.to_string(), t))
                .collect();
            let positions: Vec<usize> = filter_rows(records)
                .iter()
                .map(|r| r.user_id.parse().unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
