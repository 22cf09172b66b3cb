//! Per-author recent-tweets context.
//!
//! Every record gets a `recent_context` string: its own clean text followed
//! by the clean texts of the same author's next older tweets, up to
//! `window_size` entries, each followed by the delimiter.
//!
//! ## How It Works
//!
//! ```text
//! input ──sort index by (user asc, time desc)──► [a3 a2 a1 | b2 b1]
//!                                                  └─run a─┘ └run b┘
//! window 2:  a3 → "a3 | a2 | "   a2 → "a2 | a1 | "   a1 → "a1 | "
//!            b2 → "b2 | b1 | "   b1 → "b1 | "
//! ```
//!
//! Windows are cut at the end of each author's run, so no context ever
//! mixes authors. The records come back in the sorted order.

use core::cmp::Ordering;
use core::ops::Range;

use smallvec::SmallVec;
use tracing::debug;
use tweetprep_types::{PipelineConfig, TweetRecord};

/// Builds `recent_context` for every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextBuilder {
    window_size: usize,
    delimiter: &'static str,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl ContextBuilder {
    /// Creates a builder with the window size and delimiter from `config`.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            window_size: config.window_size,
            delimiter: config.context_delimiter,
        }
    }

    /// Maximum number of tweets per context, anchor included.
    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Sorts `records` by author then recency and fills `recent_context`.
    ///
    /// Ties in `tweet_time` keep their input order. A record without
    /// `clean_text` contributes an empty entry. No record is dropped.
    pub fn build(&self, records: Vec<TweetRecord>) -> Vec<TweetRecord> {
        let order = Self::sorted_order(&records);
        let runs = Self::author_runs(&records, &order);

        let mut contexts = vec![String::new(); records.len()];
        for run in &runs {
            let group = &order[run.clone()];
            for (k, &anchor) in group.iter().enumerate() {
                contexts[anchor] = self.window_text(&records, &group[k..]);
            }
        }

        debug!(
            records = records.len(),
            groups = runs.len(),
            window_size = self.window_size,
            "built recent contexts"
        );

        let mut slots: Vec<Option<TweetRecord>> = records.into_iter().map(Some).collect();
        order
            .iter()
            .filter_map(|&i| {
                let mut record = slots[i].take()?;
                record.recent_context = Some(std::mem::take(&mut contexts[i]));
                Some(record)
            })
            .collect()
    }

    /// Concatenates the first `window_size` entries of `newest_first`.
    fn window_text(&self, records: &[TweetRecord], newest_first: &[usize]) -> String {
        let window: SmallVec<[&str; 8]> = newest_first
            .iter()
            .take(self.window_size)
            .map(|&i| records[i].clean_text_or_empty())
            .collect();

        let len: usize = window
            .iter()
            .map(|t| t.len() + self.delimiter.len())
            .sum();
        let mut out = String::with_capacity(len);
        for text in window {
            out.push_str(text);
            out.push_str(self.delimiter);
        }
        out
    }

    /// Index permutation ordering records by `(user_id asc, tweet_time desc)`.
    ///
    /// `sort_by` is stable, so equal keys stay in input order.
    pub(crate) fn sorted_order(records: &[TweetRecord]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| recency_order(&records[a], &records[b]));
        order
    }

    /// Splits a sorted permutation into runs of one author each.
    pub(crate) fn author_runs(records: &[TweetRecord], order: &[usize]) -> Vec<Range<usize>> {
        let mut runs = Vec::new();
        let Some(&first) = order.first() else {
            return runs;
        };

        let mut current = records[first].user_id.as_str();
        let mut start = 0usize;

        for (pos, &i) in order.iter().enumerate().skip(1) {
            let user = records[i].user_id.as_str();
            if user != current {
                runs.push(start..pos);
                start = pos;
                current = user;
            }
        }

        runs.push(start..order.len());
        runs
    }
}

#[inline]
fn recency_order(a: &TweetRecord, b: &TweetRecord) -> Ordering {
    a.user_id
        .cmp(&b.user_id)
        .then_with(|| b.tweet_time.cmp(&a.tweet_time))
}

/// Builds recent contexts with `window_size` and the default delimiter.
pub fn build_context(records: Vec<TweetRecord>, window_size: usize) -> Vec<TweetRecord> {
    ContextBuilder::new(&PipelineConfig::with_window(window_size)).build(records)
}
