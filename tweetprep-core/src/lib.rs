//! Tweet dataset preprocessing.
//!
//! Three stages, normally run in this order:
//!
//! 1. [`analyzer`]: cleans raw tweet text (URLs, mentions, numbers, symbols)
//! 2. [`filter`]: drops retweets and tweets with too few words
//! 3. [`context`]: attaches each tweet's author-local recent-tweets context
//!
//! [`pipeline::Pipeline`] runs all three over a `Vec<TweetRecord>`.

pub mod analyzer;
pub mod context;
pub mod filter;
pub mod pipeline;

pub use analyzer::{normalize, word_count, Rule, TweetNormalizer};
pub use context::{build_context, ContextBuilder};
pub use filter::{filter_rows, DropReason, FilterStats, RowFilter};
pub use pipeline::{Pipeline, PipelineOutput};
pub use tweetprep_types::{
    parse_tweet_time, PipelineConfig, RawTweet, RecordError, TweetRecord, UserId,
};
