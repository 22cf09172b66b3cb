//! Text analysis for tweets.
//!
//! - **Normalizer**: Cleans raw tweet text with an ordered rule pipeline
//! - **Words**: Counts words in normalized text

pub mod normalizer;
pub mod words;

pub use normalizer::{normalize, Rule, TweetNormalizer};
pub use words::word_count;
