//! Word counting over normalized text.
//!
//! The count is defined on the normalizer's output, where words are
//! separated by single ASCII spaces: `spaces + 1`. It is not a token count
//! for arbitrary text: the empty string counts as one word, and a tab does
//! not separate words.

use memchr::memchr_iter;

/// Number of space-separated words in normalized text.
///
/// ```
/// use tweetprep_core::analyzer::word_count;
///
/// assert_eq!(word_count("the quick brown fox"), 4);
/// assert_eq!(word_count(""), 1);
/// ```
#[inline]
#[must_use]
pub fn word_count(normalized: &str) -> usize {
    memchr_iter(b' ', normalized.as_bytes()).count() + 1
}
