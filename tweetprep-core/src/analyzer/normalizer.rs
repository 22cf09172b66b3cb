use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use smallvec::SmallVec;

/// Word characters: letters, numbers, underscore. Combining marks, variation
/// selectors and joiners are not word characters.
const WORD: &str = r"\p{L}\p{N}_";

/// Whitespace: Unicode White_Space plus the separators U+001C..U+001F.
const SPACE: &str = r"\s\x1C-\x1F";

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"http[^{SPACE}]+")).unwrap());
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"@.*?[{SPACE}]")).unwrap());
static WORD_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[{WORD}]+")).unwrap());
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\p{Nd}+$").unwrap());
static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[^{WORD}{SPACE}]")).unwrap());
static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}").unwrap());

static DEFAULT: LazyLock<TweetNormalizer> = LazyLock::new(TweetNormalizer::default);

/// A single rewrite step of the tweet cleaning pipeline.
///
/// Rules are pure `&str -> Cow<str>` transforms. They borrow when nothing
/// changes, so a rule that does not apply costs one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Drops `http` plus the non-whitespace run after it.
    StripUrls,
    /// `\n` becomes a space.
    NewlinesToSpace,
    /// `\r` becomes a space.
    CarriageReturnsToSpace,
    /// `'t` becomes ` not`, anywhere in the text (`can't` -> `can not`).
    ExpandNegation,
    /// `@name` plus the whitespace ending it becomes one space.
    ///
    /// A mention that ends the text has no terminating whitespace and is
    /// left for `StripSymbols`, which only removes the `@`.
    StripMentions,
    /// Digit-only words become a space. When such a word ends the text, the
    /// non-word run before it goes with it (`"Tweet #42"` -> `"Tweet "`).
    StripNumbers,
    /// Removes everything that is neither a word character nor whitespace,
    /// including emoji residue such as U+FE0F and U+200D.
    StripSymbols,
    /// Trims spaces, collapses space runs, then trims all whitespace.
    CollapseSpaces,
}

impl Rule {
    /// The cleaning pipeline in application order.
    pub const PIPELINE: [Rule; 8] = [
        Rule::StripUrls,
        Rule::NewlinesToSpace,
        Rule::CarriageReturnsToSpace,
        Rule::ExpandNegation,
        Rule::StripMentions,
        Rule::StripNumbers,
        Rule::StripSymbols,
        Rule::CollapseSpaces,
    ];

    /// Applies this rule to `input`.
    ///
    /// Returns `Cow::Borrowed` only when the text is unchanged.
    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        match self {
            Rule::StripUrls => URL_RE.replace_all(input, ""),
            Rule::NewlinesToSpace => replace_literal(input, "\n", " "),
            Rule::CarriageReturnsToSpace => replace_literal(input, "\r", " "),
            Rule::ExpandNegation => replace_literal(input, "'t", " not"),
            Rule::StripMentions => MENTION_RE.replace_all(input, " "),
            Rule::StripNumbers => strip_numbers(input),
            Rule::StripSymbols => SYMBOL_RE.replace_all(input, ""),
            Rule::CollapseSpaces => collapse_spaces(input),
        }
    }
}

#[inline]
fn replace_literal<'a>(input: &'a str, from: &str, to: &str) -> Cow<'a, str> {
    if input.contains(from) {
        Cow::Owned(input.replace(from, to))
    } else {
        Cow::Borrowed(input)
    }
}

#[inline]
fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

fn strip_numbers(input: &str) -> Cow<'_, str> {
    let mut out = String::new();
    let mut copied = 0usize;
    let mut prev_end = 0usize;
    let mut changed = false;

    for word in WORD_RUN_RE.find_iter(input) {
        if DIGITS_RE.is_match(word.as_str()) {
            let start = if word.end() == input.len() && word.start() > prev_end {
                prev_end
            } else {
                word.start()
            };
            out.push_str(&input[copied..start]);
            out.push(' ');
            copied = word.end();
            changed = true;
        }
        prev_end = word.end();
    }

    if !changed {
        return Cow::Borrowed(input);
    }
    out.push_str(&input[copied..]);
    Cow::Owned(out)
}

fn collapse_spaces(input: &str) -> Cow<'_, str> {
    let collapsed = SPACE_RUN_RE.replace_all(input.trim_matches(' '), " ");
    let out = collapsed.trim_matches(is_space);
    // Trimming and collapsing only ever shrink the text.
    if out.len() == input.len() {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(out.to_owned())
    }
}

/// Tweet text cleaner.
///
/// Runs an ordered list of [`Rule`]s left to right; each rule sees the
/// residue of the previous ones. The default list is [`Rule::PIPELINE`]:
///
/// - Drops URLs, then turns line breaks into spaces
/// - Expands `'t` to ` not`
/// - Drops `@mentions` and standalone numbers
/// - Strips punctuation, symbols and emoji, then collapses spaces
///
/// Case is preserved. Every input, including `""`, yields a (possibly
/// empty) string.
///
/// # Examples
///
/// ```
/// use tweetprep_core::analyzer::TweetNormalizer;
///
/// let normalizer = TweetNormalizer::default();
/// assert_eq!(
///     normalizer.normalize("@jack I can't wait!! https://t.co/x 2 days"),
///     "I can not wait days"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TweetNormalizer {
    rules: SmallVec<[Rule; 8]>,
}

impl Default for TweetNormalizer {
    fn default() -> Self {
        Self::with_rules(Rule::PIPELINE)
    }
}

impl TweetNormalizer {
    /// Creates a normalizer running `rules` in the given order.
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// The rules this normalizer applies, in order.
    #[inline]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Normalizes text into an existing String buffer.
    ///
    /// Clears the buffer before writing and keeps its capacity when the
    /// result fits.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.push_str(input);

        for rule in &self.rules {
            let next = match rule.apply(out) {
                Cow::Borrowed(_) => continue,
                Cow::Owned(next) => next,
            };
            out.clear();
            out.push_str(&next);
        }
    }

    /// Normalizes text and returns a new String.
    #[inline]
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }
}

/// Normalizes `text` with the default rule pipeline.
#[inline]
pub fn normalize(text: &str) -> String {
    DEFAULT.normalize(text)
}
