//! Tweet Preprocessing Driver
//!
//! Runs the full preprocessing pipeline over a JSON Lines tweet dump and
//! writes the surviving, annotated records back out as JSON Lines.
//!
//! ## Input
//!
//! One JSON object per line with `user_id` (or `userid`), `tweet_time` and
//! `raw_text` (or `tweet_text`). Blank lines are skipped. The first row that
//! cannot be read stops the run with its line number.
//!
//! ## Usage
//!
//! ```bash
//! # Default window of 3 tweets
//! ./target/release/tweet_pipeline tweets.jsonl > cleaned.jsonl
//!
//! # Read stdin, combine 5 tweets per context
//! cat tweets.jsonl | ./target/release/tweet_pipeline - 5
//!
//! # Per-row drop reasons
//! RUST_LOG=tweetprep_core=trace ./target/release/tweet_pipeline tweets.jsonl
//! ```
//!
//! ## Output
//!
//! Records on stdout, sorted by author then newest first, each with
//! `clean_text`, `word_count` and `recent_context`. Logs go to stderr.

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tweetprep_core::{Pipeline, PipelineConfig, RawTweet, TweetRecord};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "tweetprep_core=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        bail!("Usage: tweet_pipeline <path|-> [window_size]");
    }

    let path = &args[1];
    let window_size = match args.get(2) {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("window_size must be a non-negative integer, got `{}`", raw))?,
        None => PipelineConfig::default().window_size,
    };

    let records = if path == "-" {
        read_records(io::stdin().lock(), "<stdin>")?
    } else {
        let file = File::open(path).with_context(|| format!("opening {}", path))?;
        read_records(BufReader::new(file), path)?
    };

    info!(path = %path, records = records.len(), window_size, "loaded tweets");

    let output = Pipeline::new(PipelineConfig::with_window(window_size)).run(records);
    info!("{}", output.filter_stats);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for record in &output.records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(())
}

fn read_records<R: BufRead>(reader: R, source: &str) -> Result<Vec<TweetRecord>> {
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.with_context(|| format!("{}:{}: read failed", source, line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        let raw: RawTweet = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed JSON", source, line_no))?;
        let record = TweetRecord::try_from(raw)
            .with_context(|| format!("{}:{}: invalid tweet", source, line_no))?;
        records.push(record);
    }

    Ok(records)
}
