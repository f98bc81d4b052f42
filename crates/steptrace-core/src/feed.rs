//! JSON-lines snapshot feed decoding.
//!
//! Each non-blank line is either one snapshot object or an array of
//! snapshots delivered together as one batch.

use serde::Deserialize;
use steptrace_types::Snapshot;

/// Errors raised while reading the snapshot feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Failed to read from the feed source.
    #[error("failed to read feed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A line was not a snapshot or an array of snapshots.
    #[error("malformed feed line {line}: {source}")]
    Json {
        /// One-based line number within the feed.
        line: usize,
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeedLine {
    Batch(Vec<Snapshot>),
    Single(Snapshot),
}

/// Decode one feed line into a batch. Blank lines decode to an empty
/// batch.
///
/// # Errors
///
/// Returns [`FeedError::Json`] tagged with `line_number` when the line is
/// neither a snapshot object nor an array of them.
pub fn parse_batch(line: &str, line_number: usize) -> Result<Vec<Snapshot>, FeedError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<FeedLine>(trimmed) {
        Ok(FeedLine::Batch(batch)) => Ok(batch),
        Ok(FeedLine::Single(snapshot)) => Ok(vec![snapshot]),
        Err(source) => Err(FeedError::Json {
            line: line_number,
            source,
        }),
    }
}
