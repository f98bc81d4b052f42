//! Feed reader task.
//!
//! Reads JSON lines from any async source and forwards each decoded batch
//! to the session task over a bounded channel. Malformed lines are logged
//! and skipped; they never stop the feed.

use steptrace_core::feed::{FeedError, parse_batch};
use steptrace_types::Snapshot;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Counters reported when the feed ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    /// Lines read, blank ones included.
    pub lines: usize,
    /// Batches forwarded to the session.
    pub batches: usize,
    /// Snapshots across all forwarded batches.
    pub snapshots: usize,
    /// Malformed lines skipped.
    pub skipped: usize,
}

/// Read `reader` to the end, sending one batch per non-blank line.
///
/// Stops early when the session side of `tx` is gone.
pub async fn read_feed<R>(
    reader: R,
    tx: mpsc::Sender<Vec<Snapshot>>,
) -> Result<FeedSummary, FeedError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut summary = FeedSummary::default();

    while let Some(line) = lines.next_line().await? {
        summary.lines = summary.lines.saturating_add(1);

        let batch = match parse_batch(&line, summary.lines) {
            Ok(batch) => batch,
            Err(e) => {
                summary.skipped = summary.skipped.saturating_add(1);
                warn!(error = %e, "skipping malformed feed line");
                continue;
            }
        };
        if batch.is_empty() {
            continue;
        }

        summary.batches = summary.batches.saturating_add(1);
        summary.snapshots = summary.snapshots.saturating_add(batch.len());
        if tx.send(batch).await.is_err() {
            debug!("session closed, stopping feed reader");
            break;
        }
    }

    Ok(summary)
}
