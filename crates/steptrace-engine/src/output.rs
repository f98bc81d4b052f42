//! Frame output as JSON lines.

use steptrace_types::SessionFrame;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::EngineError;

/// Encode `frame` as one JSON line and flush it to `out`.
pub async fn write_frame<W>(out: &mut W, frame: &SessionFrame) -> Result<(), EngineError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(frame)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use steptrace_core::config::InspectorConfig;
    use steptrace_core::session::Session;
    use steptrace_types::Snapshot;

    use super::*;

    #[tokio::test]
    async fn frames_are_newline_delimited_json() {
        let mut session = Session::new(InspectorConfig::default());
        let mut out = Vec::new();

        let frame = session.apply_batch(vec![Snapshot::new(10)]);
        write_frame(&mut out, &frame).await.unwrap();
        let frame = session.apply_batch(vec![Snapshot::new(20)]);
        write_frame(&mut out, &frame).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let last: SessionFrame = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(last.step_count, 2);
        assert_eq!(last.latest_clock, Some(20));
    }
}
