//! Downstream consumer: writes queued events to stdout.

use {
    jabberfeed_common::Event,
    tokio::{
        io::{AsyncWrite, AsyncWriteExt},
        sync::mpsc,
    },
    tracing::debug,
};

/// Write every event from `rx` to `out`, one JSON document per line (or
/// pretty-printed), until all queue senders are gone.
///
/// Returns how many events were written.
pub async fn drain_events<W>(
    mut rx: mpsc::Receiver<Event>,
    mut out: W,
    pretty: bool,
) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(event) = rx.recv().await {
        let mut line = if pretty {
            serde_json::to_vec_pretty(&event)?
        } else {
            serde_json::to_vec(&event)?
        };
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
        written += 1;
    }
    debug!(written, "output queue closed");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::Value};

    #[tokio::test]
    async fn writes_json_lines_until_closed() {
        let (tx, rx) = mpsc::channel(4);
        let mut first = Event::with_message("hello");
        first.set("from", "bob@example.com/laptop");
        tx.send(first).await.unwrap();
        tx.send(Event::with_message("again")).await.unwrap();
        drop(tx);

        let mut out = Vec::new();
        let written = drain_events(rx, &mut out, false).await.unwrap();
        assert_eq!(written, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["message"], "hello");
        assert_eq!(lines[0]["from"], "bob@example.com/laptop");
        assert_eq!(lines[1]["message"], "again");
    }

    #[tokio::test]
    async fn pretty_output_spans_lines() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(Event::with_message("x")).await.unwrap();
        drop(tx);

        let mut out = Vec::new();
        drain_events(rx, &mut out, true).await.unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().count() > 1);
        assert!(text.ends_with("}\n"));
    }
}
