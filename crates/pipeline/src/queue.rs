use {async_trait::async_trait, jabberfeed_common::Event, tokio::sync::mpsc};

use crate::{Error, Result};

/// Append-only sink shared by every observer.
///
/// Implementations must accept concurrent callers. Backpressure is the
/// implementation's own policy; `enqueue` may wait for capacity.
#[async_trait]
pub trait OutputQueue: Send + Sync {
    async fn enqueue(&self, event: Event) -> Result<()>;
}

/// Bounded in-process queue backed by a tokio mpsc channel.
#[derive(Debug, Clone)]
pub struct ChannelQueue {
    tx: mpsc::Sender<Event>,
}

impl ChannelQueue {
    /// Create a queue holding at most `capacity` pending events, returning
    /// the receiving end for the downstream consumer.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl OutputQueue for ChannelQueue {
    async fn enqueue(&self, event: Event) -> Result<()> {
        self.tx.send(event).await.map_err(|_| Error::QueueClosed)
    }
}
