//! Per-observer workers.
//!
//! Each observer (the direct-message observer, and one per joined room) owns
//! a bounded channel drained by a dedicated task, so messages for one
//! observer are processed strictly in arrival order while different
//! observers run concurrently.

use std::fmt;

use {
    jabberfeed_pipeline::Pipeline,
    tokio::{sync::mpsc, task::JoinSet},
    tracing::{Instrument, debug, info_span},
};

use crate::{Address, Result};

/// Size of each observer's inbound buffer.
pub const OBSERVER_CHANNEL_SIZE: usize = 256;

/// Which stream of messages an observer handles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Direct,
    /// Bare room address.
    Room(String),
}

impl Scope {
    pub fn room(&self) -> Option<&str> {
        match self {
            Self::Direct => None,
            Self::Room(room) => Some(room),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Room(_) => "room",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct messages"),
            Self::Room(room) => write!(f, "room {room}"),
        }
    }
}

/// A message that passed filtering, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub sender: Address,
    pub body: String,
}

/// Sending side of an observer.
#[derive(Debug, Clone)]
pub struct ObserverHandle {
    scope: Scope,
    tx: mpsc::Sender<InboundMessage>,
}

impl ObserverHandle {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Queue a message for this observer, waiting for buffer space.
    ///
    /// Returns `false` when the worker has already stopped.
    pub async fn deliver(&self, message: InboundMessage) -> bool {
        self.tx.send(message).await.is_ok()
    }
}

/// Spawn the worker for `scope` onto `workers` and return its handle.
///
/// The worker exits cleanly once every handle is dropped, and with an error
/// if the output queue closes.
pub fn spawn(
    scope: Scope,
    pipeline: Pipeline,
    workers: &mut JoinSet<Result<()>>,
) -> ObserverHandle {
    let (tx, rx) = mpsc::channel(OBSERVER_CHANNEL_SIZE);
    let span = info_span!("observer", scope = scope.kind(), room = scope.room());
    workers.spawn(run_worker(scope.clone(), pipeline, rx).instrument(span));
    ObserverHandle { scope, tx }
}

async fn run_worker(
    scope: Scope,
    pipeline: Pipeline,
    mut rx: mpsc::Receiver<InboundMessage>,
) -> Result<()> {
    debug!("observer started");
    while let Some(message) = rx.recv().await {
        let from = message.sender.to_string();
        pipeline
            .process(&message.body, &from, scope.room())
            .await?;
    }
    debug!("observer stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        jabberfeed_codec::PlainCodec,
        jabberfeed_pipeline::{ChannelQueue, FieldDecorator},
        std::sync::Arc,
    };

    fn message(sender: &str, body: &str) -> InboundMessage {
        InboundMessage {
            sender: Address::parse(sender).unwrap(),
            body: body.into(),
        }
    }

    #[tokio::test]
    async fn worker_preserves_order_and_scope() {
        let (queue, mut rx) = ChannelQueue::bounded(16);
        let pipeline = Pipeline::new(
            Arc::new(PlainCodec),
            Arc::new(FieldDecorator::default()),
            Arc::new(queue),
        );
        let mut workers = JoinSet::new();
        let handle = spawn(Scope::Room("r@muc.x".into()), pipeline, &mut workers);

        for n in 0..5 {
            assert!(handle.deliver(message("a@x/y", &n.to_string())).await);
        }
        drop(handle);
        workers.join_next().await.unwrap().unwrap().unwrap();

        for n in 0..5 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.get_str("message"), Some(n.to_string().as_str()));
            assert_eq!(event.get_str("room"), Some("r@muc.x"));
        }
    }

    #[tokio::test]
    async fn worker_fails_when_queue_closes() {
        let (queue, rx) = ChannelQueue::bounded(1);
        drop(rx);
        let pipeline = Pipeline::new(
            Arc::new(PlainCodec),
            Arc::new(FieldDecorator::default()),
            Arc::new(queue),
        );
        let mut workers = JoinSet::new();
        let handle = spawn(Scope::Direct, pipeline, &mut workers);
        handle.deliver(message("a@x/y", "hi")).await;

        let result = workers.join_next().await.unwrap().unwrap();
        assert!(matches!(result, Err(crate::Error::Pipeline(_))));
    }

    #[test]
    fn scope_labels() {
        assert_eq!(Scope::Direct.room(), None);
        assert_eq!(Scope::Room("r@m".into()).room(), Some("r@m"));
        assert_eq!(Scope::Room("r@m".into()).to_string(), "room r@m");
    }
}
