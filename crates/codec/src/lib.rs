//! Codecs turning a raw message body into zero or more events.
//!
//! A codec is invoked once per inbound body and yields events synchronously
//! through a callback, so a single body may produce none, one, or many events.

pub mod error;
pub mod json;
pub mod line;
pub mod plain;

use {
    jabberfeed_common::Event,
    serde::{Deserialize, Serialize},
    std::sync::Arc,
};

pub use {
    error::{Error, Result},
    json::JsonCodec,
    line::LineCodec,
    plain::PlainCodec,
};

/// Decode a raw body into events.
///
/// Implementations hold no per-call state, so one instance can be shared by
/// every observer.
pub trait Codec: Send + Sync {
    /// Codec identifier used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Decode `body`, calling `emit` once per produced event.
    ///
    /// Events emitted before an error is returned are still valid.
    fn decode(&self, body: &str, emit: &mut dyn FnMut(Event)) -> Result<()>;
}

/// Built-in codec selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// The whole body becomes the `message` field of one event.
    #[default]
    Plain,
    /// One event per non-empty line.
    Line,
    /// The body is a JSON object, or an array of objects.
    Json,
}

impl CodecKind {
    #[must_use]
    pub fn build(self) -> Arc<dyn Codec> {
        match self {
            Self::Plain => Arc::new(PlainCodec),
            Self::Line => Arc::new(LineCodec),
            Self::Json => Arc::new(JsonCodec),
        }
    }
}

/// Collect every event `codec` yields for `body`.
#[cfg(test)]
pub(crate) fn decode_all(codec: &dyn Codec, body: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    codec.decode(body, &mut |event| events.push(event))?;
    Ok(events)
}
