//! Config schema: every section of `jabberfeed.toml`.

use {
    jabberfeed_codec::CodecKind,
    jabberfeed_pipeline::DecorateConfig,
    jabberfeed_xmpp::XmppInputConfig,
    serde::{Deserialize, Serialize},
    std::net::SocketAddr,
};

/// Default capacity of the output queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JabberfeedConfig {
    pub xmpp: XmppInputConfig,
    pub codec: CodecSection,
    pub decorate: DecorateConfig,
    pub output: OutputConfig,
    pub metrics: MetricsConfig,
}

/// `[codec]`: how message bodies become events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodecSection {
    pub kind: CodecKind,
}

/// `[output]`: the event queue and its stdout consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Events buffered before observers wait on the consumer.
    pub queue_capacity: usize,
    /// Pretty-print events instead of one JSON object per line.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pretty: false,
        }
    }
}

/// `[metrics]`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Prometheus scrape listener, e.g. `127.0.0.1:9898`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<SocketAddr>,
}
