//! Metric name and label definitions.
//!
//! Centralizing the names keeps every crate reporting under the same keys.

/// XMPP session and observer metrics
pub mod xmpp {
    /// Total number of message stanzas received, labelled by `kind` (direct/room)
    pub const MESSAGES_RECEIVED_TOTAL: &str = "jabberfeed_xmpp_messages_received_total";
    /// Messages dropped before decoding (no body, error type, unknown room)
    pub const MESSAGES_FILTERED_TOTAL: &str = "jabberfeed_xmpp_messages_filtered_total";
    /// Successful room join requests
    pub const ROOM_JOINS_TOTAL: &str = "jabberfeed_xmpp_room_joins_total";
    /// Failed room joins (invalid address, send failure, server rejection)
    pub const ROOM_JOIN_FAILURES_TOTAL: &str = "jabberfeed_xmpp_room_join_failures_total";
    /// Rooms currently routed to an observer
    pub const ROOMS_ACTIVE: &str = "jabberfeed_xmpp_rooms_active";
    /// Session establishment attempts, labelled by `result`
    pub const CONNECTS_TOTAL: &str = "jabberfeed_xmpp_connects_total";
}

/// Decode-enrich-publish metrics
pub mod pipeline {
    /// Events handed to the output queue
    pub const EVENTS_PUBLISHED_TOTAL: &str = "jabberfeed_pipeline_events_published_total";
    /// Bodies the codec failed to decode, labelled by `codec`
    pub const DECODE_ERRORS_TOTAL: &str = "jabberfeed_pipeline_decode_errors_total";
    /// Time spent decoding and publishing one body, in seconds
    pub const PROCESS_DURATION_SECONDS: &str = "jabberfeed_pipeline_process_duration_seconds";
}

/// Common label keys
pub mod labels {
    pub const KIND: &str = "kind";
    pub const CODEC: &str = "codec";
    pub const RESULT: &str = "result";
}

/// Histogram buckets
pub mod buckets {
    use once_cell::sync::Lazy;

    /// Per-body processing duration buckets (in seconds)
    /// Covers 10µs to 1s
    pub static PROCESS_DURATION: Lazy<Vec<f64>> = Lazy::new(|| {
        vec![
            0.00001, 0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
        ]
    });
}
