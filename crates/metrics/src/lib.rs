//! Metrics collection and export for jabberfeed.
//!
//! All crates record through the `metrics` crate facade using the names in
//! this crate. With the `prometheus` feature enabled the binary can expose
//! them on an HTTP scrape endpoint; otherwise recording is a no-op.
//!
//! ```rust,ignore
//! use jabberfeed_metrics::{counter, xmpp};
//!
//! counter!(xmpp::MESSAGES_RECEIVED_TOTAL, "kind" => "direct").increment(1);
//! ```

mod definitions;
mod recorder;

pub use {
    definitions::*,
    recorder::{MetricsRecorderConfig, init_metrics},
};

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};
