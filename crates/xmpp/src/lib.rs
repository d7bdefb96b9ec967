//! XMPP input for jabberfeed.
//!
//! Connects as a client identity, optionally joins multi-user chat rooms,
//! and turns every inbound chat message into events published through a
//! [`Pipeline`](jabberfeed_pipeline::Pipeline).
//!
//! The wire protocol is handled by `tokio-xmpp` behind the [`Transport`]
//! trait; everything above it (session lifecycle, room subscriptions,
//! observers, routing, run loop) is transport-agnostic.

pub mod address;
pub mod client;
pub mod config;
pub mod direct;
pub mod error;
pub mod handlers;
pub mod input;
pub mod observer;
pub mod rooms;
pub mod run;
pub mod session;
pub mod transport;

#[cfg(test)]
mod testing;

pub use {
    address::{Address, RoomAddress},
    config::XmppInputConfig,
    error::{Error, Result},
    input::XmppInput,
    session::{Session, SessionState},
    transport::{ConnectSettings, Connector, StreamSecurity, Transport, TransportEvent},
};
