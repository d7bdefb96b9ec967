//! Seam between the session logic and the XMPP wire implementation.

use std::time::Duration;

use {async_trait::async_trait, secrecy::Secret};

use crate::{Address, Error, Result, RoomAddress, XmppInputConfig};

/// Everything a [`Connector`] needs to open a client stream.
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    pub user: Address,
    pub password: Secret<String>,
    /// Explicit server; `None` resolves the domain of `user`.
    pub host: Option<String>,
    pub port: u16,
    pub security: StreamSecurity,
    pub connect_timeout: Duration,
}

/// How the client stream is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSecurity {
    /// Upgrade through StartTLS before authenticating.
    StartTls,
    /// Plain TCP; the password crosses the network in clear.
    Plaintext,
}

impl StreamSecurity {
    /// StartTLS unless plaintext was explicitly allowed and TLS not required.
    #[must_use]
    pub fn from_flags(use_tls: bool, allow_plaintext: bool) -> Self {
        if allow_plaintext && !use_tls {
            Self::Plaintext
        } else {
            Self::StartTls
        }
    }
}

impl ConnectSettings {
    pub fn from_config(config: &XmppInputConfig) -> Result<Self> {
        let user = Address::parse(&config.user)?;
        if user.node.is_none() {
            return Err(Error::invalid_address(
                &config.user,
                "user address needs a node",
            ));
        }
        Ok(Self {
            user,
            password: config.password.clone(),
            host: config
                .host
                .as_deref()
                .map(str::trim)
                .filter(|h| !h.is_empty())
                .map(String::from),
            port: config.port,
            security: StreamSecurity::from_flags(config.use_tls, config.allow_plaintext),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs.max(1)),
        })
    }

    /// The host the transport dials: the override, or the user's domain.
    pub fn target_host(&self) -> &str {
        self.host.as_deref().unwrap_or(&self.user.domain)
    }
}

/// Stanza-level message types relevant to routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Normal,
    Chat,
    Groupchat,
    Headline,
    Error,
}

/// A `<message>` as decoded by the transport.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Stanza `from`; for room traffic this is `room@service/nick`.
    pub from: Address,
    pub kind: MessageKind,
    pub body: Option<String>,
    /// Real address of a room occupant, when the room discloses it.
    pub real_sender: Option<Address>,
}

/// Events the transport surfaces after the session is online.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Message(IncomingMessage),
    /// `<presence type="error">`, e.g. a rejected room join.
    PresenceError { from: Address, reason: String },
    /// The stream closed. No further events follow.
    Disconnected { reason: String },
}

/// Opens client streams.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    /// Start a client stream. Resolution and authentication may continue
    /// inside [`Transport::wait_online`].
    async fn connect(&self, settings: &ConnectSettings) -> Result<Self::Transport>;
}

/// One live client stream.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Drive the stream until it is authenticated and bound, returning the
    /// bound address.
    async fn wait_online(&mut self) -> Result<Address>;

    /// Announce availability.
    async fn send_presence(&mut self) -> Result<()>;

    /// Send the join presence for `room`.
    async fn join_room(&mut self, room: &RoomAddress) -> Result<()>;

    /// Next inbound event, or `None` once the stream has ended.
    ///
    /// Must be cancel-safe: the run loop polls it inside `select!`.
    async fn next_event(&mut self) -> Option<TransportEvent>;
}
