use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Connecting, negotiating TLS, or authenticating failed. Fatal.
    #[error("failed to establish xmpp session: {reason}")]
    Connection { reason: String },

    /// A single room could not be joined. Reported, never fatal.
    #[error("failed to join room {room}: {reason}")]
    Join { room: String, reason: String },

    /// The transport dropped an established session. Fatal to the run loop.
    #[error("xmpp transport disconnected: {reason}")]
    Disconnected { reason: String },

    #[error("invalid xmpp address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    /// Sending a stanza failed.
    #[error("xmpp transport error: {message}")]
    Transport { message: String },

    #[error(transparent)]
    Pipeline(#[from] jabberfeed_pipeline::Error),

    #[error("observer task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    #[must_use]
    pub fn connection(reason: impl std::fmt::Display) -> Self {
        Self::Connection {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn join(room: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Join {
            room: room.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn disconnected(reason: impl std::fmt::Display) -> Self {
        Self::Disconnected {
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn invalid_address(address: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn transport(message: impl std::fmt::Display) -> Self {
        Self::Transport {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
