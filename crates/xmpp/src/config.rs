use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Default client-to-server port.
pub const DEFAULT_PORT: u16 = 5222;

/// Configuration for the XMPP input.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct XmppInputConfig {
    /// The user or resource address to log in as, like `foo@example.com`.
    pub user: String,

    /// Password for `user`.
    #[serde(serialize_with = "serialize_secret")]
    pub password: Secret<String>,

    /// Multi-user chat rooms to join, as `room@conference.example.com/nick`.
    /// Without a nick the user's node is used.
    pub rooms: Vec<String>,

    /// Server to connect to. When unset, the domain of `user` is resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    pub port: u16,

    /// Require StartTLS, even when `allow_plaintext` is set.
    pub use_tls: bool,

    /// Connect over plain TCP instead of StartTLS. The password is then
    /// sent unencrypted, so keep this for local test servers.
    pub allow_plaintext: bool,

    /// Upper bound on connect + authenticate, in seconds.
    pub connect_timeout_secs: u64,

    /// Deprecated: use the log level instead. Enables verbose transport logs.
    pub debug: bool,
}

impl std::fmt::Debug for XmppInputConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmppInputConfig")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("rooms", &self.rooms)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("allow_plaintext", &self.allow_plaintext)
            .finish_non_exhaustive()
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for XmppInputConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: Secret::new(String::new()),
            rooms: Vec::new(),
            host: None,
            port: DEFAULT_PORT,
            use_tls: false,
            allow_plaintext: false,
            connect_timeout_secs: 30,
            debug: false,
        }
    }
}
