//! Session manager: one authenticated client stream plus the observer
//! routing table built on top of it.

use std::collections::HashMap;

use {
    jabberfeed_pipeline::Pipeline,
    tokio::task::JoinSet,
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use jabberfeed_metrics::{counter, labels, xmpp as xmpp_metrics};

use crate::{
    Address, Error, Result, RoomAddress,
    observer::{self, ObserverHandle, Scope},
    transport::{ConnectSettings, Connector, Transport},
};

/// Lifecycle of a session. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    NotConnected,
    Connected,
    Authenticated,
    PresenceAnnounced,
}

/// Observers registered against the session, keyed by what they receive.
#[derive(Debug, Default)]
pub struct Routes {
    direct: Option<ObserverHandle>,
    rooms: HashMap<String, ObserverHandle>,
}

impl Routes {
    pub fn direct(&self) -> Option<&ObserverHandle> {
        self.direct.as_ref()
    }

    /// Observer for a bare room address.
    pub fn room(&self, room: &str) -> Option<&ObserverHandle> {
        self.rooms.get(room)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Stop routing to `room`. Its worker finishes once drained.
    pub fn remove_room(&mut self, room: &str) -> Option<ObserverHandle> {
        self.rooms.remove(room)
    }

    pub(crate) fn insert(&mut self, handle: ObserverHandle) -> Option<ObserverHandle> {
        match handle.scope().clone() {
            Scope::Direct => self.direct.replace(handle),
            Scope::Room(room) => self.rooms.insert(room, handle),
        }
    }

    /// Drop every handle so workers drain and exit.
    pub fn clear(&mut self) {
        self.direct = None;
        self.rooms.clear();
    }
}

/// A live, authenticated session.
pub struct Session<T: Transport> {
    pub(crate) transport: T,
    pub(crate) routes: Routes,
    pub(crate) workers: JoinSet<Result<()>>,
    state: SessionState,
    settings: ConnectSettings,
    bound: Address,
}

impl<T: Transport> Session<T> {
    /// Connect, authenticate, and announce availability exactly once.
    ///
    /// Any failure along the way, including the connect timeout elapsing, is
    /// an [`Error::Connection`]. There is no retry.
    pub async fn connect<C>(connector: &C, settings: ConnectSettings) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let result = Self::establish(connector, settings).await;

        #[cfg(feature = "metrics")]
        counter!(
            xmpp_metrics::CONNECTS_TOTAL,
            labels::RESULT => if result.is_ok() { "ok" } else { "error" }
        )
        .increment(1);

        result
    }

    async fn establish<C>(connector: &C, settings: ConnectSettings) -> Result<Self>
    where
        C: Connector<Transport = T>,
    {
        let mut state = SessionState::NotConnected;
        info!(
            user = %settings.user,
            host = settings.target_host(),
            port = settings.port,
            security = ?settings.security,
            "connecting to xmpp server"
        );

        let online = async {
            let mut transport = connector.connect(&settings).await?;
            state = SessionState::Connected;
            debug!(?state, "stream opened");

            let bound = transport.wait_online().await?;
            Ok::<_, Error>((transport, bound))
        };

        let (mut transport, bound) = tokio::time::timeout(settings.connect_timeout, online)
            .await
            .map_err(|_| {
                Error::connection(format!(
                    "timed out after {}s",
                    settings.connect_timeout.as_secs()
                ))
            })?
            .map_err(into_connection_error)?;
        state = SessionState::Authenticated;
        debug!(?state, %bound, "stream authenticated");

        transport
            .send_presence()
            .await
            .map_err(into_connection_error)?;
        state = SessionState::PresenceAnnounced;
        info!(%bound, "xmpp session online");

        Ok(Self {
            transport,
            routes: Routes::default(),
            workers: JoinSet::new(),
            state,
            settings,
            bound,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Address the server bound this session to.
    pub fn bound_address(&self) -> &Address {
        &self.bound
    }

    pub fn settings(&self) -> &ConnectSettings {
        &self.settings
    }

    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Install an observer for `scope`, replacing any previous one.
    pub fn observe(&mut self, scope: Scope, pipeline: Pipeline) {
        let handle = observer::spawn(scope, pipeline, &mut self.workers);
        if let Some(previous) = self.routes.insert(handle) {
            warn!(scope = %previous.scope(), "replaced existing observer");
        }
    }

    /// Stop routing messages for `room`.
    pub fn unobserve_room(&mut self, room: &str) {
        self.routes.remove_room(room);
    }

    /// Send the join presence for `room`.
    pub async fn join_room(&mut self, room: &RoomAddress) -> Result<()> {
        self.transport.join_room(room).await
    }
}

fn into_connection_error(error: Error) -> Error {
    match error {
        Error::Connection { .. } => error,
        other => Error::connection(other),
    }
}
