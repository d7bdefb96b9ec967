//! In-memory transport for exercising the session logic without a server.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use {async_trait::async_trait, secrecy::Secret, tokio::sync::mpsc};

use crate::{
    Address, Error, Result, RoomAddress,
    transport::{
        ConnectSettings, Connector, IncomingMessage, MessageKind, StreamSecurity, Transport,
        TransportEvent,
    },
};

/// Stanzas the session sent through the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Presence,
    Join(String),
}

pub type SentLog = Arc<Mutex<Vec<Sent>>>;

enum Online {
    Bound(Address),
    Reject(String),
    Hang,
}

pub struct MockTransport {
    online: Online,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    sent: SentLog,
    failing_joins: HashSet<String>,
}

pub struct MockConnector {
    transport: Mutex<Option<MockTransport>>,
}

impl MockConnector {
    fn with(online: Online) -> (Self, mpsc::UnboundedSender<TransportEvent>, SentLog) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sent = SentLog::default();
        let transport = MockTransport {
            online,
            events: rx,
            sent: Arc::clone(&sent),
            failing_joins: HashSet::new(),
        };
        (
            Self {
                transport: Mutex::new(Some(transport)),
            },
            tx,
            sent,
        )
    }

    /// A server that authenticates and binds `bound`.
    pub fn online(bound: &str) -> (Self, mpsc::UnboundedSender<TransportEvent>, SentLog) {
        Self::with(Online::Bound(Address::parse(bound).unwrap()))
    }

    /// A server that rejects authentication.
    pub fn rejecting(reason: &str) -> Self {
        Self::with(Online::Reject(reason.into())).0
    }

    /// A server that never finishes the handshake.
    pub fn hanging() -> Self {
        Self::with(Online::Hang).0
    }

    /// Make sending the join presence for the bare `room` fail.
    pub fn failing_join(self, room: &str) -> Self {
        if let Some(transport) = self.transport.lock().unwrap().as_mut() {
            transport.failing_joins.insert(room.to_string());
        }
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, _settings: &ConnectSettings) -> Result<MockTransport> {
        self.transport
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Error::connection("mock transport already used"))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn wait_online(&mut self) -> Result<Address> {
        match self.online {
            Online::Bound(ref address) => Ok(address.clone()),
            Online::Reject(ref reason) => Err(Error::connection(reason)),
            Online::Hang => std::future::pending().await,
        }
    }

    async fn send_presence(&mut self) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Presence);
        Ok(())
    }

    async fn join_room(&mut self, room: &RoomAddress) -> Result<()> {
        if self.failing_joins.contains(&room.room()) {
            return Err(Error::transport("connection reset"));
        }
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Join(room.occupant().to_string()));
        Ok(())
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

pub fn settings() -> ConnectSettings {
    ConnectSettings {
        user: Address::parse("bot@example.com").unwrap(),
        password: Secret::new("secret".into()),
        host: None,
        port: 5222,
        security: StreamSecurity::StartTls,
        connect_timeout: Duration::from_secs(5),
    }
}

pub fn message(from: &str, kind: MessageKind, body: Option<&str>) -> TransportEvent {
    TransportEvent::Message(IncomingMessage {
        from: Address::parse(from).unwrap(),
        kind,
        body: body.map(String::from),
        real_sender: None,
    })
}

pub fn room_message(room: &str, nick: &str, real: Option<&str>, body: &str) -> TransportEvent {
    TransportEvent::Message(IncomingMessage {
        from: Address::parse(&format!("{room}/{nick}")).unwrap(),
        kind: MessageKind::Groupchat,
        body: Some(body.into()),
        real_sender: real.map(|r| Address::parse(r).unwrap()),
    })
}
