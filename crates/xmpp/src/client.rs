//! [`Transport`] backed by `tokio-xmpp`.

use {
    async_trait::async_trait,
    futures::StreamExt,
    secrecy::ExposeSecret,
    tokio_xmpp::{
        Client, Event, Stanza,
        connect::DnsConfig,
        jid::Jid,
        minidom::Element,
        parsers::{
            message::{Lang, Message, MessageType},
            muc::{Muc, MucUser},
            presence::{Presence, Type as PresenceType},
            stanza_error::StanzaError,
        },
        xmlstream::Timeouts,
    },
    tracing::{debug, trace},
};

use crate::{
    Address, Error, Result, RoomAddress,
    transport::{
        ConnectSettings, Connector, IncomingMessage, MessageKind, StreamSecurity, Transport,
        TransportEvent,
    },
};

const CLIENT_SRV: &str = "_xmpp-client._tcp";

/// Opens client streams with `tokio-xmpp`.
///
/// Streams are upgraded through StartTLS unless the settings ask for
/// plaintext.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioXmppConnector;

#[async_trait]
impl Connector for TokioXmppConnector {
    type Transport = TokioXmppTransport;

    async fn connect(&self, settings: &ConnectSettings) -> Result<TokioXmppTransport> {
        let jid = to_jid(&settings.user)?;
        let password = settings.password.expose_secret().clone();
        let dns = match settings.host.as_deref() {
            Some(host) => DnsConfig::no_srv(host, settings.port),
            None => DnsConfig::srv(&settings.user.domain, CLIENT_SRV, settings.port),
        };

        let client = match settings.security {
            StreamSecurity::StartTls => {
                Client::new_starttls(jid, password, dns, Timeouts::default())
            },
            StreamSecurity::Plaintext => {
                Client::new_plaintext(jid, password, dns, Timeouts::default())
            },
        };
        Ok(TokioXmppTransport { client })
    }
}

/// A live `tokio-xmpp` client stream.
pub struct TokioXmppTransport {
    client: Client,
}

impl TokioXmppTransport {
    async fn send(&mut self, stanza: impl Into<Stanza>) -> Result<()> {
        self.client
            .send_stanza(stanza.into())
            .await
            .map(drop)
            .map_err(Error::transport)
    }
}

#[async_trait]
impl Transport for TokioXmppTransport {
    async fn wait_online(&mut self) -> Result<Address> {
        while let Some(event) = self.client.next().await {
            match event {
                Event::Online { bound_jid, .. } => return from_jid(&bound_jid),
                Event::Disconnected(e) => return Err(Error::connection(e)),
                Event::Stanza(stanza) => {
                    trace!(?stanza, "stanza before session was online");
                },
            }
        }
        Err(Error::connection("stream closed during negotiation"))
    }

    async fn send_presence(&mut self) -> Result<()> {
        self.send(Presence::new(PresenceType::None)).await
    }

    async fn join_room(&mut self, room: &RoomAddress) -> Result<()> {
        let occupant = to_jid(&room.occupant())?;
        let presence = Presence::new(PresenceType::None)
            .with_to(occupant)
            .with_payloads(vec![Muc::new().into()]);
        self.send(presence).await
    }

    async fn next_event(&mut self) -> Option<TransportEvent> {
        loop {
            match self.client.next().await? {
                Event::Stanza(Stanza::Message(message)) => {
                    if let Some(event) = convert_message(message) {
                        return Some(event);
                    }
                },
                Event::Stanza(Stanza::Presence(presence)) => {
                    if let Some(event) = convert_presence(presence) {
                        return Some(event);
                    }
                },
                Event::Stanza(Stanza::Iq(iq)) => {
                    debug!(id = iq.id(), from = ?iq.from(), "iq stanza (unhandled)");
                },
                Event::Disconnected(e) => {
                    return Some(TransportEvent::Disconnected {
                        reason: e.to_string(),
                    });
                },
                Event::Online { resumed, .. } => {
                    debug!(resumed, "stream came back online");
                },
            }
        }
    }
}

fn to_jid(address: &Address) -> Result<Jid> {
    let text = address.to_string();
    text.parse::<Jid>()
        .map_err(|e| Error::invalid_address(text, e))
}

fn from_jid(jid: &Jid) -> Result<Address> {
    Address::parse(&jid.to_string())
}

fn message_kind(kind: &MessageType) -> MessageKind {
    match kind {
        MessageType::Chat => MessageKind::Chat,
        MessageType::Groupchat => MessageKind::Groupchat,
        MessageType::Headline => MessageKind::Headline,
        MessageType::Error => MessageKind::Error,
        MessageType::Normal => MessageKind::Normal,
    }
}

fn first_payload<T: TryFrom<Element>>(payloads: &[Element]) -> Option<T> {
    payloads.iter().find_map(|el| T::try_from(el.clone()).ok())
}

fn convert_message(message: Message) -> Option<TransportEvent> {
    let Some(from) = message.from.as_ref() else {
        debug!("ignoring message without from");
        return None;
    };
    let from = match from_jid(from) {
        Ok(from) => from,
        Err(e) => {
            debug!(error = %e, "ignoring message with unusable from");
            return None;
        },
    };

    let body = message
        .bodies
        .get(&Lang::default())
        .or_else(|| message.bodies.values().next())
        .cloned();

    let real_sender = first_payload::<MucUser>(&message.payloads)
        .and_then(|user| user.items.into_iter().find_map(|item| item.jid))
        .and_then(|jid| Address::parse(&jid.to_string()).ok());

    Some(TransportEvent::Message(IncomingMessage {
        from,
        kind: message_kind(&message.type_),
        body,
        real_sender,
    }))
}

fn convert_presence(presence: Presence) -> Option<TransportEvent> {
    let from = presence.from.as_ref().and_then(|jid| from_jid(jid).ok());
    match presence.type_ {
        PresenceType::Error => {
            let from = from?;
            let reason = first_payload::<StanzaError>(&presence.payloads)
                .map(|e| format!("{:?}", e.defined_condition))
                .unwrap_or_else(|| "unknown error".to_string());
            Some(TransportEvent::PresenceError { from, reason })
        },
        other => {
            trace!(from = ?from.map(|f| f.to_string()), ?other, "presence");
            None
        },
    }
}
