//! Inbound stanza routing.
//!
//! Dispatches transport events to the matching observer: groupchat traffic
//! from a joined room goes to that room's observer, everything else to the
//! direct-message observer. Messages without a body never get that far.

use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use jabberfeed_metrics::{counter, gauge, labels, xmpp as xmpp_metrics};

use crate::{
    Address,
    observer::{InboundMessage, ObserverHandle},
    session::Routes,
    transport::{IncomingMessage, MessageKind},
};

/// Why a message was dropped before reaching an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filtered {
    /// No body, or an empty one (chat states, receipts, subjects).
    NoBody,
    /// `type="error"` bounce.
    ErrorStanza,
    /// Groupchat from a room we have no observer for.
    UnknownRoom,
    /// No direct-message observer is installed.
    NoObserver,
}

/// Pick the observer for `message` and build what it will process.
pub fn route(
    routes: &Routes,
    message: IncomingMessage,
) -> Result<(&ObserverHandle, InboundMessage), Filtered> {
    if message.kind == MessageKind::Error {
        return Err(Filtered::ErrorStanza);
    }

    let body = match message.body {
        Some(body) if !body.is_empty() => body,
        _ => return Err(Filtered::NoBody),
    };

    if message.kind == MessageKind::Groupchat {
        let room = message.from.bare_string();
        let handle = routes.room(&room).ok_or(Filtered::UnknownRoom)?;
        // Prefer the occupant's real address when the room discloses it.
        let sender = message.real_sender.unwrap_or(message.from);
        return Ok((handle, InboundMessage { sender, body }));
    }

    let handle = routes.direct().ok_or(Filtered::NoObserver)?;
    Ok((handle, InboundMessage {
        sender: message.from,
        body,
    }))
}

/// Handle an inbound `<message>` stanza.
pub async fn handle_message(routes: &Routes, message: IncomingMessage) {
    let from = message.from.to_string();
    let kind = message.kind;

    match route(routes, message) {
        Ok((handle, inbound)) => {
            #[cfg(feature = "metrics")]
            counter!(
                xmpp_metrics::MESSAGES_RECEIVED_TOTAL,
                labels::KIND => handle.scope().kind()
            )
            .increment(1);

            debug!(%from, scope = %handle.scope(), "routing message");
            if !handle.deliver(inbound).await {
                warn!(%from, scope = %handle.scope(), "observer stopped, dropping message");
            }
        },
        Err(reason) => {
            debug!(%from, ?kind, ?reason, "ignoring message");
            #[cfg(feature = "metrics")]
            counter!(xmpp_metrics::MESSAGES_FILTERED_TOTAL).increment(1);
        },
    }
}

/// Handle `<presence type="error">`.
///
/// An error from a joined room means the join was refused (nickname
/// conflict, members-only, missing room). The room stops being routed; the
/// other observers are unaffected.
pub fn handle_presence_error(routes: &mut Routes, from: &Address, reason: &str) {
    let room = from.bare_string();
    if routes.remove_room(&room).is_some() {
        warn!(%room, %reason, "room rejected join");
        #[cfg(feature = "metrics")]
        {
            counter!(xmpp_metrics::ROOM_JOIN_FAILURES_TOTAL).increment(1);
            gauge!(xmpp_metrics::ROOMS_ACTIVE).set(routes.room_count() as f64);
        }
    } else {
        debug!(%from, %reason, "presence error");
    }
}
