//! Room subscriber: joins each configured multi-user chat room and installs
//! a room-scoped observer for it.

use {
    jabberfeed_pipeline::Pipeline,
    tracing::{info, warn},
};

#[cfg(feature = "metrics")]
use jabberfeed_metrics::{counter, gauge, xmpp as xmpp_metrics};

use crate::{
    Error, RoomAddress,
    observer::Scope,
    session::Session,
    transport::Transport,
};

/// Nickname used when neither the room address nor the user carries one.
pub const FALLBACK_NICK: &str = "jabberfeed";

/// A joined room and the nickname we joined it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSubscription {
    pub address: RoomAddress,
}

impl RoomSubscription {
    pub fn room(&self) -> String {
        self.address.room()
    }
}

/// Join every room in `rooms`, in order.
///
/// A room that fails to join is logged and skipped; the remaining rooms
/// are still attempted. An empty list installs nothing.
pub async fn join_rooms<T: Transport>(
    session: &mut Session<T>,
    rooms: &[String],
    pipeline: &Pipeline,
) -> Vec<RoomSubscription> {
    if rooms.is_empty() {
        return Vec::new();
    }

    let default_nick = session
        .bound_address()
        .node
        .clone()
        .unwrap_or_else(|| FALLBACK_NICK.to_string());

    let mut joined = Vec::with_capacity(rooms.len());
    for room in rooms {
        match join_room(session, room, &default_nick, pipeline).await {
            Ok(subscription) => {
                info!(room = %subscription.address, "joined room");
                joined.push(subscription);
            },
            Err(e) => {
                warn!(room = %room, error = %e, "failed to join room, continuing");
                #[cfg(feature = "metrics")]
                counter!(xmpp_metrics::ROOM_JOIN_FAILURES_TOTAL).increment(1);
            },
        }
    }

    #[cfg(feature = "metrics")]
    gauge!(xmpp_metrics::ROOMS_ACTIVE).set(session.routes().room_count() as f64);

    joined
}

async fn join_room<T: Transport>(
    session: &mut Session<T>,
    room: &str,
    default_nick: &str,
    pipeline: &Pipeline,
) -> Result<RoomSubscription, Error> {
    let address = RoomAddress::parse(room)
        .map_err(|e| Error::join(room, e))?
        .with_default_nick(default_nick);
    let bare = address.room();

    // The observer goes in first so history the room replays right after the
    // join is routed.
    session.observe(Scope::Room(bare.clone()), pipeline.clone());
    if let Err(e) = session.join_room(&address).await {
        session.unobserve_room(&bare);
        return Err(Error::join(bare, e));
    }

    #[cfg(feature = "metrics")]
    counter!(xmpp_metrics::ROOM_JOINS_TOTAL).increment(1);

    Ok(RoomSubscription { address })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::{MockConnector, Sent, settings},
        jabberfeed_codec::PlainCodec,
        jabberfeed_pipeline::{ChannelQueue, FieldDecorator},
        std::sync::Arc,
    };

    fn pipeline() -> Pipeline {
        let (queue, _rx) = ChannelQueue::bounded(8);
        Pipeline::new(
            Arc::new(PlainCodec),
            Arc::new(FieldDecorator::default()),
            Arc::new(queue),
        )
    }

    fn rooms(list: &[&str]) -> Vec<String> {
        list.iter().map(|r| r.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_list_installs_nothing() {
        let (connector, _events, sent) = MockConnector::online("bot@example.com/feed");
        let mut session = Session::connect(&connector, settings()).await.unwrap();
        let joined = join_rooms(&mut session, &[], &pipeline()).await;
        assert!(joined.is_empty());
        assert_eq!(session.routes().room_count(), 0);
        assert_eq!(session.workers.len(), 0);
        assert_eq!(sent.lock().unwrap().as_slice(), &[Sent::Presence]);
    }

    #[tokio::test]
    async fn joins_each_room_in_order_with_nick() {
        let (connector, _events, sent) = MockConnector::online("bot@example.com/feed");
        let mut session = Session::connect(&connector, settings()).await.unwrap();
        let joined = join_rooms(
            &mut session,
            &rooms(&["a@muc.example.com", "b@muc.example.com/watcher"]),
            &pipeline(),
        )
        .await;

        assert_eq!(joined.len(), 2);
        assert_eq!(session.routes().room_count(), 2);
        assert!(session.routes().room("a@muc.example.com").is_some());
        assert!(session.routes().room("b@muc.example.com").is_some());
        assert_eq!(sent.lock().unwrap().as_slice(), &[
            Sent::Presence,
            Sent::Join("a@muc.example.com/bot".into()),
            Sent::Join("b@muc.example.com/watcher".into()),
        ]);
    }

    #[tokio::test]
    async fn failed_join_does_not_abort_the_rest() {
        let (connector, _events, sent) = MockConnector::online("bot@example.com/feed");
        let connector = connector.failing_join("b@muc.example.com");
        let mut session = Session::connect(&connector, settings()).await.unwrap();
        let joined = join_rooms(
            &mut session,
            &rooms(&["a@muc.example.com", "b@muc.example.com", "not a room", "c@muc.example.com"]),
            &pipeline(),
        )
        .await;

        let names: Vec<_> = joined.iter().map(RoomSubscription::room).collect();
        assert_eq!(names, vec!["a@muc.example.com", "c@muc.example.com"]);
        assert!(session.routes().room("b@muc.example.com").is_none());
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn refusal_from_server_removes_mixed_case_room() {
        let (connector, _events, _sent) = MockConnector::online("bot@example.com/feed");
        let mut session = Session::connect(&connector, settings()).await.unwrap();
        let joined =
            join_rooms(&mut session, &rooms(&["Ops@MUC.example.com"]), &pipeline()).await;
        assert_eq!(joined[0].room(), "ops@muc.example.com");

        let from = crate::Address::parse("ops@muc.example.com/bot").unwrap();
        crate::handlers::handle_presence_error(&mut session.routes, &from, "Conflict");
        assert_eq!(session.routes().room_count(), 0);
    }
}
