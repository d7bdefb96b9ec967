//! Event loop for an online session.

use {
    tokio::task::JoinSet,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::{
    Error, Result, handlers,
    session::Session,
    transport::{Transport, TransportEvent},
};

/// Dispatch transport events to observers until the stream ends or
/// `shutdown` fires.
///
/// Cancellation is a clean stop and returns `Ok`. Losing the stream returns
/// [`Error::Disconnected`]; no reconnect is attempted. Either way every
/// observer finishes the messages it already accepted before this returns.
pub async fn run_loop<T: Transport>(
    mut session: Session<T>,
    shutdown: CancellationToken,
) -> Result<()> {
    info!(
        rooms = session.routes.room_count(),
        direct = session.routes.direct().is_some(),
        "listening for messages"
    );

    let outcome = loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => {
                info!("shutdown requested");
                break Ok(());
            },

            Some(joined) = session.workers.join_next(), if !session.workers.is_empty() => {
                match joined {
                    Ok(Ok(())) => debug!("observer finished"),
                    Ok(Err(e)) => break Err(e),
                    Err(e) => break Err(Error::from(e)),
                }
            },

            event = session.transport.next_event() => match event {
                Some(TransportEvent::Message(message)) => {
                    handlers::handle_message(&session.routes, message).await;
                },
                Some(TransportEvent::PresenceError { from, reason }) => {
                    handlers::handle_presence_error(&mut session.routes, &from, &reason);
                },
                Some(TransportEvent::Disconnected { reason }) => {
                    break Err(Error::disconnected(reason));
                },
                None => break Err(Error::disconnected("stream ended")),
            },
        }
    };

    if let Err(e) = &outcome {
        error!(error = %e, "xmpp input stopped");
    }

    session.routes.clear();
    let drained = drain(&mut session.workers).await;
    outcome.and(drained)
}

/// Wait for every worker, surfacing the first failure.
async fn drain(workers: &mut JoinSet<Result<()>>) -> Result<()> {
    let mut first_error = None;
    while let Some(joined) = workers.join_next().await {
        let result = joined.map_err(Error::from).and_then(|r| r);
        if let Err(e) = result {
            warn!(error = %e, "observer failed while draining");
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}
