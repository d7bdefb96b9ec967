use std::{sync::Arc, time::Instant};

use {
    jabberfeed_codec::Codec,
    jabberfeed_common::Event,
    tracing::{debug, trace, warn},
};

#[cfg(feature = "metrics")]
use jabberfeed_metrics::{counter, histogram, labels, pipeline as pipeline_metrics};

use crate::{Decorator, OutputQueue, Result};

/// Field carrying the stringified sender address.
pub const FROM_FIELD: &str = "from";
/// Field carrying the room address, present only on room-sourced events.
pub const ROOM_FIELD: &str = "room";

/// Shared decode → decorate → stamp → enqueue routine.
///
/// Holds only shared, immutable collaborators, so one instance is cloned
/// into every observer and may run concurrently.
#[derive(Clone)]
pub struct Pipeline {
    codec: Arc<dyn Codec>,
    decorator: Arc<dyn Decorator>,
    queue: Arc<dyn OutputQueue>,
}

impl Pipeline {
    pub fn new(
        codec: Arc<dyn Codec>,
        decorator: Arc<dyn Decorator>,
        queue: Arc<dyn OutputQueue>,
    ) -> Self {
        Self {
            codec,
            decorator,
            queue,
        }
    }

    /// Decode `body` and publish every resulting event.
    ///
    /// A decode failure is logged and does not fail the call; events the
    /// codec produced before failing are still published. Returns the
    /// number of events enqueued.
    ///
    /// # Errors
    ///
    /// Only when the output queue is closed.
    pub async fn process(&self, body: &str, from: &str, room: Option<&str>) -> Result<usize> {
        let started = Instant::now();
        let codec = self.codec.name();

        let mut events = Vec::new();
        if let Err(e) = self.codec.decode(body, &mut |event| events.push(event)) {
            warn!(codec, %from, room, error = %e, "failed to decode message body");
            #[cfg(feature = "metrics")]
            counter!(pipeline_metrics::DECODE_ERRORS_TOTAL, labels::CODEC => codec).increment(1);
        }

        let count = events.len();
        for event in events {
            let event = self.enrich(event, from, room);
            trace!(?event, "enqueueing event");
            self.queue.enqueue(event).await?;
        }

        #[cfg(feature = "metrics")]
        {
            counter!(pipeline_metrics::EVENTS_PUBLISHED_TOTAL).increment(count as u64);
            histogram!(pipeline_metrics::PROCESS_DURATION_SECONDS)
                .record(started.elapsed().as_secs_f64());
        }

        debug!(
            codec,
            %from,
            room,
            count,
            elapsed_us = started.elapsed().as_micros() as u64,
            "published events"
        );
        Ok(count)
    }

    fn enrich(&self, mut event: Event, from: &str, room: Option<&str>) -> Event {
        self.decorator.decorate(&mut event);
        event.set(FROM_FIELD, from);
        if let Some(room) = room {
            event.set(ROOM_FIELD, room);
        }
        event
    }
}
