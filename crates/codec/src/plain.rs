use jabberfeed_common::Event;

use crate::{Codec, Result};

/// Passes the body through untouched as the event `message`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn decode(&self, body: &str, emit: &mut dyn FnMut(Event)) -> Result<()> {
        emit(Event::with_message(body));
        Ok(())
    }
}
