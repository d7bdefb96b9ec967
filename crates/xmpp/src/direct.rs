//! Direct message observer.

use {jabberfeed_pipeline::Pipeline, tracing::debug};

use crate::{observer::Scope, session::Session, transport::Transport};

/// Install the single observer for messages addressed to the session's
/// identity outside any joined room.
pub fn register_direct_observer<T: Transport>(session: &mut Session<T>, pipeline: &Pipeline) {
    session.observe(Scope::Direct, pipeline.clone());
    debug!(identity = %session.bound_address(), "direct message observer installed");
}
