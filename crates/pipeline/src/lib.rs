//! Decode-enrich-publish pipeline.
//!
//! Raw message bodies go through a [`Codec`](jabberfeed_codec::Codec), every
//! produced event is decorated and stamped with provenance fields, then
//! handed to an [`OutputQueue`].

pub mod decorate;
pub mod error;
pub mod process;
pub mod queue;

pub use {
    decorate::{DecorateConfig, Decorator, FieldDecorator},
    error::{Error, Result},
    process::{FROM_FIELD, Pipeline, ROOM_FIELD},
    queue::{ChannelQueue, OutputQueue},
};
