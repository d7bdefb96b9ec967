//! Shared types, error definitions, and utilities used across all jabberfeed crates.

pub mod error;
pub mod event;

pub use {
    error::{Error, Result},
    event::Event,
};
