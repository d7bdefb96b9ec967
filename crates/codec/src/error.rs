/// Crate-wide result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The body could not be turned into events.
    #[error("{codec} codec failed to decode body: {message}")]
    Decode {
        codec: &'static str,
        message: String,
    },
}

impl Error {
    #[must_use]
    pub fn decode(codec: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            codec,
            message: message.to_string(),
        }
    }
}
