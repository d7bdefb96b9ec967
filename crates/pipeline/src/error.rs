/// Crate-wide result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The downstream consumer dropped its end of the queue.
    #[error("output queue is closed")]
    QueueClosed,
}
