use thiserror::Error;

/// Errors raised while building events from external input.
#[derive(Error, Debug)]
pub enum Error {
    /// The value is valid JSON but not an object.
    #[error("event must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn not_an_object(value: &serde_json::Value) -> Self {
        let kind = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        Self::NotAnObject { kind }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
