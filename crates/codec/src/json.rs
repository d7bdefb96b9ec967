use {jabberfeed_common::Event, serde_json::Value, tracing::debug};

use crate::{Codec, Error, Result};

/// Parses the body as JSON.
///
/// An object yields one event carrying its fields; an array yields one event
/// per element, and every element must be an object.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn decode(&self, body: &str, emit: &mut dyn FnMut(Event)) -> Result<()> {
        let value: Value =
            serde_json::from_str(body.trim()).map_err(|e| Error::decode(self.name(), e))?;

        match value {
            Value::Array(items) => {
                debug!(count = items.len(), "decoding json array body");
                for (index, item) in items.into_iter().enumerate() {
                    let event = Event::from_value(item)
                        .map_err(|e| Error::decode(self.name(), format!("element {index}: {e}")))?;
                    emit(event);
                }
                Ok(())
            },
            other => {
                emit(Event::from_value(other).map_err(|e| Error::decode(self.name(), e))?);
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::decode_all, serde_json::json};

    #[test]
    fn object_becomes_event() {
        let events = decode_all(&JsonCodec, r#"{"level":"warn","n":2}"#).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].get_str("level"), Some("warn"));
        assert_eq!(events[0].get("n"), Some(&json!(2)));
        assert!(events[0].contains("@timestamp"));
    }

    #[test]
    fn array_yields_one_event_per_element() {
        let events = decode_all(&JsonCodec, r#"[{"a":1},{"a":2},{"a":3}]"#).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].get("a"), Some(&json!(3)));
    }

    #[test]
    fn empty_array_yields_nothing() {
        assert!(decode_all(&JsonCodec, "[]").unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_decode_error() {
        let err = decode_all(&JsonCodec, "not json").unwrap_err();
        assert!(matches!(err, Error::Decode { codec: "json", .. }));
    }

    #[test]
    fn scalar_is_decode_error() {
        let err = decode_all(&JsonCodec, "42").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn events_before_bad_element_are_emitted() {
        let mut seen = Vec::new();
        let result = JsonCodec.decode(r#"[{"a":1}, 7, {"a":3}]"#, &mut |e| seen.push(e));
        assert!(result.is_err());
        assert_eq!(seen.len(), 1);
    }
}
