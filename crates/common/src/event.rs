//! The structured unit that flows from codecs to the output queue.

use {
    chrono::{SecondsFormat, Utc},
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use crate::error::{Error, Result};

/// Field holding the event creation time (RFC 3339, millisecond precision).
pub const TIMESTAMP: &str = "@timestamp";
/// Field holding the event schema version.
pub const VERSION: &str = "@version";
/// Field holding the primary text payload.
pub const MESSAGE: &str = "message";
/// Field holding the tag list.
pub const TAGS: &str = "tags";

const SCHEMA_VERSION: &str = "1";

/// A structured event: a flat-or-nested JSON object keyed by field name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    /// Create an empty event stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::from_map(Map::new())
    }

    /// Create an event carrying `message` as its payload.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        let mut event = Self::new();
        event.set(MESSAGE, message.into());
        event
    }

    /// Wrap an existing object, filling in `@timestamp` and `@version`
    /// when the object does not provide them.
    #[must_use]
    pub fn from_map(mut fields: Map<String, Value>) -> Self {
        if !matches!(fields.get(TIMESTAMP), Some(Value::String(_))) {
            fields.insert(TIMESTAMP.into(), Value::String(now_rfc3339()));
        }
        fields
            .entry(VERSION)
            .or_insert_with(|| Value::String(SCHEMA_VERSION.into()));
        Self { fields }
    }

    /// Build an event from an arbitrary JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(Error::not_an_object(&other)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Get a field as a string slice, if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Tags currently attached to the event. Non-string entries are skipped.
    pub fn tags(&self) -> Vec<&str> {
        match self.fields.get(TAGS) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(tag)) => vec![tag.as_str()],
            _ => Vec::new(),
        }
    }

    /// Append a tag unless it is already present.
    ///
    /// A scalar `tags` value is promoted to an array first.
    pub fn add_tag(&mut self, tag: &str) {
        let entry = self
            .fields
            .entry(TAGS)
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            let previous = entry.take();
            *entry = match previous {
                Value::Null => Value::Array(Vec::new()),
                scalar => Value::Array(vec![scalar]),
            };
        }
        if let Value::Array(items) = entry
            && !items.iter().any(|t| t.as_str() == Some(tag))
        {
            items.push(Value::String(tag.to_string()));
        }
    }

    /// Expand `%{field}` references against this event.
    ///
    /// String fields are inserted verbatim, other values as compact JSON.
    /// References to missing fields are left untouched.
    pub fn sprintf(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("%{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            match self.fields.get(key) {
                Some(Value::String(s)) => out.push_str(s),
                Some(other) => out.push_str(&other.to_string()),
                None => {
                    out.push_str("%{");
                    out.push_str(key);
                    out.push('}');
                },
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    #[test]
    fn new_event_is_stamped() {
        let event = Event::new();
        let ts = event.get_str(TIMESTAMP).unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert_eq!(event.get_str(VERSION), Some("1"));
    }

    #[test]
    fn from_map_keeps_existing_timestamp() {
        let map = json!({"@timestamp": "2024-01-01T00:00:00.000Z", "a": 1});
        let event = Event::from_value(map).unwrap();
        assert_eq!(event.get_str(TIMESTAMP), Some("2024-01-01T00:00:00.000Z"));
        assert_eq!(event.get("a"), Some(&json!(1)));
    }

    #[test]
    fn from_map_replaces_non_string_timestamp() {
        let event = Event::from_value(json!({"@timestamp": 12})).unwrap();
        assert!(event.get_str(TIMESTAMP).is_some());
    }

    #[rstest]
    #[case(json!(null))]
    #[case(json!([1, 2]))]
    #[case(json!("text"))]
    #[case(json!(3.5))]
    fn from_value_rejects_non_objects(#[case] value: Value) {
        assert!(matches!(
            Event::from_value(value),
            Err(Error::NotAnObject { .. })
        ));
    }

    #[test]
    fn add_tag_deduplicates() {
        let mut event = Event::new();
        event.add_tag("chat");
        event.add_tag("chat");
        event.add_tag("xmpp");
        assert_eq!(event.tags(), vec!["chat", "xmpp"]);
    }

    #[test]
    fn add_tag_promotes_scalar() {
        let mut event = Event::new();
        event.set(TAGS, "existing");
        event.add_tag("new");
        assert_eq!(event.tags(), vec!["existing", "new"]);
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("from %{user}", "from alice")]
    #[case("%{count} items", "3 items")]
    #[case("%{missing} stays", "%{missing} stays")]
    #[case("open %{user", "open %{user")]
    fn sprintf_expands_fields(#[case] template: &str, #[case] expected: &str) {
        let mut event = Event::new();
        event.set("user", "alice");
        event.set("count", 3);
        assert_eq!(event.sprintf(template), expected);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut event = Event::with_message("hi");
        event.set("from", "a@b/c");
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["message"], "hi");
        assert_eq!(value["from"], "a@b/c");
    }
}
