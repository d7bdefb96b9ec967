use {
    jabberfeed_common::Event,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Hook applied to every event before provenance fields are set.
pub trait Decorator: Send + Sync {
    fn decorate(&self, event: &mut Event);
}

/// Generic event decoration settings shared by every input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DecorateConfig {
    /// Value for the `type` field, applied only when the event has none.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Tags appended to every event.
    pub tags: Vec<String>,

    /// Extra fields; values may reference other fields with `%{name}`.
    pub add_field: BTreeMap<String, String>,
}

/// [`Decorator`] driven by a [`DecorateConfig`].
#[derive(Debug, Clone, Default)]
pub struct FieldDecorator {
    config: DecorateConfig,
}

impl FieldDecorator {
    pub fn new(config: DecorateConfig) -> Self {
        Self { config }
    }
}

impl Decorator for FieldDecorator {
    fn decorate(&self, event: &mut Event) {
        if let Some(ref event_type) = self.config.event_type
            && !event.contains("type")
        {
            event.set("type", event_type.as_str());
        }

        for tag in &self.config.tags {
            event.add_tag(tag);
        }

        for (field, template) in &self.config.add_field {
            let value = event.sprintf(template);
            event.set(field.as_str(), value);
        }
    }
}
