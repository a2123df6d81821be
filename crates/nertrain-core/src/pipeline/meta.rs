use serde::{Deserialize, Serialize};

/// Name of the only trainable component.
pub const NER_COMPONENT: &str = "ner";

/// Descriptive metadata written next to a saved model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Model name, set when saving.
    pub name: String,
    /// Language code the pipeline was created for.
    pub lang: String,
    /// Version of the library that wrote the model.
    pub version: String,
    /// Entity labels known to the recognizer.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Component names, in order.
    #[serde(default)]
    pub pipeline: Vec<String>,
}

impl ModelMeta {
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            name: "model".to_string(),
            lang: lang.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            labels: Vec::new(),
            pipeline: vec![NER_COMPONENT.to_string()],
        }
    }
}

impl Default for ModelMeta {
    fn default() -> Self {
        Self::new("en")
    }
}
