//! List entries.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{HubError, Result};
use crate::merge::{ListMerge, merge_maps};

/// A single catalog item.
///
/// While a list is being processed an entry carries raw category labels
/// (`"Tools/CLI"`); after processing they are replaced by category ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    categories: Vec<u32>,
    #[serde(skip)]
    labels: Vec<String>,
    #[serde(flatten)]
    attributes: Map<String, Value>,
}

impl Entry {
    /// Create an entry. The id is lower-cased to form its identity key.
    pub fn new(id: impl AsRef<str>, kind: impl Into<String>) -> Self {
        Self {
            id: id.as_ref().to_lowercase(),
            kind: kind.into(),
            categories: Vec::new(),
            labels: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Build an entry from a JSON object `{id, type, categories?, ...}`.
    ///
    /// `categories` must be a list of label strings; every other key becomes
    /// an attribute.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(HubError::definition("an entry must be a JSON object"));
        };

        let id = match map.remove("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => id,
            _ => return Err(HubError::definition("an entry requires a non-empty string 'id'")),
        };
        let kind = match map.remove("type") {
            Some(Value::String(kind)) if !kind.is_empty() => kind,
            _ => return Err(HubError::definition(format!("entry '{id}' requires a string 'type'"))),
        };

        let mut entry = Self::new(&id, kind);
        match map.remove("categories") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for item in items {
                    match item {
                        Value::String(label) => entry.labels.push(label),
                        other => {
                            return Err(HubError::definition(format!(
                                "entry '{id}' has a non-string category {other}"
                            )));
                        }
                    }
                }
            }
            Some(other) => {
                return Err(HubError::definition(format!(
                    "entry '{id}' categories must be a list, got {other}"
                )));
            }
        }
        entry.attributes = map;
        Ok(entry)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Category ids assigned during processing.
    pub fn categories(&self) -> &[u32] {
        &self.categories
    }

    pub fn set_categories(&mut self, ids: Vec<u32>) {
        self.categories = ids;
    }

    /// Raw category labels collected before the taxonomy pass.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set_labels(&mut self, labels: Vec<String>) {
        self.labels = labels;
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn has(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    /// Merge attributes into this entry: scalars overwrite, objects merge
    /// recursively and lists gain the items they do not already hold.
    pub fn merge_attributes(&mut self, attributes: &Map<String, Value>) {
        merge_maps(&mut self.attributes, attributes, ListMerge::Union);
    }

    /// Merge another contribution for the same id into this entry in place.
    /// Identity (`id`, `type`) is kept from `self`.
    pub fn merge(&mut self, other: &Entry) {
        self.merge_attributes(&other.attributes);
        for label in &other.labels {
            if !self.labels.contains(label) {
                self.labels.push(label.clone());
            }
        }
    }
}
