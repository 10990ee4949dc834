//! Core domain types for AwesomeHub lists.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{HubError, Result};

/// Order assigned to categories that have no `categoryOrder` override.
pub const DEFAULT_CATEGORY_ORDER: i64 = 20;

/// Counter key incremented for every entry regardless of its type.
pub const COUNT_ALL: &str = "all";

// ---------------------------------------------------------------------------
// ListDefinition
// ---------------------------------------------------------------------------

/// A list definition file (`<list>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDefinition {
    /// List identifier.
    pub id: String,
    /// Sources in the order they are processed.
    pub sources: Vec<Source>,
    /// Global list options.
    #[serde(default)]
    pub options: ListOptions,
}

/// `options` section of a list definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    /// Default options merged under every source's own options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub source: Map<String, Value>,
    /// Category path → display priority.
    #[serde(default, rename = "categoryOrder")]
    pub category_order: HashMap<String, i64>,
    /// Options this core does not interpret (kept for renderers).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ListDefinition {
    /// Parse and validate a definition from a JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let definition: Self =
            serde_json::from_value(value).map_err(|e| HubError::definition(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Load and validate a definition from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| HubError::io(path, e))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| HubError::definition(format!("failed to parse {}: {e}", path.display())))?;
        Self::from_value(value)
    }

    /// Check the structural rules serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(HubError::definition("the list id must not be empty"));
        }
        if self.sources.is_empty() {
            return Err(HubError::definition("the list must define at least one source"));
        }
        for (index, source) in self.sources.iter().enumerate() {
            if source.kind.trim().is_empty() {
                return Err(HubError::definition(format!(
                    "source #{index} has an empty type"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// A typed descriptor of where raw items come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Discriminator used by processors to claim the source.
    #[serde(rename = "type")]
    pub kind: String,
    /// Opaque payload interpreted by the claiming processor.
    #[serde(default)]
    pub data: Value,
    /// Source options (`exclude`, `category`, `categories`, ...).
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl Source {
    pub fn new(kind: impl Into<String>, data: Value, options: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            data,
            options,
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// `exclude` patterns; a single string is accepted as a one-item list.
    pub fn exclude_patterns(&self) -> Result<Vec<String>> {
        match self.option("exclude") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => string_list(value, "exclude"),
        }
    }

    /// The single forced category path, if set.
    pub fn category(&self) -> Result<Option<&str>> {
        match self.option("category") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(path)) => Ok(Some(path.as_str())),
            Some(other) => Err(HubError::definition(format!(
                "source option 'category' must be a string, got {other}"
            ))),
        }
    }

    /// `categories` option as `(label, patterns)` pairs in definition order.
    pub fn category_patterns(&self) -> Result<Vec<(String, Vec<String>)>> {
        match self.option("categories") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(label, patterns)| Ok((label.clone(), string_list(patterns, "categories")?)))
                .collect(),
            Some(other) => Err(HubError::definition(format!(
                "source option 'categories' must be a mapping, got {other}"
            ))),
        }
    }
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>> {
    match value {
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(String::from).ok_or_else(|| {
                    HubError::definition(format!(
                        "source option '{key}' must only contain strings, got {item}"
                    ))
                })
            })
            .collect(),
        other => Err(HubError::definition(format!(
            "source option '{key}' must be a string or a list of strings, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// A node of the category taxonomy, keyed by its normalized slug path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    /// Display title of the last contribution for this path.
    pub title: String,
    /// Slash-joined slug path, unique within a list.
    pub path: String,
    /// Parent category id, `None` for top-level categories.
    pub parent: Option<u32>,
    /// `"all"` plus one counter per entry type.
    pub count: BTreeMap<String, u64>,
    pub order: i64,
}

impl Category {
    /// Number of entries counted under this category.
    pub fn total(&self) -> u64 {
        self.count.get(COUNT_ALL).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(options: Value) -> Source {
        serde_json::from_value(json!({"type": "inline", "data": [], "options": options}))
            .expect("source")
    }

    #[test]
    fn definition_parses_category_order() {
        let def = ListDefinition::from_value(json!({
            "id": "Awesome",
            "sources": [{"type": "inline", "data": []}],
            "options": {"categoryOrder": {"tools/cli": 1}, "theme": "dark"}
        }))
        .expect("definition");
        assert_eq!(def.options.category_order["tools/cli"], 1);
        assert_eq!(def.options.extra["theme"], json!("dark"));
        assert!(def.sources[0].options.is_empty());
    }

    #[test]
    fn definition_without_sources_is_invalid() {
        let err = ListDefinition::from_value(json!({"id": "x", "sources": []})).unwrap_err();
        assert!(matches!(err, HubError::InvalidDefinition { .. }));
    }

    #[test]
    fn definition_with_non_integer_order_is_invalid() {
        let err = ListDefinition::from_value(json!({
            "id": "x",
            "sources": [{"type": "inline"}],
            "options": {"categoryOrder": {"a": "first"}}
        }))
        .unwrap_err();
        assert!(matches!(err, HubError::InvalidDefinition { .. }));
    }

    #[test]
    fn source_option_accessors() {
        let src = source(json!({
            "exclude": "^skip-",
            "categories": {"Tools/CLI": ["cli-", "term"], "Misc": "*"}
        }));
        assert_eq!(src.exclude_patterns().unwrap(), vec!["^skip-".to_string()]);
        assert_eq!(src.category().unwrap(), None);

        let pairs = src.category_patterns().unwrap();
        assert_eq!(pairs[0].0, "Tools/CLI");
        assert_eq!(pairs[0].1.len(), 2);
        assert_eq!(pairs[1], ("Misc".to_string(), vec!["*".to_string()]));
    }

    #[test]
    fn malformed_options_are_rejected() {
        assert!(source(json!({"exclude": [1]})).exclude_patterns().is_err());
        assert!(source(json!({"category": ["a"]})).category().is_err());
        assert!(source(json!({"categories": ["a"]})).category_patterns().is_err());
    }
}
