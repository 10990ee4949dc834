//! Attribute validation resolver backed by the entry cache.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, warn};

use awesomehub_shared::{Entry, HubError, Result};

use super::EntryResolver;
use crate::cache::EntryCache;

/// Checks that entries carry the required attributes and stamps them with
/// `resolved_at`. Fresh cache records are merged back instead.
pub struct AttributesResolver {
    cache: EntryCache,
    required: Vec<String>,
}

impl AttributesResolver {
    pub fn new(cache: EntryCache, required: Vec<String>) -> Self {
        Self { cache, required }
    }

    fn missing<'a>(&'a self, entry: &Entry) -> Vec<&'a str> {
        self.required
            .iter()
            .filter(|key| entry.get(key).is_none_or(Value::is_null))
            .map(String::as_str)
            .collect()
    }
}

impl EntryResolver for AttributesResolver {
    fn name(&self) -> &str {
        "attributes"
    }

    fn supports(&self, _entry: &Entry) -> bool {
        true
    }

    fn is_cached(&self, entry: &Entry) -> bool {
        self.cache.contains(entry.id())
    }

    fn resolve(&self, entry: &mut Entry, force: bool) -> Result<()> {
        if !force {
            if let Some(record) = self.cache.get(entry.id())? {
                debug!(entry_id = entry.id(), stored_at = %record.stored_at, "cache hit");
                entry.merge_attributes(&record.attributes);
                return Ok(());
            }
        }

        let missing = self.missing(entry);
        if !missing.is_empty() {
            return Err(HubError::resolve_failed(format!(
                "missing required attribute(s): {}",
                missing.join(", ")
            )));
        }

        entry.set("resolved_at", Value::String(Utc::now().to_rfc3339()));
        if let Err(e) = self.cache.put(entry.id(), entry.attributes()) {
            warn!(entry_id = entry.id(), error = %e, "failed to cache resolved entry");
        }
        Ok(())
    }
}
