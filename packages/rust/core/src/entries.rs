//! The entry set and the merge engine feeding it.

use std::collections::HashMap;

use tracing::debug;

use awesomehub_shared::Entry;

use crate::rules::SourceRules;

/// Entries keyed by id, iterated in order of first discovery.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    entries: HashMap<String, Entry>,
    order: Vec<String>,
}

/// What [`EntrySet::add`] did with an incoming entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Merged,
    Excluded,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.entries.get_mut(id)
    }

    /// Ids in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        let mut by_id: HashMap<&String, &mut Entry> = self.entries.iter_mut().collect();
        self.order
            .iter()
            .filter_map(move |id| by_id.remove(id))
    }

    pub fn remove(&mut self, id: &str) -> Option<Entry> {
        let entry = self.entries.remove(id)?;
        self.order.retain(|known| known != id);
        Some(entry)
    }

    /// Add an entry contributed by a source.
    ///
    /// Excluded ids are dropped. An id already present is merged into the
    /// existing entry in place, and the source's category rules are then
    /// applied to that canonical entry.
    pub fn add(&mut self, entry: Entry, rules: &SourceRules) -> AddOutcome {
        if rules.is_excluded(entry.id()) {
            debug!(entry_id = entry.id(), "entry excluded by source rules");
            return AddOutcome::Excluded;
        }

        if let Some(existing) = self.entries.get_mut(entry.id()) {
            existing.merge(&entry);
            categorize(existing, rules);
            return AddOutcome::Merged;
        }

        let mut entry = entry;
        categorize(&mut entry, rules);
        self.order.push(entry.id().to_string());
        self.entries.insert(entry.id().to_string(), entry);
        AddOutcome::Inserted
    }
}

fn categorize(entry: &mut Entry, rules: &SourceRules) {
    if let Some(category) = rules.forced_category() {
        entry.set_labels(vec![category.to_string()]);
        return;
    }

    let matched = rules.matching_labels(entry.id());
    if !matched.is_empty() {
        let mut labels = entry.labels().to_vec();
        labels.extend(matched);
        entry.set_labels(labels);
    }
}
