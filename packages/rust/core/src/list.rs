//! The list aggregate and its processing phase.
//!
//! A [`List`] is built once per definition and then driven through
//! [`List::process`] (sources → entries → categories) and
//! [`List::resolve`] (entry enrichment).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use awesomehub_shared::{
    COUNT_ALL, Category, Entry, HubError, ListDefinition, ListMerge, Result, Source, merge_maps,
};

use crate::entries::EntrySet;
use crate::processors::{Action, ProcessorEvent, ProcessorRegistry, StatusKind};
use crate::progress::ProgressReporter;
use crate::rules::SourceRules;
use crate::taxonomy::{CategoryNode, CategoryTree};

/// Summary of a processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    pub entries: usize,
    pub categories: usize,
}

/// A curated list: its definition plus the entries and categories derived
/// from it.
#[derive(Debug, Clone)]
pub struct List {
    pub(crate) definition: ListDefinition,
    pub(crate) entries: EntrySet,
    pub(crate) categories: CategoryTree,
    pub(crate) processed: bool,
    pub(crate) resolved: bool,
}

/// Serializable snapshot of a finalized list.
#[derive(Debug, Serialize)]
pub struct ListOutput<'a> {
    pub id: String,
    pub entries: Vec<&'a Entry>,
    pub categories: Vec<&'a Category>,
    pub tree: Vec<CategoryNode>,
}

impl List {
    /// Build a list from a definition, stacking `options.source` defaults
    /// under every source's own options.
    pub fn new(mut definition: ListDefinition) -> Result<Self> {
        definition.validate()?;

        let defaults = definition.options.source.clone();
        if !defaults.is_empty() {
            for source in &mut definition.sources {
                let mut options = defaults.clone();
                merge_maps(&mut options, &source.options, ListMerge::Concat);
                source.options = options;
            }
        }

        Ok(Self {
            definition,
            entries: EntrySet::new(),
            categories: CategoryTree::new(),
            processed: false,
            resolved: false,
        })
    }

    /// Parse, validate and build a list from a JSON definition.
    pub fn from_value(value: Value) -> Result<Self> {
        Self::new(ListDefinition::from_value(value)?)
    }

    /// Lower-cased list id.
    pub fn id(&self) -> String {
        self.definition.id.to_lowercase()
    }

    pub fn definition(&self) -> &ListDefinition {
        &self.definition
    }

    pub fn entries(&self) -> &EntrySet {
        &self.entries
    }

    pub fn categories(&self) -> &CategoryTree {
        &self.categories
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Set a list option that this core does not interpret.
    pub fn set_option(&mut self, key: impl Into<String>, value: Value) {
        self.definition.options.extra.insert(key.into(), value);
    }

    /// Replace the category order overrides; applied on the next
    /// [`process`](Self::process) of an unprocessed list.
    pub fn set_category_order(&mut self, order: HashMap<String, i64>) {
        self.definition.options.category_order = order;
    }

    pub fn output(&self) -> ListOutput<'_> {
        ListOutput {
            id: self.id(),
            entries: self.entries.iter().collect(),
            categories: self.categories.iter().collect(),
            tree: self.categories.tree(),
        }
    }

    // -----------------------------------------------------------------------
    // Processing
    // -----------------------------------------------------------------------

    /// Run every source through the processor chain, then organize the
    /// collected entries into categories.
    ///
    /// Processing an already processed list is a no-op.
    #[instrument(skip_all, fields(list = %self.definition.id))]
    pub fn process(
        &mut self,
        processors: &ProcessorRegistry,
        progress: &dyn ProgressReporter,
    ) -> Result<ProcessStats> {
        if processors.is_empty() {
            return Err(HubError::state(
                "cannot process the list; no source processors have been provided",
            ));
        }
        if self.processed {
            debug!("list already processed");
            return Ok(self.process_stats());
        }

        info!("processing list sources");
        progress.start("Processing sources");
        let sources = self.definition.sources.clone();
        let result = self.process_sources(processors, &sources, 0, progress);
        progress.end();
        result?;
        info!(entries = self.entries.len(), "processed entries");

        info!("organizing categories");
        self.organize_categories();
        self.categories
            .apply_order(&self.definition.options.category_order);

        self.processed = true;
        info!(categories = self.categories.len(), "organized categories");

        Ok(self.process_stats())
    }

    fn process_stats(&self) -> ProcessStats {
        ProcessStats {
            entries: self.entries.len(),
            categories: self.categories.len(),
        }
    }

    fn process_sources(
        &mut self,
        processors: &ProcessorRegistry,
        sources: &[Source],
        depth: usize,
        progress: &dyn ProgressReporter,
    ) -> Result<()> {
        for (index, source) in sources.iter().enumerate() {
            let rules = SourceRules::compile(source)?;
            let mut handled = false;

            for processor in processors.iter() {
                let action = processor.action(source)?;
                if action == Action::Skip {
                    continue;
                }
                handled = true;
                let name = processor.name();
                info!(depth, source_index = index, source_type = %source.kind, processor = name, "processing source");

                let entries = &mut self.entries;
                let mut emit = |event: ProcessorEvent| match event {
                    ProcessorEvent::StatusUpdate {
                        kind: StatusKind::Error,
                        message,
                    } => warn!(source_index = index, source_type = %source.kind, "{message}"),
                    ProcessorEvent::StatusUpdate { message, .. } => progress.update(&message),
                    ProcessorEvent::EntryCreated(entry) => {
                        entries.add(entry, &rules);
                    }
                };

                let children = match processor.process(source, &mut emit) {
                    Ok(children) => children,
                    Err(e) => {
                        error!(depth, source_index = index, source_type = %source.kind, processor = name, error = %e, "failed processing source");
                        break;
                    }
                };

                if action == Action::PartialProcessing {
                    if children.is_empty() {
                        warn!(depth, source_index = index, source_type = %source.kind, processor = name, "no child sources from processing source");
                    } else {
                        self.process_sources(processors, &children, depth + 1, progress)?;
                    }
                }
                break;
            }

            if !handled {
                error!(depth, source_index = index, source_type = %source.kind, "ignoring source; none of the given processors supports it");
                continue;
            }
            debug!(depth, source_index = index, source_type = %source.kind, "finished processing source");
        }

        Ok(())
    }

    /// Replace every entry's labels with category ids, building the tree.
    fn organize_categories(&mut self) {
        for entry in self.entries.iter_mut() {
            let mut labels: Vec<String> = Vec::new();
            for raw in entry.labels() {
                let label = clean_label(raw);
                if !label.is_empty() && !labels.contains(&label) {
                    labels.push(label);
                }
            }

            let count = BTreeMap::from([
                (COUNT_ALL.to_string(), 1),
                (entry.kind().to_string(), 1),
            ]);
            let ids: Vec<u32> = labels
                .iter()
                .flat_map(|label| self.categories.insert(label, &count))
                .collect();

            entry.set_categories(ids);
        }
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove an entry and release its category counts.
    pub fn remove_entry(&mut self, id: &str) -> Result<Option<Entry>> {
        if !self.processed {
            return Err(HubError::state(
                "cannot remove an entry while the list is not processed",
            ));
        }

        let Some(entry) = self.entries.remove(id) else {
            return Ok(None);
        };
        self.categories.release(entry.categories(), entry.kind());
        Ok(Some(entry))
    }
}

/// Strip control characters and surrounding whitespace from a raw label.
fn clean_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::processors::{InlineProcessor, SourceProcessor};
    use crate::progress::SilentProgress;

    /// Expands an `expand` source into the inline sources held in its data.
    struct Expander;

    impl SourceProcessor for Expander {
        fn name(&self) -> &str {
            "expander"
        }
        fn action(&self, source: &Source) -> Result<Action> {
            Ok(if source.kind == "expand" {
                Action::PartialProcessing
            } else {
                Action::Skip
            })
        }
        fn process(
            &self,
            source: &Source,
            _emit: &mut dyn FnMut(ProcessorEvent),
        ) -> Result<Vec<Source>> {
            Ok(serde_json::from_value(source.data.clone())?)
        }
    }

    /// Fails on every `broken` source.
    struct Failing;

    impl SourceProcessor for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn action(&self, source: &Source) -> Result<Action> {
            Ok(if source.kind == "broken" {
                Action::Processing
            } else {
                Action::Skip
            })
        }
        fn process(
            &self,
            _source: &Source,
            emit: &mut dyn FnMut(ProcessorEvent),
        ) -> Result<Vec<Source>> {
            emit(ProcessorEvent::EntryCreated(Entry::new("partial", "x")));
            Err(HubError::ProcessorFailed("upstream unavailable".into()))
        }
    }

    /// Claims inline sources ahead of `InlineProcessor` and counts calls.
    struct Counting(AtomicUsize);

    impl SourceProcessor for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn action(&self, source: &Source) -> Result<Action> {
            Ok(if source.kind == "inline" {
                Action::Processing
            } else {
                Action::Skip
            })
        }
        fn process(
            &self,
            _source: &Source,
            _emit: &mut dyn FnMut(ProcessorEvent),
        ) -> Result<Vec<Source>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    /// Reports an action code outside the known set.
    struct Broken;

    impl SourceProcessor for Broken {
        fn name(&self) -> &str {
            "broken"
        }
        fn action(&self, _source: &Source) -> Result<Action> {
            Action::from_code(9, self.name())
        }
        fn process(
            &self,
            _source: &Source,
            _emit: &mut dyn FnMut(ProcessorEvent),
        ) -> Result<Vec<Source>> {
            Ok(Vec::new())
        }
    }

    fn registry() -> ProcessorRegistry {
        ProcessorRegistry::new()
            .with(Expander)
            .with(Failing)
            .with(InlineProcessor)
    }

    fn list(value: Value) -> List {
        List::from_value(value).expect("list")
    }

    #[test]
    fn same_id_from_two_sources_merges_categories() {
        let mut list = list(json!({
            "id": "Awesome",
            "sources": [
                {"type": "inline", "data": [{"id": "a", "type": "x", "categories": ["Tools/CLI"]}]},
                {"type": "expand", "data": [
                    {"type": "inline", "data": [{"id": "A", "type": "x", "categories": ["Tools/GUI"]}]}
                ]}
            ]
        }));

        let stats = list.process(&registry(), &SilentProgress).expect("process");
        assert_eq!(stats, ProcessStats { entries: 1, categories: 3 });
        assert!(list.is_processed());
        assert_eq!(list.id(), "awesome");

        let cats = list.categories();
        let tools = cats.by_path("tools").unwrap();
        let cli = cats.by_path("tools/cli").unwrap();
        let gui = cats.by_path("tools/gui").unwrap();
        assert_eq!(tools.count[COUNT_ALL], 2);
        assert_eq!(cli.parent, Some(tools.id));

        let entry = list.entries().get("a").unwrap();
        assert!(entry.categories().contains(&cli.id));
        assert!(entry.categories().contains(&gui.id));
    }

    #[test]
    fn processing_without_processors_fails() {
        let mut list = list(json!({"id": "x", "sources": [{"type": "inline", "data": []}]}));
        let err = list.process(&ProcessorRegistry::new(), &SilentProgress).unwrap_err();
        assert!(matches!(err, HubError::State { .. }));
        assert!(!list.is_processed());
    }

    #[test]
    fn failing_and_unsupported_sources_do_not_abort() {
        let mut list = list(json!({
            "id": "x",
            "sources": [
                {"type": "broken"},
                {"type": "unknown"},
                {"type": "expand", "data": []},
                {"type": "inline", "data": [{"id": "ok", "type": "x"}]}
            ]
        }));

        list.process(&registry(), &SilentProgress).expect("process");
        let ids: Vec<&str> = list.entries().ids().collect();
        // Entries emitted before a processor failure are kept.
        assert_eq!(ids, vec!["partial", "ok"]);
    }

    #[test]
    fn first_matching_processor_wins() {
        let counting = Counting(AtomicUsize::new(0));
        let registry = ProcessorRegistry::new().with(counting).with(InlineProcessor);
        let mut list = list(json!({
            "id": "x",
            "sources": [{"type": "inline", "data": [{"id": "a", "type": "x"}]}]
        }));

        list.process(&registry, &SilentProgress).expect("process");
        assert!(list.entries().is_empty());
    }

    #[test]
    fn unexpected_action_is_fatal() {
        let registry = ProcessorRegistry::new().with(Broken).with(InlineProcessor);
        let mut list = list(json!({"id": "x", "sources": [{"type": "inline", "data": []}]}));
        let err = list.process(&registry, &SilentProgress).unwrap_err();
        assert!(matches!(err, HubError::UnexpectedAction { code: 9, .. }));
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        let mut list = list(json!({
            "id": "x",
            "sources": [{"type": "inline", "data": [], "options": {"categories": {"A": "(open"}}}]
        }));
        let err = list.process(&registry(), &SilentProgress).unwrap_err();
        assert!(matches!(err, HubError::InvalidPattern { role: "category", .. }));
        assert!(!list.is_processed());
    }

    #[test]
    fn exclusion_is_source_local() {
        let mut list = list(json!({
            "id": "x",
            "sources": [
                {"type": "inline", "options": {"exclude": ["^skip-"]},
                 "data": [{"id": "skip-x", "type": "x", "from": "first"}, {"id": "keep", "type": "x"}]},
                {"type": "inline", "data": [{"id": "skip-x", "type": "x", "categories": ["Late"]}]}
            ]
        }));
        list.process(&registry(), &SilentProgress).expect("process");

        let late = list.entries().get("skip-x").expect("contributed by the second source");
        assert!(late.get("from").is_none());
        assert!(list.entries().contains("keep"));
    }

    #[test]
    fn source_defaults_merge_under_source_options() {
        let mut list = list(json!({
            "id": "x",
            "options": {
                "source": {"exclude": ["^skip-"], "categories": {"Misc": "*"}},
                "categoryOrder": {"misc": 1}
            },
            "sources": [
                {"type": "inline", "options": {"exclude": ["^drop-"]},
                 "data": [{"id": "skip-a", "type": "x"}, {"id": "drop-b", "type": "x"}, {"id": "c", "type": "x"}]}
            ]
        }));
        assert_eq!(
            list.definition().sources[0].options["exclude"],
            json!(["^skip-", "^drop-"])
        );

        list.process(&registry(), &SilentProgress).expect("process");
        assert_eq!(list.entries().ids().collect::<Vec<_>>(), vec!["c"]);
        let misc = list.categories().by_path("misc").unwrap();
        assert_eq!(misc.order, 1);
        assert_eq!(misc.count["x"], 1);
    }

    #[test]
    fn labels_are_cleaned_and_deduplicated() {
        let mut list = list(json!({
            "id": "x",
            "sources": [{"type": "inline", "data": [
                {"id": "a", "type": "x", "categories": [" Tools\u{7} ", "Tools", "", "  "]}
            ]}]
        }));
        list.process(&registry(), &SilentProgress).expect("process");

        let entry = list.entries().get("a").unwrap();
        assert_eq!(entry.categories(), [1]);
        assert_eq!(list.categories().get(1).unwrap().count[COUNT_ALL], 1);
    }

    #[test]
    fn second_process_is_idempotent() {
        let mut list = list(json!({
            "id": "x",
            "sources": [{"type": "inline", "data": [{"id": "a", "type": "x", "categories": ["T"]}]}]
        }));
        let first = list.process(&registry(), &SilentProgress).expect("first");
        let second = list.process(&registry(), &SilentProgress).expect("second");
        assert_eq!(first, second);
        assert_eq!(list.categories().by_path("t").unwrap().count[COUNT_ALL], 1);
    }

    #[test]
    fn remove_entry_requires_processing_and_prunes() {
        let mut list = list(json!({
            "id": "x",
            "sources": [{"type": "inline", "data": [
                {"id": "a", "type": "x", "categories": ["Tools/CLI"]},
                {"id": "b", "type": "y", "categories": ["Tools/GUI"]}
            ]}]
        }));
        assert!(list.remove_entry("a").is_err());

        list.process(&registry(), &SilentProgress).expect("process");
        let removed = list.remove_entry("a").expect("remove").expect("entry");
        assert_eq!(removed.id(), "a");
        assert!(list.remove_entry("a").unwrap().is_none());

        assert!(list.categories().by_path("tools/cli").is_none());
        let tools = list.categories().by_path("tools").unwrap();
        assert_eq!(tools.count[COUNT_ALL], 1);
        assert_eq!(tools.count["y"], 1);
    }

    #[test]
    fn removing_an_all_typed_entry_keeps_shared_categories() {
        let mut list = list(json!({
            "id": "x",
            "sources": [{"type": "inline", "data": [
                {"id": "a", "type": "all", "categories": ["T"]},
                {"id": "b", "type": "all", "categories": ["T"]}
            ]}]
        }));
        list.process(&registry(), &SilentProgress).expect("process");
        assert_eq!(list.categories().by_path("t").unwrap().count[COUNT_ALL], 2);

        list.remove_entry("a").expect("remove");
        let t = list.categories().by_path("t").expect("category survives");
        assert_eq!(t.count[COUNT_ALL], 1);
        assert_eq!(list.entries().get("b").unwrap().categories(), &[t.id]);
    }

    #[test]
    fn output_serializes_entries_and_categories() {
        let mut list = list(json!({
            "id": "Demo",
            "sources": [{"type": "inline", "data": [{"id": "a", "type": "x", "categories": ["Tools"]}]}]
        }));
        list.set_option("title", json!("Demo list"));
        list.process(&registry(), &SilentProgress).expect("process");

        let value = serde_json::to_value(list.output()).expect("serialize");
        assert_eq!(value["id"], json!("demo"));
        assert_eq!(value["entries"][0]["categories"], json!([1]));
        assert_eq!(value["categories"][0]["path"], json!("tools"));
        assert_eq!(value["tree"][0]["count"], json!(1));
        assert_eq!(list.definition().options.extra["title"], json!("Demo list"));
    }
}
