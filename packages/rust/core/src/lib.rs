//! List-processing and resolution engine for AwesomeHub.
//!
//! This crate turns a [`ListDefinition`](awesomehub_shared::ListDefinition)
//! into a deduplicated, categorized and resolved entry set:
//! - [`processors`]: source processor contract, registry, built-ins
//! - [`entries`]: the entry set and its merge engine
//! - [`taxonomy`]: path-based category tree
//! - [`resolvers`]: entry resolver contract, registry, built-ins
//! - [`list`] / [`resolve`]: the [`List`] aggregate and its two phases

pub mod cache;
pub mod entries;
pub mod list;
pub mod processors;
pub mod progress;
pub mod resolve;
pub mod resolvers;
pub mod rules;
pub mod taxonomy;

pub use cache::{CacheRecord, EntryCache};
pub use entries::{AddOutcome, EntrySet};
pub use list::{List, ListOutput, ProcessStats};
pub use processors::{
    Action, IncludeProcessor, InlineProcessor, ProcessorEvent, ProcessorRegistry,
    SourceProcessor, StatusKind,
};
pub use progress::{ProgressReporter, SilentProgress};
pub use resolve::ResolveStats;
pub use resolvers::{AttributesResolver, EntryResolver, ResolverRegistry};
pub use rules::{SourceRules, compile_pattern};
pub use taxonomy::{CategoryNode, CategoryTree, slugify};
