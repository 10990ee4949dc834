//! Shared types, error model, and configuration for AwesomeHub.
//!
//! This crate is the foundation depended on by all other AwesomeHub crates.
//! It provides:
//! - [`HubError`]: the unified error type
//! - Domain types ([`ListDefinition`], [`Source`], [`Entry`], [`Category`])
//! - Nested map merging ([`merge_maps`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod entry;
pub mod error;
pub mod merge;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OutputConfig, ResolveConfig, config_dir, config_file_path, expand_home,
    init_config, load_config, load_config_from,
};
pub use entry::Entry;
pub use error::{HubError, Result};
pub use merge::{ListMerge, merge_maps};
pub use types::{
    COUNT_ALL, Category, DEFAULT_CATEGORY_ORDER, ListDefinition, ListOptions, Source,
};
