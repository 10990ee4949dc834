//! Entry resolver trait and built-in resolvers.
//!
//! Resolvers enrich or validate one entry at a time, typically backed by an
//! [`EntryCache`](crate::cache::EntryCache).

mod attributes;

use awesomehub_shared::{Entry, Result};

pub use attributes::AttributesResolver;

/// Pluggable unit enriching a single entry.
///
/// A [`HubError::ResolveFailed`](awesomehub_shared::HubError::ResolveFailed)
/// from [`resolve`](Self::resolve) drops the entry from the list; any other
/// error aborts resolution.
pub trait EntryResolver: Send + Sync {
    /// Human-readable resolver name for tracing.
    fn name(&self) -> &str;

    fn supports(&self, entry: &Entry) -> bool;

    /// Whether resolving `entry` would be served from cache.
    fn is_cached(&self, entry: &Entry) -> bool;

    /// Resolve in place; `force` bypasses the cache.
    fn resolve(&self, entry: &mut Entry, force: bool) -> Result<()>;
}

/// Holds registered resolvers in priority order.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn EntryResolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resolver: impl EntryResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    pub fn with(mut self, resolver: impl EntryResolver + 'static) -> Self {
        self.register(resolver);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// The first resolver supporting `entry`.
    pub fn find(&self, entry: &Entry) -> Option<&dyn EntryResolver> {
        self.resolvers
            .iter()
            .find(|resolver| resolver.supports(entry))
            .map(|resolver| resolver.as_ref())
    }
}
