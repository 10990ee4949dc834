//! Resolution phase: run every entry through the resolver chain.

use serde::Serialize;
use tracing::{info, instrument, warn};

use awesomehub_shared::{HubError, Result};

use crate::list::List;
use crate::progress::ProgressReporter;
use crate::resolvers::ResolverRegistry;

/// Summary of a resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    /// Entries visited.
    pub total: usize,
    /// Entries resolved successfully.
    pub resolved: usize,
    /// Resolved entries served from cache.
    pub cached: usize,
}

impl List {
    /// Resolve every entry with the first resolver supporting it.
    ///
    /// Entries that fail with a resolve failure, or that no resolver
    /// supports, are removed from the list. Any other resolver error aborts
    /// the run.
    #[instrument(skip_all, fields(list = %self.definition.id, force = force))]
    pub fn resolve(
        &mut self,
        resolvers: &ResolverRegistry,
        force: bool,
        progress: &dyn ProgressReporter,
    ) -> Result<ResolveStats> {
        if !self.processed {
            return Err(HubError::state(
                "cannot resolve the list while it is not processed",
            ));
        }
        if resolvers.is_empty() {
            return Err(HubError::state(
                "cannot resolve the list; no resolvers have been provided",
            ));
        }
        if self.entries.is_empty() {
            return Err(HubError::state("no entries to resolve"));
        }

        info!("resolving list entries");
        progress.start("Resolving entries");

        let ids: Vec<String> = self.entries.ids().map(String::from).collect();
        let mut stats = ResolveStats::default();

        for (index, id) in ids.iter().enumerate() {
            stats.total += 1;
            let position = index + 1;

            let Some(entry) = self.entries.get_mut(id) else {
                continue;
            };
            let Some(resolver) = resolvers.find(entry) else {
                let kind = entry.kind().to_string();
                self.remove_entry(id)?;
                warn!(position, entry_id = %id, entry_type = %kind, "ignoring entry; none of the given resolvers supports it");
                continue;
            };

            let cached = resolver.is_cached(entry);
            progress.update(&format!("Resolving entry#{position} => {id}"));

            match resolver.resolve(entry, force) {
                Ok(()) => {
                    stats.resolved += 1;
                    if cached {
                        stats.cached += 1;
                    }
                }
                Err(e) if e.is_resolve_failure() => {
                    self.remove_entry(id)?;
                    warn!(position, entry_id = %id, resolver = resolver.name(), error = %e, "failed resolving entry");
                }
                Err(e) => {
                    progress.end();
                    return Err(e);
                }
            }
        }

        self.resolved = true;
        progress.end();
        info!(
            resolved = stats.resolved,
            total = stats.total,
            cached = stats.cached,
            "resolved entries"
        );

        Ok(stats)
    }
}
