//! Source processor trait, events, and built-in processors.
//!
//! Processors claim sources by type and either produce entries directly or
//! expand a source into child sources.

mod include;
mod inline;

use awesomehub_shared::{Entry, HubError, Result, Source};

pub use include::IncludeProcessor;
pub use inline::InlineProcessor;

// ---------------------------------------------------------------------------
// Actions & events
// ---------------------------------------------------------------------------

/// A processor's verdict on a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Action {
    /// Not applicable; try the next processor.
    Skip = 0,
    /// Produce final entries for the source via events.
    Processing = 1,
    /// Expand the source into child sources.
    PartialProcessing = 2,
}

impl Action {
    /// Decode a raw action code reported by `processor`.
    pub fn from_code(code: u8, processor: &str) -> Result<Self> {
        match code {
            0 => Ok(Self::Skip),
            1 => Ok(Self::Processing),
            2 => Ok(Self::PartialProcessing),
            _ => Err(HubError::UnexpectedAction {
                processor: processor.to_string(),
                code,
            }),
        }
    }
}

/// Severity of a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Messages a processor emits while handling a source.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorEvent {
    /// Human-readable progress, or a non-fatal error message.
    StatusUpdate { kind: StatusKind, message: String },
    /// A fully formed entry for the merge engine.
    EntryCreated(Entry),
}

impl ProcessorEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self::StatusUpdate {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::StatusUpdate {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Pluggable unit turning one source into entries or child sources.
///
/// Processors are tried in registration order; the first one that does not
/// return [`Action::Skip`] handles the source exclusively.
pub trait SourceProcessor: Send + Sync {
    /// Human-readable processor name for tracing.
    fn name(&self) -> &str;

    /// Decide how this processor handles `source`.
    ///
    /// An error here is a broken plugin contract and aborts the run.
    fn action(&self, source: &Source) -> Result<Action>;

    /// Handle the source. Entries and progress go through `emit`; the
    /// returned sources are the children for [`Action::PartialProcessing`]
    /// and are ignored otherwise.
    fn process(
        &self,
        source: &Source,
        emit: &mut dyn FnMut(ProcessorEvent),
    ) -> Result<Vec<Source>>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds registered processors in priority order.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: Vec<Box<dyn SourceProcessor>>,
}

impl ProcessorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in processors. `include_root` is
    /// the directory relative include paths are resolved against.
    pub fn with_builtins(include_root: impl Into<std::path::PathBuf>) -> Self {
        Self::new()
            .with(InlineProcessor)
            .with(IncludeProcessor::new(include_root))
    }

    /// Append a processor (lowest priority so far).
    pub fn register(&mut self, processor: impl SourceProcessor + 'static) {
        self.processors.push(Box::new(processor));
    }

    pub fn with(mut self, processor: impl SourceProcessor + 'static) -> Self {
        self.register(processor);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SourceProcessor> {
        self.processors.iter().map(|p| p.as_ref())
    }
}
