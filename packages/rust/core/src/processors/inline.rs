//! Inline entries embedded in the list definition.

use serde_json::Value;

use awesomehub_shared::{Entry, HubError, Result, Source};

use super::{Action, ProcessorEvent, SourceProcessor};

/// Handles `inline` sources: `data` is an array of entry objects.
pub struct InlineProcessor;

impl SourceProcessor for InlineProcessor {
    fn name(&self) -> &str {
        "inline"
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
        source: &Source,
        emit: &mut dyn FnMut(ProcessorEvent),
    ) -> Result<Vec<Source>> {
        let Value::Array(items) = &source.data else {
            return Err(HubError::ProcessorFailed(
                "inline source data must be a list of entries".into(),
            ));
        };

        for (index, item) in items.iter().enumerate() {
            match Entry::from_value(item.clone()) {
                Ok(entry) => {
                    emit(ProcessorEvent::info(format!("Created entry {}", entry.id())));
                    emit(ProcessorEvent::EntryCreated(entry));
                }
                Err(e) => emit(ProcessorEvent::error(format!(
                    "Skipping inline item #{index}; {e}"
                ))),
            }
        }

        Ok(Vec::new())
    }
}
