//! Source lists split out into separate JSON files.

use std::path::{Path, PathBuf};

use serde_json::Value;

use awesomehub_shared::{HubError, ListMerge, Result, Source, merge_maps};

use super::{Action, ProcessorEvent, SourceProcessor};

/// Handles `include` sources: `data` is the path of a JSON file holding an
/// array of sources, which become children of the including source.
///
/// The including source's options are merged under each child's options.
/// Relative paths of nested `include` children are taken from the directory
/// of the file that lists them.
pub struct IncludeProcessor {
    root: PathBuf,
}

impl IncludeProcessor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve_path(&self, raw: &Path) -> PathBuf {
        if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            self.root.join(raw)
        }
    }
}

fn include_path(data: &Value) -> Result<&Path> {
    match data.as_str().filter(|s| !s.trim().is_empty()) {
        Some(raw) => Ok(Path::new(raw)),
        None => Err(HubError::ProcessorFailed(
            "include source data must be a file path".into(),
        )),
    }
}

/// Re-anchor a nested include's relative path at `base`, the directory of
/// the file that lists it.
fn rebase(child: &mut Source, base: &Path) {
    if child.kind != "include" {
        return;
    }
    let Some(raw) = child.data.as_str().map(Path::new) else {
        return;
    };
    if raw.is_relative() {
        child.data = Value::String(base.join(raw).to_string_lossy().into_owned());
    }
}

impl SourceProcessor for IncludeProcessor {
    fn name(&self) -> &str {
        "include"
    }

    fn action(&self, source: &Source) -> Result<Action> {
        Ok(if source.kind == "include" {
            Action::PartialProcessing
        } else {
            Action::Skip
        })
    }

    fn process(
        &self,
        source: &Source,
        emit: &mut dyn FnMut(ProcessorEvent),
    ) -> Result<Vec<Source>> {
        let raw = include_path(&source.data)?;
        let base = raw.parent().unwrap_or(Path::new(""));
        let path = self.resolve_path(raw);
        emit(ProcessorEvent::info(format!("Reading {}", path.display())));

        let content = std::fs::read_to_string(&path).map_err(|e| HubError::io(&path, e))?;
        let children: Vec<Source> = serde_json::from_str(&content).map_err(|e| {
            HubError::ProcessorFailed(format!("failed to parse {}: {e}", path.display()))
        })?;

        Ok(children
            .into_iter()
            .map(|mut child| {
                let mut options = source.options.clone();
                merge_maps(&mut options, &child.options, ListMerge::Concat);
                child.options = options;
                rebase(&mut child, base);
                child
            })
            .collect())
    }
}
