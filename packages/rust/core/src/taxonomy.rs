//! Category taxonomy builder.
//!
//! Turns slash-delimited tag paths (`"Tools/Command Line"`) into a flat map
//! of [`Category`] records keyed by id, deduplicated by normalized slug path
//! (`tools/command-line`). Ids are assigned on first sight, starting at 1.

use std::collections::{BTreeMap, HashMap};

use deunicode::deunicode_char;
use serde::Serialize;
use tracing::debug;

use awesomehub_shared::{COUNT_ALL, Category, DEFAULT_CATEGORY_ORDER};

/// All categories of one list.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    categories: BTreeMap<u32, Category>,
    by_path: HashMap<String, u32>,
    last_insert: u32,
}

impl CategoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Look a category up by its normalized path.
    pub fn by_path(&self, path: &str) -> Option<&Category> {
        self.by_path.get(path).and_then(|id| self.categories.get(id))
    }

    /// Categories in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    /// Insert every level of `path`, adding `count` to each level's counters.
    ///
    /// Returns one id per path segment, root to leaf. Existing levels keep
    /// their id; their title is overwritten by the latest spelling.
    pub fn insert(&mut self, path: &str, count: &BTreeMap<String, u64>) -> Vec<u32> {
        let mut slugs: Vec<String> = Vec::new();
        let mut ids = Vec::new();

        for segment in path.trim_matches('/').split('/') {
            let title = upper_first(segment.trim());
            if title.is_empty() {
                continue;
            }
            let slug = segment_slug(&title);

            let parent_path = slugs.join("/");
            slugs.push(slug);
            let full_path = slugs.join("/");

            if let Some(&id) = self.by_path.get(&full_path) {
                if let Some(category) = self.categories.get_mut(&id) {
                    category.title = title;
                    for (key, delta) in count {
                        *category.count.entry(key.clone()).or_insert(0) += delta;
                    }
                }
                ids.push(id);
                continue;
            }

            self.last_insert += 1;
            let id = self.last_insert;
            let parent = self.by_path.get(&parent_path).copied();
            debug!(id, path = %full_path, ?parent, "new category");

            self.by_path.insert(full_path.clone(), id);
            self.categories.insert(
                id,
                Category {
                    id,
                    title,
                    path: full_path,
                    parent,
                    count: count.clone(),
                    order: DEFAULT_CATEGORY_ORDER,
                },
            );
            ids.push(id);
        }

        ids
    }

    /// Undo one entry's contribution: decrement `all` and `kind` once per
    /// occurrence of each id, deleting categories whose `all` drops below 1.
    ///
    /// An entry typed `all` was counted once on insert, so it is released
    /// once too.
    pub fn release(&mut self, ids: &[u32], kind: &str) {
        let keys: &[&str] = if kind == COUNT_ALL {
            &[COUNT_ALL]
        } else {
            &[COUNT_ALL, kind]
        };
        for id in ids {
            let Some(category) = self.categories.get_mut(id) else {
                continue;
            };
            for key in keys {
                if let Some(value) = category.count.get_mut(*key) {
                    *value = value.saturating_sub(1);
                }
            }
            if category.total() < 1 {
                debug!(id, path = %category.path, "pruning empty category");
                self.by_path.remove(&category.path);
                self.categories.remove(id);
            }
        }
    }

    /// Set every category's order from `overrides` (by path), defaulting
    /// to [`DEFAULT_CATEGORY_ORDER`].
    pub fn apply_order(&mut self, overrides: &HashMap<String, i64>) {
        for category in self.categories.values_mut() {
            category.order = overrides
                .get(&category.path)
                .copied()
                .unwrap_or(DEFAULT_CATEGORY_ORDER);
        }
    }

    /// Nested view of the taxonomy, siblings sorted by order then title.
    pub fn tree(&self) -> Vec<CategoryNode> {
        let mut children: HashMap<Option<u32>, Vec<&Category>> = HashMap::new();
        for category in self.categories.values() {
            // A parent that has been pruned leaves its children at the top.
            let parent = category.parent.filter(|p| self.categories.contains_key(p));
            children.entry(parent).or_default().push(category);
        }
        build_nodes(None, &children)
    }
}

/// A category with its nested children, for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    pub id: u32,
    pub title: String,
    pub path: String,
    pub order: i64,
    pub count: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

fn build_nodes(
    parent: Option<u32>,
    children: &HashMap<Option<u32>, Vec<&Category>>,
) -> Vec<CategoryNode> {
    let Some(level) = children.get(&parent) else {
        return Vec::new();
    };

    let mut nodes: Vec<CategoryNode> = level
        .iter()
        .map(|category| CategoryNode {
            id: category.id,
            title: category.title.clone(),
            path: category.path.clone(),
            order: category.order,
            count: category.total(),
            children: build_nodes(Some(category.id), children),
        })
        .collect();

    nodes.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
    });
    nodes
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Normalize a title into an ASCII, lower-case, hyphenated token.
///
/// Non-ASCII characters are transliterated first. Characters outside
/// `[A-Za-z0-9_-]` then become separators, runs of separators collapse
/// into one hyphen and edge hyphens are trimmed.
pub fn slugify(input: &str) -> String {
    let mut ascii = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii() {
            ascii.push(c);
        } else {
            ascii.push_str(deunicode_char(c).unwrap_or(" "));
        }
    }

    let mut slug = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    slug.trim_matches('-').to_string()
}

/// Slug of one non-empty path segment; never empty.
///
/// Titles without a single letter or digit fall back to their code points
/// (`"#"` becomes `u23`) so the level is kept.
fn segment_slug(title: &str) -> String {
    let slug = slugify(title);
    if !slug.is_empty() {
        return slug;
    }
    title
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| format!("u{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
