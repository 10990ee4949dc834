//! Compiled per-source inclusion and categorization rules.
//!
//! Pattern strings come from source options. A pattern written as
//! `/body/flags` is delimited; anything else is used as-is. Matching is an
//! unanchored search, so `^skip-` restricts to a prefix while `cli` matches
//! anywhere in the id.

use regex::Regex;

use awesomehub_shared::{HubError, Result, Source};

/// Rules applied to every entry a source contributes.
#[derive(Debug, Clone, Default)]
pub struct SourceRules {
    exclude: Vec<Regex>,
    category: Option<String>,
    categories: Vec<(String, Vec<Regex>)>,
}

impl SourceRules {
    /// Compile the `exclude`, `category` and `categories` options of a source.
    pub fn compile(source: &Source) -> Result<Self> {
        let exclude = source
            .exclude_patterns()?
            .iter()
            .map(|pattern| compile_pattern(pattern, "exclude"))
            .collect::<Result<Vec<_>>>()?;

        let category = source.category()?.map(String::from);

        let mut categories = Vec::new();
        for (label, patterns) in source.category_patterns()? {
            let compiled = patterns
                .iter()
                .map(|pattern| {
                    let pattern = if pattern == "*" { ".*" } else { pattern.as_str() };
                    compile_pattern(pattern, "category")
                })
                .collect::<Result<Vec<_>>>()?;
            categories.push((label, compiled));
        }

        Ok(Self {
            exclude,
            category,
            categories,
        })
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(id))
    }

    /// The single category forced onto every entry of the source.
    pub fn forced_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Labels whose patterns match `id`, once per matching pattern.
    pub fn matching_labels(&self, id: &str) -> Vec<String> {
        let mut labels = Vec::new();
        for (label, patterns) in &self.categories {
            for re in patterns {
                if re.is_match(id) {
                    labels.push(label.clone());
                }
            }
        }
        labels
    }
}

/// Compile one option pattern, honoring `/body/flags` delimiters.
pub fn compile_pattern(pattern: &str, role: &'static str) -> Result<Regex> {
    let expression = match split_delimited(pattern) {
        Some((body, flags)) => {
            // `u` is the default for this engine.
            let flags: String = flags.chars().filter(|f| *f != 'u').collect();
            if flags.is_empty() {
                body.to_string()
            } else {
                format!("(?{flags}){body}")
            }
        }
        None => pattern.to_string(),
    };

    Regex::new(&expression).map_err(|source| HubError::InvalidPattern {
        pattern: pattern.to_string(),
        role,
        source,
    })
}

fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    Some((&rest[..end], &rest[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(options: serde_json::Value) -> Source {
        serde_json::from_value(json!({"type": "inline", "options": options})).expect("source")
    }

    #[test]
    fn bare_patterns_search_anywhere() {
        let re = compile_pattern("cli", "exclude").unwrap();
        assert!(re.is_match("awesome-cli-tools"));
        let anchored = compile_pattern("^skip-", "exclude").unwrap();
        assert!(anchored.is_match("skip-x"));
        assert!(!anchored.is_match("no-skip-x"));
    }

    #[test]
    fn delimited_patterns_apply_flags() {
        let re = compile_pattern("/^SKIP-/i", "exclude").unwrap();
        assert!(re.is_match("skip-x"));
        let plain = compile_pattern("/a\\/b/", "exclude").unwrap();
        assert!(plain.is_match("a/b"));
        let unicode = compile_pattern("/^x$/u", "exclude").unwrap();
        assert!(unicode.is_match("x"));
    }

    #[test]
    fn invalid_patterns_are_configuration_errors() {
        let err = compile_pattern("(unclosed", "category").unwrap_err();
        match err {
            HubError::InvalidPattern { pattern, role, .. } => {
                assert_eq!(pattern, "(unclosed");
                assert_eq!(role, "category");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(compile_pattern("/x/q", "exclude").is_err());
    }

    #[test]
    fn compile_reads_source_options() {
        let rules = SourceRules::compile(&source(json!({
            "exclude": ["^skip-"],
            "categories": {"Tools/CLI": ["cli", "term"], "All": "*"}
        })))
        .unwrap();

        assert!(rules.is_excluded("skip-me"));
        assert!(!rules.is_excluded("keep-me"));
        assert_eq!(rules.forced_category(), None);
        assert_eq!(
            rules.matching_labels("cli-term"),
            vec!["Tools/CLI".to_string(), "Tools/CLI".to_string(), "All".to_string()]
        );
        assert_eq!(rules.matching_labels("gui"), vec!["All".to_string()]);
    }

    #[test]
    fn compile_fails_fast_on_bad_exclude() {
        let err = SourceRules::compile(&source(json!({"exclude": ["[z-a]"]}))).unwrap_err();
        assert!(matches!(err, HubError::InvalidPattern { role: "exclude", .. }));
    }
}
