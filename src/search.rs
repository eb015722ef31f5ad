use serde_json::Value;
use thiserror::Error;

use crate::query::key_segment;
use crate::tree::{kind_of, sorted_entries};
use crate::types::{MatchKind, SearchMatch};

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub keys: bool,
    pub values: bool,
    pub case_sensitive: bool,
    pub regex: bool,
    pub whole_word: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            keys: true,
            values: true,
            case_sensitive: false,
            regex: false,
            whole_word: false,
        }
    }
}

pub fn text_matches(text: &str, query: &str, re: Option<&regex::Regex>, whole_word: bool) -> bool {
    if let Some(re) = re {
        re.is_match(text)
    } else if whole_word {
        // Note: text and query should already be case-normalized if needed
        text.split(|c: char| !c.is_alphanumeric())
            .any(|word| word == query)
    } else {
        text.contains(query)
    }
}

/// Walk the document in display order (sorted object keys, original array
/// order) and report every key/value hit with the query string selecting
/// the value it sits on.
pub fn search(root: &Value, query: &str, options: &SearchOptions) -> Result<Vec<SearchMatch>, SearchError> {
    let mut results = Vec::new();
    if query.trim().is_empty() {
        return Ok(results);
    }
    let re = if options.regex {
        Some(regex::Regex::new(query)?)
    } else {
        None
    };
    let needle = if options.case_sensitive {
        query.to_string()
    } else {
        query.to_lowercase()
    };
    // Object roots accumulate segments from an empty prefix; array roots
    // index from the root identity.
    let prefix = if root.is_object() { "" } else { "." };
    search_recursive(root, prefix, &needle, re.as_ref(), options, &mut results);
    Ok(results)
}

fn normalized(text: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn search_recursive(
    value: &Value,
    prefix: &str,
    needle: &str,
    re: Option<&regex::Regex>,
    options: &SearchOptions,
    results: &mut Vec<SearchMatch>,
) {
    match value {
        Value::Object(map) => {
            for (key, val) in sorted_entries(map) {
                let child_query = format!("{prefix}{}", key_segment(key));

                if options.keys
                    && text_matches(&normalized(key, options.case_sensitive), needle, re, options.whole_word)
                {
                    results.push(SearchMatch {
                        query: child_query.clone(),
                        key: Some(key.to_string()),
                        kind: kind_of(val),
                        match_kind: MatchKind::Key,
                        matched: key.to_string(),
                    });
                }

                if options.values {
                    if let Some(text) = scalar_text(val) {
                        if text_matches(&normalized(&text, options.case_sensitive), needle, re, options.whole_word) {
                            results.push(SearchMatch {
                                query: child_query.clone(),
                                key: Some(key.to_string()),
                                kind: kind_of(val),
                                match_kind: MatchKind::Value,
                                matched: text,
                            });
                        }
                    }
                }

                if matches!(val, Value::Object(_) | Value::Array(_)) {
                    search_recursive(val, &child_query, needle, re, options, results);
                }
            }
        }
        Value::Array(arr) => {
            for (index, item) in arr.iter().enumerate() {
                let item_query = format!("{prefix}[{index}]");

                if options.values {
                    if let Some(text) = scalar_text(item) {
                        if text_matches(&normalized(&text, options.case_sensitive), needle, re, options.whole_word) {
                            results.push(SearchMatch {
                                query: item_query.clone(),
                                key: None,
                                kind: kind_of(item),
                                match_kind: MatchKind::Value,
                                matched: text,
                            });
                        }
                    }
                }

                if matches!(item, Value::Object(_) | Value::Array(_)) {
                    search_recursive(item, &item_query, needle, re, options, results);
                }
            }
        }
        // Primitives are handled inside object/array iteration
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::eval_query;
    use crate::types::NodeKind;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "name": "Ada",
            "tags": ["rust", "json"],
            "meta": {"rust-version": "1.75", "count": 42, "done": true}
        })
    }

    #[test]
    fn matches_keys_and_values() {
        let hits = search(&doc(), "rust", &SearchOptions::default()).unwrap();
        let queries: Vec<&str> = hits.iter().map(|m| m.query.as_str()).collect();
        assert_eq!(queries, vec![".meta['rust-version']", ".tags[0]"]);
        assert_eq!(hits[0].match_kind, MatchKind::Key);
        assert_eq!(hits[0].matched, "rust-version");
        assert_eq!(hits[1].match_kind, MatchKind::Value);
        assert_eq!(hits[1].kind, NodeKind::String);
        assert_eq!(hits[1].key, None);
    }

    #[test]
    fn match_queries_select_the_hit_value() {
        let v = doc();
        let hits = search(&v, "rust", &SearchOptions::default()).unwrap();
        for hit in &hits {
            assert!(eval_query(&hit.query, &v).is_ok(), "query {}", hit.query);
        }
        assert_eq!(eval_query(&hits[1].query, &v).unwrap(), &json!("rust"));
    }

    #[test]
    fn case_folding_is_the_default() {
        let hits = search(&doc(), "ADA", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].matched, "Ada");

        let mut opts = SearchOptions::default();
        opts.case_sensitive = true;
        assert!(search(&doc(), "ADA", &opts).unwrap().is_empty());
    }

    #[test]
    fn numbers_and_booleans_match_by_canonical_text() {
        let hits = search(&doc(), "42", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].query, ".meta.count");
        assert_eq!(hits[0].kind, NodeKind::Number);

        let hits = search(&doc(), "true", &SearchOptions::default()).unwrap();
        assert_eq!(hits[0].query, ".meta.done");
    }

    #[test]
    fn whole_word_splits_on_non_alphanumerics() {
        let v = json!({"a": "rusty nail", "b": "a rust nail"});
        let mut opts = SearchOptions::default();
        opts.whole_word = true;
        let hits = search(&v, "rust", &opts).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].query, ".b");
    }

    #[test]
    fn regex_mode_and_invalid_patterns() {
        let mut opts = SearchOptions::default();
        opts.regex = true;
        let hits = search(&doc(), "^ru", &opts).unwrap();
        assert!(hits.iter().any(|m| m.query == ".tags[0]"));
        assert!(matches!(search(&doc(), "(", &opts), Err(SearchError::Pattern(_))));
    }

    #[test]
    fn array_roots_index_from_the_root_identity() {
        let v = json!(["alpha", {"beta": "gamma"}]);
        let hits = search(&v, "gamma", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].query, ".[1].beta");
        assert_eq!(eval_query(&hits[0].query, &v).unwrap(), &json!("gamma"));
    }

    #[test]
    fn blank_queries_match_nothing() {
        assert!(search(&doc(), "  ", &SearchOptions::default()).unwrap().is_empty());
    }
}
