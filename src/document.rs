use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::query::{to_query, QueryError};
use crate::search::{search, SearchError, SearchOptions};
use crate::tree::build;
use crate::types::{DisplayNode, SearchMatch};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("no document loaded")]
    NoDocument,
    #[error("invalid JSON document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Parse document text into a JSON value. One pair of enclosing
/// parentheses (JSONP-style wrapping) is stripped before parsing.
pub fn parse_document(text: &str) -> Result<Value, DocumentError> {
    let trimmed = text.trim();
    let inner = match trimmed
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
    {
        Some(unwrapped) => unwrapped,
        None => trimmed,
    };
    let value: Value = serde_json::from_str(inner)?;
    tracing::debug!(bytes = inner.len(), "document parsed");
    Ok(value)
}

/// Holds the current document for the embedding application. Readers
/// clone the `Arc` out of the guard; no lock is held across core work.
pub struct DocumentStore {
    doc: RwLock<Option<Arc<Value>>>,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self {
            doc: RwLock::new(None),
        }
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, install it as the current document (replacing any
    /// previous one), and return its display tree.
    pub fn open_text(&self, text: &str) -> Result<Vec<DisplayNode>, DocumentError> {
        let root = parse_document(text)?;
        let tree = build(&root);
        *self.doc.write() = Some(Arc::new(root));
        Ok(tree)
    }

    pub fn document(&self) -> Option<Arc<Value>> {
        self.doc.read().clone()
    }

    /// Rebuild the display tree for the current document.
    pub fn tree(&self) -> Result<Vec<DisplayNode>, DocumentError> {
        let root = self.document().ok_or(DocumentError::NoDocument)?;
        Ok(build(&root))
    }

    /// Translate a selection path recorded against the current document's
    /// display tree into a query string.
    pub fn query_for(&self, path: &[usize]) -> Result<String, DocumentError> {
        let root = self.document().ok_or(DocumentError::NoDocument)?;
        Ok(to_query(path, &root)?)
    }

    pub fn search_for(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchMatch>, DocumentError> {
        let root = self.document().ok_or(DocumentError::NoDocument)?;
        Ok(search(&root, query, options)?)
    }

    pub fn clear(&self) {
        *self.doc.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn jsonp_wrapping_is_stripped() {
        assert_eq!(
            parse_document("({\"a\": 1})").unwrap(),
            parse_document("{\"a\": 1}").unwrap()
        );
        assert_eq!(parse_document("  (null)  ").unwrap(), json!(null));
    }

    #[test]
    fn only_a_matched_pair_is_stripped() {
        // A lone opening paren is not JSONP wrapping.
        assert!(parse_document("(1").is_err());
        // Stripping is attempted once; the leftovers must still parse.
        assert!(parse_document("(1)(2)").is_err());
    }

    #[test]
    fn parse_failures_are_reported() {
        assert!(matches!(
            parse_document("{not json}"),
            Err(DocumentError::Parse(_))
        ));
    }

    #[test]
    fn store_round_trip() {
        let store = DocumentStore::new();
        assert!(matches!(store.tree(), Err(DocumentError::NoDocument)));
        assert!(matches!(store.query_for(&[0]), Err(DocumentError::NoDocument)));

        let tree = store.open_text("{\"a\": [1, 2], \"b\": \"x\"}").unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(store.tree().unwrap(), tree);
        assert_eq!(store.query_for(&[0, 1]).unwrap(), ".a[1]");
        assert_eq!(store.query_for(&[1]).unwrap(), ".b");

        // Replacing the document invalidates old paths loudly.
        store.open_text("{\"only\": 1}").unwrap();
        assert!(matches!(
            store.query_for(&[1]),
            Err(DocumentError::Query(QueryError::OutOfRange { .. }))
        ));

        store.clear();
        assert!(store.document().is_none());
    }

    #[test]
    fn store_search_addresses_the_current_document() {
        let store = DocumentStore::new();
        store.open_text("[\"alpha\", \"beta\"]").unwrap();
        let hits = store.search_for("beta", &SearchOptions::default()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].query, ".[1]");
    }
}
