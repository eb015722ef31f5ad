//! Core of a desktop JSON browser: eager display trees and jq-style
//! query strings over `serde_json` documents.
//!
//! Rendering, theming, window/menu management, clipboard and file
//! dialogs are the embedding application's concern; it feeds text in,
//! renders the returned [`DisplayNode`] tree, and maps selection paths
//! back to query strings.

// Module declarations
pub mod document;
pub mod query;
pub mod search;
pub mod tree;
pub mod types;

pub use document::{parse_document, DocumentError, DocumentStore};
pub use query::{eval_query, to_query, QueryError};
pub use search::{search, SearchError, SearchOptions};
pub use tree::{build, truncate, STRING_DISPLAY_BUDGET};
pub use types::{DisplayNode, MatchKind, NodeKind, SearchMatch, Segment};
