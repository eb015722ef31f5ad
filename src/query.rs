use serde_json::Value;
use thiserror::Error;

use crate::tree::sorted_entries;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The path does not fit the document — stale selection or a value
    /// from a different document generation. Fatal for the call.
    #[error("path step {step}: index {index} is out of range for the document")]
    OutOfRange { step: usize, index: usize },
    #[error("malformed query at byte {at}: {reason}")]
    Syntax { at: usize, reason: &'static str },
    #[error("query segment {0} does not match the document")]
    Unmatched(String),
}

// Translator walk state, one step ahead of the builder's traversal: the
// display tree holds an extra level for "the array itself" versus "an
// indexed element", and an extra leaf level under scalar item wrappers.
enum Walk<'a> {
    // Next index selects a sorted object key, or the sole child of a
    // nested array's item wrapper.
    Awaiting(&'a Value),
    // Cursor is an array whose element index arrives with the next step.
    // `marker` records whether an unindexed `[]` was already appended.
    IndexPending { arr: &'a Vec<Value>, marker: bool },
    // A scalar reached through an item wrapper keeps one leaf child.
    ScalarTail,
    // Leaf reached; any further step is a stale path.
    Exhausted,
}

/// Reconstruct the jq-style query selecting the node at `path` in the
/// display tree built from `value`.
///
/// The path uses display order: sorted object keys, original array order.
/// For an array or scalar root the single top-level node is the empty
/// path. Out-of-range steps fail loudly; paths must come from a tree
/// built from this same `value`.
pub fn to_query(path: &[usize], value: &Value) -> Result<String, QueryError> {
    let mut jq = String::new();
    let mut state = match value {
        Value::Object(_) => Walk::Awaiting(value),
        Value::Array(arr) => {
            jq.push('.');
            Walk::IndexPending { arr, marker: false }
        }
        _ => {
            jq.push('.');
            Walk::Exhausted
        }
    };

    for (step, &index) in path.iter().enumerate() {
        let out_of_range = QueryError::OutOfRange { step, index };
        state = match state {
            Walk::Awaiting(cursor) => match cursor {
                Value::Object(map) => {
                    let entries = sorted_entries(map);
                    let &(key, next) = entries.get(index).ok_or(out_of_range)?;
                    jq.push_str(&key_segment(key));
                    match next {
                        Value::Array(arr) => {
                            jq.push_str("[]");
                            Walk::IndexPending { arr, marker: true }
                        }
                        Value::Object(_) => Walk::Awaiting(next),
                        _ => Walk::Exhausted,
                    }
                }
                // Array nested directly inside another array: its item
                // wrapper has exactly one child, the array's own node.
                Value::Array(arr) => {
                    if index != 0 {
                        return Err(out_of_range);
                    }
                    jq.push_str("[]");
                    Walk::IndexPending { arr, marker: true }
                }
                _ => return Err(out_of_range),
            },
            Walk::IndexPending { arr, marker } => {
                let element = arr.get(index).ok_or(out_of_range)?;
                if marker {
                    // Resolve the pending `[]` into a concrete index.
                    jq.truncate(jq.len() - 2);
                }
                jq.push_str(&format!("[{index}]"));
                match element {
                    Value::Object(_) | Value::Array(_) => Walk::Awaiting(element),
                    _ => Walk::ScalarTail,
                }
            }
            Walk::ScalarTail => {
                if index != 0 {
                    return Err(out_of_range);
                }
                Walk::Exhausted
            }
            Walk::Exhausted => return Err(out_of_range),
        };
    }

    if jq.is_empty() {
        jq.push('.');
    }
    Ok(jq)
}

pub(crate) fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// Identifier keys use dotted notation, everything else bracket-quoted
// with embedded quotes escaped.
pub(crate) fn key_segment(key: &str) -> String {
    if is_identifier(key) {
        format!(".{key}")
    } else {
        format!("['{}']", key.replace('\'', "\\'"))
    }
}

/// Evaluate a query over the subset of syntax `to_query` produces:
/// leading `.`, `.key`, `['key']`, `[<n>]`, and a trailing `[]` (which
/// requires an array and selects it unchanged).
pub fn eval_query<'a>(query: &str, value: &'a Value) -> Result<&'a Value, QueryError> {
    if query.is_empty() {
        return Err(QueryError::Syntax { at: 0, reason: "empty query" });
    }
    let mut cursor = value;
    let mut rest = query;
    let pos = |rest: &str| query.len() - rest.len();

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("[]") {
            if !cursor.is_array() {
                return Err(QueryError::Unmatched("[]".into()));
            }
            rest = after;
        } else if let Some(after) = rest.strip_prefix("['") {
            let (key, after) = take_quoted(after).ok_or(QueryError::Syntax {
                at: pos(rest),
                reason: "unterminated bracket key",
            })?;
            cursor = cursor
                .as_object()
                .and_then(|m| m.get(&key))
                .ok_or_else(|| QueryError::Unmatched(format!("['{key}']")))?;
            rest = after;
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']').ok_or(QueryError::Syntax {
                at: pos(rest),
                reason: "unterminated index",
            })?;
            let index: usize = after[..end].parse().map_err(|_| QueryError::Syntax {
                at: pos(rest),
                reason: "invalid index",
            })?;
            cursor = cursor
                .as_array()
                .and_then(|a| a.get(index))
                .ok_or_else(|| QueryError::Unmatched(format!("[{index}]")))?;
            rest = &after[end + 1..];
        } else if let Some(after) = rest.strip_prefix('.') {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            if end > 0 {
                let key = &after[..end];
                cursor = cursor
                    .as_object()
                    .and_then(|m| m.get(key))
                    .ok_or_else(|| QueryError::Unmatched(format!(".{key}")))?;
                rest = &after[end..];
            } else if pos(rest) == 0 && (after.is_empty() || after.starts_with('[')) {
                // Root identity.
                rest = after;
            } else {
                return Err(QueryError::Syntax { at: pos(rest), reason: "dangling '.'" });
            }
        } else {
            return Err(QueryError::Syntax { at: pos(rest), reason: "expected '.' or '['" });
        }
    }
    Ok(cursor)
}

// Consume a quoted bracket key up to its closing `']`, unescaping `\'`.
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let mut key = String::new();
    let mut chars = s.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '\'')) => key.push('\''),
                Some((_, other)) => {
                    key.push('\\');
                    key.push(other);
                }
                None => return None,
            },
            '\'' => {
                let rest = s[i + 1..].strip_prefix(']')?;
                return Some((key, rest));
            }
            _ => key.push(c),
        }
    }
    None
}
