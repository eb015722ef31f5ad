use serde_json::Value;
use crate::types::{DisplayNode, NodeKind, Segment};

// Display budget for string leaves, ellipsis included.
pub const STRING_DISPLAY_BUDGET: usize = 256;

/// Clamp a string to at most `max` characters; longer inputs keep the
/// first `max - 1` characters plus an ellipsis so the result stays within
/// the budget. Counts characters, not bytes.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}…")
    }
}

// Object entries are visited in ascending key order; the query translator
// decodes paths against the same ordering.
pub(crate) fn sorted_entries(map: &serde_json::Map<String, Value>) -> Vec<(&str, &Value)> {
    let mut entries: Vec<(&str, &Value)> = map.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_unstable_by_key(|&(k, _)| k);
    entries
}

pub(crate) fn kind_of(value: &Value) -> NodeKind {
    match value {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        Value::String(_) => NodeKind::String,
        Value::Number(_) => NodeKind::Number,
        Value::Bool(_) => NodeKind::Boolean,
        Value::Null => NodeKind::Null,
    }
}

/// Build the full display tree for a document, eagerly.
///
/// An object root contributes one top-level node per key (sorted); an
/// array or scalar root contributes a single node.
pub fn build(value: &Value) -> Vec<DisplayNode> {
    let mut out = Vec::new();
    add_item(None, value, &mut out);
    out
}

fn add_item(key: Option<&str>, value: &Value, out: &mut Vec<DisplayNode>) {
    match value {
        Value::Object(map) => {
            if let Some(k) = key {
                let mut children = Vec::with_capacity(map.len());
                for (entry_key, entry_value) in sorted_entries(map) {
                    add_item(Some(entry_key), entry_value, &mut children);
                }
                out.push(DisplayNode {
                    key: Some(k.to_string()),
                    kind: NodeKind::Object,
                    label: format!("{k} {{}}"),
                    segments: vec![
                        Segment::Key(k.to_string()),
                        Segment::Marker("{}".into()),
                    ],
                    children,
                });
            } else {
                // Synthetic root and object array-elements: entries attach
                // directly to the parent, no wrapper node.
                for (entry_key, entry_value) in sorted_entries(map) {
                    add_item(Some(entry_key), entry_value, out);
                }
            }
        }
        Value::Array(arr) => {
            let mut children = Vec::with_capacity(arr.len());
            for (index, element) in arr.iter().enumerate() {
                let mut expansion = Vec::new();
                add_item(None, element, &mut expansion);
                children.push(DisplayNode {
                    key: None,
                    kind: kind_of(element),
                    label: format!("item:{index}"),
                    segments: vec![Segment::Marker(format!("item:{index}"))],
                    children: expansion,
                });
            }
            let count = format!("{} items", arr.len());
            let mut segments = Vec::with_capacity(3);
            let label = if let Some(k) = key {
                segments.push(Segment::Key(k.to_string()));
                format!("{k} (array) {count}")
            } else {
                format!("(array) {count}")
            };
            segments.push(Segment::Marker("(array)".into()));
            segments.push(Segment::Value(count));
            out.push(DisplayNode {
                key: key.map(str::to_string),
                kind: NodeKind::Array,
                label,
                segments,
                children,
            });
        }
        Value::String(s) => {
            let shown = format!("\"{}\"", truncate(s, STRING_DISPLAY_BUDGET));
            out.push(leaf(key, NodeKind::String, shown));
        }
        Value::Number(n) => match canonical_number(n) {
            Some(text) => out.push(leaf(key, NodeKind::Number, text)),
            None => {
                tracing::warn!(kind = "number", "no canonical text form, falling back to raw display");
                out.push(leaf(key, NodeKind::Unrepresentable, n.to_string()));
            }
        },
        Value::Bool(b) => out.push(leaf(key, NodeKind::Boolean, b.to_string())),
        Value::Null => out.push(leaf(key, NodeKind::Null, "null".to_string())),
    }
}

fn leaf(key: Option<&str>, kind: NodeKind, value_text: String) -> DisplayNode {
    let (label, segments) = match key {
        Some(k) => (
            format!("{k} : {value_text}"),
            vec![Segment::Key(k.to_string()), Segment::Value(value_text)],
        ),
        None => (value_text.clone(), vec![Segment::Value(value_text)]),
    };
    DisplayNode {
        key: key.map(str::to_string),
        kind,
        label,
        segments,
        children: Vec::new(),
    }
}

fn canonical_number(n: &serde_json::Number) -> Option<String> {
    if n.is_i64() || n.is_u64() || n.as_f64().is_some_and(f64::is_finite) {
        Some(n.to_string())
    } else {
        None
    }
}
