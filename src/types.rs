use serde::Serialize;

/// Runtime kind of the JSON value a display node stands for.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
    /// Value whose canonical text form could not be recovered. Carries a
    /// best-effort fallback in the label; never aborts a build.
    Unrepresentable,
}

/// One styled fragment of a node label. The frontend colors fragments by
/// role; the fragment order inside `DisplayNode::segments` is fixed.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Marker(String),
    Value(String),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DisplayNode {
    pub key: Option<String>,      // object key; None for array elements and root scalars
    pub kind: NodeKind,
    pub label: String,            // full display text of the row
    pub segments: Vec<Segment>,   // label parts in display order
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Where a search hit matched.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Key,
    Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub query: String,            // jq query selecting the hit
    pub key: Option<String>,      // object key the hit sits under, if any
    pub kind: NodeKind,
    pub match_kind: MatchKind,
    pub matched: String,          // the actual matched text
}
