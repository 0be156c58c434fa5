//! Captured curriculum item records

use std::collections::BTreeMap;

use serde::Deserialize;

/// Interpretation of a record's `type` tag during path extraction.
///
/// Only two tag values carry meaning for the traversal; everything else is
/// ordinary curriculum content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `"Y"` - path boundary, traversal stops here
    Boundary,
    /// `"O"` - learning objective, collected on the side channel
    Objective,
    /// Any other tag - ordinary content node
    Content,
}

/// One item of the captured id -> record map.
///
/// Fields the engine does not interpret (`code`, `module`, `text`, ...) are
/// kept verbatim in `extra`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRecord {
    #[serde(rename = "type", default)]
    pub tag: String,

    #[serde(default)]
    pub title: String,

    /// Fallback display text for records with an empty title
    #[serde(default)]
    pub subtitle: String,

    /// Ordered child ids; absent or null means leaf
    #[serde(default)]
    pub children: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NodeRecord {
    pub fn kind(&self) -> NodeKind {
        match self.tag.as_str() {
            "Y" => NodeKind::Boundary,
            "O" => NodeKind::Objective,
            _ => NodeKind::Content,
        }
    }

    /// Title with subtitle fallback.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.subtitle
        } else {
            &self.title
        }
    }

    pub fn is_leaf(&self) -> bool {
        match &self.children {
            None => true,
            Some(ids) => ids.is_empty(),
        }
    }
}
