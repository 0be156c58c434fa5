//! Immutable selection snapshots

use std::collections::HashSet;

/// Snapshot of the node ids a user has marked for export.
///
/// Taken once before extraction starts; the extractor never observes a
/// selection that changes mid-walk. An empty or absent selection means the
/// whole subtree is considered selected. Ids that do not occur in the built
/// tree are simply never matched.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_membership() {
        let selection: SelectionSet = ["a", "b"].into_iter().collect();
        assert!(selection.contains("a"));
        assert!(!selection.contains("c"));
        assert_eq!(selection.len(), 2);
    }
}
