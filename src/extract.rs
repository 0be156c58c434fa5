//! Path extraction: leaf-to-root walks with type-tag classification

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::arena::NodeTree;
use crate::record::NodeKind;
use crate::select::SelectionSet;

/// Identity of a root-to-leaf path: the ordered ids of its ordinary nodes.
///
/// Ids, never display text - structurally distinct subtrees with duplicate
/// titles must not coalesce.
pub type PathKey = Vec<String>;

/// One deduplicated root-to-leaf path.
#[derive(Debug, Clone)]
pub struct ExtractedPath {
    /// Ordinary nodes in root -> leaf order, leaf inclusive
    pub path: Vec<Index>,
    /// Objective nodes collected along the walk, root -> leaf order
    pub aux_path: Vec<Index>,
}

/// Extraction result: unique paths keyed by [`PathKey`], in leaf-discovery
/// order.
///
/// Insertion order is preserved so two runs over the same tree and selection
/// produce identical output.
#[derive(Debug, Default)]
pub struct ExtractedPaths {
    entries: Vec<ExtractedPath>,
    index: HashMap<PathKey, usize>,
}

impl ExtractedPaths {
    fn insert_or_merge(&mut self, key: PathKey, path: Vec<Index>, aux_path: Vec<Index>) {
        match self.index.get(&key) {
            Some(&pos) => {
                // Duplicate path: union the side channels, never replace.
                if !aux_path.is_empty() {
                    self.entries[pos].aux_path.extend(aux_path);
                }
            }
            None => {
                self.entries.push(ExtractedPath { path, aux_path });
                self.index.insert(key, self.entries.len() - 1);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedPath> {
        self.entries.iter()
    }

    pub fn get(&self, key: &[String]) -> Option<&ExtractedPath> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks every effective leaf of the subtree under `subtree_root` upward and
/// collects the deduplicated root-to-leaf paths.
///
/// Chain nodes are classified by their `type` tag: `"Y"` stops the walk at
/// the conceptual root boundary (excluded), `"O"` is collected into the side
/// channel when `include_aux` is set (never into the main path), anything
/// else joins the main path. Objective nodes hanging off a chain node as
/// children are collected into the same side channel; they never count as
/// leaves of their own. The walk never climbs above `subtree_root`.
///
/// Under a non-empty selection, the effective leaves are the selected nodes
/// with no selected ordinary children; otherwise every node without
/// ordinary children is a leaf. Returns the paths plus the subtree root's
/// display title, used to name the export artifact. Structurally odd trees
/// (a leaf tagged `"Y"`) degrade to short or empty paths rather than
/// erroring.
#[instrument(level = "debug", skip(tree, selection))]
pub fn extract(
    tree: &NodeTree,
    subtree_root: Index,
    include_aux: bool,
    selection: Option<&SelectionSet>,
) -> (ExtractedPaths, String) {
    let display_name = tree
        .get_node(subtree_root)
        .map(|node| node.data.record.display_title().to_string())
        .unwrap_or_default();

    // Normalize "no selection" and "empty selection" to whole-subtree export.
    let selection = selection.filter(|s| !s.is_empty());

    let mut paths = ExtractedPaths::default();
    for leaf in effective_leaves(tree, subtree_root, selection) {
        let (path, aux_path) = walk_up(tree, leaf, subtree_root, include_aux);
        let key: PathKey = path
            .iter()
            .filter_map(|&idx| tree.get_node(idx).map(|n| n.data.id.clone()))
            .collect();
        trace!(?key, aux = aux_path.len(), "leaf walk complete");
        paths.insert_or_merge(key, path, aux_path);
    }

    debug!(unique = paths.len(), "extraction finished for {display_name}");
    (paths, display_name)
}

/// Leaves of the subtree in pre-order discovery order, honoring a selection
/// snapshot when present.
///
/// Objective nodes are never leaves themselves; a node whose remaining
/// children are all objectives counts as a leaf and keeps them as its side
/// channel.
fn effective_leaves(
    tree: &NodeTree,
    subtree_root: Index,
    selection: Option<&SelectionSet>,
) -> Vec<Index> {
    let is_ordinary = |idx: Index| {
        tree.get_node(idx)
            .is_some_and(|n| n.data.record.kind() != NodeKind::Objective)
    };

    tree.iter_subtree(subtree_root)
        .filter(|(_, node)| {
            if node.data.record.kind() == NodeKind::Objective {
                return false;
            }
            match selection {
                None => !node.children.iter().any(|&child| is_ordinary(child)),
                Some(marked) => {
                    marked.contains(&node.data.id)
                        && !node.children.iter().any(|&child| {
                            is_ordinary(child)
                                && tree
                                    .get_node(child)
                                    .is_some_and(|c| marked.contains(&c.data.id))
                        })
                }
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Single upward walk from `leaf`, classifying every chain node including
/// the leaf itself and collecting the objective children hanging off each
/// chain node. Returns (path, aux_path) already reversed to root->leaf
/// order.
fn walk_up(
    tree: &NodeTree,
    leaf: Index,
    subtree_root: Index,
    include_aux: bool,
) -> (Vec<Index>, Vec<Index>) {
    let mut path = Vec::new();
    let mut aux_rev = Vec::new();

    let mut came_from: Option<Index> = None;
    let mut current = Some(leaf);
    while let Some(idx) = current {
        let Some(node) = tree.get_node(idx) else { break };
        match node.data.record.kind() {
            NodeKind::Boundary => break,
            NodeKind::Objective => {
                if include_aux {
                    aux_rev.push(idx);
                }
            }
            NodeKind::Content => path.push(idx),
        }
        if include_aux {
            // Off-chain objectives attach to this node's paths; reversed so
            // the final ordering restores declaration order.
            for &child in node.children.iter().rev() {
                if Some(child) == came_from {
                    continue;
                }
                let is_objective = tree
                    .get_node(child)
                    .is_some_and(|c| c.data.record.kind() == NodeKind::Objective);
                if is_objective {
                    aux_rev.push(child);
                }
            }
        }
        if idx == subtree_root {
            break;
        }
        came_from = Some(idx);
        current = node.parent;
    }

    path.reverse();
    aux_rev.reverse();
    (path, aux_rev)
}
