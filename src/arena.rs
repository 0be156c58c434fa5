use generational_arena::{Arena, Index};
use std::fmt;
use tracing::instrument;

use crate::record::NodeRecord;

/// Payload of a materialized tree node: the source record plus the id it was
/// stored under.
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Id the record was keyed by in the node store
    pub id: String,
    /// The captured record, owned by the tree for its lifetime
    pub record: NodeRecord,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record.display_title())
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes, in source declaration order
    pub children: Vec<Index>,
}

/// Arena-based curriculum tree.
///
/// Uses generational arena for memory-safe node references and O(1) lookups.
/// Every node except the root has exactly one parent; the builder only
/// follows forward `children` edges, so the structure is acyclic by
/// construction.
#[derive(Debug, Default)]
pub struct NodeTree {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self, data))]
    pub fn insert_node(&mut self, data: NodeData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Pre-order iterator over the whole tree.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::from_root(self, self.root)
    }

    /// Pre-order iterator over the subtree rooted at `from`.
    pub fn iter_subtree(&self, from: Index) -> TreeIterator {
        TreeIterator::from_root(self, Some(from))
    }

    /// First node (pre-order) whose payload satisfies the predicate.
    ///
    /// Used both for id lookups and arbitrary payload inspection; returns
    /// None rather than erroring when nothing matches.
    #[instrument(level = "trace", skip(self, predicate))]
    pub fn find<P>(&self, predicate: P) -> Option<Index>
    where
        P: Fn(&NodeData) -> bool,
    {
        self.iter()
            .find(|(_, node)| predicate(&node.data))
            .map(|(idx, _)| idx)
    }

    pub fn find_by_id(&self, id: &str) -> Option<Index> {
        self.find(|data| data.id == id)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        if let Some(root) = self.root {
            self.calculate_depth(root)
        } else {
            0
        }
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Collects all leaf nodes (nodes with no children) under `from`, in
    /// pre-order discovery order.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self, from: Index) -> Vec<Index> {
        self.iter_subtree(from)
            .filter(|(_, node)| node.children.is_empty())
            .map(|(idx, _)| idx)
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a NodeTree,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn from_root(tree: &'a NodeTree, root: Option<Index>) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = root {
            stack.push(root);
        }
        Self { tree, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}
