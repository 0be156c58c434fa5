use std::collections::VecDeque;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::arena::{NodeData, NodeTree};
use crate::errors::{TreeError, TreeResult};
use crate::store::NodeStore;

/// Materializes a parent-linked tree from a [`NodeStore`], breadth-first
/// from a declared root id.
///
/// The builder only follows forward `children` edges and never revisits
/// state in the store; an id declared under two parents yields two distinct
/// tree nodes. A missing root or child id is a hard error so the caller
/// never receives a tree silently missing branches.
#[derive(Debug, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip(self, store))]
    pub fn build(&self, store: &NodeStore, root_id: &str) -> TreeResult<NodeTree> {
        let root_record = store.get(root_id).ok_or_else(|| TreeError::MissingNode {
            id: root_id.to_string(),
            referenced_by: None,
        })?;

        let mut tree = NodeTree::new();
        let root_idx = tree.insert_node(
            NodeData {
                id: root_id.to_string(),
                record: root_record.clone(),
            },
            None,
        );

        let mut queue: VecDeque<Index> = VecDeque::new();
        queue.push_back(root_idx);

        while let Some(parent_idx) = queue.pop_front() {
            let (parent_id, child_ids) = {
                let parent = tree
                    .get_node(parent_idx)
                    .ok_or_else(|| TreeError::InternalError("dangling arena index".to_string()))?;
                (parent.data.id.clone(), parent.data.record.children.clone())
            };

            // Absent or null children means leaf, no expansion.
            let Some(child_ids) = child_ids else { continue };

            for child_id in child_ids {
                let child_record = store.get(&child_id).ok_or_else(|| TreeError::MissingNode {
                    id: child_id.clone(),
                    referenced_by: Some(parent_id.clone()),
                })?;

                let child_idx = tree.insert_node(
                    NodeData {
                        id: child_id,
                        record: child_record.clone(),
                    },
                    Some(parent_idx),
                );
                queue.push_back(child_idx);
            }
        }

        debug!(nodes = tree.node_count(), "tree built from {}", root_id);
        Ok(tree)
    }
}
