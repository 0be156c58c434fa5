//! Terminal tree rendering

use generational_arena::Index;
use termtree::Tree;

use crate::arena::NodeTree;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for NodeTree {
    fn to_tree_string(&self) -> Tree<String> {
        if let Some(root_idx) = self.root() {
            let mut tree = Tree::new(label(self, root_idx));

            fn build(arena: &NodeTree, node_idx: Index, parent_tree: &mut Tree<String>) {
                if let Some(node) = arena.get_node(node_idx) {
                    for &child_idx in &node.children {
                        let mut child_tree = Tree::new(label(arena, child_idx));
                        build(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }

            build(self, root_idx, &mut tree);
            tree
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}

fn label(tree: &NodeTree, idx: Index) -> String {
    tree.get_node(idx)
        .map(|node| {
            let title = node.data.record.display_title();
            match (title.is_empty(), node.data.record.tag.is_empty()) {
                (true, _) => node.data.id.clone(),
                (false, true) => title.to_string(),
                (false, false) => format!("{} [{}]", title, node.data.record.tag),
            }
        })
        .unwrap_or_default()
}
