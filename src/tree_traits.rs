/*
Conversion of a forest branch into a `termtree::Tree` for display.
The branch needs the arena to descend, so the trait is implemented on the
forest and takes the starting handle.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{DomainResult, Forest, NodeId};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, id: NodeId) -> DomainResult<Tree<String>>;
}

impl TreeNodeConvert for Forest {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, id: NodeId) -> DomainResult<Tree<String>> {
        let node = self.node(id)?;

        let mut label = format!("{} ({})", node.name(), node.class());
        if !node.metadata().is_empty() {
            let names: Vec<&str> = node.metadata().keys().map(String::as_str).collect();
            label.push_str(&format!(" [{}]", names.join(", ")));
        }

        // Recursively construct the children
        let leaves = node
            .children()
            .entries()
            .map(|(_, child)| self.to_tree_string(child))
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Tree::new(label).with_leaves(leaves))
    }
}
