//! Text outline of a tree for debugging and terminal display.
//!
//! Closed nodes are prefixed with `+`, open ones with `-`. Children appear
//! only under open nodes whose children are loaded, the same visibility rule
//! a tree view applies.

use termtree::Tree;
use tracing::instrument;

use crate::domain::Node;

pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<D> TreeNodeConvert for Node<D> {
    fn to_tree_string(&self) -> Tree<String> {
        let icon = if self.properties.is_open { "-" } else { "+" };
        let label = format!("{} {}", icon, self.title);

        let leaves: Vec<_> = match &self.children {
            Some(children) if self.properties.is_open => {
                children.iter().map(|c| c.to_tree_string()).collect()
            }
            _ => Vec::new(),
        };

        Tree::new(label).with_leaves(leaves)
    }
}

/// Render every root's outline, one after another.
#[instrument(level = "trace", skip(roots))]
pub fn render_outline<D>(roots: &[Node<D>]) -> String {
    roots
        .iter()
        .map(|root| root.to_tree_string().to_string())
        .collect()
}
