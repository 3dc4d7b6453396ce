//! Immutable update engine.
//!
//! A single walk rebuilds every node of a forest: the matched update is
//! applied where the id equals the target, the unmatched update everywhere
//! else, and the walk continues into whatever children each update leaves
//! behind.

use crate::domain::entities::{Node, NodeId, PropertiesPatch};

/// Either a literal value or a function of the current value.
pub enum Update<'a, T, R = T> {
    Replace(R),
    Transform(Box<dyn Fn(&T) -> R + 'a>),
}

impl<'a, T, R: Clone> Update<'a, T, R> {
    pub fn transform(f: impl Fn(&T) -> R + 'a) -> Self {
        Update::Transform(Box::new(f))
    }

    pub fn apply(&self, current: &T) -> R {
        match self {
            Update::Replace(value) => value.clone(),
            Update::Transform(f) => f(current),
        }
    }
}

impl<T, R: std::fmt::Debug> std::fmt::Debug for Update<'_, T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Update::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            Update::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Replaces a node; children left as `None` fall back to the original ones.
pub type NodeUpdate<'a, D> = Update<'a, Node<D>>;

/// Derives a properties patch from the current node.
pub type PropertiesUpdate<'a, D> = Update<'a, Node<D>, PropertiesPatch>;

impl<D> From<Node<D>> for Update<'_, Node<D>> {
    fn from(node: Node<D>) -> Self {
        Update::Replace(node)
    }
}

impl<D> From<PropertiesPatch> for Update<'_, Node<D>, PropertiesPatch> {
    fn from(patch: PropertiesPatch) -> Self {
        Update::Replace(patch)
    }
}

/// Turn a properties update into a node update that merges the patch.
///
/// The produced node carries no children, so the walk reuses the original
/// subtree.
pub fn merge_properties<'a, D: Clone + 'a>(update: PropertiesUpdate<'a, D>) -> NodeUpdate<'a, D> {
    Update::transform(move |node: &Node<D>| {
        let patch = update.apply(node);
        let mut next = node.shallow_clone();
        next.properties.merge(&patch);
        next
    })
}

/// Rebuild `roots`, applying `matched` to every node whose id is `target`
/// and `unmatched` (identity when absent) to all others.
///
/// The input is left untouched so a failed update never leaves a half-built
/// tree behind. Returns the new roots and the number of matched nodes.
pub fn rebuild<D: Clone>(
    roots: &[Node<D>],
    target: &NodeId,
    matched: &NodeUpdate<'_, D>,
    unmatched: Option<&NodeUpdate<'_, D>>,
) -> (Vec<Node<D>>, usize) {
    let mut walker = Walker {
        target,
        matched,
        unmatched,
        hits: 0,
    };
    let roots = walker.walk_all(roots);
    (roots, walker.hits)
}

struct Walker<'w, 'a, D> {
    target: &'w NodeId,
    matched: &'w NodeUpdate<'a, D>,
    unmatched: Option<&'w NodeUpdate<'a, D>>,
    hits: usize,
}

impl<D: Clone> Walker<'_, '_, D> {
    fn walk_all(&mut self, nodes: &[Node<D>]) -> Vec<Node<D>> {
        nodes.iter().map(|node| self.walk(node)).collect()
    }

    fn walk(&mut self, node: &Node<D>) -> Node<D> {
        let update = if &node.id == self.target {
            self.hits += 1;
            Some(self.matched)
        } else {
            self.unmatched
        };

        let mut next = match update {
            Some(update) => update.apply(node),
            None => node.shallow_clone(),
        };

        // Children produced by the update win; otherwise re-walk the originals
        next.children = match next.children.take() {
            Some(children) => Some(self.walk_all(&children)),
            None => node.children.as_deref().map(|children| self.walk_all(children)),
        };
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: i64) -> Node<()> {
        Node::new(id, format!("n{id}"), ()).with_children(vec![])
    }

    fn sample() -> Vec<Node<()>> {
        vec![
            Node::new(1, "n1", ()).with_children(vec![leaf(2), leaf(3)]),
            Node::new(4, "n4", ()),
        ]
    }

    #[test]
    fn given_identity_update_when_rebuilding_then_tree_is_unchanged() {
        let identity: NodeUpdate<()> = Update::transform(|node: &Node<()>| node.clone());

        let (roots, hits) = rebuild(&sample(), &NodeId::from(2), &identity, None);

        assert_eq!(roots, sample());
        assert_eq!(hits, 1);
    }

    #[test]
    fn given_transform_without_children_when_rebuilding_then_keeps_subtree() {
        let rename: NodeUpdate<()> = Update::transform(|node: &Node<()>| {
            let mut next = node.shallow_clone();
            next.title = "renamed".into();
            next
        });

        let (roots, _) = rebuild(&sample(), &NodeId::from(1), &rename, None);

        assert_eq!(roots[0].title, "renamed");
        assert_eq!(roots[0].child_nodes().len(), 2);
        assert!(roots[1].is_unloaded());
    }

    #[test]
    fn given_unmatched_update_when_rebuilding_then_descendants_of_target_are_visited() {
        let matched: NodeUpdate<()> = Update::transform(|node: &Node<()>| node.shallow_clone());
        let unmatched: NodeUpdate<()> = Update::transform(|node: &Node<()>| {
            let mut next = node.shallow_clone();
            next.title.push('*');
            next
        });

        let (roots, _) = rebuild(&sample(), &NodeId::from(1), &matched, Some(&unmatched));

        assert_eq!(roots[0].title, "n1");
        assert_eq!(roots[0].child_nodes()[0].title, "n2*");
        assert_eq!(roots[0].child_nodes()[1].title, "n3*");
        assert_eq!(roots[1].title, "n4*");
    }

    #[test]
    fn given_missing_target_when_rebuilding_then_no_hits() {
        let matched: NodeUpdate<()> = leaf(99).into();

        let (roots, hits) = rebuild(&sample(), &NodeId::from(42), &matched, None);

        assert_eq!(hits, 0);
        assert_eq!(roots, sample());
    }

    #[test]
    fn given_replace_update_when_rebuilding_then_replacement_children_are_walked() {
        let matched: NodeUpdate<()> = Node::new(4, "n4", ()).with_children(vec![leaf(5)]).into();
        let unmatched: NodeUpdate<()> = Update::transform(|node: &Node<()>| {
            let mut next = node.shallow_clone();
            next.properties.is_leaf = true;
            next
        });

        let (roots, hits) = rebuild(&sample(), &NodeId::from(4), &matched, Some(&unmatched));

        assert_eq!(hits, 1);
        assert!(!roots[1].properties.is_leaf);
        assert!(roots[1].child_nodes()[0].properties.is_leaf);
    }
}
