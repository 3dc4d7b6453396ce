//! Read-only traversal over a forest of nodes.
//!
//! Every helper visits nodes in pre-order: a node before its children,
//! siblings in source order.

use tracing::instrument;

use crate::domain::entities::{Node, NodeId};

/// Depth-first pre-order iterator over a forest.
pub struct PreOrder<'a, D> {
    stack: Vec<&'a Node<D>>,
}

impl<'a, D> PreOrder<'a, D> {
    pub fn new(roots: &'a [Node<D>]) -> Self {
        // Push in reverse so the first root pops first
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a, D> Iterator for PreOrder<'a, D> {
    type Item = &'a Node<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_nodes().iter().rev());
        Some(node)
    }
}

/// Call `visit` for every node.
pub fn traverse<'a, D>(roots: &'a [Node<D>], visit: impl FnMut(&'a Node<D>)) {
    PreOrder::new(roots).for_each(visit);
}

/// First node satisfying `predicate`; stops as soon as one is found.
pub fn find<'a, D>(roots: &'a [Node<D>], mut predicate: impl FnMut(&Node<D>) -> bool) -> Option<&'a Node<D>> {
    PreOrder::new(roots).find(|node| predicate(node))
}

/// Every node satisfying `predicate`, flattened.
pub fn filter<'a, D>(roots: &'a [Node<D>], mut predicate: impl FnMut(&Node<D>) -> bool) -> Vec<&'a Node<D>> {
    PreOrder::new(roots).filter(|node| predicate(node)).collect()
}

pub fn find_by_id<'a, D>(roots: &'a [Node<D>], id: &NodeId) -> Option<&'a Node<D>> {
    find(roots, |node| &node.id == id)
}

/// Node whose direct children include `id`.
#[instrument(level = "trace", skip(roots))]
pub fn find_parent<'a, D>(roots: &'a [Node<D>], id: &NodeId) -> Option<&'a Node<D>> {
    find(roots, |node| node.has_child(id))
}

/// Number of nodes in the forest.
pub fn count<D>(roots: &[Node<D>]) -> usize {
    PreOrder::new(roots).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    //      1        5
    //     / \
    //    2   4
    //    |
    //    3
    fn forest() -> Vec<Node<()>> {
        vec![
            Node::new(1, "a", ()).with_children(vec![
                Node::new(2, "b", ()).with_children(vec![Node::new(3, "c", ())]),
                Node::new(4, "d", ()).with_children(vec![]),
            ]),
            Node::new(5, "e", ()),
        ]
    }

    fn ids<'a>(nodes: impl IntoIterator<Item = &'a Node<()>>) -> Vec<NodeId> {
        nodes.into_iter().map(|node| node.id.clone()).collect()
    }

    #[test]
    fn given_forest_when_iterating_then_visits_in_pre_order() {
        let roots = forest();

        let visited = ids(PreOrder::new(&roots));

        assert_eq!(visited, (1..=5i64).map(NodeId::from).collect::<Vec<_>>());
    }

    #[test]
    fn given_forest_when_traversing_then_sees_every_node_once() {
        let roots = forest();
        let mut titles = Vec::new();

        traverse(&roots, |node| titles.push(node.title.as_str()));

        assert_eq!(titles, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(count(&roots), 5);
    }

    #[test]
    fn given_predicate_when_finding_then_stops_at_first_match() {
        let roots = forest();
        let mut checked = 0;

        let found = find(&roots, |node| {
            checked += 1;
            node.child_nodes().is_empty()
        });

        assert_eq!(found.map(|node| node.id.clone()), Some(NodeId::from(3)));
        assert_eq!(checked, 3);
    }

    #[test]
    fn given_nested_child_when_finding_parent_then_returns_direct_parent() {
        let roots = forest();

        assert_eq!(find_parent(&roots, &NodeId::from(3)).map(|n| n.title.as_str()), Some("b"));
        assert!(find_parent(&roots, &NodeId::from(1)).is_none());
        assert!(find_parent(&roots, &NodeId::from(42)).is_none());
    }

    #[test]
    fn given_predicate_when_filtering_then_flattens_matches() {
        let roots = forest();

        let even = filter(&roots, |node| matches!(node.id, NodeId::Int(id) if id % 2 == 0));

        assert_eq!(ids(even), vec![NodeId::from(2), NodeId::from(4)]);
    }
}
