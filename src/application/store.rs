//! Tree store: one committed tree plus its mutation and query operations.
//!
//! Every mutation reads the current snapshot, computes a complete new forest
//! and commits it in one step, bumping the revision. Updaters always see the
//! latest committed nodes, so back-to-back toggles compose correctly.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::traverse::{self, PreOrder};
use crate::domain::update::{self, merge_properties};
use crate::domain::{
    BuildOptions, Node, NodeId, NodeUpdate, PropertiesPatch, PropertiesUpdate, SourceRecord, Tree,
    TreeBuilder, Update,
};

/// Child id -> parent id links discovered by ancestry lookups.
///
/// Valid for a single revision; cleared on every commit.
#[derive(Debug, Default)]
struct AncestryCache {
    parents: HashMap<NodeId, Option<NodeId>>,
}

/// Holder of one tree and the operations on it.
#[derive(Debug)]
pub struct TreeStore<D = Value> {
    tree: Tree<D>,
    ancestry: RefCell<AncestryCache>,
}

impl<D> Default for TreeStore<D> {
    fn default() -> Self {
        Self {
            tree: Tree::default(),
            ancestry: RefCell::new(AncestryCache::default()),
        }
    }
}

impl<D: SourceRecord> TreeStore<D> {
    /// Build the initial tree from source records.
    pub fn from_records(records: &[D], options: BuildOptions<D>) -> ApplicationResult<Self> {
        let roots = TreeBuilder::new(options).build(records)?;
        Ok(Self::from_nodes(roots))
    }
}

impl<D: Clone> TreeStore<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(roots: Vec<Node<D>>) -> Self {
        Self {
            tree: Tree { revision: 0, roots },
            ancestry: RefCell::new(AncestryCache::default()),
        }
    }

    /// Current committed snapshot.
    pub fn tree(&self) -> &Tree<D> {
        &self.tree
    }

    pub fn roots(&self) -> &[Node<D>] {
        &self.tree.roots
    }

    pub fn revision(&self) -> u64 {
        self.tree.revision
    }

    pub fn into_tree(self) -> Tree<D> {
        self.tree
    }

    // ------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------

    /// Replace the whole forest, or attach `nodes` under `root_id`.
    ///
    /// With a root id this behaves like [`set_children`](Self::set_children):
    /// an already loaded subtree is kept.
    #[instrument(level = "debug", skip(self, nodes), fields(count = nodes.len()))]
    pub fn initialize(&mut self, nodes: Vec<Node<D>>, root_id: Option<&NodeId>) {
        match root_id {
            Some(id) => {
                self.set_children(id, nodes);
            }
            None => self.commit("initialize", None, nodes),
        }
    }

    /// Rebuild the tree, applying `matched` to the node(s) with id `target`
    /// and `unmatched` to every other node.
    ///
    /// Returns how many nodes matched. Zero matches still commits a new
    /// revision.
    #[instrument(level = "debug", skip(self, matched, unmatched))]
    pub fn update_node<'a>(
        &mut self,
        target: &NodeId,
        matched: impl Into<NodeUpdate<'a, D>>,
        unmatched: Option<NodeUpdate<'a, D>>,
    ) -> usize
    where
        D: 'a,
    {
        self.apply("update_node", target, &matched.into(), unmatched.as_ref())
    }

    /// Attach `children` to `target` unless it already has a children list.
    ///
    /// Lazy loads are idempotent: a second call leaves the first attachment.
    #[instrument(level = "debug", skip(self, children), fields(count = children.len()))]
    pub fn set_children(&mut self, target: &NodeId, children: Vec<Node<D>>) -> usize {
        let attach = Update::transform(move |node: &Node<D>| {
            let mut next = node.shallow_clone();
            if node.is_unloaded() {
                next.children = Some(children.clone());
            }
            next
        });
        self.apply("set_children", target, &attach, None)
    }

    /// Merge `matched` into the target's properties and `unmatched` into
    /// every other node's properties.
    #[instrument(level = "debug", skip(self, matched, unmatched))]
    pub fn set_node_properties<'a>(
        &mut self,
        target: &NodeId,
        matched: impl Into<PropertiesUpdate<'a, D>>,
        unmatched: Option<PropertiesUpdate<'a, D>>,
    ) -> usize
    where
        D: 'a,
    {
        let matched = merge_properties(matched.into());
        let unmatched = unmatched.map(merge_properties);
        self.apply("set_node_properties", target, &matched, unmatched.as_ref())
    }

    /// Set `is_open`, or toggle it when `is_open` is `None`.
    ///
    /// The toggle reads the node being rebuilt, never a stale copy.
    pub fn set_open(&mut self, target: &NodeId, is_open: Option<bool>) -> usize {
        debug!("set_open: target={} is_open={:?}", target, is_open);
        let patch: PropertiesUpdate<D> = Update::transform(move |node: &Node<D>| {
            PropertiesPatch::new().with_open(is_open.unwrap_or(!node.properties.is_open))
        });
        self.set_node_properties(target, patch, None)
    }

    /// Toggle callback handed to the rendering layer.
    pub fn toggle_open(&mut self, target: &NodeId) -> usize {
        self.set_open(target, None)
    }

    /// Set `is_active` on the target. Activating also deactivates every
    /// other node, so at most one node is active at a time.
    pub fn set_active(&mut self, target: &NodeId, is_active: bool) -> usize {
        debug!("set_active: target={} is_active={}", target, is_active);
        let matched = PropertiesPatch::new().with_active(is_active);
        let unmatched =
            is_active.then(|| Update::Replace(PropertiesPatch::new().with_active(false)));
        self.set_node_properties(target, matched, unmatched)
    }

    fn apply(
        &mut self,
        op: &'static str,
        target: &NodeId,
        matched: &NodeUpdate<'_, D>,
        unmatched: Option<&NodeUpdate<'_, D>>,
    ) -> usize {
        let (roots, hits) = update::rebuild(&self.tree.roots, target, matched, unmatched);
        if hits == 0 {
            debug!("{}: target {} not found", op, target);
        }
        self.commit(op, Some(target), roots);
        hits
    }

    fn commit(&mut self, op: &'static str, target: Option<&NodeId>, roots: Vec<Node<D>>) {
        self.tree.roots = roots;
        self.tree.revision += 1;
        self.ancestry.get_mut().parents.clear();
        debug!(
            "{}: committed revision {} (target={:?})",
            op, self.tree.revision, target
        );
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    /// Pre-order iterator over the whole tree.
    pub fn iter(&self) -> PreOrder<'_, D> {
        PreOrder::new(&self.tree.roots)
    }

    pub fn traverse<'s>(&'s self, visit: impl FnMut(&'s Node<D>)) {
        traverse::traverse(&self.tree.roots, visit);
    }

    pub fn find(&self, predicate: impl FnMut(&Node<D>) -> bool) -> Option<&Node<D>> {
        traverse::find(&self.tree.roots, predicate)
    }

    pub fn find_by_id(&self, id: &NodeId) -> Option<&Node<D>> {
        traverse::find_by_id(&self.tree.roots, id)
    }

    pub fn filter(&self, predicate: impl FnMut(&Node<D>) -> bool) -> Vec<&Node<D>> {
        traverse::filter(&self.tree.roots, predicate)
    }

    pub fn node_count(&self) -> usize {
        traverse::count(&self.tree.roots)
    }

    /// Direct parent of `id` in the whole tree.
    pub fn get_parent(&self, id: &NodeId) -> Option<&Node<D>> {
        traverse::find_parent(&self.tree.roots, id)
    }

    /// Ancestors of `id`, root first, immediate parent last.
    ///
    /// Roots and unknown ids have no ancestors.
    #[instrument(level = "debug", skip(self))]
    pub fn get_ancestors(&self, id: &NodeId) -> Vec<&Node<D>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id.clone()]);
        let mut current = id.clone();

        while let Some(parent) = self.parent_id(&current) {
            // Repeated ids would otherwise ascend forever
            if !seen.insert(parent.clone()) {
                break;
            }
            chain.push(parent.clone());
            current = parent;
        }

        chain
            .iter()
            .rev()
            .filter_map(|parent| self.find_by_id(parent))
            .collect()
    }

    fn parent_id(&self, id: &NodeId) -> Option<NodeId> {
        if let Some(cached) = self.ancestry.borrow().parents.get(id) {
            return cached.clone();
        }
        let parent = self.get_parent(id).map(|node| node.id.clone());
        self.ancestry
            .borrow_mut()
            .parents
            .insert(id.clone(), parent.clone());
        parent
    }

    /// Ids of root-level nodes that are open. Nested nodes are not reported.
    pub fn open_ids(&self) -> Vec<NodeId> {
        self.root_ids_where(|node| node.properties.is_open)
    }

    /// Ids of root-level nodes that are loading. Nested nodes are not reported.
    pub fn loading_ids(&self) -> Vec<NodeId> {
        self.root_ids_where(|node| node.properties.is_loading)
    }

    fn root_ids_where(&self, predicate: impl Fn(&Node<D>) -> bool) -> Vec<NodeId> {
        self.tree
            .roots
            .iter()
            .filter(|node| predicate(node))
            .map(|node| node.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> TreeStore {
        let records = vec![
            json!({"id": 1, "name": "Root 1", "employees": [
                {"id": 2, "name": "Child 1", "employees": []},
                {"id": 3, "name": "Child 2", "employees": []}
            ]}),
            json!({"id": 4, "name": "Root 2"}),
        ];
        TreeStore::from_records(&records, BuildOptions::new("id", "name", "employees")).unwrap()
    }

    #[test]
    fn given_mutation_when_committed_then_revision_increments() {
        let mut store = store();
        assert_eq!(store.revision(), 0);

        store.toggle_open(&NodeId::from(1));
        store.toggle_open(&NodeId::from(99));

        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn given_cached_ancestry_when_tree_changes_then_cache_is_reset() {
        let mut store = store();
        assert_eq!(store.get_ancestors(&NodeId::from(5)).len(), 0);

        store.set_children(
            &NodeId::from(4),
            vec![Node::new(5, "Lazy", json!({})).with_children(vec![])],
        );

        let ancestors = store.get_ancestors(&NodeId::from(5));
        assert_eq!(ancestors.len(), 1);
        assert_eq!(ancestors[0].id, NodeId::from(4));
    }

    #[test]
    fn given_repeated_id_chain_when_resolving_ancestors_then_terminates() {
        let looped = Node::new(1, "outer", ()).with_children(vec![Node::new(1, "inner", ())]);
        let store = TreeStore::from_nodes(vec![looped]);

        let ancestors = store.get_ancestors(&NodeId::from(1));

        assert!(ancestors.is_empty());
    }

    #[test]
    fn given_open_nested_node_when_listing_open_ids_then_only_roots_are_reported() {
        let mut store = store();

        store.set_open(&NodeId::from(2), Some(true));
        store.set_open(&NodeId::from(4), Some(true));

        assert_eq!(store.open_ids(), vec![NodeId::from(4)]);
        assert!(store.loading_ids().is_empty());
    }
}
