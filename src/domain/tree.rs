//! The christree: an arena-backed trie over fixed-length byte keys whose
//! nodes are additionally threaded into one sorted sibling chain per depth.

use generational_arena::{Arena, Index};
use tracing::{debug, error, instrument, trace, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::layer::Layer;
use crate::domain::node::Node;

/// Arena-based christree.
///
/// The arena owns every node. The vertical structure (parent to children)
/// and the horizontal structure (per-depth sibling chains) are both expressed
/// through `Index` handles into the same arena.
#[derive(Debug)]
pub struct ChrisTree<T> {
    pub(crate) nodes: Arena<Node<T>>,
    pub(crate) root: Index,
    pub(crate) layers: Vec<Layer>,
    /// Maximum number of structural nodes, root excluded.
    node_budget: Option<usize>,
}

impl<T> ChrisTree<T> {
    /// Create an empty tree indexing keys of exactly `depth` bytes.
    #[instrument(level = "debug")]
    pub fn init(depth: usize) -> TreeResult<Self> {
        Self::build(depth, None)
    }

    /// Create an empty tree that holds at most `node_budget` structural nodes.
    ///
    /// Node creation fails with [`TreeError::Allocation`] once the budget is
    /// used up. Nothing is reserved in advance.
    #[instrument(level = "debug")]
    pub fn with_node_budget(depth: usize, node_budget: usize) -> TreeResult<Self> {
        Self::build(depth, Some(node_budget))
    }

    fn build(depth: usize, node_budget: Option<usize>) -> TreeResult<Self> {
        if depth < 1 {
            warn!("tree depth must be at least 1");
            return Err(TreeError::InvalidArgument(
                "tree depth must be at least 1".into(),
            ));
        }
        if depth > i32::MAX as usize {
            warn!(depth, "tree depth out of range");
            return Err(TreeError::InvalidArgument(format!(
                "tree depth {depth} out of range"
            )));
        }

        let root = Node::root().inspect_err(|e| error!("failed to create christree: {e}"))?;
        let mut nodes = Arena::new();
        let root = nodes.insert(root);

        debug!(depth, ?node_budget, "christree created");
        Ok(Self {
            nodes,
            root,
            layers: vec![Layer::default(); depth],
            node_budget,
        })
    }

    /// Release the tree.
    ///
    /// Entries still stored are released with it.
    #[instrument(level = "debug", skip(self))]
    pub fn close(self) {
        if !self.is_empty() {
            warn!(entries = self.len(), "closing christree that still holds entries");
        }
        debug!("christree closed");
    }

    /// Number of bytes in every key.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.layers.last().map_or(0, Layer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of structural nodes, root excluded.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn node_budget(&self) -> Option<usize> {
        self.node_budget
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn get_node(&self, idx: Index) -> Option<&Node<T>> {
        self.nodes.get(idx)
    }

    pub fn layer(&self, depth: usize) -> Option<&Layer> {
        self.layers.get(depth)
    }

    /// Live node count at `depth`, zero when the depth is out of range.
    pub fn layer_len(&self, depth: usize) -> usize {
        self.layers.get(depth).map_or(0, Layer::len)
    }

    /// Handles of the layer at `depth`, read front to back along its chain.
    pub fn layer_nodes(&self, depth: usize) -> LayerIter<'_, T> {
        LayerIter {
            tree: self,
            cursor: self.layers.get(depth).and_then(|l| l.head),
        }
    }

    /// Discriminators of the layer at `depth` in chain order.
    pub fn layer_discriminators(&self, depth: usize) -> Vec<u8> {
        self.layer_nodes(depth)
            .map(|idx| self.node(idx).discriminator)
            .collect()
    }

    /// Discriminators directly below the root.
    pub fn root_children(&self) -> Vec<u8> {
        self.node(self.root).children.iter().map(|&(d, _)| d).collect()
    }

    /// Exact lookup of the payload stored under `key`.
    #[instrument(level = "trace", skip(self))]
    pub fn get(&self, key: &[u8]) -> Option<&T> {
        if key.len() != self.depth() {
            return None;
        }
        self.find_terminal(key)
            .and_then(|idx| self.node(idx).payload.as_ref())
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn node(&self, idx: Index) -> &Node<T> {
        &self.nodes[idx]
    }

    pub(crate) fn node_mut(&mut self, idx: Index) -> &mut Node<T> {
        &mut self.nodes[idx]
    }

    pub(crate) fn terminal_depth(&self) -> i32 {
        self.depth() as i32 - 1
    }

    /// Follow `key` from the root via child lookups.
    pub(crate) fn find_terminal(&self, key: &[u8]) -> Option<Index> {
        key.iter()
            .try_fold(self.root, |current, &byte| self.node(current).find_child(byte))
    }

    pub(crate) fn check_key(&self, key: &[u8]) -> TreeResult<()> {
        if key.len() != self.depth() {
            warn!(
                len = key.len(),
                depth = self.depth(),
                "key length does not match tree depth"
            );
            return Err(TreeError::InvalidArgument(format!(
                "key has {} bytes, tree depth is {}",
                key.len(),
                self.depth()
            )));
        }
        Ok(())
    }

    /// Allocate an unlinked node and place it in the arena.
    #[instrument(level = "trace", skip(self))]
    pub(crate) fn create_node(&mut self, depth: i32, discriminator: u8) -> TreeResult<Index> {
        let node = Node::new(depth, discriminator)
            .inspect_err(|e| error!("failed to create christree node: {e}"))?;

        if let Some(budget) = self.node_budget {
            if self.node_count() >= budget {
                error!(budget, "node budget exhausted");
                return Err(TreeError::Allocation(format!(
                    "node budget of {budget} exhausted"
                )));
            }
        }
        Ok(self.nodes.insert(node))
    }

    /// Release a node and the storage it owns.
    ///
    /// The node must already be unlinked from its parent and its layer chain.
    /// Only the node's own storage is released; its former neighbours are
    /// left untouched.
    pub(crate) fn destroy_node(&mut self, idx: Index) -> Option<T> {
        let node = self.nodes.remove(idx)?;
        debug_assert!(node.children.is_empty(), "destroying node with live children");
        debug_assert!(node.parent.is_none(), "destroying node still linked to parent");
        debug_assert!(
            node.before.is_none() && node.after.is_none(),
            "destroying node still linked into its layer"
        );
        trace!(depth = node.depth, layer_id = node.layer_id, "node destroyed");
        node.payload
    }

    /// Register `idx` as a child of `parent`.
    pub(crate) fn link_vertical(&mut self, idx: Index, parent: Index) -> TreeResult<()> {
        let discriminator = self.node(idx).discriminator;
        self.node_mut(parent).add_child(discriminator, idx)?;
        self.node_mut(idx).parent = Some(parent);
        Ok(())
    }

    pub(crate) fn unlink_vertical(&mut self, idx: Index, parent: Index) {
        let discriminator = self.node(idx).discriminator;
        self.node_mut(parent).remove_child(discriminator);
        self.node_mut(idx).parent = None;
    }

    /// Link a fresh node into both structures. On failure neither link
    /// survives.
    pub(crate) fn link_node(&mut self, idx: Index, parent: Index) -> TreeResult<()> {
        self.link_vertical(idx, parent)
            .map_err(|e| TreeError::link("register child under parent", e))?;

        if let Err(e) = self.link_into_layer(idx) {
            self.unlink_vertical(idx, parent);
            return Err(TreeError::link("link node into layer", e));
        }
        Ok(())
    }

    pub(crate) fn unlink_node(&mut self, idx: Index, parent: Index) -> TreeResult<()> {
        self.unlink_from_layer(idx)?;
        self.unlink_vertical(idx, parent);
        Ok(())
    }
}

/// Walks one layer's sibling chain front to back.
pub struct LayerIter<'a, T> {
    tree: &'a ChrisTree<T>,
    cursor: Option<Index>,
}

impl<T> Iterator for LayerIter<'_, T> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = self.tree.node(current).after;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_zero_depth_when_init_then_invalid_argument() {
        let result = ChrisTree::<u32>::init(0);
        assert!(matches!(result, Err(TreeError::InvalidArgument(_))));
    }

    #[test]
    fn given_new_tree_when_inspecting_then_is_empty() {
        let tree = ChrisTree::<u32>::init(3).unwrap();

        assert_eq!(tree.depth(), 3);
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.node(tree.root()).is_root());
        assert!((0..3).all(|d| tree.layer_len(d) == 0));
        assert!(tree.root_children().is_empty());
    }

    #[test]
    fn given_full_budget_when_creating_node_then_allocation_error() {
        let mut tree = ChrisTree::<u32>::with_node_budget(2, 1).unwrap();

        tree.create_node(0, 1).unwrap();
        let result = tree.create_node(0, 2);

        assert!(matches!(result, Err(TreeError::Allocation(_))));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn given_unbounded_budget_when_creating_tree_then_nothing_preallocated() {
        let mut tree = ChrisTree::<u32>::with_node_budget(2, usize::MAX).unwrap();

        tree.create_node(0, 1).unwrap();

        assert_eq!(tree.node_budget(), Some(usize::MAX));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn given_linked_node_when_unlinking_then_both_structures_cleared() {
        let mut tree = ChrisTree::<u32>::init(2).unwrap();
        let idx = tree.create_node(0, 0x42).unwrap();

        tree.link_node(idx, tree.root()).unwrap();
        assert_eq!(tree.root_children(), vec![0x42]);
        assert_eq!(tree.layer_discriminators(0), vec![0x42]);
        assert_eq!(tree.node(idx).parent(), Some(tree.root()));

        tree.unlink_node(idx, tree.root()).unwrap();
        assert!(tree.root_children().is_empty());
        assert!(tree.layer_discriminators(0).is_empty());
        assert_eq!(tree.layer_len(0), 0);
        assert!(tree.node(idx).parent().is_none());
        assert!(tree.destroy_node(idx).is_none());
    }

    #[test]
    fn given_node_at_invalid_depth_when_linking_then_vertical_link_rolled_back() {
        let mut tree = ChrisTree::<u32>::init(2).unwrap();
        let idx = tree.create_node(7, 0x01).unwrap();

        let result = tree.link_node(idx, tree.root());

        assert!(matches!(result, Err(TreeError::Link { .. })));
        assert!(tree.root_children().is_empty());
        assert!(tree.node(idx).parent().is_none());
    }
}
