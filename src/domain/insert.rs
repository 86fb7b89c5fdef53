//! Insertion: walk the key, growing missing branches, then attach the payload.

use generational_arena::Index;
use tracing::{debug, error, instrument};

use crate::domain::error::TreeResult;
use crate::domain::tree::ChrisTree;

impl<T> ChrisTree<T> {
    /// Store `payload` under `key`, returning the payload it replaces.
    ///
    /// Re-inserting an existing key swaps the payload without touching the
    /// structure. When a node cannot be created or linked, the node of the
    /// failing step is destroyed and the branch grown earlier in this call is
    /// pruned again before the error is returned.
    #[instrument(level = "debug", skip(self, key, payload), fields(key = %hex::encode(key)))]
    pub fn add(&mut self, key: &[u8], payload: T) -> TreeResult<Option<T>> {
        self.check_key(key)?;

        let mut current = self.root;
        for (depth, &byte) in key.iter().enumerate() {
            current = match self.node(current).find_child(byte) {
                Some(child) => child,
                None => match self.grow_branch(current, depth as i32, byte) {
                    Ok(child) => child,
                    Err(e) => {
                        error!("failed to add key to christree: {e}");
                        if let Err(prune_err) = self.prune(current) {
                            error!("rollback of partial branch failed: {prune_err}");
                        }
                        return Err(e);
                    }
                },
            };
        }

        let replaced = self.node_mut(current).payload.replace(payload);
        debug!(replaced = replaced.is_some(), "payload attached");
        Ok(replaced)
    }

    fn grow_branch(&mut self, parent: Index, depth: i32, discriminator: u8) -> TreeResult<Index> {
        let child = self.create_node(depth, discriminator)?;
        if let Err(e) = self.link_node(child, parent) {
            self.destroy_node(child);
            return Err(e);
        }
        Ok(child)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::error::TreeError;
    use crate::domain::tree::ChrisTree;

    #[test]
    fn given_empty_tree_when_adding_then_one_node_per_depth() {
        let mut tree = ChrisTree::init(3).unwrap();

        let replaced = tree.add(&[1, 2, 3], "p1").unwrap();

        assert!(replaced.is_none());
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&[1, 2, 3]), Some(&"p1"));
        tree.verify().unwrap();
    }

    #[test]
    fn given_existing_key_when_adding_again_then_payload_replaced_structure_unchanged() {
        let mut tree = ChrisTree::init(3).unwrap();
        tree.add(&[1, 2, 3], "first").unwrap();
        let nodes = tree.node_count();

        let replaced = tree.add(&[1, 2, 3], "second").unwrap();

        assert_eq!(replaced, Some("first"));
        assert_eq!(tree.node_count(), nodes);
        assert_eq!(tree.get(&[1, 2, 3]), Some(&"second"));
    }

    #[test]
    fn given_wrong_key_length_when_adding_then_invalid_argument_without_mutation() {
        let mut tree = ChrisTree::init(3).unwrap();

        let result = tree.add(&[1, 2], "short");

        assert!(matches!(result, Err(TreeError::InvalidArgument(_))));
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn given_exhausted_budget_when_adding_then_partial_branch_pruned() {
        let mut tree = ChrisTree::with_node_budget(3, 4).unwrap();
        tree.add(&[1, 2, 3], "kept").unwrap();

        // needs three new nodes below the root, only one slot remains
        let result = tree.add(&[9, 9, 9], "lost");

        assert!(matches!(result, Err(TreeError::Allocation(_))));
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.root_children(), vec![1]);
        assert_eq!(tree.get(&[1, 2, 3]), Some(&"kept"));
        tree.verify().unwrap();
    }

    #[test]
    fn given_failing_rollback_when_adding_then_original_error_returned() {
        let mut tree = ChrisTree::with_node_budget(2, 1).unwrap();
        // childless node outside every layer: pruning it cannot unlink it
        let stray = tree.create_node(7, 0x01).unwrap();
        tree.link_vertical(stray, tree.root()).unwrap();

        let result = tree.add(&[0x01, 0x05], "lost");

        assert!(matches!(result, Err(TreeError::Allocation(_))));
    }

    #[test]
    fn given_exhausted_budget_when_adding_below_shared_prefix_then_prefix_kept() {
        let mut tree = ChrisTree::with_node_budget(3, 4).unwrap();
        tree.add(&[1, 2, 3], "kept").unwrap();

        // shares [1], needs two new nodes, one slot remains
        let result = tree.add(&[1, 5, 6], "lost");

        assert!(result.is_err());
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.layer_discriminators(1), vec![2]);
        tree.verify().unwrap();

        // the freed slot is usable again
        tree.add(&[1, 2, 4], "fits").unwrap();
        assert_eq!(tree.node_count(), 4);
    }
}
