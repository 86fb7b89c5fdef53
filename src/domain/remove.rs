//! Deletion with upward pruning, and full teardown.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::error::TreeResult;
use crate::domain::tree::ChrisTree;

impl<T> ChrisTree<T> {
    /// Remove `key`, returning its payload. Absent keys are a no-op.
    ///
    /// The whole dead suffix of the key's path is destroyed: starting at the
    /// terminal node, every childless node is unlinked and destroyed until an
    /// ancestor still shared with another key (or the root) is reached.
    #[instrument(level = "debug", skip(self, key), fields(key = %hex::encode(key)))]
    pub fn remove(&mut self, key: &[u8]) -> TreeResult<Option<T>> {
        self.check_key(key)?;

        let Some(terminal) = self.find_terminal(key) else {
            debug!("key absent");
            return Ok(None);
        };

        let payload = self.node_mut(terminal).payload.take();
        let pruned = self.prune(terminal)?;
        debug!(pruned, "key removed");
        Ok(payload)
    }

    /// Destroy childless nodes from `start` upward. Returns how many nodes
    /// were destroyed.
    pub(crate) fn prune(&mut self, start: Index) -> TreeResult<usize> {
        let mut current = start;
        let mut pruned = 0;
        loop {
            let node = self.node(current);
            if !node.children.is_empty() {
                break;
            }
            let Some(parent) = node.parent else {
                break;
            };

            self.unlink_node(current, parent)?;
            self.destroy_node(current);
            pruned += 1;
            current = parent;
        }
        Ok(pruned)
    }

    /// Remove every entry.
    ///
    /// Nodes are unlinked from both structures and destroyed children first.
    /// Identity counters keep running.
    #[instrument(level = "debug", skip(self))]
    pub fn clear(&mut self) -> TreeResult<usize> {
        let entries = self.len();
        let order: Vec<(Index, Index)> = self
            .iter_postorder()
            .filter_map(|idx| self.node(idx).parent.map(|parent| (idx, parent)))
            .collect();

        for (idx, parent) in order {
            self.unlink_node(idx, parent)?;
            self.destroy_node(idx);
        }
        debug!(entries, "christree cleared");
        Ok(entries)
    }
}
