//! Layer registry: one sorted sibling chain per tree depth.

use generational_arena::Index;
use tracing::{trace, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::tree::ChrisTree;

/// Registry entry for one depth.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    /// First node of the chain (smallest discriminator).
    pub(crate) head: Option<Index>,
    pub(crate) count: usize,
    /// Next identity tag; never reused within a tree.
    pub(crate) next_layer_id: u64,
}

impl Layer {
    pub fn head(&self) -> Option<Index> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn next_layer_id(&self) -> u64 {
        self.next_layer_id
    }
}

impl<T> ChrisTree<T> {
    fn layer_slot(&self, depth: i32) -> TreeResult<usize> {
        usize::try_from(depth)
            .ok()
            .filter(|&d| d < self.layers.len())
            .ok_or(TreeError::InvalidDepth {
                depth,
                tree_depth: self.layers.len(),
            })
    }

    /// Tag `idx` with the next identity of its layer and splice it into the
    /// layer's chain.
    ///
    /// The node goes after every node whose discriminator is less than or
    /// equal to its own, so equal discriminators keep insertion order.
    pub(crate) fn link_into_layer(&mut self, idx: Index) -> TreeResult<()> {
        let (depth, discriminator) = {
            let node = self.node(idx);
            (node.depth, node.discriminator)
        };
        let slot = self.layer_slot(depth).inspect_err(|e| warn!("{e}"))?;

        let mut before = None;
        let mut cursor = self.layers[slot].head;
        while let Some(current) = cursor {
            let node = self.node(current);
            if node.discriminator > discriminator {
                break;
            }
            before = Some(current);
            cursor = node.after;
        }

        let layer = &mut self.layers[slot];
        let layer_id = layer.next_layer_id;
        layer.next_layer_id += 1;
        layer.count += 1;
        if before.is_none() {
            layer.head = Some(idx);
        }

        {
            let node = self.node_mut(idx);
            node.layer_id = layer_id;
            node.before = before;
            node.after = cursor;
        }
        if let Some(b) = before {
            self.node_mut(b).after = Some(idx);
        }
        if let Some(a) = cursor {
            self.node_mut(a).before = Some(idx);
        }

        trace!(depth, discriminator, layer_id, "linked into layer");
        Ok(())
    }

    /// Splice `idx` out of its layer's chain.
    ///
    /// The chain is searched by identity tag; discriminators repeat across
    /// branches and cannot single out the node.
    pub(crate) fn unlink_from_layer(&mut self, idx: Index) -> TreeResult<()> {
        let (depth, layer_id) = {
            let node = self.node(idx);
            (node.depth, node.layer_id)
        };
        let slot = self.layer_slot(depth).inspect_err(|e| warn!("{e}"))?;

        let found = self
            .layer_nodes(slot)
            .find(|&current| self.node(current).layer_id == layer_id);
        let Some(found) = found else {
            warn!(depth, layer_id, "node not found in its layer");
            return Ok(());
        };

        let (before, after) = {
            let node = self.node_mut(found);
            (node.before.take(), node.after.take())
        };
        match before {
            Some(b) => self.node_mut(b).after = after,
            None => self.layers[slot].head = after,
        }
        if let Some(a) = after {
            self.node_mut(a).before = before;
        }
        self.layers[slot].count -= 1;

        trace!(depth, layer_id, "unlinked from layer");
        Ok(())
    }
}
