//! Structural invariant checks, used by tests and the `verify` script command.

use std::collections::HashSet;

use tracing::{instrument, warn};

use crate::domain::error::{TreeError, TreeResult};
use crate::domain::tree::ChrisTree;

fn violation(message: String) -> TreeResult<()> {
    warn!("{message}");
    Err(TreeError::InvariantViolation(message))
}

impl<T> ChrisTree<T> {
    /// Check that both linkage structures agree and every node invariant
    /// holds. Reports the first breach found.
    #[instrument(level = "debug", skip(self))]
    pub fn verify(&self) -> TreeResult<()> {
        let terminal = self.terminal_depth();
        let mut per_depth = vec![0usize; self.depth()];
        let mut reachable = 0usize;

        for idx in self.iter() {
            let node = self.node(idx);
            reachable += 1;

            if idx != self.root {
                let Some(parent) = node.parent.and_then(|p| self.get_node(p)) else {
                    return violation(format!("node {idx:?} has no live parent"));
                };
                if node.depth != parent.depth + 1 {
                    return violation(format!(
                        "node {idx:?} at depth {} under parent at depth {}",
                        node.depth, parent.depth
                    ));
                }
                if node.depth > terminal {
                    return violation(format!("node {idx:?} below terminal depth"));
                }
                per_depth[node.depth as usize] += 1;
                if node.payload.is_some() && node.depth != terminal {
                    return violation(format!("payload on non-terminal node {idx:?}"));
                }
                if node.depth != terminal && node.children.is_empty() {
                    return violation(format!("childless structural node {idx:?}"));
                }
            } else if node.parent.is_some() || node.payload.is_some() {
                return violation("root carries a parent or payload".into());
            }

            for pair in node.children.windows(2) {
                if pair[0].0 >= pair[1].0 {
                    return violation(format!("children of {idx:?} not strictly ascending"));
                }
            }
            for &(discriminator, child) in &node.children {
                match self.get_node(child) {
                    Some(c) if c.discriminator == discriminator && c.parent == Some(idx) => {}
                    _ => return violation(format!("child {child:?} of {idx:?} disagrees with its slot")),
                }
            }
        }

        if reachable != self.nodes.len() {
            return violation(format!(
                "{} nodes in arena, {reachable} reachable from root",
                self.nodes.len()
            ));
        }

        for (depth, layer) in self.layers.iter().enumerate() {
            let mut previous = None;
            let mut ids = HashSet::new();
            let mut length = 0usize;
            for idx in self.layer_nodes(depth) {
                let node = self.node(idx);
                length += 1;
                if length > layer.count {
                    return violation(format!("layer {depth} chain longer than its count"));
                }
                if node.depth != depth as i32 {
                    return violation(format!("node {idx:?} at depth {} in layer {depth}", node.depth));
                }
                if node.before != previous {
                    return violation(format!("layer {depth} back link broken at {idx:?}"));
                }
                if let Some(p) = previous {
                    if self.node(p).discriminator > node.discriminator {
                        return violation(format!("layer {depth} out of order at {idx:?}"));
                    }
                }
                if node.layer_id >= layer.next_layer_id || !ids.insert(node.layer_id) {
                    return violation(format!("layer {depth} identity tag {} invalid", node.layer_id));
                }
                previous = Some(idx);
            }
            if length != layer.count || length != per_depth[depth] {
                return violation(format!(
                    "layer {depth}: chain {length}, count {}, reachable {}",
                    layer.count, per_depth[depth]
                ));
            }
        }

        Ok(())
    }
}
