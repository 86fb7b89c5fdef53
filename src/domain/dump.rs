/*
Read-only renderings of a christree for humans: the vertical structure as a
termtree, and every layer chain as one line per depth.
 */
use std::collections::HashMap;
use std::fmt::Display;

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;
use tracing::instrument;

use crate::domain::tree::ChrisTree;

pub trait TreeDump {
    fn to_tree_string(&self) -> Tree<String>;
    fn layer_dump(&self) -> String;
}

impl<T: Display> TreeDump for ChrisTree<T> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        let root_label = format!("christree (depth {}, {} keys)", self.depth(), self.len());

        // children finish before their parent, so each subtree is complete
        // by the time its parent collects it
        let mut built: HashMap<Index, Tree<String>> = HashMap::new();
        for idx in self.iter_postorder() {
            let label = if idx == self.root() {
                root_label.clone()
            } else {
                node_label(self, idx)
            };
            let mut subtree = Tree::new(label);
            for child in self.node(idx).children() {
                if let Some(child_tree) = built.remove(&child) {
                    subtree.push(child_tree);
                }
            }
            built.insert(idx, subtree);
        }

        built
            .remove(&self.root())
            .unwrap_or_else(|| Tree::new(root_label))
    }

    #[instrument(level = "debug", skip(self))]
    fn layer_dump(&self) -> String {
        (0..self.depth())
            .map(|depth| {
                let chain = self
                    .layer_nodes(depth)
                    .map(|idx| {
                        let node = self.node(idx);
                        format!("{:02x}#{}", node.discriminator, node.layer_id)
                    })
                    .join(" ");
                format!("L{depth} [{}]: {chain}", self.layer_len(depth))
            })
            .join("\n")
    }
}

fn node_label<T: Display>(tree: &ChrisTree<T>, idx: Index) -> String {
    let node = tree.node(idx);
    match &node.payload {
        Some(payload) => format!("{:02x} #{} => {payload}", node.discriminator, node.layer_id),
        None => format!("{:02x} #{}", node.discriminator, node.layer_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tree_when_dumping_then_labels_show_hex_ids_and_payloads() {
        let mut tree = ChrisTree::init(2).unwrap();
        tree.add(&[0x01, 0x0a], "x").unwrap();
        tree.add(&[0x02, 0x0a], "y").unwrap();

        let rendered = tree.to_tree_string().to_string();

        assert!(rendered.starts_with("christree (depth 2, 2 keys)"));
        assert!(rendered.contains("01 #0"));
        assert!(rendered.contains("0a #0 => x"));
        assert!(rendered.contains("0a #1 => y"));
    }

    #[test]
    fn given_siblings_when_dumping_then_children_in_ascending_order() {
        let mut tree = ChrisTree::init(2).unwrap();
        tree.add(&[0x02, 0x01], "b").unwrap();
        tree.add(&[0x01, 0x09], "a").unwrap();

        let dump = tree.to_tree_string();

        let labels: Vec<&String> = dump.leaves.iter().map(|t| &t.root).collect();
        assert_eq!(labels, vec!["01 #1", "02 #0"]);
        assert_eq!(dump.leaves[0].leaves[0].root, "09 #1 => a");
    }

    #[test]
    fn given_tree_when_dumping_layers_then_one_line_per_depth() {
        let mut tree = ChrisTree::init(2).unwrap();
        tree.add(&[0x02, 0x0a], "y").unwrap();
        tree.add(&[0x01, 0x0a], "x").unwrap();

        let rendered = tree.layer_dump();

        assert_eq!(rendered, "L0 [2]: 01#1 02#0\nL1 [2]: 0a#0 0a#1");
    }
}
