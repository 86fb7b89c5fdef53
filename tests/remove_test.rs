//! Removal, pruning and teardown

use christree::util::testing;
use christree::{ChrisTree, Mask, TreeError};

fn scenario_a() -> ChrisTree<&'static str> {
    let mut tree = ChrisTree::init(3).unwrap();
    tree.add(&[0x01, 0x02, 0x03], "P1").unwrap();
    tree.add(&[0x01, 0x02, 0x04], "P2").unwrap();
    tree
}

// ============================================================
// Scenario B: shared ancestors survive
// ============================================================

#[test]
fn given_shared_prefix_when_removing_one_key_then_shared_nodes_survive() {
    testing::init_test_setup();
    let mut tree = scenario_a();

    let removed = tree.remove(&[0x01, 0x02, 0x03]).unwrap();

    assert_eq!(removed, Some("P1"));
    assert!(tree
        .select(&Mask::new(0, vec![0x01, 0x02, 0x03]), 10)
        .unwrap()
        .is_empty());
    assert_eq!(tree.layer_discriminators(1), vec![0x02]);
    assert_eq!(tree.layer_discriminators(2), vec![0x04]);
    assert_eq!(tree.get(&[0x01, 0x02, 0x04]), Some(&"P2"));
    assert_eq!(tree.node_count(), 3);
    tree.verify().unwrap();
}

#[test]
fn given_last_key_when_removing_then_tree_back_to_empty() {
    testing::init_test_setup();
    let mut tree = scenario_a();

    tree.remove(&[0x01, 0x02, 0x03]).unwrap();
    tree.remove(&[0x01, 0x02, 0x04]).unwrap();

    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 0);
    assert!(tree.root_children().is_empty());
    for depth in 0..3 {
        assert_eq!(tree.layer_len(depth), 0);
        assert!(tree.layer(depth).unwrap().head().is_none());
    }
    tree.verify().unwrap();
}

#[test]
fn given_branch_split_high_when_removing_then_whole_suffix_pruned() {
    testing::init_test_setup();
    let mut tree = ChrisTree::init(4).unwrap();
    tree.add(&[1, 2, 3, 4], "keep").unwrap();
    tree.add(&[1, 7, 8, 9], "drop").unwrap();

    tree.remove(&[1, 7, 8, 9]).unwrap();

    assert_eq!(tree.node_count(), 4);
    assert_eq!(tree.layer_discriminators(1), vec![2]);
    assert_eq!(tree.layer_discriminators(2), vec![3]);
    assert_eq!(tree.layer_discriminators(3), vec![4]);
    tree.verify().unwrap();
}

// ============================================================
// Edge cases
// ============================================================

#[test]
fn given_absent_key_when_removing_then_noop() {
    testing::init_test_setup();
    let mut tree = scenario_a();

    assert_eq!(tree.remove(&[0x01, 0x09, 0x03]).unwrap(), None);
    assert_eq!(tree.remove(&[0x01, 0x02, 0x05]).unwrap(), None);

    assert_eq!(tree.len(), 2);
    assert_eq!(tree.node_count(), 4);
}

#[test]
fn given_key_removed_twice_when_removing_then_second_is_noop() {
    testing::init_test_setup();
    let mut tree = scenario_a();

    assert_eq!(tree.remove(&[0x01, 0x02, 0x04]).unwrap(), Some("P2"));
    assert_eq!(tree.remove(&[0x01, 0x02, 0x04]).unwrap(), None);
    tree.verify().unwrap();
}

#[test]
fn given_wrong_key_length_when_removing_then_invalid_argument() {
    testing::init_test_setup();
    let mut tree = scenario_a();

    let result = tree.remove(&[0x01, 0x02]);

    assert!(matches!(result, Err(TreeError::InvalidArgument(_))));
    assert_eq!(tree.len(), 2);
}

#[test]
fn given_removed_key_when_adding_again_then_new_layer_ids_issued() {
    testing::init_test_setup();
    let mut tree = scenario_a();
    let next_before = tree.layer(2).unwrap().next_layer_id();

    tree.remove(&[0x01, 0x02, 0x03]).unwrap();
    tree.add(&[0x01, 0x02, 0x03], "again").unwrap();

    let ids: Vec<u64> = tree
        .layer_nodes(2)
        .map(|idx| tree.get_node(idx).unwrap().layer_id())
        .collect();
    assert_eq!(ids, vec![next_before, 1]);
    tree.verify().unwrap();
}

// ============================================================
// Clear
// ============================================================

#[test]
fn given_populated_tree_when_clearing_then_empty_and_reusable() {
    testing::init_test_setup();
    let mut tree = ChrisTree::init(2).unwrap();
    for a in 0..4u8 {
        for b in 0..3u8 {
            tree.add(&[a, b], u16::from(a) * 10 + u16::from(b)).unwrap();
        }
    }

    let removed = tree.clear().unwrap();

    assert_eq!(removed, 12);
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 0);
    tree.verify().unwrap();

    tree.add(&[1, 1], 11).unwrap();
    assert_eq!(tree.get(&[1, 1]), Some(&11));
    tree.verify().unwrap();
}
