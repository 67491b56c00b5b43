use bstpipe::bst::{Bst, expected_height};
use bstpipe::pipeline::{SerializedTree, consume};
use bstpipe::record::RecordOrder;
use bstpipe::traversal::Traversal;
use proptest::prelude::*;
use std::cmp::Ordering;

fn cmp(a: &u32, b: &u32) -> Ordering {
    a.cmp(b)
}

fn order() -> RecordOrder<u32> {
    RecordOrder { items: cmp, keys: cmp }
}

// A shuffled set of distinct keys.
fn distinct_keys(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::btree_set(0u32..100_000, 1..max_len)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

fn serialize<'a>(keys: &'a [u32], traversal: Traversal) -> SerializedTree<'a, u32> {
    let complete = Bst::build(order(), keys.iter()).minimize_complete();
    SerializedTree::new(complete.iter(traversal).collect())
}

proptest! {
    #[test]
    fn minimize_reaches_minimum_height(keys in distinct_keys(300)) {
        let complete = Bst::build(order(), keys.iter()).minimize_complete();
        prop_assert_eq!(complete.len(), keys.len());
        prop_assert_eq!(complete.height(), expected_height(keys.len()));
        prop_assert!(complete.is_balanced());
    }

    #[test]
    fn inorder_is_strictly_increasing(keys in distinct_keys(300)) {
        let bst = Bst::build(order(), keys.iter());
        let walked: Vec<u32> = bst.iter(Traversal::InOrder).copied().collect();
        prop_assert!(walked.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(walked.len(), keys.len());
    }

    #[test]
    fn inorder_with_duplicates_is_non_decreasing(
        keys in proptest::collection::vec(0u32..20, 1..200)
    ) {
        let bst = Bst::build(order(), keys.iter());
        let walked: Vec<u32> = bst.iter(Traversal::InOrder).copied().collect();
        prop_assert!(walked.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn levelorder_round_trip_is_valid(keys in distinct_keys(300)) {
        let validation = consume(serialize(&keys, Traversal::LevelOrder), order());
        prop_assert!(validation.is_valid(), "{:?}", validation);
    }

    #[test]
    fn postorder_round_trip_is_caught(keys in distinct_keys(300)) {
        prop_assume!(keys.len() >= 3);
        let validation = consume(serialize(&keys, Traversal::PostOrder), order());
        prop_assert!(validation.sorted);
        prop_assert!(!validation.balanced);
        prop_assert!(!validation.is_valid());
    }
}

#[test]
fn two_records_are_indistinguishable() {
    // Any two-node tree already has minimum height.
    let keys = [1u32, 2];
    let validation = consume(serialize(&keys, Traversal::PostOrder), order());
    assert!(validation.is_valid());
}
