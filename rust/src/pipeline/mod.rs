use serde::Serialize;
use std::cmp::Ordering;
use thiserror::Error;
use tracing::debug;

use crate::bst::{Bst, expected_height};
use crate::permutation::Permutation;
use crate::random::RandomSource;
use crate::record::{RecordOrder, RecordStore};
use crate::traversal::Traversal;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("cannot build a tree from an empty record set")]
    EmptyRecordSet,
}

/// Decides, per produced tree, whether to serialize it correctly.
///
/// A draw from `[1, num_trees]` below `error_rate` selects post-order, which
/// keeps the keys but loses the complete shape once re-inserted. Roughly
/// `(error_rate - 1) / num_trees` of the trees are faulty; an `error_rate` of
/// 1 never faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaultPolicy {
    pub error_rate: usize,
    pub num_trees: usize,
}

impl FaultPolicy {
    pub fn new(error_rate: usize, num_trees: usize) -> Self {
        FaultPolicy {
            error_rate,
            num_trees,
        }
    }

    // Always serializes correctly.
    pub fn never() -> Self {
        FaultPolicy::new(1, 1)
    }

    pub fn choose(&self, rand: &mut RandomSource) -> Traversal {
        let draw = rand.get_random_int(1, self.num_trees.max(1));
        if draw >= self.error_rate {
            Traversal::LevelOrder
        } else {
            Traversal::PostOrder
        }
    }
}

/// A flattened tree: records in traversal order and nothing else.
///
/// Not `Clone`; handing one to the buffer moves it.
#[derive(Debug)]
pub struct SerializedTree<'a, R> {
    records: Vec<&'a R>,
}

impl<'a, R> SerializedTree<'a, R> {
    pub fn new(records: Vec<&'a R>) -> Self {
        SerializedTree { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[&'a R] {
        &self.records
    }
}

/// Outcome of checking one serialized tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub sorted: bool,
    pub height: isize,
    pub expected_height: isize,
    pub balanced: bool,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        self.sorted && self.height == self.expected_height && self.balanced
    }
}

/// Turns a record store into serialized trees, one per call to `produce`.
///
/// Construction rejects an empty store, so producing never fails.
#[derive(Debug)]
pub struct Producer<'a, R> {
    store: &'a RecordStore<R>,
    order: RecordOrder<R>,
    policy: FaultPolicy,
}

impl<'a, R> Producer<'a, R> {
    pub fn new(
        store: &'a RecordStore<R>,
        order: RecordOrder<R>,
        policy: FaultPolicy,
    ) -> Result<Self, PipelineError> {
        if store.is_empty() {
            return Err(PipelineError::EmptyRecordSet);
        }
        Ok(Producer {
            store,
            order,
            policy,
        })
    }

    /// Builds a tree from a fresh random ordering of the store, minimizes it
    /// and flattens it with the traversal picked by the fault policy.
    pub fn produce(&self, rand: &mut RandomSource) -> SerializedTree<'a, R> {
        let n = self.store.size();
        let shuffled: Vec<&'a R> = Permutation::new(n, n, rand)
            .filter_map(|i| self.store.get(i))
            .collect();
        let bst = Bst::build(self.order, shuffled);
        let complete = bst.minimize_complete();
        drop(bst);

        let traversal = self.policy.choose(rand);
        debug!(?traversal, records = n, "serializing tree");
        let records: Vec<&'a R> = complete.iter(traversal).collect();
        SerializedTree::new(records)
    }
}

pub fn produce<'a, R>(
    store: &'a RecordStore<R>,
    order: RecordOrder<R>,
    policy: FaultPolicy,
    rand: &mut RandomSource,
) -> Result<SerializedTree<'a, R>, PipelineError> {
    Ok(Producer::new(store, order, policy)?.produce(rand))
}

/// Rebuilds a tree from `tree` in array order and checks it is sorted, of
/// minimum height, and balanced. Never fails; a bad array is reported in the
/// returned [`Validation`].
pub fn consume<R>(tree: SerializedTree<'_, R>, order: RecordOrder<R>) -> Validation {
    let expected = expected_height(tree.len());
    let bst = Bst::build(order, tree.records.iter().copied());

    let mut sorted = true;
    let mut inorder = bst.iter(Traversal::InOrder);
    if let Some(mut prev) = inorder.next() {
        for next in inorder {
            if (order.items)(prev, next) != Ordering::Less {
                sorted = false;
                break;
            }
            prev = next;
        }
    }

    Validation {
        sorted,
        height: bst.height(),
        expected_height: expected,
        balanced: bst.is_balanced(),
    }
}
