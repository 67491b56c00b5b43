use std::cmp::Ordering;

use crate::record::RecordOrder;
use crate::traversal::{Traversal, TreeIter};

// A node borrows its record; the record store keeps ownership.
pub(crate) struct Node<'a, R> {
    pub(crate) record: &'a R,
    pub(crate) left: Option<Box<Node<'a, R>>>,
    pub(crate) right: Option<Box<Node<'a, R>>>,
}

impl<'a, R> Node<'a, R> {
    fn leaf(record: &'a R) -> Box<Self> {
        Box::new(Node {
            record,
            left: None,
            right: None,
        })
    }
}

/// Height of a minimum-height tree over `n` nodes, counted in edges.
///
/// `ceil(log2(n + 1)) - 1`, so an empty tree is `-1` and a single node is `0`,
/// which matches [`Bst::height`].
pub fn expected_height(n: usize) -> isize {
    (usize::BITS - n.leading_zeros()) as isize - 1
}

/// An unbalanced binary search tree over borrowed records.
///
/// Records are ordered by `order.keys`. Records whose key compares equal to a
/// node's key always go to that node's right.
pub struct Bst<'a, R> {
    root: Option<Box<Node<'a, R>>>,
    order: RecordOrder<R>,
    len: usize,
}

impl<'a, R> Bst<'a, R> {
    pub fn new(order: RecordOrder<R>) -> Self {
        Bst {
            root: None,
            order,
            len: 0,
        }
    }

    // build inserts the records one at a time, in the order given.
    pub fn build<I>(order: RecordOrder<R>, records: I) -> Self
    where
        I: IntoIterator<Item = &'a R>,
    {
        let mut bst = Bst::new(order);
        for record in records {
            bst.insert(record);
        }
        bst
    }

    pub fn insert(&mut self, record: &'a R) {
        let keys = self.order.keys;
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            slot = match keys(record, node.record) {
                Ordering::Less => &mut node.left,
                Ordering::Equal | Ordering::Greater => &mut node.right,
            };
        }
        *slot = Some(Node::leaf(record));
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn order(&self) -> RecordOrder<R> {
        self.order
    }

    pub(crate) fn root(&self) -> Option<&Node<'a, R>> {
        self.root.as_deref()
    }

    /// Edges on the longest root-to-leaf path; `-1` for an empty tree.
    pub fn height(&self) -> isize {
        self.fold_heights().0
    }

    /// True when every node's subtrees differ in height by at most one.
    pub fn is_balanced(&self) -> bool {
        self.fold_heights().1
    }

    // Bottom-up pass computing (height, balanced) without recursion, so that
    // a degenerate tree cannot exhaust the stack.
    fn fold_heights(&self) -> (isize, bool) {
        let mut pending: Vec<&Node<'a, R>> = Vec::new();
        let mut postorder: Vec<&Node<'a, R>> = Vec::with_capacity(self.len);
        if let Some(root) = self.root() {
            pending.push(root);
        }
        while let Some(node) = pending.pop() {
            postorder.push(node);
            if let Some(left) = node.left.as_deref() {
                pending.push(left);
            }
            if let Some(right) = node.right.as_deref() {
                pending.push(right);
            }
        }

        // postorder holds self, right, left; walking it backwards visits
        // left, right, self, so child heights sit on top of the stack.
        let mut heights: Vec<isize> = Vec::new();
        let mut balanced = true;
        for node in postorder.iter().rev() {
            let rh = if node.right.is_some() { heights.pop().unwrap_or(-1) } else { -1 };
            let lh = if node.left.is_some() { heights.pop().unwrap_or(-1) } else { -1 };
            if (lh - rh).abs() > 1 {
                balanced = false;
            }
            heights.push(1 + lh.max(rh));
        }
        (heights.pop().unwrap_or(-1), balanced)
    }

    pub fn iter(&self, traversal: Traversal) -> TreeIter<'_, 'a, R> {
        TreeIter::new(self, traversal)
    }

    /// Builds a new tree of minimum height over the same records.
    ///
    /// The records are read back in key order and the middle of each range
    /// becomes the root of that range. On an even-length range the upper
    /// middle is chosen, which keeps the left subtree at least as large as
    /// the right one.
    pub fn minimize_complete(&self) -> Bst<'a, R> {
        let sorted: Vec<&'a R> = self.iter(Traversal::InOrder).collect();
        Bst {
            root: Self::build_range(&sorted),
            order: self.order,
            len: sorted.len(),
        }
    }

    fn build_range(sorted: &[&'a R]) -> Option<Box<Node<'a, R>>> {
        if sorted.is_empty() {
            return None;
        }
        let mid = sorted.len() / 2;
        let mut node = Node::leaf(sorted[mid]);
        node.left = Self::build_range(&sorted[..mid]);
        node.right = Self::build_range(&sorted[mid + 1..]);
        Some(node)
    }
}

// Dropping a long chain of boxes recursively can overflow; unlink instead.
impl<R> Drop for Bst<'_, R> {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node<'_, R>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}
