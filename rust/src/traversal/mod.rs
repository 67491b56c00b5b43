use std::collections::VecDeque;

use thiserror::Error;

use crate::bst::{Bst, Node};

/// How a [`TreeIter`] walks its tree. Fixed for the life of the iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// left, self, right: ascending key order on a valid tree.
    InOrder,
    /// breadth first, left to right within a level.
    LevelOrder,
    /// left, right, self.
    PostOrder,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraversalError {
    #[error("iterator exhausted")]
    Exhausted,
}

enum Frontier<'t, 'a, R> {
    // nodes whose left spine has been pushed but which are not yet yielded
    InOrder(Vec<&'t Node<'a, R>>),
    LevelOrder(VecDeque<&'t Node<'a, R>>),
    // (node, children already pushed)
    PostOrder(Vec<(&'t Node<'a, R>, bool)>),
}

// TreeIter is a lazy, single-pass walk over a borrowed tree. Build a new one
// to walk the tree again.
pub struct TreeIter<'t, 'a, R> {
    frontier: Frontier<'t, 'a, R>,
    remaining: usize,
}

impl<'t, 'a, R> TreeIter<'t, 'a, R> {
    pub(crate) fn new(bst: &'t Bst<'a, R>, traversal: Traversal) -> Self {
        let root = bst.root();
        let frontier = match traversal {
            Traversal::InOrder => {
                let mut stack = Vec::new();
                push_left_spine(&mut stack, root);
                Frontier::InOrder(stack)
            }
            Traversal::LevelOrder => Frontier::LevelOrder(root.into_iter().collect()),
            Traversal::PostOrder => {
                Frontier::PostOrder(root.into_iter().map(|n| (n, false)).collect())
            }
        };
        TreeIter {
            frontier,
            remaining: bst.len(),
        }
    }

    pub fn has_next(&self) -> bool {
        self.remaining > 0
    }

    /// Like `next`, but running off the end is an error instead of `None`.
    pub fn try_next(&mut self) -> Result<&'a R, TraversalError> {
        self.next().ok_or(TraversalError::Exhausted)
    }
}

fn push_left_spine<'t, 'a, R>(stack: &mut Vec<&'t Node<'a, R>>, mut node: Option<&'t Node<'a, R>>) {
    while let Some(n) = node {
        stack.push(n);
        node = n.left.as_deref();
    }
}

impl<'t, 'a, R> Iterator for TreeIter<'t, 'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<&'a R> {
        let record = match &mut self.frontier {
            Frontier::InOrder(stack) => {
                let node = stack.pop()?;
                push_left_spine(stack, node.right.as_deref());
                node.record
            }
            Frontier::LevelOrder(queue) => {
                let node = queue.pop_front()?;
                queue.extend(node.left.as_deref());
                queue.extend(node.right.as_deref());
                node.record
            }
            Frontier::PostOrder(stack) => loop {
                let (node, expanded) = stack.pop()?;
                if expanded {
                    break node.record;
                }
                stack.push((node, true));
                if let Some(right) = node.right.as_deref() {
                    stack.push((right, false));
                }
                if let Some(left) = node.left.as_deref() {
                    stack.push((left, false));
                }
            },
        };
        self.remaining -= 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R> ExactSizeIterator for TreeIter<'_, '_, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordOrder;
    use std::cmp::Ordering;

    fn cmp(a: &u32, b: &u32) -> Ordering {
        a.cmp(b)
    }

    fn walk(keys: &[u32], traversal: Traversal) -> Vec<u32> {
        let order = RecordOrder { items: cmp, keys: cmp };
        let bst = Bst::build(order, keys.iter());
        bst.iter(traversal).copied().collect()
    }

    //        4
    //      2   6
    //     1 3 5 7
    const PERFECT: [u32; 7] = [4, 2, 6, 1, 3, 5, 7];

    #[test]
    fn test_inorder() {
        assert_eq!(walk(&PERFECT, Traversal::InOrder), vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_levelorder() {
        assert_eq!(walk(&PERFECT, Traversal::LevelOrder), vec![4, 2, 6, 1, 3, 5, 7]);
    }

    #[test]
    fn test_postorder() {
        assert_eq!(walk(&PERFECT, Traversal::PostOrder), vec![1, 3, 2, 5, 7, 6, 4]);
    }

    #[test]
    fn test_lopsided_postorder() {
        // 3 -> left 1 -> right 2
        assert_eq!(walk(&[3, 1, 2], Traversal::PostOrder), vec![2, 1, 3]);
        assert_eq!(walk(&[3, 1, 2], Traversal::InOrder), vec![1, 2, 3]);
    }

    #[test]
    fn test_exhaustion() {
        let order = RecordOrder { items: cmp, keys: cmp };
        let keys = [1u32];
        let bst = Bst::build(order, keys.iter());
        let mut iter = bst.iter(Traversal::LevelOrder);
        assert!(iter.has_next());
        assert_eq!(iter.try_next(), Ok(&1));
        assert!(!iter.has_next());
        assert_eq!(iter.try_next(), Err(TraversalError::Exhausted));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_empty_tree() {
        assert!(walk(&[], Traversal::InOrder).is_empty());
        assert!(walk(&[], Traversal::PostOrder).is_empty());
        assert!(walk(&[], Traversal::LevelOrder).is_empty());
    }
}
