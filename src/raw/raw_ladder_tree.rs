use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};
use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::Node;

// Weight-balance parameters (Hirai & Yamamoto). With weight = size + 1, a
// node is balanced when neither child outweighs the other by more than
// DELTA; GAMMA picks single versus double rotation when it is not.
const DELTA: usize = 3;
const GAMMA: usize = 2;

/// Stack of pending ancestors for the bounded in-order walk. Its depth is
/// at most the tree height, which stays below `log_{4/3}(len + 1) + 1`
/// (about 77 at `u32` handles); deeper walks spill to the heap.
type Stack = SmallVec<[Handle; 64]>;

/// The weight-balanced order-statistic tree backing `TreeIndex`.
///
/// Keys are kept in ascending `Ord` order and every node caches the size of
/// its subtree, so the 1-based position of a key and the key at a position
/// are both found in a single root-to-leaf descent.
pub(crate) struct RawLadderTree<K> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<K>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

impl<K> RawLadderTree<K> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of keys in the tree.
    pub(crate) fn len(&self) -> usize {
        self.size(self.root)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut level: Vec<Handle> = self.root.into_iter().collect();
        while !level.is_empty() {
            height += 1;
            level = level
                .iter()
                .flat_map(|&handle| {
                    let (left, right) = self.nodes.get(handle).children();
                    left.into_iter().chain(right)
                })
                .collect();
        }
        height
    }

    /// Returns the key at 1-based position `rank`, or `None` if `rank` is
    /// zero or past the end.
    pub(crate) fn select(&self, rank: usize) -> Option<&K> {
        if rank == 0 || rank > self.len() {
            return None;
        }

        let mut remaining = rank;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let here = self.size(node.left()) + 1;
            match remaining.cmp(&here) {
                Less => current = node.left(),
                Equal => return Some(node.key()),
                Greater => {
                    remaining -= here;
                    current = node.right();
                }
            }
        }
        None
    }

    /// Returns the keys at 1-based positions `from..=to`, in order.
    ///
    /// `from` is raised to 1 and `to` is lowered to `len()`; an empty
    /// iterator is returned when nothing is left between them.
    pub(crate) fn range(&self, from: usize, to: usize) -> Range<'_, K> {
        let from = from.max(1);
        let to = to.min(self.len());
        if from > to {
            return Range {
                tree: self,
                stack: Stack::new(),
                next_rank: from,
                remaining: 0,
            };
        }

        // Descend to `from`, remembering every node we pass on its left:
        // those are exactly the keys that follow it in order.
        let mut stack = Stack::new();
        let mut remaining = from;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let here = self.size(node.left()) + 1;
            match remaining.cmp(&here) {
                Less => {
                    stack.push(handle);
                    current = node.left();
                }
                Equal => {
                    stack.push(handle);
                    break;
                }
                Greater => {
                    remaining -= here;
                    current = node.right();
                }
            }
        }

        Range {
            tree: self,
            stack,
            next_rank: from,
            remaining: to - from + 1,
        }
    }

    #[inline]
    fn size(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |handle| self.nodes.get(handle).size())
    }

    #[inline]
    fn weight(&self, handle: Option<Handle>) -> usize {
        self.size(handle) + 1
    }

    fn update_size(&mut self, handle: Handle) {
        let (left, right) = self.nodes.get(handle).children();
        let size = self.size(left) + self.size(right) + 1;
        self.nodes.get_mut(handle).set_size(size);
    }

    /// Restores the weight balance at `handle` after one of its subtrees
    /// grew or shrank by a single key. Returns the new subtree root.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let (left, right) = self.nodes.get(handle).children();
        let left_weight = self.weight(left);
        let right_weight = self.weight(right);

        if right_weight > DELTA * left_weight
            && let Some(right) = right
        {
            let (inner, outer) = self.nodes.get(right).children();
            if let Some(inner) = inner
                && self.weight(Some(inner)) >= GAMMA * self.weight(outer)
            {
                let pivot = self.rotate_right(right, inner);
                self.nodes.get_mut(handle).set_right(Some(pivot));
                return self.rotate_left(handle, pivot);
            }
            return self.rotate_left(handle, right);
        }

        if left_weight > DELTA * right_weight
            && let Some(left) = left
        {
            let (outer, inner) = self.nodes.get(left).children();
            if let Some(inner) = inner
                && self.weight(Some(inner)) >= GAMMA * self.weight(outer)
            {
                let pivot = self.rotate_left(left, inner);
                self.nodes.get_mut(handle).set_left(Some(pivot));
                return self.rotate_right(handle, pivot);
            }
            return self.rotate_right(handle, left);
        }

        self.update_size(handle);
        handle
    }

    /// Lifts `right` (the right child of `handle`) above it.
    fn rotate_left(&mut self, handle: Handle, right: Handle) -> Handle {
        let inner = self.nodes.get(right).left();
        self.nodes.get_mut(handle).set_right(inner);
        self.nodes.get_mut(right).set_left(Some(handle));
        self.update_size(handle);
        self.update_size(right);
        right
    }

    /// Lifts `left` (the left child of `handle`) above it.
    fn rotate_right(&mut self, handle: Handle, left: Handle) -> Handle {
        let inner = self.nodes.get(left).right();
        self.nodes.get_mut(handle).set_left(inner);
        self.nodes.get_mut(left).set_right(Some(handle));
        self.update_size(handle);
        self.update_size(left);
        left
    }

    /// Detaches the smallest node of the subtree at `handle`. Returns the
    /// rebalanced remainder and the detached node, whose links are stale.
    fn detach_min(&mut self, handle: Handle) -> (Option<Handle>, Handle) {
        let (left, right) = self.nodes.get(handle).children();
        match left {
            None => (right, handle),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes.get_mut(handle).set_left(rest);
                (Some(self.rebalance(handle)), min)
            }
        }
    }
}

impl<K: Ord> RawLadderTree<K> {
    /// Looks up `key` and returns the stored key with its 1-based rank.
    pub(crate) fn get_with_rank<Q>(&self, key: &Q) -> Option<(&K, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut before = 0;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            match key.cmp(node.key().borrow()) {
                Less => current = node.left(),
                Greater => {
                    before += self.size(node.left()) + 1;
                    current = node.right();
                }
                Equal => return Some((node.key(), before + self.size(node.left()) + 1)),
            }
        }
        None
    }

    /// Inserts `key`. Returns `false`, leaving the tree untouched, if an
    /// equal key is already present.
    pub(crate) fn insert(&mut self, key: K) -> bool {
        match self.insert_at(self.root, key) {
            Ok(root) => {
                self.root = Some(root);
                true
            }
            Err(_) => false,
        }
    }

    fn insert_at(&mut self, at: Option<Handle>, key: K) -> Result<Handle, K> {
        let Some(handle) = at else {
            return Ok(self.nodes.alloc(Node::new(key)));
        };

        let node = self.nodes.get(handle);
        let (left, right) = node.children();
        match key.cmp(node.key()) {
            Less => {
                let left = self.insert_at(left, key)?;
                self.nodes.get_mut(handle).set_left(Some(left));
            }
            Greater => {
                let right = self.insert_at(right, key)?;
                self.nodes.get_mut(handle).set_right(Some(right));
            }
            Equal => return Err(key),
        }
        Ok(self.rebalance(handle))
    }

    /// Removes and returns the key equal to `key`, if present.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (root, removed) = self.remove_at(self.root, key)?;
        self.root = root;
        Some(removed)
    }

    fn remove_at<Q>(&mut self, at: Option<Handle>, key: &Q) -> Option<(Option<Handle>, K)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = at?;
        let node = self.nodes.get(handle);
        let (left, right) = node.children();

        match key.cmp(node.key().borrow()) {
            Less => {
                let (left, removed) = self.remove_at(left, key)?;
                self.nodes.get_mut(handle).set_left(left);
                Some((Some(self.rebalance(handle)), removed))
            }
            Greater => {
                let (right, removed) = self.remove_at(right, key)?;
                self.nodes.get_mut(handle).set_right(right);
                Some((Some(self.rebalance(handle)), removed))
            }
            Equal => {
                let replacement = match (left, right) {
                    (None, None) => None,
                    (Some(child), None) | (None, Some(child)) => Some(child),
                    (Some(left), Some(right)) => {
                        // The in-order successor takes this node's place.
                        let (rest, successor) = self.detach_min(right);
                        let successor_node = self.nodes.get_mut(successor);
                        successor_node.set_left(Some(left));
                        successor_node.set_right(rest);
                        Some(self.rebalance(successor))
                    }
                };
                Some((replacement, self.nodes.take(handle).into_key()))
            }
        }
    }
}

/// In-order iterator over a contiguous block of ranks, yielding
/// `(rank, key)` pairs. Created by [`RawLadderTree::range`].
pub(crate) struct Range<'a, K> {
    tree: &'a RawLadderTree<K>,
    stack: Stack,
    next_rank: usize,
    remaining: usize,
}

impl<'a, K> Iterator for Range<'a, K> {
    type Item = (usize, &'a K);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let handle = self.stack.pop()?;
        let node = tree.nodes.get(handle);

        // Queue the leftmost path of the right subtree: the next key in
        // order is at its bottom.
        let mut current = node.right();
        while let Some(child) = current {
            self.stack.push(child);
            current = tree.nodes.get(child).left();
        }

        let rank = self.next_rank;
        self.next_rank += 1;
        self.remaining -= 1;
        Some((rank, node.key()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Range<'_, K> {}

impl<K> FusedIterator for Range<'_, K> {}
