use super::handle::Handle;

/// A binary tree node: one key, two optional children and the number of
/// keys in the subtree rooted here. There is no parent link; every walk
/// starts at the root and carries whatever path state it needs.
pub(crate) struct Node<K> {
    key: K,
    left: Option<Handle>,
    right: Option<Handle>,
    size: usize,
}

impl<K> Node<K> {
    /// Creates a detached leaf holding `key`.
    pub(crate) const fn new(key: K) -> Self {
        Self {
            key,
            left: None,
            right: None,
            size: 1,
        }
    }

    #[inline]
    pub(crate) const fn key(&self) -> &K {
        &self.key
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) const fn left(&self) -> Option<Handle> {
        self.left
    }

    #[inline]
    pub(crate) const fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) const fn children(&self) -> (Option<Handle>, Option<Handle>) {
        (self.left, self.right)
    }

    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) const fn size(&self) -> usize {
        self.size
    }

    /// A subtree never holds more keys than the arena can address.
    pub(crate) fn set_size(&mut self, size: usize) {
        debug_assert!(
            (1..=Handle::MAX).contains(&size),
            "`Node::set_size()` - `size` outside 1..=`Handle::MAX`!"
        );
        self.size = size;
    }
}
