//! Ordered iterators over an [`ArtMap`](crate::ArtMap) or one of its subtrees.
//!
//! All iterators walk the tree depth-first with an explicit stack of per-node child iterators,
//! visiting children in ascending dispatch byte order, so entries come out in strictly
//! increasing byte-lexicographic key order and stack depth never depends on the call stack.

use std::iter::FusedIterator;

use crate::node::{Content, DefaultNode, LeafData};

type NodeIterator<'a, V> = dyn DoubleEndedIterator<Item = (u8, &'a DefaultNode<V>)> + 'a;
type NodeIteratorMut<'a, V> = dyn DoubleEndedIterator<Item = (u8, &'a mut DefaultNode<V>)> + 'a;

/// Iterator over `(key, &value)` in key order.
pub struct Iter<'a, V> {
    // A leaf-only subtree has no child iterator to push, so it is held here until yielded.
    pending_leaf: Option<&'a LeafData<V>>,
    node_iter_stack: Vec<Box<NodeIterator<'a, V>>>,
    remaining: Option<usize>,
}

impl<'a, V> Iter<'a, V> {
    /// Iterate the subtree rooted at `node`. `len`, when known, is the exact number of entries
    /// below it and is only used for `size_hint`.
    pub(crate) fn new(node: Option<&'a DefaultNode<V>>, len: Option<usize>) -> Self {
        let mut iter = Self {
            pending_leaf: None,
            node_iter_stack: Vec::new(),
            remaining: len,
        };
        match node {
            Some(node) => match &node.content {
                Content::Leaf(leaf) => iter.pending_leaf = Some(leaf),
                _ => iter.node_iter_stack.push(node.iter()),
            },
            None => iter.remaining = Some(0),
        }
        iter
    }

    fn next_leaf(&mut self) -> Option<&'a LeafData<V>> {
        if let Some(leaf) = self.pending_leaf.take() {
            return Some(leaf);
        }
        // Grab the last iterator from the stack, and see if there's more to iterate off of it.
        // If not, pop it off and continue. If the next node is a leaf, we're done; otherwise
        // push its child iterator and keep descending.
        loop {
            let last_iter = self.node_iter_stack.last_mut()?;

            let Some((_k, node)) = last_iter.next() else {
                self.node_iter_stack.pop();
                continue;
            };

            match &node.content {
                Content::Leaf(leaf) => return Some(leaf),
                _ => self.node_iter_stack.push(node.iter()),
            }
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.next_leaf()?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some((&leaf.key, &leaf.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) => (remaining, Some(remaining)),
            None => (0, None),
        }
    }
}

impl<V> FusedIterator for Iter<'_, V> {}

/// Iterator over `(key, &mut value)` in key order.
pub struct IterMut<'a, V> {
    pending_leaf: Option<&'a mut LeafData<V>>,
    node_iter_stack: Vec<Box<NodeIteratorMut<'a, V>>>,
    remaining: usize,
}

impl<'a, V> IterMut<'a, V> {
    pub(crate) fn new(node: Option<&'a mut DefaultNode<V>>, len: usize) -> Self {
        let mut iter = Self {
            pending_leaf: None,
            node_iter_stack: Vec::new(),
            remaining: len,
        };
        if let Some(node) = node {
            if node.is_leaf() {
                iter.pending_leaf = node.leaf_mut();
            } else {
                iter.node_iter_stack.push(node.iter_mut());
            }
        }
        iter
    }
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (&'a [u8], &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = match self.pending_leaf.take() {
            Some(leaf) => leaf,
            None => loop {
                let last_iter = self.node_iter_stack.last_mut()?;
                let Some((_k, node)) = last_iter.next() else {
                    self.node_iter_stack.pop();
                    continue;
                };
                if node.is_leaf() {
                    break node.leaf_mut()?;
                }
                self.node_iter_stack.push(node.iter_mut());
            },
        };
        self.remaining = self.remaining.saturating_sub(1);
        let LeafData { key, value } = leaf;
        Some((&**key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

/// Owning iterator over `(key, value)` in key order, produced by consuming the map.
pub struct IntoIter<V> {
    stack: Vec<DefaultNode<V>>,
    remaining: usize,
}

impl<V> IntoIter<V> {
    pub(crate) fn new(root: Option<DefaultNode<V>>, len: usize) -> Self {
        Self {
            stack: root.into_iter().collect(),
            remaining: len,
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = (Box<[u8]>, V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut node = self.stack.pop()?;
            if node.is_leaf() {
                let Content::Leaf(leaf) = node.content else {
                    unreachable!("Should not be possible.");
                };
                self.remaining = self.remaining.saturating_sub(1);
                return Some((leaf.key, leaf.value));
            }
            // Smallest child must be on top of the stack.
            self.stack.extend(node.take_children().into_iter().rev());
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}
impl<V> FusedIterator for IntoIter<V> {}

/// Keys in order.
pub struct Keys<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> FusedIterator for Keys<'_, V> {}

/// Values in key order.
pub struct Values<'a, V> {
    pub(crate) inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> FusedIterator for Values<'_, V> {}

/// Mutable values in key order.
pub struct ValuesMut<'a, V> {
    pub(crate) inner: IterMut<'a, V>,
}

impl<'a, V> Iterator for ValuesMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for ValuesMut<'_, V> {}
impl<V> FusedIterator for ValuesMut<'_, V> {}
