use log::trace;

use crate::mapping::NodeMapping;
use crate::mapping::direct_mapping::DirectMapping;
use crate::mapping::indexed_mapping::IndexedMapping;
use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;
use crate::partials::Partial;
use crate::partials::vector_partial::VectorPartial;

// A delete shrinks a node once its occupancy drops to half of the next smaller variant's
// capacity. Shrinking at exactly the smaller capacity would thrash on alternating insert/delete
// at the boundary.
const NODE16_SHRINK_AT: usize = 2;
const NODE48_SHRINK_AT: usize = 8;
const NODE256_SHRINK_AT: usize = 24;

pub(crate) type DefaultNode<V> = Node<VectorPartial, V>;

type ChildIter<'a, P, V> = Box<dyn DoubleEndedIterator<Item = (u8, &'a Node<P, V>)> + 'a>;
type ChildIterMut<'a, P, V> = Box<dyn DoubleEndedIterator<Item = (u8, &'a mut Node<P, V>)> + 'a>;

#[derive(Clone)]
pub(crate) struct LeafData<V> {
    pub(crate) key: Box<[u8]>,
    pub(crate) value: V,
}

/// A node is either a leaf holding one entry, or an inner node with one of four child table
/// shapes. `prefix` holds the bytes below the dispatch byte that selected this node in its
/// parent; for a leaf that is the rest of its key.
#[derive(Clone)]
pub(crate) struct Node<P: Partial, V> {
    pub(crate) prefix: P,
    pub(crate) content: Content<P, V>,
}

#[derive(Clone)]
pub(crate) enum Content<P: Partial, V> {
    Leaf(LeafData<V>),
    Node4(SortedKeyedMapping<Node<P, V>, 4>),
    Node16(SortedKeyedMapping<Node<P, V>, 16>),
    Node48(IndexedMapping<Node<P, V>, 48>),
    Node256(DirectMapping<Node<P, V>>),
}

impl<P: Partial, V> Node<P, V> {
    #[inline]
    pub(crate) fn new_leaf(prefix: P, key: Box<[u8]>, value: V) -> Node<P, V> {
        Self {
            prefix,
            content: Content::Leaf(LeafData { key, value }),
        }
    }

    #[inline]
    pub(crate) fn new_inner(prefix: P) -> Self {
        Self::new_4(prefix)
    }

    #[inline]
    pub(crate) fn new_4(prefix: P) -> Self {
        Self {
            prefix,
            content: Content::Node4(SortedKeyedMapping::new()),
        }
    }

    #[inline]
    #[allow(dead_code)]
    pub(crate) fn new_16(prefix: P) -> Self {
        Self {
            prefix,
            content: Content::Node16(SortedKeyedMapping::new()),
        }
    }

    #[inline]
    #[allow(dead_code)]
    pub(crate) fn new_48(prefix: P) -> Self {
        Self {
            prefix,
            content: Content::Node48(IndexedMapping::new()),
        }
    }

    #[inline]
    #[allow(dead_code)]
    pub(crate) fn new_256(prefix: P) -> Self {
        Self {
            prefix,
            content: Content::Node256(DirectMapping::new()),
        }
    }

    pub(crate) fn leaf(&self) -> Option<&LeafData<V>> {
        let Content::Leaf(leaf) = &self.content else {
            return None;
        };
        Some(leaf)
    }

    pub(crate) fn leaf_mut(&mut self) -> Option<&mut LeafData<V>> {
        let Content::Leaf(leaf) = &mut self.content else {
            return None;
        };
        Some(leaf)
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> Option<&V> {
        self.leaf().map(|leaf| &leaf.value)
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut V> {
        self.leaf_mut().map(|leaf| &mut leaf.value)
    }

    /// True if this is a leaf whose full key is exactly `key`.
    #[inline]
    pub(crate) fn is_leaf_for(&self, key: &[u8]) -> bool {
        self.leaf().is_some_and(|leaf| *leaf.key == *key)
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(&self.content, Content::Leaf(_))
    }

    #[inline]
    pub(crate) fn is_inner(&self) -> bool {
        !self.is_leaf()
    }

    pub(crate) fn num_children(&self) -> usize {
        match &self.content {
            Content::Node4(n) => n.num_children(),
            Content::Node16(n) => n.num_children(),
            Content::Node48(n) => n.num_children(),
            Content::Node256(n) => n.num_children(),
            Content::Leaf(_) => 0,
        }
    }

    pub(crate) fn seek_child(&self, key: u8) -> Option<&Node<P, V>> {
        match &self.content {
            Content::Node4(km) => km.seek_child(key),
            Content::Node16(km) => km.seek_child(key),
            Content::Node48(im) => im.seek_child(key),
            Content::Node256(dm) => dm.seek_child(key),
            Content::Leaf(_) => None,
        }
    }

    pub(crate) fn seek_child_mut(&mut self, key: u8) -> Option<&mut Node<P, V>> {
        match &mut self.content {
            Content::Node4(km) => km.seek_child_mut(key),
            Content::Node16(km) => km.seek_child_mut(key),
            Content::Node48(im) => im.seek_child_mut(key),
            Content::Node256(dm) => dm.seek_child_mut(key),
            Content::Leaf(_) => None,
        }
    }

    /// Attach `node` under dispatch byte `key`, growing into the next variant first if this
    /// one is full. The caller guarantees `key` is not already present.
    pub(crate) fn add_child(&mut self, key: u8, node: Node<P, V>) {
        if self.is_full() {
            self.grow();
        }

        match &mut self.content {
            Content::Node4(km) => km.add_child(key, node),
            Content::Node16(km) => km.add_child(key, node),
            Content::Node48(im) => im.add_child(key, node),
            Content::Node256(dm) => dm.add_child(key, node),
            Content::Leaf(_) => unreachable!("Should not be possible."),
        }
    }

    /// Detach the child under `key`. Afterwards the node may have shrunk into a smaller variant,
    /// or, if only one child was left, been replaced in place by that child.
    pub(crate) fn delete_child(&mut self, key: u8) -> Option<Node<P, V>> {
        let node = match &mut self.content {
            Content::Node4(km) => km.delete_child(key),
            Content::Node16(km) => km.delete_child(key),
            Content::Node48(im) => im.delete_child(key),
            Content::Node256(dm) => dm.delete_child(key),
            Content::Leaf(_) => unreachable!("Should not be possible."),
        };
        if node.is_some() {
            self.shrink();
        }
        node
    }

    #[inline]
    fn is_full(&self) -> bool {
        match &self.content {
            Content::Node4(km) => km.is_full(),
            Content::Node16(km) => km.is_full(),
            Content::Node48(im) => im.is_full(),
            // Should not be possible; there are only 256 distinct dispatch bytes.
            Content::Node256(_) => false,
            Content::Leaf(_) => unreachable!("Should not be possible."),
        }
    }

    fn grow(&mut self) {
        trace!(
            "growing node{} with prefix {:?}",
            self.capacity(),
            self.prefix.to_slice()
        );
        match &mut self.content {
            Content::Node4(km) => {
                self.content = Content::Node16(SortedKeyedMapping::from_sorted_entries(km.drain()))
            }
            Content::Node16(km) => {
                self.content = Content::Node48(IndexedMapping::from_sorted_entries(km.drain()))
            }
            Content::Node48(im) => {
                self.content = Content::Node256(DirectMapping::from_sorted_entries(im.drain()))
            }
            Content::Node256(_) => unreachable!("Should never grow a node256"),
            Content::Leaf(_) => unreachable!("Should not be possible."),
        }
    }

    fn shrink(&mut self) {
        let num_children = self.num_children();
        match &mut self.content {
            Content::Node4(km) if num_children == 1 => {
                // A node4 with only one child has that child collapsed into it. If the child is
                // a leaf, we become that leaf.
                let Some((key, child)) = km.drain().next() else {
                    unreachable!("node4 reported one child but had none");
                };
                trace!(
                    "collapsing node4 with prefix {:?} into its child under {key:#04x}",
                    self.prefix.to_slice()
                );
                self.prefix = self.prefix.partial_joined(key, &child.prefix);
                self.content = child.content;
            }
            Content::Node16(km) if num_children <= NODE16_SHRINK_AT => {
                trace!("shrinking node16 to node4");
                self.content = Content::Node4(SortedKeyedMapping::from_sorted_entries(km.drain()));
            }
            Content::Node48(im) if num_children <= NODE48_SHRINK_AT => {
                trace!("shrinking node48 to node16");
                self.content = Content::Node16(SortedKeyedMapping::from_sorted_entries(im.drain()));
            }
            Content::Node256(dm) if num_children <= NODE256_SHRINK_AT => {
                trace!("shrinking node256 to node48");
                self.content = Content::Node48(IndexedMapping::from_sorted_entries(dm.drain()));
            }
            _ => {}
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        match &self.content {
            Content::Node4 { .. } => 4,
            Content::Node16 { .. } => 16,
            Content::Node48 { .. } => 48,
            Content::Node256 { .. } => 256,
            Content::Leaf(_) => 0,
        }
    }

    /// Children in ascending dispatch byte order.
    pub(crate) fn iter(&self) -> ChildIter<'_, P, V> {
        match &self.content {
            Content::Node4(n) => Box::new(n.iter()),
            Content::Node16(n) => Box::new(n.iter()),
            Content::Node48(n) => Box::new(n.iter()),
            Content::Node256(n) => Box::new(n.iter()),
            Content::Leaf(_) => Box::new(std::iter::empty()),
        }
    }

    pub(crate) fn iter_mut(&mut self) -> ChildIterMut<'_, P, V> {
        match &mut self.content {
            Content::Node4(n) => Box::new(n.iter_mut()),
            Content::Node16(n) => Box::new(n.iter_mut()),
            Content::Node48(n) => Box::new(n.iter_mut()),
            Content::Node256(n) => Box::new(n.iter_mut()),
            Content::Leaf(_) => Box::new(std::iter::empty()),
        }
    }

    /// Move all children out in ascending dispatch byte order. The node is left as an empty
    /// inner node and must be discarded by the caller.
    pub(crate) fn take_children(&mut self) -> Vec<Node<P, V>> {
        match &mut self.content {
            Content::Node4(n) => n.drain().map(|(_, c)| c).collect(),
            Content::Node16(n) => n.drain().map(|(_, c)| c).collect(),
            Content::Node48(n) => n.drain().map(|(_, c)| c).collect(),
            Content::Node256(n) => n.drain().map(|(_, c)| c).collect(),
            Content::Leaf(_) => Vec::new(),
        }
    }

    /// The leaf reached by always following the smallest dispatch byte.
    pub(crate) fn leftmost_leaf(&self) -> Option<&LeafData<V>> {
        let mut cur = self;
        loop {
            if let Content::Leaf(leaf) = &cur.content {
                return Some(leaf);
            }
            cur = cur.iter().next()?.1;
        }
    }

    /// The leaf reached by always following the largest dispatch byte.
    pub(crate) fn rightmost_leaf(&self) -> Option<&LeafData<V>> {
        let mut cur = self;
        loop {
            if let Content::Leaf(leaf) = &cur.content {
                return Some(leaf);
            }
            cur = cur.iter().next_back()?.1;
        }
    }

    /// Number of leaves (entries) in the subtree rooted here.
    pub(crate) fn num_leaves(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.is_leaf() {
                count += 1;
            } else {
                stack.extend(node.iter().map(|(_, child)| child));
            }
        }
        count
    }
}
