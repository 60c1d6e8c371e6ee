//! Adaptive Radix Tree backed ordered map.
//!
//! This module contains [`ArtMap`], the tree operations layer: insert, lookup, delete, ordered
//! traversal and prefix queries, all implemented by walking nodes from the root.

use std::fmt::{self, Debug};
use std::ops::Index;

use log::{debug, trace};

use crate::error::ArtError;
use crate::iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
use crate::node::{Content, DefaultNode, LeafData};
use crate::partials::Partial;
use crate::partials::vector_partial::VectorPartial;
use crate::stats::{TreeStats, TreeStatsTrait, collect_tree_stats};

/// An ordered map from byte-string keys to values, stored in an Adaptive Radix Tree.
///
/// Lookup, insert and remove cost is proportional to the key length rather than to the number
/// of stored entries, while iteration yields entries in byte-lexicographic key order.
///
/// ## Prefix absorption
///
/// No stored key is ever a strict prefix of another stored key. Inserting a key that extends
/// stored keys removes those shorter keys, and inserting a key that is a strict prefix of stored
/// keys removes all of them. The most recent insert always wins:
///
/// ```rust
/// use artmap::ArtMap;
///
/// let mut map = ArtMap::new();
/// map.insert("apple", 1);
/// map.insert("applesauce", 2);
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get("apple"), None);
///
/// map.insert("apple", 3);
/// assert_eq!(map.len(), 1);
/// assert_eq!(map.get("applesauce"), None);
/// ```
///
/// ## Examples
///
/// ```rust
/// use artmap::ArtMap;
///
/// let mut map = ArtMap::from([("apple", 1), ("application", 2), ("banana", 3)]);
///
/// assert_eq!(map.get_prefix("app"), Some((&b"apple"[..], &1)));
/// let apps: Vec<_> = map.prefix_iter("app").map(|(_, v)| *v).collect();
/// assert_eq!(apps, vec![1, 2]);
///
/// assert_eq!(map.remove("apple"), Ok(1));
/// assert_eq!(map.get_prefix("app"), Some((&b"application"[..], &2)));
/// assert!(map.remove("apple").is_err());
/// ```
#[derive(Clone)]
pub struct ArtMap<ValueType> {
    root: Option<DefaultNode<ValueType>>,
    len: usize,
}

enum InsertOutcome<ValueType> {
    /// The exact key was present; its old value was swapped out.
    Replaced(ValueType),
    /// A new leaf was attached. `absorbed` entries were dropped because their keys were a strict
    /// prefix or a strict extension of the inserted key.
    Inserted { absorbed: usize },
}

impl<ValueType> Default for ArtMap<ValueType> {
    fn default() -> Self {
        Self::new()
    }
}

impl<ValueType> ArtMap<ValueType> {
    /// Create a new empty map.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of entries in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Remove every entry, dropping all values.
    pub fn clear(&mut self) {
        debug!("clearing map with {} entries", self.len);
        self.root = None;
        self.len = 0;
    }

    /// Get a reference to the value stored under exactly `key`.
    #[inline]
    pub fn get<K: AsRef<[u8]>>(&self, key: K) -> Option<&ValueType> {
        let key = key.as_ref();
        Self::find_leaf(self.root.as_ref()?, key).map(|leaf| &leaf.value)
    }

    /// Get the stored key and value for exactly `key`.
    pub fn get_key_value<K: AsRef<[u8]>>(&self, key: K) -> Option<(&[u8], &ValueType)> {
        let key = key.as_ref();
        Self::find_leaf(self.root.as_ref()?, key).map(|leaf| (&*leaf.key, &leaf.value))
    }

    /// Get a mutable reference to the value stored under exactly `key`.
    #[inline]
    pub fn get_mut<K: AsRef<[u8]>>(&mut self, key: K) -> Option<&mut ValueType> {
        let key = key.as_ref();
        Self::find_leaf_mut(self.root.as_mut()?, key)
    }

    /// Get the value under `key`, or `default` if there is none.
    pub fn get_or<'a, K: AsRef<[u8]>>(&'a self, key: K, default: &'a ValueType) -> &'a ValueType {
        self.get(key).unwrap_or(default)
    }

    /// Get the value under `key`, failing with [`ArtError::KeyNotFound`] if it is absent.
    pub fn try_get<K: AsRef<[u8]>>(&self, key: K) -> Result<&ValueType, ArtError> {
        let key = key.as_ref();
        self.get(key).ok_or_else(|| ArtError::key_not_found(key))
    }

    /// True if an entry is stored under exactly `key`.
    #[inline]
    pub fn contains_key<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Insert a key-value pair.
    ///
    /// Returns the previous value if `key` was already present. Entries whose keys are a strict
    /// prefix or a strict extension of `key` are removed and their values dropped.
    ///
    /// ```rust
    /// use artmap::ArtMap;
    ///
    /// let mut map = ArtMap::new();
    /// assert_eq!(map.insert("key1", 100), None);
    /// assert_eq!(map.insert("key1", 200), Some(100));
    /// assert_eq!(map.get("key1"), Some(&200));
    /// ```
    pub fn insert<K: AsRef<[u8]>>(&mut self, key: K, value: ValueType) -> Option<ValueType> {
        let key = key.as_ref();
        let Some(root) = self.root.as_mut() else {
            self.root = Some(DefaultNode::new_leaf(
                VectorPartial::from_slice(key),
                Box::from(key),
                value,
            ));
            self.len = 1;
            return None;
        };

        match Self::insert_recurse(root, key, value, 0) {
            InsertOutcome::Replaced(old) => Some(old),
            InsertOutcome::Inserted { absorbed } => {
                self.len = self.len + 1 - absorbed;
                None
            }
        }
    }

    /// Remove the entry stored under exactly `key` and return its value.
    ///
    /// Fails with [`ArtError::KeyNotFound`] if there is no such entry.
    pub fn remove<K: AsRef<[u8]>>(&mut self, key: K) -> Result<ValueType, ArtError> {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Remove the entry stored under exactly `key` and return both its key and value.
    pub fn remove_entry<K: AsRef<[u8]>>(
        &mut self,
        key: K,
    ) -> Result<(Box<[u8]>, ValueType), ArtError> {
        let key = key.as_ref();
        let Some(root) = self.root.as_mut() else {
            return Err(ArtError::key_not_found(key));
        };

        // Special case, if the root is a leaf and matches the key, we can just take it out of
        // the tree. If it doesn't match our key, then we have nothing to do here anyways.
        if root.is_leaf() {
            if !root.is_leaf_for(key) {
                return Err(ArtError::key_not_found(key));
            }
            let Some(DefaultNode {
                content: Content::Leaf(leaf),
                ..
            }) = self.root.take()
            else {
                unreachable!("Should not be possible.");
            };
            self.len = 0;
            return Ok((leaf.key, leaf.value));
        }

        // Don't bother doing anything if there's no prefix match on the root at all.
        let prefix_len = root.prefix.len();
        if root.prefix.prefix_length_slice(key) != prefix_len {
            return Err(ArtError::key_not_found(key));
        }

        let leaf = Self::remove_recurse(root, key, prefix_len)
            .ok_or_else(|| ArtError::key_not_found(key))?;
        self.len -= 1;
        Ok((leaf.key, leaf.value))
    }

    /// Entry with the smallest key.
    pub fn first(&self) -> Option<(&[u8], &ValueType)> {
        let leaf = self.root.as_ref()?.leftmost_leaf()?;
        Some((&leaf.key, &leaf.value))
    }

    /// Entry with the largest key.
    pub fn last(&self) -> Option<(&[u8], &ValueType)> {
        let leaf = self.root.as_ref()?.rightmost_leaf()?;
        Some((&leaf.key, &leaf.value))
    }

    /// The lexicographically first entry whose key starts with `prefix`.
    ///
    /// The empty prefix matches every key, so it returns the smallest entry.
    pub fn get_prefix<K: AsRef<[u8]>>(&self, prefix: K) -> Option<(&[u8], &ValueType)> {
        let subtree = Self::seek_prefix(self.root.as_ref()?, prefix.as_ref())?;
        let leaf = subtree.leftmost_leaf()?;
        Some((&leaf.key, &leaf.value))
    }

    /// All entries whose key starts with `prefix`, in key order.
    ///
    /// The empty prefix iterates the whole map; a prefix nothing starts with yields nothing.
    pub fn prefix_iter<K: AsRef<[u8]>>(&self, prefix: K) -> Iter<'_, ValueType> {
        let prefix = prefix.as_ref();
        let subtree = self
            .root
            .as_ref()
            .and_then(|root| Self::seek_prefix(root, prefix));
        let len = if prefix.is_empty() {
            Some(self.len)
        } else {
            None
        };
        Iter::new(subtree, len)
    }

    /// All entries in key order.
    pub fn iter(&self) -> Iter<'_, ValueType> {
        Iter::new(self.root.as_ref(), Some(self.len))
    }

    /// All entries in key order, with mutable access to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, ValueType> {
        IterMut::new(self.root.as_mut(), self.len)
    }

    /// All keys in order.
    pub fn keys(&self) -> Keys<'_, ValueType> {
        Keys { inner: self.iter() }
    }

    /// All values, in key order.
    pub fn values(&self) -> Values<'_, ValueType> {
        Values { inner: self.iter() }
    }

    /// All values, in key order, mutably.
    pub fn values_mut(&mut self) -> ValuesMut<'_, ValueType> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<ValueType> TreeStatsTrait for ArtMap<ValueType> {
    fn get_tree_stats(&self) -> TreeStats {
        collect_tree_stats(self.root.as_ref())
    }
}

// Internals implementation
impl<ValueType> ArtMap<ValueType> {
    fn find_leaf<'a>(
        cur_node: &'a DefaultNode<ValueType>,
        key: &[u8],
    ) -> Option<&'a LeafData<ValueType>> {
        let mut cur_node = cur_node;
        let mut depth = 0;
        loop {
            if let Some(leaf) = cur_node.leaf() {
                return (*leaf.key == *key).then_some(leaf);
            }

            let rest = &key[depth..];
            let prefix_len = cur_node.prefix.len();
            if prefix_len >= rest.len() || cur_node.prefix.prefix_length_slice(rest) != prefix_len
            {
                return None;
            }

            cur_node = cur_node.seek_child(rest[prefix_len])?;
            depth += prefix_len + 1;
        }
    }

    fn find_leaf_mut<'a>(
        cur_node: &'a mut DefaultNode<ValueType>,
        key: &[u8],
    ) -> Option<&'a mut ValueType> {
        let mut cur_node = cur_node;
        let mut depth = 0;
        loop {
            if cur_node.is_leaf() {
                if !cur_node.is_leaf_for(key) {
                    return None;
                }
                return cur_node.value_mut();
            }

            let rest = &key[depth..];
            let prefix_len = cur_node.prefix.len();
            if prefix_len >= rest.len() || cur_node.prefix.prefix_length_slice(rest) != prefix_len
            {
                return None;
            }

            cur_node = cur_node.seek_child_mut(rest[prefix_len])?;
            depth += prefix_len + 1;
        }
    }

    /// Descend as far as `prefix` dictates and return the node whose subtree holds exactly the
    /// keys starting with `prefix`.
    fn seek_prefix<'a>(
        cur_node: &'a DefaultNode<ValueType>,
        prefix: &[u8],
    ) -> Option<&'a DefaultNode<ValueType>> {
        let mut cur_node = cur_node;
        let mut depth = 0;
        loop {
            let rest = &prefix[depth..];
            let common = cur_node.prefix.prefix_length_slice(rest);

            // The prefix runs out within (or at the end of) this node's compressed prefix, so
            // everything below here matches it.
            if common == rest.len() {
                return Some(cur_node);
            }

            // Diverged inside the compressed prefix, or hit a leaf whose key is shorter than the
            // prefix.
            if common < cur_node.prefix.len() || cur_node.is_leaf() {
                return None;
            }

            cur_node = cur_node.seek_child(rest[common])?;
            depth += common + 1;
        }
    }

    fn insert_recurse(
        cur_node: &mut DefaultNode<ValueType>,
        key: &[u8],
        value: ValueType,
        depth: usize,
    ) -> InsertOutcome<ValueType> {
        let rest = &key[depth..];
        let prefix_len = cur_node.prefix.len();
        let longest_common_prefix = cur_node.prefix.prefix_length_slice(rest);

        // Exact match on an existing leaf: swap the value, no structural change.
        if cur_node.is_leaf() && longest_common_prefix == prefix_len && prefix_len == rest.len() {
            let Content::Leaf(leaf) = &mut cur_node.content else {
                unreachable!("Should not be possible.");
            };
            return InsertOutcome::Replaced(std::mem::replace(&mut leaf.value, value));
        }

        // Either the key ends inside or at the end of this node's prefix (so every key below is
        // a strict extension of it), or this is a leaf whose key is a strict prefix of ours.
        // In both cases the new entry takes this whole position.
        if longest_common_prefix == rest.len()
            || (cur_node.is_leaf() && longest_common_prefix == prefix_len)
        {
            let absorbed = cur_node.num_leaves();
            trace!("key {key:?} absorbs {absorbed} entries at depth {depth}");
            *cur_node = DefaultNode::new_leaf(VectorPartial::from_slice(rest), Box::from(key), value);
            return InsertOutcome::Inserted { absorbed };
        }

        // The key diverges partway through this node's prefix. We have to break this node up,
        // creating a new parent holding the common part, with the old node and a new leaf as
        // its two children.
        if longest_common_prefix < prefix_len {
            let k1 = cur_node.prefix.at(longest_common_prefix);
            let k2 = rest[longest_common_prefix];
            trace!(
                "splitting prefix {:?} at {longest_common_prefix}",
                cur_node.prefix.to_slice()
            );

            let parent_prefix = cur_node.prefix.partial_before(longest_common_prefix);
            cur_node.prefix = cur_node.prefix.partial_after(longest_common_prefix + 1);
            let old_node = std::mem::replace(cur_node, DefaultNode::new_inner(parent_prefix));

            let new_leaf = DefaultNode::new_leaf(
                VectorPartial::from_slice(&rest[longest_common_prefix + 1..]),
                Box::from(key),
                value,
            );
            cur_node.add_child(k1, old_node);
            cur_node.add_child(k2, new_leaf);
            return InsertOutcome::Inserted { absorbed: 0 };
        }

        // We must be an inner node whose prefix is fully matched, with key bytes left over.
        // Either we need a new child, or one of our children does.
        debug_assert!(cur_node.is_inner());
        let k = rest[prefix_len];
        let Some(child) = cur_node.seek_child_mut(k) else {
            let new_leaf = DefaultNode::new_leaf(
                VectorPartial::from_slice(&rest[prefix_len + 1..]),
                Box::from(key),
                value,
            );
            cur_node.add_child(k, new_leaf);
            return InsertOutcome::Inserted { absorbed: 0 };
        };

        Self::insert_recurse(child, key, value, depth + prefix_len + 1)
    }

    /// `depth` is the position in `key` of the dispatch byte that selects a child of
    /// `parent_node`, i.e. just past the parent's own prefix.
    fn remove_recurse(
        parent_node: &mut DefaultNode<ValueType>,
        key: &[u8],
        depth: usize,
    ) -> Option<LeafData<ValueType>> {
        // A key that ends at an inner node cannot be stored.
        let c = *key.get(depth)?;
        let child_node = parent_node.seek_child_mut(c)?;

        // If the child is the leaf for our key, detach it from this parent. The parent collapses
        // into its remaining child if only one is left.
        if child_node.is_leaf() {
            if !child_node.is_leaf_for(key) {
                return None;
            }
            let Some(DefaultNode {
                content: Content::Leaf(leaf),
                ..
            }) = parent_node.delete_child(c)
            else {
                unreachable!("Should not be possible.");
            };
            return Some(leaf);
        }

        let rest = &key[depth + 1..];
        let prefix_len = child_node.prefix.len();
        if child_node.prefix.prefix_length_slice(rest) != prefix_len {
            return None;
        }

        // Otherwise, recurse down the branch in that direction.
        Self::remove_recurse(child_node, key, depth + 1 + prefix_len)
    }
}

impl<ValueType: Debug> Debug for ArtMap<ValueType> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (KeyDisplay(k), v)))
            .finish()
    }
}

/// Shows a key as a string when it is valid UTF-8, otherwise as raw bytes.
struct KeyDisplay<'a>(&'a [u8]);

impl Debug for KeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(self.0) {
            Ok(s) => write!(f, "{s:?}"),
            Err(_) => write!(f, "{:?}", self.0),
        }
    }
}

impl<ValueType: PartialEq> PartialEq for ArtMap<ValueType> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<ValueType: Eq> Eq for ArtMap<ValueType> {}

impl<K: AsRef<[u8]>, ValueType> Index<K> for ArtMap<ValueType> {
    type Output = ValueType;

    /// Panics if `key` is not present.
    fn index(&self, key: K) -> &ValueType {
        self.get(key).expect("key not found in ArtMap")
    }
}

impl<K: AsRef<[u8]>, ValueType> FromIterator<(K, ValueType)> for ArtMap<ValueType> {
    fn from_iter<I: IntoIterator<Item = (K, ValueType)>>(iter: I) -> Self {
        let mut map = ArtMap::new();
        map.extend(iter);
        map
    }
}

impl<K: AsRef<[u8]>, ValueType> Extend<(K, ValueType)> for ArtMap<ValueType> {
    fn extend<I: IntoIterator<Item = (K, ValueType)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: AsRef<[u8]>, ValueType, const N: usize> From<[(K, ValueType); N]> for ArtMap<ValueType> {
    fn from(entries: [(K, ValueType); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<'a, ValueType> IntoIterator for &'a ArtMap<ValueType> {
    type Item = (&'a [u8], &'a ValueType);
    type IntoIter = Iter<'a, ValueType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, ValueType> IntoIterator for &'a mut ArtMap<ValueType> {
    type Item = (&'a [u8], &'a mut ValueType);
    type IntoIter = IterMut<'a, ValueType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<ValueType> IntoIterator for ArtMap<ValueType> {
    type Item = (Box<[u8]>, ValueType);
    type IntoIter = IntoIter<ValueType>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.len)
    }
}
