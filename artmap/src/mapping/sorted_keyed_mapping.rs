use crate::mapping::NodeMapping;
use crate::utils::u8_keys::{
    u8_keys_find_insert_position_sorted, u8_keys_find_key_position_sorted,
};

/// Maps a key to a node, using a sorted array of keys and a corresponding array of nodes.
/// Presence of a key at a position below `num_children` means there is a node at the same
/// position in children. Unused key slots hold 255.
/// When an item is inserted or deleted the items to the right of it are shifted, in order to
/// keep the array sorted; in exchange, iteration is in key order for free.
#[derive(Clone)]
pub struct SortedKeyedMapping<N, const WIDTH: usize> {
    pub(crate) keys: [u8; WIDTH],
    pub(crate) children: Box<[Option<N>; WIDTH]>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for SortedKeyedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> SortedKeyedMapping<N, WIDTH> {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys: [255; WIDTH],
            children: Box::new(std::array::from_fn(|_| None)),
            num_children: 0,
        }
    }

    /// Build from entries arriving in ascending key order, as produced by `drain` on any other
    /// mapping. Each one lands at the end, so no shifting happens.
    pub fn from_sorted_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, N)>,
    {
        let mut new = Self::new();
        for (key, node) in entries {
            new.add_child(key, node);
        }
        new
    }

    #[inline]
    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, &N)> {
        self.keys
            .iter()
            .zip(self.children.iter())
            .take(self.num_children as usize)
            .filter_map(|(k, c)| c.as_ref().map(|c| (*k, c)))
    }

    #[inline]
    pub(crate) fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (u8, &mut N)> {
        self.keys
            .iter()
            .zip(self.children.iter_mut())
            .take(self.num_children as usize)
            .filter_map(|(k, c)| c.as_mut().map(|c| (*k, c)))
    }

    /// Move every child out, in ascending key order, leaving the mapping empty.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (u8, N)> + '_ {
        let num_children = std::mem::replace(&mut self.num_children, 0) as usize;
        let keys = std::mem::replace(&mut self.keys, [255; WIDTH]);
        self.children
            .iter_mut()
            .take(num_children)
            .zip(keys)
            .filter_map(|(c, k)| c.take().map(|c| (k, c)))
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for SortedKeyedMapping<N, WIDTH> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let num_children = self.num_children as usize;
        assert!(num_children < WIDTH, "add_child: no space left");
        debug_assert!(self.seek_child(key).is_none());

        let idx = u8_keys_find_insert_position_sorted::<WIDTH>(key, &self.keys, num_children);
        for i in (idx..num_children).rev() {
            self.keys[i + 1] = self.keys[i];
            self.children[i + 1] = self.children[i].take();
        }
        self.keys[idx] = key;
        self.children[idx] = Some(node);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        self.children[idx].as_ref()
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let idx =
            u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, self.num_children as usize)?;
        self.children[idx].as_mut()
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let num_children = self.num_children as usize;
        let idx = u8_keys_find_key_position_sorted::<WIDTH>(key, &self.keys, num_children)?;

        let node = self.children[idx].take();

        // Shift keys and children to the left.
        for i in idx..num_children - 1 {
            self.keys[i] = self.keys[i + 1];
            self.children[i] = self.children[i + 1].take();
        }
        self.keys[num_children - 1] = 255;
        self.num_children -= 1;

        node
    }

    #[inline(always)]
    fn num_children(&self) -> usize {
        self.num_children as usize
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::sorted_keyed_mapping::SortedKeyedMapping;

    #[test]
    fn test_add_seek_delete() {
        let mut node = SortedKeyedMapping::<u8, 4>::new();
        node.add_child(4, 4);
        node.add_child(2, 2);
        node.add_child(3, 3);
        node.add_child(1, 1);
        assert_eq!(node.num_children(), 4);
        assert!(node.is_full());
        assert_eq!(node.seek_child(1), Some(&1));
        assert_eq!(node.seek_child(2), Some(&2));
        assert_eq!(node.seek_child(3), Some(&3));
        assert_eq!(node.seek_child(4), Some(&4));
        assert_eq!(node.seek_child(5), None);
        assert_eq!(node.seek_child_mut(4), Some(&mut 4));
        assert_eq!(node.seek_child_mut(5), None);
        assert_eq!(node.delete_child(1), Some(1));
        assert_eq!(node.delete_child(3), Some(3));
        assert_eq!(node.delete_child(3), None);
        assert_eq!(node.num_children(), 2);
        assert_eq!(node.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(node.delete_child(2), Some(2));
        assert_eq!(node.delete_child(4), Some(4));
        assert_eq!(node.delete_child(5), None);
        assert_eq!(node.num_children(), 0);
    }

    #[test]
    fn test_iteration_is_sorted() {
        let mut node = SortedKeyedMapping::<u8, 16>::new();
        for k in [200u8, 3, 255, 0, 17, 99, 1] {
            node.add_child(k, k);
        }
        let keys: Vec<u8> = node.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![0, 1, 3, 17, 99, 200, 255]);
        for (_, v) in node.iter_mut() {
            *v = v.wrapping_add(1);
        }
        assert_eq!(node.seek_child(255), Some(&0));
        let drained: Vec<(u8, u8)> = node.drain().collect();
        assert_eq!(drained.len(), 7);
        assert_eq!(drained[0], (0, 1));
        assert_eq!(node.num_children(), 0);
        assert_eq!(node.seek_child(0), None);
    }

    #[test]
    fn test_regrow_from_drain() {
        let mut small = SortedKeyedMapping::<String, 4>::new();
        for k in [9u8, 7, 5, 3] {
            small.add_child(k, k.to_string());
        }
        let big = SortedKeyedMapping::<String, 16>::from_sorted_entries(small.drain());
        assert_eq!(big.num_children(), 4);
        assert_eq!(big.seek_child(7).map(String::as_str), Some("7"));
        assert_eq!(small.num_children(), 0);
    }
}
