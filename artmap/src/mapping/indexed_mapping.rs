use crate::mapping::NodeMapping;
use crate::utils::bitset::{Bitset64, BitsetTrait};

const EMPTY: u8 = 255;

/// A mapping from keys to separate child slots. Every possible key byte has an entry in
/// `child_ptr_indexes` naming the slot in `children` that holds its node, or `EMPTY`.
/// Slot occupancy is tracked in a bitset so a free slot can be found without scanning children.
#[derive(Clone)]
pub struct IndexedMapping<N, const WIDTH: usize> {
    child_ptr_indexes: Box<[u8; 256]>,
    children: Box<[Option<N>; WIDTH]>,
    occupied: Bitset64<1>,
    pub(crate) num_children: u8,
}

impl<N, const WIDTH: usize> Default for IndexedMapping<N, WIDTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, const WIDTH: usize> IndexedMapping<N, WIDTH> {
    pub fn new() -> Self {
        assert!(WIDTH <= 64 && WIDTH < EMPTY as usize);
        Self {
            child_ptr_indexes: Box::new([EMPTY; 256]),
            children: Box::new(std::array::from_fn(|_| None)),
            occupied: Bitset64::new(),
            num_children: 0,
        }
    }

    pub fn from_sorted_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, N)>,
    {
        let mut im = Self::new();
        for (key, node) in entries {
            im.add_child(key, node);
        }
        im
    }

    pub(crate) fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, &N)> {
        self.child_ptr_indexes
            .iter()
            .enumerate()
            .filter(|(_, pos)| **pos != EMPTY)
            .filter_map(move |(key, pos)| {
                self.children[*pos as usize]
                    .as_ref()
                    .map(|c| (key as u8, c))
            })
    }

    /// Mutable iteration in key order. Slots are not stored in key order, so the borrowed
    /// children are collected and sorted first.
    pub(crate) fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (u8, &mut N)> {
        let mut slot_keys = [EMPTY; WIDTH];
        for (key, pos) in self.child_ptr_indexes.iter().enumerate() {
            if *pos != EMPTY {
                slot_keys[*pos as usize] = key as u8;
            }
        }
        let mut entries: Vec<(u8, &mut N)> = self
            .children
            .iter_mut()
            .zip(slot_keys)
            .filter_map(|(c, k)| c.as_mut().map(|c| (k, c)))
            .collect();
        entries.sort_unstable_by_key(|(k, _)| *k);
        entries.into_iter()
    }

    /// Move every child out, in ascending key order, leaving the mapping empty.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (u8, N)> + '_ {
        self.num_children = 0;
        self.occupied.clear();
        let indexes = &mut self.child_ptr_indexes;
        let children = &mut self.children;
        (0..256usize).filter_map(move |key| {
            let pos = std::mem::replace(&mut indexes[key], EMPTY);
            if pos == EMPTY {
                return None;
            }
            children[pos as usize].take().map(|c| (key as u8, c))
        })
    }
}

impl<N, const WIDTH: usize> NodeMapping<N, WIDTH> for IndexedMapping<N, WIDTH> {
    fn add_child(&mut self, key: u8, node: N) {
        debug_assert_eq!(self.child_ptr_indexes[key as usize], EMPTY);
        let pos = self
            .occupied
            .first_empty()
            .filter(|pos| *pos < WIDTH)
            .expect("add_child: no space left");
        self.child_ptr_indexes[key as usize] = pos as u8;
        self.children[pos] = Some(node);
        self.occupied.set(pos);
        self.num_children += 1;
    }

    fn seek_child(&self, key: u8) -> Option<&N> {
        let pos = self.child_ptr_indexes[key as usize];
        if pos == EMPTY {
            return None;
        }
        self.children[pos as usize].as_ref()
    }

    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        let pos = self.child_ptr_indexes[key as usize];
        if pos == EMPTY {
            return None;
        }
        self.children[pos as usize].as_mut()
    }

    fn delete_child(&mut self, key: u8) -> Option<N> {
        let pos = std::mem::replace(&mut self.child_ptr_indexes[key as usize], EMPTY);
        if pos == EMPTY {
            return None;
        }
        self.occupied.unset(pos as usize);
        self.num_children -= 1;
        self.children[pos as usize].take()
    }

    fn num_children(&self) -> usize {
        self.num_children as usize
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::indexed_mapping::IndexedMapping;

    #[test]
    fn test_basic_mapping() {
        let mut mapping = IndexedMapping::<u8, 48>::new();
        for i in 0..48 {
            mapping.add_child(i, i);
            assert_eq!(*mapping.seek_child(i).unwrap(), i);
        }
        assert!(mapping.is_full());
        for i in 0..48 {
            assert_eq!(*mapping.seek_child(i).unwrap(), i);
        }
        for i in 0..48 {
            assert_eq!(mapping.delete_child(i).unwrap(), i);
        }
        for i in 0..48 {
            assert!(mapping.seek_child(i).is_none());
        }
        assert_eq!(mapping.num_children(), 0);
    }

    #[test]
    fn test_slot_reuse_and_order() {
        let mut mapping = IndexedMapping::<String, 48>::new();
        // Insert in descending order so slot order is the reverse of key order.
        for k in (100..140u8).rev() {
            mapping.add_child(k, k.to_string());
        }
        for k in 110..120u8 {
            assert_eq!(mapping.delete_child(k), Some(k.to_string()));
        }
        for k in 0..10u8 {
            mapping.add_child(k, k.to_string());
        }
        let keys: Vec<u8> = mapping.iter().map(|(k, _)| k).collect();
        let expected: Vec<u8> = (0..10).chain(100..110).chain(120..140).collect();
        assert_eq!(keys, expected);

        for (k, v) in mapping.iter_mut() {
            v.push_str(&format!("-{k}"));
        }
        assert_eq!(mapping.seek_child(5).map(String::as_str), Some("5-5"));

        let drained: Vec<u8> = mapping.drain().map(|(k, _)| k).collect();
        assert_eq!(drained, expected);
        assert_eq!(mapping.num_children(), 0);
        assert_eq!(mapping.iter().count(), 0);
    }
}
