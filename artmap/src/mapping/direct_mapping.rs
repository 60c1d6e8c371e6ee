use crate::mapping::NodeMapping;
use crate::utils::bitset::{Bitset64, BitsetTrait};

/// The widest mapping: one slot per possible key byte, indexed directly by the byte. Which
/// slots are filled is mirrored in a bitset, so the child count is a popcount.
#[derive(Clone)]
pub struct DirectMapping<N> {
    pub(crate) children: Box<[Option<N>; 256]>,
    occupied: Bitset64<4>,
}

impl<N> Default for DirectMapping<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectMapping<N> {
    pub fn new() -> Self {
        Self {
            children: Box::new(std::array::from_fn(|_| None)),
            occupied: Bitset64::new(),
        }
    }

    pub fn from_sorted_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u8, N)>,
    {
        let mut dm = Self::new();
        for (key, node) in entries {
            dm.add_child(key, node);
        }
        dm
    }

    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u8, &N)> {
        self.occupied
            .iter()
            .filter_map(move |key| self.children[key].as_ref().map(|c| (key as u8, c)))
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (u8, &mut N)> {
        self.children
            .iter_mut()
            .enumerate()
            .filter_map(|(key, c)| c.as_mut().map(|c| (key as u8, c)))
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (u8, N)> + '_ {
        self.occupied.clear();
        self.children
            .iter_mut()
            .enumerate()
            .filter_map(|(key, c)| c.take().map(|c| (key as u8, c)))
    }
}

impl<N> NodeMapping<N, 256> for DirectMapping<N> {
    #[inline]
    fn add_child(&mut self, key: u8, node: N) {
        let old = self.children[key as usize].replace(node);
        debug_assert!(old.is_none());
        self.occupied.set(key as usize);
    }

    #[inline]
    fn seek_child(&self, key: u8) -> Option<&N> {
        self.children[key as usize].as_ref()
    }

    #[inline]
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N> {
        self.children[key as usize].as_mut()
    }

    #[inline]
    fn delete_child(&mut self, key: u8) -> Option<N> {
        let n = self.children[key as usize].take();
        if n.is_some() {
            self.occupied.unset(key as usize);
        }
        n
    }

    #[inline]
    fn num_children(&self) -> usize {
        self.occupied.size()
    }
}

#[cfg(test)]
mod tests {
    use crate::mapping::NodeMapping;
    use crate::mapping::direct_mapping::DirectMapping;

    #[test]
    fn direct_mapping_test() {
        let mut dm = DirectMapping::new();
        for i in 0..=255u8 {
            dm.add_child(i, i);
            assert_eq!(*dm.seek_child(i).unwrap(), i);
        }
        assert!(dm.is_full());
        assert_eq!(dm.iter().next_back(), Some((255, &255)));
        for i in 0..=255u8 {
            assert_eq!(dm.delete_child(i), Some(i));
            assert_eq!(dm.seek_child(i), None);
        }
        assert_eq!(dm.delete_child(0), None);
        assert_eq!(dm.num_children(), 0);
    }

    #[test]
    fn drain_in_key_order() {
        let mut dm = DirectMapping::new();
        for i in [250u8, 3, 77, 0] {
            dm.add_child(i, i as u32 * 10);
        }
        let drained: Vec<(u8, u32)> = dm.drain().collect();
        assert_eq!(drained, vec![(0, 0), (3, 30), (77, 770), (250, 2500)]);
        assert_eq!(dm.num_children(), 0);
    }
}
