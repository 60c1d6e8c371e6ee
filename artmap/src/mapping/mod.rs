pub mod direct_mapping;
pub mod indexed_mapping;
pub mod sorted_keyed_mapping;

/// A child table keyed by a single discriminator byte.
pub trait NodeMapping<N, const NUM_CHILDREN: usize> {
    fn add_child(&mut self, key: u8, node: N);
    fn seek_child(&self, key: u8) -> Option<&N>;
    fn seek_child_mut(&mut self, key: u8) -> Option<&mut N>;
    fn delete_child(&mut self, key: u8) -> Option<N>;
    fn num_children(&self) -> usize;
    fn width(&self) -> usize {
        NUM_CHILDREN
    }
    fn is_full(&self) -> bool {
        self.num_children() >= self.width()
    }
}
