//! Search routines over the sorted key arrays used by the small node variants.

fn binary_find_key(key: u8, keys: &[u8], num_children: usize) -> Option<usize> {
    let mut left = 0;
    let mut right = num_children;
    while left < right {
        let mid = (left + right) / 2;
        match keys[mid].cmp(&key) {
            std::cmp::Ordering::Less => left = mid + 1,
            std::cmp::Ordering::Equal => return Some(mid),
            std::cmp::Ordering::Greater => right = mid,
        }
    }
    None
}

/// Position of `key` among the first `num_children` entries of a sorted `keys` array.
pub fn u8_keys_find_key_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8],
    num_children: usize,
) -> Option<usize> {
    // Width 4 and under, just use linear search.
    if WIDTH <= 4 {
        return (0..num_children).find(|&i| keys[i] == key);
    }
    binary_find_key(key, keys, num_children)
}

/// Slot where `key` must go to keep the first `num_children` entries sorted. Returns
/// `num_children` when it sorts after everything present.
pub fn u8_keys_find_insert_position_sorted<const WIDTH: usize>(
    key: u8,
    keys: &[u8],
    num_children: usize,
) -> usize {
    if WIDTH <= 4 {
        return (0..num_children)
            .find(|&i| key < keys[i])
            .unwrap_or(num_children);
    }
    keys[..num_children].partition_point(|k| *k < key)
}
