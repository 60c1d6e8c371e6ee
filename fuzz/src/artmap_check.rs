#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artmap::ArtMap;

#[derive(Arbitrary, Debug)]
enum MapMethod {
    Get { key: Vec<u8> },
    Insert { key: Vec<u8>, val: usize },
    Update { key: Vec<u8>, val: usize },
    Delete { key: Vec<u8> },
}

/// Insert into the model the way the map does: any stored key that is a strict prefix or a
/// strict extension of the new key is dropped first.
fn model_insert(bt_map: &mut BTreeMap<Vec<u8>, usize>, key: &[u8], val: usize) -> Option<usize> {
    bt_map.retain(|k, _| k.as_slice() == key || !(k.starts_with(key) || key.starts_with(k)));
    bt_map.insert(key.to_vec(), val)
}

fuzz_target!(|methods: Vec<MapMethod>| {
    let mut art = ArtMap::<usize>::new();
    let mut bt_map = BTreeMap::<Vec<u8>, usize>::new();

    for m in &methods {
        match m {
            MapMethod::Get { key } => {
                assert_eq!(art.get(key), bt_map.get(key));
            }
            MapMethod::Insert { key, val } => {
                let btree_insert = model_insert(&mut bt_map, key, *val);
                let a_insert = art.insert(key, *val);
                assert_eq!(a_insert, btree_insert);
            }
            MapMethod::Update { key, val } => {
                let old_bt = bt_map.get_mut(key);
                let old_art = art.get_mut(key);
                assert_eq!(old_art, old_bt);

                if let (Some(old_bt), Some(old_art)) = (old_bt, old_art) {
                    *old_bt = *val;
                    *old_art = *val;
                }
                assert_eq!(art.get(key), bt_map.get(key));
            }
            MapMethod::Delete { key } => {
                let btr = bt_map.remove(key);
                let artr = art.remove(key).ok();
                assert_eq!(artr, btr);
            }
        }
        assert_eq!(art.len(), bt_map.len());
    }

    let art_entries: Vec<(&[u8], &usize)> = art.iter().collect();
    let bt_entries: Vec<(&[u8], &usize)> = bt_map.iter().map(|(k, v)| (k.as_slice(), v)).collect();
    assert_eq!(art_entries, bt_entries);
});
