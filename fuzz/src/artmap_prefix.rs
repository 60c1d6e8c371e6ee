#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use artmap::ArtMap;

#[derive(Arbitrary, Debug)]
struct PrefixInput {
    keys: Vec<Vec<u8>>,
    prefixes: Vec<Vec<u8>>,
}

fuzz_target!(|input: PrefixInput| {
    let art: ArtMap<usize> = input
        .keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k, i))
        .collect();

    let all: Vec<&[u8]> = art.keys().collect();
    assert!(all.windows(2).all(|w| w[0] < w[1] && !w[1].starts_with(w[0])));

    for prefix in &input.prefixes {
        let expected: Vec<&[u8]> = all
            .iter()
            .copied()
            .filter(|k| k.starts_with(prefix))
            .collect();
        let found: Vec<&[u8]> = art.prefix_iter(prefix).map(|(k, _)| k).collect();
        assert_eq!(found, expected);
        assert_eq!(
            art.get_prefix(prefix).map(|(k, _)| k),
            expected.first().copied()
        );
    }
});
