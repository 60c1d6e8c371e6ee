/// Overall performance bench for a static number of keys in a few scenarios, plus the prefix
/// queries, compared against BTreeMap where it makes sense. Here to quickly test for regressions.
use std::collections::BTreeMap;
use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::seq::SliceRandom;
use rand::{Rng, rng};

use artmap::ArtMap;

// Variations on the number of keys to insert into the map for benchmarks that measure retrievals
const MAP_SIZES: [u64; 3] = [1 << 12, 1 << 16, 1 << 20];

fn criterion_config() -> Criterion {
    if std::env::var("ARTMAP_BENCH_FULL").as_deref() == Ok("1") {
        Criterion::default()
    } else {
        Criterion::default()
            .sample_size(30)
            .warm_up_time(Duration::from_secs(1))
            .measurement_time(Duration::from_secs(2))
    }
}

pub fn rand_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_insert");
    group.throughput(Throughput::Elements(1));

    let keys = gen_keys(3, 2, 3);

    group.bench_function("artmap", |b| {
        let mut map = ArtMap::new();
        let mut rng = rng();
        b.iter(|| {
            let key = &keys[rng.random_range(0..keys.len())];
            map.insert(key, key.len());
        })
    });

    group.bench_function("btree", |b| {
        let mut map = BTreeMap::new();
        let mut rng = rng();
        b.iter(|| {
            let key = &keys[rng.random_range(0..keys.len())];
            map.insert(key.clone(), key.len());
        })
    });

    group.finish();
}

pub fn rand_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_remove");
    let keys = gen_keys(3, 2, 3);

    group.throughput(Throughput::Elements(1));
    group.bench_function("artmap", |b| {
        let mut map = ArtMap::new();
        let mut rng = rng();
        for key in &keys {
            map.insert(key, key.len());
        }
        b.iter(|| {
            let key = &keys[rng.random_range(0..keys.len())];
            black_box(map.remove(key).ok());
        })
    });

    group.finish();
}

pub fn rand_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_get");
    group.throughput(Throughput::Elements(1));
    for size in MAP_SIZES {
        group.bench_with_input(BenchmarkId::new("artmap", size), &size, |b, size| {
            let mut map = ArtMap::new();
            for i in 0..*size {
                map.insert(i.to_be_bytes(), i);
            }
            let mut rng = rng();
            b.iter(|| {
                let key = rng.random_range(0..*size);
                black_box(map.get(key.to_be_bytes()));
            })
        });
        group.bench_with_input(BenchmarkId::new("btree", size), &size, |b, size| {
            let map: BTreeMap<[u8; 8], u64> = (0..*size).map(|i| (i.to_be_bytes(), i)).collect();
            let mut rng = rng();
            b.iter(|| {
                let key = rng.random_range(0..*size);
                black_box(map.get(&key.to_be_bytes()));
            })
        });
    }
    group.finish();
}

pub fn rand_get_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("rand_get_str");
    let keys = gen_keys(3, 2, 3);
    group.throughput(Throughput::Elements(1));

    group.bench_function("artmap", |b| {
        let map: ArtMap<usize> = keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
        let mut rng = rng();
        b.iter(|| {
            let key = &keys[rng.random_range(0..keys.len())];
            black_box(map.get(key));
        })
    });

    group.finish();
}

pub fn seq_get(c: &mut Criterion) {
    for size in MAP_SIZES {
        c.bench_with_input(BenchmarkId::new("seq_get", size), &size, |b, size| {
            let mut map = ArtMap::new();
            for i in 0..*size {
                map.insert(i.to_be_bytes(), i);
            }
            b.iter_custom(|iters| {
                let mut c = 0u64;
                let start = Instant::now();
                for _ in 0..iters {
                    if c == *size {
                        c = 0;
                    }
                    black_box(map.get(c.to_be_bytes()));
                    c += 1;
                }
                start.elapsed()
            })
        });
    }
}

pub fn seq_insert(c: &mut Criterion) {
    c.bench_function("seq_insert", |b| {
        let mut map = ArtMap::new();
        let mut key = 0u64;
        b.iter(|| {
            map.insert(key.to_be_bytes(), key);
            key += 1;
        })
    });
}

pub fn seq_remove(c: &mut Criterion) {
    for size in MAP_SIZES {
        c.bench_with_input(BenchmarkId::new("seq_remove", size), &size, |b, size| {
            let mut map = ArtMap::new();
            b.iter_custom(|iters| {
                for i in 0..*size {
                    map.insert(i.to_be_bytes(), i);
                }
                let mut start = Instant::now();
                let mut cumulative_time = Duration::new(0, 0);
                let mut c = 0u64;
                for _ in 0..iters {
                    if c == *size {
                        cumulative_time += start.elapsed();
                        c = 0;
                        for i in 0..*size {
                            map.insert(i.to_be_bytes(), i);
                        }
                        start = Instant::now();
                    }
                    black_box(map.remove(c.to_be_bytes()).ok());
                    c += 1;
                }
                cumulative_time += start.elapsed();
                cumulative_time
            })
        });
    }
}

pub fn prefix_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix");
    let keys = gen_keys(3, 2, 3);
    let map: ArtMap<usize> = keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let btree: BTreeMap<Vec<u8>, usize> = map.iter().map(|(k, v)| (k.to_vec(), *v)).collect();

    // Two-level prefixes like "aaabb", each covering about 256 keys.
    let prefixes: Vec<Vec<u8>> = keys.iter().map(|k| k.as_bytes()[..5].to_vec()).collect();

    group.bench_function("get_prefix/artmap", |b| {
        let mut rng = rng();
        b.iter(|| {
            let prefix = &prefixes[rng.random_range(0..prefixes.len())];
            black_box(map.get_prefix(prefix));
        })
    });
    group.bench_function("get_prefix/btree", |b| {
        let mut rng = rng();
        b.iter(|| {
            let prefix = &prefixes[rng.random_range(0..prefixes.len())];
            black_box(
                btree
                    .range::<Vec<u8>, _>(prefix..)
                    .next()
                    .filter(|(k, _)| k.starts_with(prefix)),
            );
        })
    });
    group.bench_function("prefix_iter/artmap", |b| {
        let mut rng = rng();
        b.iter(|| {
            let prefix = &prefixes[rng.random_range(0..prefixes.len())];
            black_box(map.prefix_iter(prefix).count());
        })
    });
    group.bench_function("prefix_iter/btree", |b| {
        let mut rng = rng();
        b.iter(|| {
            let prefix = &prefixes[rng.random_range(0..prefixes.len())];
            black_box(
                btree
                    .range::<Vec<u8>, _>(prefix..)
                    .take_while(|(k, _)| k.starts_with(prefix))
                    .count(),
            );
        })
    });

    group.finish();
}

pub fn full_iter(c: &mut Criterion) {
    let keys = gen_keys(3, 2, 3);
    let map: ArtMap<usize> = keys.iter().enumerate().map(|(i, k)| (k, i)).collect();
    c.bench_function("full_iter", |b| {
        b.iter(|| black_box(map.iter().count()));
    });
}

/// Keys made of a repeated first-level character, a repeated second-level character, and a
/// random suffix, so the upper levels compress and the lower levels fan out.
fn gen_keys(l1_prefix: usize, l2_prefix: usize, suffix: usize) -> Vec<String> {
    let mut keys = Vec::new();
    let chars: Vec<char> = ('a'..='z').collect();
    let mut rng = rng();
    for c1 in &chars {
        let level1_prefix = c1.to_string().repeat(l1_prefix);
        for c2 in &chars {
            let level2_prefix = c2.to_string().repeat(l2_prefix);
            let key_prefix = level1_prefix.clone() + &level2_prefix;
            for _ in 0..=u8::MAX {
                let suffix: String = (0..suffix)
                    .map(|_| chars[rng.random_range(0..chars.len())])
                    .collect();
                keys.push(key_prefix.clone() + &suffix);
            }
        }
    }

    keys.shuffle(&mut rng);
    keys
}

criterion_group!(
    name = rand_benches;
    config = criterion_config();
    targets = rand_get, rand_get_str, rand_insert, rand_remove
);
criterion_group!(
    name = seq_benches;
    config = criterion_config();
    targets = seq_get, seq_insert, seq_remove
);
criterion_group!(
    name = prefix_benches;
    config = criterion_config();
    targets = prefix_ops, full_iter
);
criterion_main!(seq_benches, rand_benches, prefix_benches);
