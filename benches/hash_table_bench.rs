use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;
use unified_hash::{Dict, IntHash};

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// 10k indices into 0..n, with repeats.
fn picks(n: usize) -> Vec<usize> {
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..10_000)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            (s as usize) % n
        })
        .collect()
}

fn bench_put_fresh_100k(c: &mut Criterion) {
    c.bench_function("int_hash::put_fresh_100k", |b| {
        b.iter_batched(
            IntHash::<u64>::new,
            |mut h| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    let _ = h.put(x as i64, i as u64).unwrap();
                }
                black_box(h)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("dict::put_fresh_100k", |b| {
        b.iter_batched(
            Dict::<u64>::new,
            |mut d| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    let _ = d.put(key(x), i as u64).unwrap();
                }
                black_box(d)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_put_presized_100k(c: &mut Criterion) {
    c.bench_function("int_hash::put_presized_100k", |b| {
        b.iter_batched(
            || {
                let mut h = IntHash::<u64>::new();
                h.resize(140_000).unwrap();
                h
            },
            |mut h| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    let _ = h.put(x as i64, i as u64).unwrap();
                }
                black_box(h)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("dict::get_hit_10k_on_100k", |b| {
        let mut d = Dict::new();
        let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            let _ = d.put(k.clone(), i as u64).unwrap();
        }
        let queries: Vec<&str> = picks(keys.len()).into_iter().map(|i| keys[i].as_str()).collect();
        b.iter(|| {
            for k in &queries {
                black_box(d.get(*k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("int_hash::get_miss_10k_on_100k", |b| {
        let mut h = IntHash::new();
        for (i, x) in lcg(11).take(100_000).enumerate() {
            let _ = h.put(x as i64, i as u64).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = miss.next().unwrap() as i64;
                black_box(h.get(&k));
            }
        })
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("int_hash::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut h = IntHash::new();
                let keys: Vec<i64> = lcg(5).take(110_000).map(|x| x as i64).collect();
                for (i, &k) in keys.iter().enumerate() {
                    let _ = h.put(k, i as u64).unwrap();
                }
                let to_remove: Vec<i64> = picks(keys.len()).into_iter().map(|i| keys[i]).collect();
                (h, to_remove)
            },
            |(mut h, to_remove)| {
                for k in to_remove {
                    let _ = h.remove(&k);
                }
                black_box(h)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_iterate(c: &mut Criterion) {
    c.bench_function("int_hash::iter_all_100k", |b| {
        let mut h = IntHash::new();
        for (i, x) in lcg(999).take(100_000).enumerate() {
            let _ = h.put(x as i64, i as u64).unwrap();
        }
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in h.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("int_hash::cursor_scan_100k", |b| {
        let mut h = IntHash::new();
        for (i, x) in lcg(999).take(100_000).enumerate() {
            let _ = h.put(x as i64, i as u64).unwrap();
        }
        b.iter(|| {
            let mut sum = 0u64;
            let mut cursor = h.start();
            while let Some(c) = cursor {
                sum = sum.wrapping_add(*h.value_at(c).unwrap());
                cursor = h.next(c).unwrap();
            }
            black_box(sum)
        })
    });

    c.bench_function("int_hash::cursor_remove_half_100k", |b| {
        b.iter_batched(
            || {
                let mut h = IntHash::new();
                for (i, x) in lcg(1001).take(100_000).enumerate() {
                    let _ = h.put(x as i64, i as u64).unwrap();
                }
                h
            },
            |mut h| {
                let mut cursor = h.start();
                while let Some(c) = cursor {
                    if h.value_at(c).is_some_and(|v| v % 2 == 0) {
                        let _ = h.remove_at(c).unwrap();
                    }
                    cursor = h.next(c).unwrap();
                }
                black_box(h)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_put;
    config = bench_config();
    targets = bench_put_fresh_100k, bench_put_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_get_hit_10k,
              bench_get_miss_10k,
              bench_remove_random_10k,
              bench_iterate
}
criterion_main!(benches_put, benches_ops);
