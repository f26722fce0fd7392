use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyrank::rank::rank_for_key;
use keyrank::{Key, SimulatedHwCpa, Transform, WeightTable, DEFAULT_LOG_BASE};

const KEY: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F,
];

// Weights for one simulated AES-128 attack
fn simulated_weights(precision_bits: u32) -> WeightTable {
    let mut cpa = SimulatedHwCpa::new(KEY, 20, 0.25, 1);
    let mut table = cpa.next_attack().expect("simulated attack");
    Transform::apply_all(&Transform::correlation_pipeline(DEFAULT_LOG_BASE), &mut table);
    table.map_to_weight(precision_bits).expect("weight conversion")
}

fn rank_benchmarks(c: &mut Criterion) {
    let key = Key::new(128, KEY.to_vec()).expect("key");
    let mut group = c.benchmark_group("Path Count Rank");
    group.sample_size(10);

    for precision_bits in [6u32, 8, 10] {
        let weights = simulated_weights(precision_bits);
        group.bench_with_input(
            format!("AES-128 ({} bits of precision)", precision_bits),
            &weights,
            |b, weights| b.iter(|| rank_for_key(black_box(&key), black_box(weights))),
        );
    }

    group.finish();
}

criterion_group!(benches, rank_benchmarks);
criterion_main!(benches);
