use keyrank::rank::{approximate_rank, log2_rank, rank_all_weights, rank_for_key};
use keyrank::{rank_key, DistinguishingTable, Key, SimulatedHwCpa, Transform, WeightTable};

fn main() {
    println!("🔐 Key Rank Example");
    println!("===================");

    // Example 1: hand-written weights for a 4-bit key
    println!("📝 Example 1: Two 2-bit Vectors");
    println!("-------------------------------");

    let weights = WeightTable::new(2, 2, vec![0, 1, 3, 0, 0, 2, 3, 0]).unwrap();
    let key = Key::from_hex(4, "06").unwrap();
    println!("🔑 Key: 0b0110");
    println!("⚖️  Key weight: {}", weights.weight_for_key(&key).unwrap());
    println!("📊 Rank: {}", rank_for_key(&key, &weights).unwrap());
    println!();

    // Example 2: ranks for every weight bound in one pass
    println!("📝 Example 2: Rank of Every Weight Bound");
    println!("----------------------------------------");

    let ranks = rank_all_weights(6, &weights).unwrap();
    for (offset, rank) in ranks.iter().enumerate() {
        println!("   weight < {}: {} candidates", 6 - offset, rank);
    }
    println!();

    // Example 3: raw scores through the whole pipeline
    println!("📝 Example 3: Raw Scores");
    println!("------------------------");

    let scores = [4.0, 3.0, 1.0, 4.0, 3.0, 1.0, 2.0, 4.0];
    for key_hex in ["06", "0C"] {
        let rank = rank_key(key_hex, 8, 2, 2, &scores).unwrap();
        println!("🔑 Key {}: rank {}", key_hex, rank);
    }
    println!();

    // Example 4: simulated CPA against AES-128
    println!("📝 Example 4: Simulated AES-128 CPA");
    println!("-----------------------------------");

    let key_bytes = [
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
        0x0F,
    ];
    let key = Key::new(128, key_bytes.to_vec()).unwrap();
    for traces in [10, 20, 40] {
        let mut cpa = SimulatedHwCpa::new(key_bytes, traces, 0.25, 7);
        let mut table: DistinguishingTable = cpa.next_attack().unwrap();
        let estimate = approximate_rank(&table, &key, |a, b| a > b).unwrap();
        Transform::apply_all(&Transform::correlation_pipeline(2.0), &mut table);
        let weights = table.map_to_weight(10).unwrap();
        let rank = rank_for_key(&key, &weights).unwrap();
        println!(
            "📈 {} traces: rank = 2^{:.3} (estimate 2^{:.3})",
            traces,
            log2_rank(&rank),
            log2_rank(&estimate)
        );
    }

    println!();
    println!("✅ Done");
}
