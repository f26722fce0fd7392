use keyrank::rank::{log2_rank, rank_for_key};
use keyrank::{Key, SimulatedHwCpa, Transform, DEFAULT_LOG_BASE};

fn main() {
    env_logger::init();
    println!("Key Rank Demo");

    let key_bytes: [u8; 16] = rand::random();
    let mut cpa = SimulatedHwCpa::new(key_bytes, 30, 0.25, 0xC0FFEE);

    let result = cpa.next_attack().and_then(|mut table| {
        Transform::apply_all(&Transform::correlation_pipeline(DEFAULT_LOG_BASE), &mut table);
        let weights = table.map_to_weight(12)?;
        let key = Key::new(128, key_bytes.to_vec())?;
        rank_for_key(&key, &weights)
    });

    match result {
        Ok(rank) => {
            println!("Key: {}", cpa.key_hex());
            println!("Traces: {}, SNR: {}", cpa.trace_count(), cpa.snr());
            println!("Rank: 2^{:.4} ({})", log2_rank(&rank), rank);
        }
        Err(e) => {
            eprintln!("Rank failed: {}", e);
            std::process::exit(1);
        }
    }
}
