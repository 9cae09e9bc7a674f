//! Load Tests for the Keyset Manager
//!
//! Many tasks share one manager and one base keyset. Every task must see
//! its own lineage only.
//!
//! Run with: cargo test --test load_test --release -- --ignored

use keysmith_keys::{init_keyset_manager, AeadVariant, KeyId, KeyStatus};
use std::sync::Arc;
use std::time::Instant;

#[tokio::test]
async fn test_concurrent_mutations_are_isolated() {
    let manager = init_keyset_manager();
    let base = Arc::new(
        manager
            .generate_new_symmetric(AeadVariant::Aes256Gcm)
            .await
            .expect("Failed to generate keyset"),
    );

    let mut handles = Vec::new();
    for i in 0..32u32 {
        let manager = Arc::clone(&manager);
        let base = Arc::clone(&base);
        handles.push(tokio::spawn(async move {
            let mut keyset = (*base).clone();
            for _ in 0..=(i % 4) {
                keyset = manager.rotate(&keyset, AeadVariant::Aes128Gcm).await?;
            }
            Ok::<_, keysmith_keys::KeyError>((i, keyset))
        }));
    }

    for handle in handles {
        let (i, keyset) = handle.await.expect("task panicked").expect("rotation failed");
        let expected = i % 4 + 2;
        assert_eq!(keyset.len() as u32, expected);
        assert_eq!(keyset.primary_key_id(), KeyId::new(expected).ok());
    }

    assert_eq!(base.key_ids(), vec![KeyId::FIRST]);
    assert_eq!(base.status(KeyId::FIRST), Some(KeyStatus::Enabled));
}

#[tokio::test]
#[ignore] // Timing-sensitive, run manually in release mode
async fn test_rotation_throughput() {
    let manager = init_keyset_manager();
    let mut keyset = manager
        .generate_new_symmetric(AeadVariant::Aes128Gcm)
        .await
        .expect("Failed to generate keyset");

    let rotations = 1000;
    let start = Instant::now();
    for _ in 0..rotations {
        let rotated = manager
            .rotate(&keyset, AeadVariant::Aes128Gcm)
            .await
            .expect("rotation failed");
        let old = keyset.primary_key_id().expect("primary");
        let disabled = manager.disable(&rotated, old).expect("disable failed");
        keyset = manager.delete(&disabled, old).expect("delete failed");
    }
    let elapsed = start.elapsed();
    let per_second = rotations as f64 / elapsed.as_secs_f64();

    println!("Rotated {} times in {:?} ({:.2}/s)", rotations, elapsed, per_second);
    assert_eq!(keyset.len(), 1);
    assert_eq!(keyset.primary_key_id(), KeyId::new(rotations + 1).ok());
    assert!(per_second > 100.0, "Throughput too low: {:.2}/s", per_second);
}
