//! Integration Tests for Keyset Lifecycle
//!
//! Drives the manager through rotation scenarios using the public API only
//! and checks that every earlier keyset value is left as it was.

use keysmith_keys::{
    init_keyset_manager, AeadVariant, HybridVariant, KeyError, KeyId, KeyStatus, KeysetManager,
    MacVariant, SignatureVariant,
};
use std::sync::Arc;

fn id(value: u32) -> KeyId {
    KeyId::new(value).expect("non-zero key id")
}

fn manager() -> Arc<KeysetManager> {
    init_keyset_manager()
}

#[tokio::test]
async fn test_full_rotation_cycle() {
    let manager = manager();

    let v1 = manager
        .generate_new_symmetric(AeadVariant::Aes128Gcm)
        .await
        .expect("Failed to generate keyset");
    assert_eq!(v1.key_ids(), vec![id(1)]);
    assert_eq!(v1.primary_key_id(), Some(id(1)));

    let v2 = manager
        .add(&v1, AeadVariant::Aes256Gcm)
        .await
        .expect("Failed to add key");
    let v3 = manager.set_primary(&v2, id(2)).expect("Failed to set primary");
    let v4 = manager.disable(&v3, id(1)).expect("Failed to disable");
    let v5 = manager.destroy(&v4, id(1)).expect("Failed to destroy");
    let v6 = manager.delete(&v5, id(1)).expect("Failed to delete");

    assert_eq!(v6.key_ids(), vec![id(2)]);
    assert_eq!(v6.primary_key_id(), Some(id(2)));
    assert_eq!(v6.primary_template().map(|t| t.variant), Some("aes256-gcm"));

    // Each intermediate value still describes its own point in time
    assert_eq!(v1.key_ids(), vec![id(1)]);
    assert_eq!(v2.primary_key_id(), Some(id(1)));
    assert_eq!(v3.status(id(1)), Some(KeyStatus::Enabled));
    assert_eq!(v4.status(id(1)), Some(KeyStatus::Disabled));
    assert_eq!(v5.status(id(1)), Some(KeyStatus::Destroyed));
    assert!(v5.contains(id(1)));
}

#[tokio::test]
async fn test_rotate_promotes_new_key() {
    let manager = manager();
    let v1 = manager
        .generate_new_symmetric(MacVariant::HmacSha256)
        .await
        .unwrap();
    let v2 = manager.rotate(&v1, MacVariant::HmacSha512).await.unwrap();

    assert_eq!(v2.primary_key_id(), Some(id(2)));
    assert_eq!(v2.status(id(1)), Some(KeyStatus::Enabled));
    assert_eq!(v1.primary_key_id(), Some(id(1)));
    assert_eq!(v1.len(), 1);
}

#[tokio::test]
async fn test_deleted_ids_are_not_reused() {
    let manager = manager();
    let v1 = manager
        .generate_new_symmetric(AeadVariant::ChaCha20Poly1305)
        .await
        .unwrap();
    let v2 = manager.add(&v1, AeadVariant::ChaCha20Poly1305).await.unwrap();
    let v3 = manager.disable(&v2, id(2)).unwrap();
    let v4 = manager.delete(&v3, id(2)).unwrap();
    let v5 = manager.add(&v4, AeadVariant::ChaCha20Poly1305).await.unwrap();

    assert_eq!(v5.key_ids(), vec![id(1), id(3)]);
}

#[tokio::test]
async fn test_rejected_transitions_leave_keyset_usable() {
    let manager = manager();
    let keyset = manager
        .generate_new_symmetric(AeadVariant::Aes256Gcm)
        .await
        .unwrap();

    for result in [
        manager.disable(&keyset, id(1)),
        manager.delete(&keyset, id(1)),
        manager.destroy(&keyset, id(1)),
    ] {
        assert!(matches!(result, Err(KeyError::InvalidTransition { .. })));
    }
    assert!(matches!(
        manager.enable(&keyset, id(7)),
        Err(KeyError::UnknownKeyId(_))
    ));

    let next = manager.add(&keyset, AeadVariant::Aes256Gcm).await.unwrap();
    assert!(matches!(
        manager.delete(&next, id(2)),
        Err(KeyError::InvalidTransition { .. })
    ));
    assert_eq!(keyset.status(id(1)), Some(KeyStatus::Enabled));
}

#[tokio::test]
async fn test_destroyed_key_cannot_return() {
    let manager = manager();
    let v1 = manager
        .generate_new_symmetric(MacVariant::HmacSha512)
        .await
        .unwrap();
    let v2 = manager.add(&v1, MacVariant::HmacSha512).await.unwrap();
    let v3 = manager.destroy(&v2, id(2)).unwrap();

    assert!(manager.enable(&v3, id(2)).is_err());
    assert!(manager.set_primary(&v3, id(2)).is_err());
    assert!(manager.disable(&v3, id(2)).is_err());
    assert!(!v3.has_material(id(2)));
    assert!(v2.has_material(id(2)));
}

#[tokio::test]
async fn test_signature_public_keyset_tracks_private() {
    let manager = manager();
    let private = manager
        .generate_new_asymmetric(SignatureVariant::Ed25519)
        .await
        .unwrap();
    let (keyset, public) = private.into_parts();
    assert_eq!(public.primary_key_id(), keyset.primary_key_id());
    assert_eq!(public.keys().len(), 1);

    let rotated = manager.rotate(&keyset, SignatureVariant::Ed25519).await.unwrap();
    let retired = manager.disable(&rotated, id(1)).unwrap();
    let public = manager.public_keyset(&retired).await.unwrap();

    assert_eq!(public.primary_key_id(), Some(id(2)));
    assert_eq!(public.key(id(1)).unwrap().status(), KeyStatus::Disabled);
    assert_ne!(
        public.key(id(1)).unwrap().public_key(),
        public.key(id(2)).unwrap().public_key()
    );

    let destroyed = manager.destroy(&retired, id(1)).unwrap();
    let public = manager.public_keyset(&destroyed).await.unwrap();
    assert!(public.key(id(1)).is_none());
}

#[tokio::test]
async fn test_hybrid_public_keys_are_32_bytes() {
    let manager = manager();
    let private = manager
        .generate_new_asymmetric(HybridVariant::X25519HkdfSha256Aes128Gcm)
        .await
        .unwrap();
    let primary = private.public().primary().expect("primary public key");
    assert_eq!(primary.public_key().len(), 32);
    assert_eq!(
        primary.template().variant,
        "x25519-hkdf-sha256-aes128-gcm"
    );
}
