//! Integration Tests for Keyset Persistence
//!
//! Covers encrypted, cleartext and public keyset files, and the
//! configuration-driven bootstrap path a service uses on start-up.

use keysmith_config::KeysmithConfig;
use keysmith_keys::{
    acknowledge_cleartext_risk, init_keyset_manager, load_or_generate_asymmetric,
    load_or_generate_symmetric, master_key_or_generate, Aead, AeadVariant, CleartextAllowed,
    HybridEncryption, HybridVariant, KeyError, KeyId, Keyset, MasterKey, Signature,
    SignatureVariant, Variant,
};
use keysmith_types::EncryptedKeysetRecord;
use std::collections::HashMap;
use tempfile::TempDir;

fn config_for(dir: &TempDir, extra: &[(&str, &str)]) -> KeysmithConfig {
    let mut vars = HashMap::new();
    vars.insert(
        "KEYSMITH_KEYSET_DIR".to_string(),
        dir.path().display().to_string(),
    );
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    KeysmithConfig::from_vars(vars).expect("Failed to load config")
}

#[tokio::test]
async fn test_encrypted_round_trip_preserves_state() {
    let dir = TempDir::new().unwrap();
    let manager = init_keyset_manager();
    let master = MasterKey::generate();
    let path = dir.path().join("aead.json");

    let v1 = manager
        .generate_new_symmetric(AeadVariant::Aes128Gcm)
        .await
        .unwrap();
    let v2 = manager.rotate(&v1, AeadVariant::Aes256Gcm).await.unwrap();
    let v3 = manager.disable(&v2, KeyId::FIRST).unwrap();
    manager.save_encrypted(&v3, &path, &master).await.unwrap();

    let read: Keyset<Aead> = manager.read_encrypted(&path, &master).await.unwrap();
    assert_eq!(read.info(), v3.info());

    // Id allocation continues from the stored counter
    let v4 = manager.add(&read, AeadVariant::Aes128Gcm).await.unwrap();
    assert!(v4.contains(KeyId::new(3).unwrap()));
}

#[tokio::test]
async fn test_encrypted_file_has_no_plain_material() {
    let dir = TempDir::new().unwrap();
    let manager = init_keyset_manager();
    let master = MasterKey::from_secret("integration-secret");
    let path = dir.path().join("aead.json");

    let keyset = manager
        .generate_new_symmetric(AeadVariant::Aes256Gcm)
        .await
        .unwrap();
    manager.save_encrypted(&keyset, &path, &master).await.unwrap();

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    let record = EncryptedKeysetRecord::from_json(text.as_bytes()).unwrap();
    assert_eq!(record.keyset_info, keyset.info());
    assert!(!text.contains("material"));
}

#[tokio::test]
async fn test_tampered_header_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manager = init_keyset_manager();
    let master = MasterKey::generate();
    let path = dir.path().join("aead.json");

    let v1 = manager
        .generate_new_symmetric(AeadVariant::Aes256Gcm)
        .await
        .unwrap();
    let v2 = manager.add(&v1, AeadVariant::Aes256Gcm).await.unwrap();
    manager.save_encrypted(&v2, &path, &master).await.unwrap();

    let text = tokio::fs::read_to_string(&path).await.unwrap();
    let mut record = EncryptedKeysetRecord::from_json(text.as_bytes()).unwrap();
    record.keyset_info.primary_key_id = Some(KeyId::new(2).unwrap());
    tokio::fs::write(&path, record.to_json().unwrap()).await.unwrap();

    let err = manager
        .read_encrypted::<Aead>(&path, &master)
        .await
        .unwrap_err();
    assert!(matches!(err, KeyError::Decryption(_)));
}

#[tokio::test]
async fn test_family_mismatch_on_read() {
    let dir = TempDir::new().unwrap();
    let manager = init_keyset_manager();
    let master = MasterKey::generate();
    let path = dir.path().join("sign.json");

    let keyset = manager
        .generate_new_asymmetric(SignatureVariant::Ed25519)
        .await
        .unwrap()
        .into_keyset();
    manager.save_encrypted(&keyset, &path, &master).await.unwrap();

    assert!(manager.read_encrypted::<Aead>(&path, &master).await.is_err());
    assert!(manager
        .read_encrypted::<HybridEncryption>(&path, &master)
        .await
        .is_err());
    assert!(manager
        .read_encrypted::<Signature>(&path, &master)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cleartext_requires_acknowledgement() {
    let dir = TempDir::new().unwrap();
    let manager = init_keyset_manager();
    let path = dir.path().join("clear.json");

    let keyset = manager
        .generate_new_symmetric(AeadVariant::ChaCha20Poly1305)
        .await
        .unwrap();
    let read = acknowledge_cleartext_risk(|cap: CleartextAllowed<Keyset<Aead>>| {
        let manager = manager.clone();
        let keyset = keyset.clone();
        let path = path.clone();
        async move {
            manager.save_cleartext(&keyset, &path, cap).await?;
            manager.read_cleartext(&path, cap).await
        }
    })
    .await
    .unwrap();
    assert_eq!(read.info(), keyset.info());
}

#[tokio::test]
async fn test_public_keyset_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let manager = init_keyset_manager();
    let path = dir.path().join("hybrid.pub.json");

    let private = manager
        .generate_new_asymmetric(HybridVariant::X25519HkdfSha256Aes256Gcm)
        .await
        .unwrap();
    manager.save_public(private.public(), &path).await.unwrap();

    let read = manager
        .read_public::<HybridEncryption>(&path)
        .await
        .unwrap();
    assert_eq!(read.keys(), private.public().keys());
    assert!(manager.read_public::<Signature>(&path).await.is_err());
}

#[tokio::test]
async fn test_bootstrap_from_config() {
    let dir = TempDir::new().unwrap();
    let config = config_for(
        &dir,
        &[
            ("KEYSMITH_MASTER_KEY", "bootstrap-secret"),
            ("KEYSMITH_DEFAULT_AEAD", "chacha20-poly1305"),
        ],
    );
    let manager = init_keyset_manager();
    let master = master_key_or_generate(config.master_key());
    let variant = AeadVariant::from_name(&config.default_variants().aead).unwrap();
    let path = config.keyset_path("service.json");

    let first = load_or_generate_symmetric(&manager, &path, &master, variant)
        .await
        .unwrap();
    assert_eq!(
        first.primary_template().map(|t| t.variant),
        Some("chacha20-poly1305")
    );

    // A restart with the same secret reads the stored keyset back
    let restarted = master_key_or_generate(config.master_key());
    let second = load_or_generate_symmetric(&manager, &path, &restarted, variant)
        .await
        .unwrap();
    assert_eq!(second.info(), first.info());
}

#[tokio::test]
async fn test_bootstrap_asymmetric_keeps_existing_file() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, &[]);
    let manager = init_keyset_manager();
    let master = MasterKey::generate();
    let variant = SignatureVariant::from_name(&config.default_variants().signature).unwrap();
    let path = config.keyset_path("signing.json");

    let first = load_or_generate_asymmetric(&manager, &path, &master, variant)
        .await
        .unwrap();
    let rotated = manager.rotate(&first, variant).await.unwrap();
    manager.save_encrypted(&rotated, &path, &master).await.unwrap();

    let loaded = load_or_generate_asymmetric(&manager, &path, &master, variant)
        .await
        .unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded.primary_key_id(), KeyId::new(2).ok());
}
