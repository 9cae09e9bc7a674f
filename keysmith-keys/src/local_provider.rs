//! In-process crypto provider
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::{KeyError, KeyResult};
use crate::handle::{KeyData, KeyMaterial, KeysetHandle};
use crate::provider::CryptoProvider;
use crate::template::{self, KeyTemplate, Primitive};
use aes_gcm::aead::KeyInit;
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use async_trait::async_trait;
use chacha20poly1305::ChaCha20Poly1305;
use ed25519_dalek::SigningKey;
use keysmith_types::{KeyId, KeyRecord, KeysetRecord, RECORD_VERSION};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Provider generating key material in process with the RustCrypto and
/// dalek crates. Stateless; cheap to share.
#[derive(Debug, Default, Clone)]
pub struct LocalCryptoProvider;

impl LocalCryptoProvider {
    pub fn new() -> Self {
        Self
    }

    fn generate_material(template: &KeyTemplate) -> Vec<u8> {
        match template.primitive {
            Primitive::Aes128Gcm => Aes128Gcm::generate_key(&mut OsRng).to_vec(),
            Primitive::Aes256Gcm => Aes256Gcm::generate_key(&mut OsRng).to_vec(),
            Primitive::ChaCha20Poly1305 => ChaCha20Poly1305::generate_key(&mut OsRng).to_vec(),
            Primitive::HmacSha256 | Primitive::HmacSha512 => {
                let mut key = vec![0u8; template.key_size];
                OsRng.fill_bytes(&mut key);
                key
            }
            Primitive::Ed25519 => SigningKey::generate(&mut OsRng).to_bytes().to_vec(),
            Primitive::X25519 => StaticSecret::random_from_rng(&mut OsRng).to_bytes().to_vec(),
        }
    }

    /// Size the primitive actually requires
    fn required_size(primitive: Primitive) -> Option<usize> {
        match primitive {
            Primitive::Aes128Gcm => Some(16),
            Primitive::Aes256Gcm | Primitive::ChaCha20Poly1305 => Some(32),
            Primitive::Ed25519 | Primitive::X25519 => Some(32),
            // HMAC accepts any key length
            Primitive::HmacSha256 | Primitive::HmacSha512 => None,
        }
    }

    fn secret_32(key: &KeyData) -> KeyResult<Zeroizing<[u8; 32]>> {
        let material = key.material().ok_or_else(|| {
            KeyError::PublicDerivation(format!("key {} has no material", key.id()))
        })?;
        let bytes: [u8; 32] = material.expose().try_into().map_err(|_| {
            KeyError::PublicDerivation(format!(
                "key {} has {} bytes of material, expected 32",
                key.id(),
                material.len()
            ))
        })?;
        Ok(Zeroizing::new(bytes))
    }

    fn decode_key(record: &KeyRecord) -> KeyResult<KeyData> {
        let template = template::by_type_url(&record.type_url)
            .map_err(|_| KeyError::Format(format!("unknown key type: {}", record.type_url)))?;

        let material = match &record.material {
            Some(encoded) => {
                let bytes = hex::decode(encoded).map_err(|e| {
                    KeyError::Format(format!("key {} material is not hex: {}", record.id, e))
                })?;
                if bytes.len() != template.key_size {
                    return Err(KeyError::Format(format!(
                        "key {} has {} bytes of material, expected {}",
                        record.id,
                        bytes.len(),
                        template.key_size
                    )));
                }
                Some(KeyMaterial::new(bytes))
            }
            None => None,
        };

        KeyData::restore(record.id, record.status, template, record.created_at, material)
    }
}

#[async_trait]
impl CryptoProvider for LocalCryptoProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn new_key(&self, template: &'static KeyTemplate, id: KeyId) -> KeyResult<KeyData> {
        if let Some(required) = Self::required_size(template.primitive) {
            if template.key_size != required {
                return Err(KeyError::Generation(format!(
                    "{} requires a {}-byte key, template asks for {}",
                    template.variant, required, template.key_size
                )));
            }
        }
        if template.key_size == 0 {
            return Err(KeyError::Generation(format!(
                "{} template has an empty key size",
                template.variant
            )));
        }

        let material = KeyMaterial::new(Self::generate_material(template));
        debug!(key_id = %id, variant = template.variant, "Generated key material");
        Ok(KeyData::new(id, template, material))
    }

    async fn public_key(&self, key: &KeyData) -> KeyResult<Vec<u8>> {
        match key.template().primitive {
            Primitive::Ed25519 => {
                let secret = Self::secret_32(key)?;
                let signing = SigningKey::from_bytes(&secret);
                Ok(signing.verifying_key().to_bytes().to_vec())
            }
            Primitive::X25519 => {
                let secret = StaticSecret::from(*Self::secret_32(key)?);
                Ok(X25519PublicKey::from(&secret).to_bytes().to_vec())
            }
            _ => Err(KeyError::PublicDerivation(format!(
                "{} keys have no public half",
                key.template().variant
            ))),
        }
    }

    async fn serialize(&self, handle: &KeysetHandle) -> KeyResult<Vec<u8>> {
        let record = KeysetRecord {
            version: RECORD_VERSION,
            primary_key_id: handle.primary(),
            next_key_id: handle.next_key_id(),
            keys: handle
                .keys()
                .iter()
                .map(|k| KeyRecord {
                    id: k.id(),
                    status: k.status(),
                    type_url: k.template().type_url.to_string(),
                    created_at: k.created_at(),
                    material: k.material().map(|m| hex::encode(m.expose())),
                })
                .collect(),
        };
        Ok(record.to_json()?)
    }

    async fn deserialize(&self, bytes: &[u8]) -> KeyResult<KeysetHandle> {
        let record = KeysetRecord::from_json(bytes)?;
        let keys = record
            .keys
            .iter()
            .map(Self::decode_key)
            .collect::<KeyResult<Vec<_>>>()?;
        KeysetHandle::from_parts(record.primary_key_id, record.next_key_id, keys)
    }
}
