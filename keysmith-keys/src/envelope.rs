//! Master-key envelope encryption for keysets at rest
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
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

/// Length in bytes of a master key
pub const MASTER_KEY_LEN: usize = 32;

const NONCE_LEN: usize = 12;

/// Key-encryption key protecting keysets written to disk
pub struct MasterKey(Zeroizing<[u8; MASTER_KEY_LEN]>);

impl MasterKey {
    /// Use exactly 32 raw bytes
    pub fn from_bytes(bytes: &[u8]) -> KeyResult<Self> {
        if bytes.len() != MASTER_KEY_LEN {
            return Err(KeyError::Configuration(format!(
                "Master key must be exactly {} bytes, got {}",
                MASTER_KEY_LEN,
                bytes.len()
            )));
        }
        let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Build from a configured secret.
    ///
    /// A 64-character hex string is taken as the raw key; anything else is
    /// hashed with SHA-256.
    pub fn from_secret(secret: &str) -> Self {
        if let Ok(bytes) = hex::decode(secret) {
            let bytes = Zeroizing::new(bytes);
            if let Ok(key) = Self::from_bytes(&bytes) {
                return key;
            }
        }
        let hash = Sha256::digest(secret.as_bytes());
        let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        key.copy_from_slice(&hash);
        Self(key)
    }

    /// Fresh random master key
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        OsRng.fill_bytes(key.as_mut_slice());
        Self(key)
    }

    /// Short identifier safe to log: first 8 hex chars of SHA-256(key)
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        hex::encode(&digest[..4])
    }

    /// Encrypt `plaintext`, binding `aad`. Output is nonce || ciphertext.
    pub(crate) fn seal(&self, plaintext: &[u8], aad: &[u8]) -> KeyResult<Vec<u8>> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.0.as_slice()));
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, Payload { msg: plaintext, aad })
            .map_err(|e| KeyError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut result = nonce.to_vec();
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Inverse of [`seal`](Self::seal)
    pub(crate) fn open(&self, sealed: &[u8], aad: &[u8]) -> KeyResult<Zeroizing<Vec<u8>>> {
        if sealed.len() < NONCE_LEN {
            return Err(KeyError::Decryption("Encrypted data too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.0.as_slice()));

        let plaintext = cipher
            .decrypt(nonce, Payload { msg: ciphertext, aad })
            .map_err(|e| KeyError::Decryption(format!("Decryption failed: {}", e)))?;

        Ok(Zeroizing::new(plaintext))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey({})", self.fingerprint())
    }
}
