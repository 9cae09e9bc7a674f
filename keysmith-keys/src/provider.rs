//! Crypto provider interface
//!
//! The keyset manager never touches algorithms directly. A provider
//! materializes keys for a template, derives public halves, and converts
//! handles to and from bytes. Implementations:
//! - Local in-process provider ([`LocalCryptoProvider`](crate::local_provider::LocalCryptoProvider))
//! - HSM or remote KMS backends can implement the same trait
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


use crate::error::KeyResult;
use crate::handle::{KeyData, KeysetBuilder, KeysetHandle};
use crate::template::KeyTemplate;
use async_trait::async_trait;
use keysmith_types::KeyId;

/// Trait for crypto provider backends
#[async_trait]
pub trait CryptoProvider: Send + Sync {
    /// Short backend name used in log fields
    fn name(&self) -> &'static str;

    /// Generate fresh material for `template` under the given id
    async fn new_key(&self, template: &'static KeyTemplate, id: KeyId) -> KeyResult<KeyData>;

    /// Derive the public key bytes of an asymmetric private key
    async fn public_key(&self, key: &KeyData) -> KeyResult<Vec<u8>>;

    /// Cleartext serialization of a handle, including secret material
    async fn serialize(&self, handle: &KeysetHandle) -> KeyResult<Vec<u8>>;

    /// Inverse of [`serialize`](Self::serialize)
    async fn deserialize(&self, bytes: &[u8]) -> KeyResult<KeysetHandle>;

    /// A fresh single-key handle whose only key is enabled and primary
    async fn generate(&self, template: &'static KeyTemplate) -> KeyResult<KeysetHandle> {
        let key = self.new_key(template, KeyId::FIRST).await?;
        KeysetHandle::with_primary(key)
    }

    /// Working copy seeded from an existing handle
    fn builder(&self, handle: &KeysetHandle) -> KeysetBuilder {
        KeysetBuilder::from_handle(handle)
    }
}
