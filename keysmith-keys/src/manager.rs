//! Keyset manager: generation, lifecycle mutations and persistence
//!
//! Every mutation follows the same copy-on-write protocol: validate the
//! requested transition against the current state, seed a provider
//! builder from the current handle, apply the single change, and wrap
//! the emitted handle in a new [`Keyset`]. The input keyset is never
//! touched.
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


use crate::envelope::MasterKey;
use crate::error::{KeyError, KeyResult};
use crate::family::{AsymmetricFamily, Family, SymmetricFamily, Variant};
use crate::gate::CleartextAllowed;
use crate::keyset::{Keyset, PrivateKeyset, PublicKeyEntry, PublicKeyset};
use crate::lifecycle::{self, Operation};
use crate::provider::CryptoProvider;
use crate::storage;
use keysmith_types::{EncryptedKeysetRecord, KeyId, KeysetInfo, PublicKeysetRecord, RECORD_VERSION};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keyset mutation engine on top of a crypto provider backend
#[derive(Clone)]
pub struct KeysetManager {
    provider: Arc<dyn CryptoProvider>,
}

impl KeysetManager {
    /// Create a new keyset manager with a provider backend
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self { provider }
    }

    /// Generate a single-key symmetric keyset
    pub async fn generate_new_symmetric<V>(&self, variant: V) -> KeyResult<Keyset<V::Family>>
    where
        V: Variant,
        V::Family: SymmetricFamily,
    {
        let family = <V::Family as Family>::KIND;
        let handle = self.provider.generate(variant.template()).await?;
        info!(
            family = %family,
            variant = variant.name(),
            provider = self.provider.name(),
            "Generated keyset"
        );
        Keyset::from_handle(handle)
    }

    /// Generate a single-key asymmetric keyset and derive its public keyset
    pub async fn generate_new_asymmetric<V>(
        &self,
        variant: V,
    ) -> KeyResult<PrivateKeyset<V::Family>>
    where
        V: Variant,
        V::Family: AsymmetricFamily,
    {
        let family = <V::Family as Family>::KIND;
        let handle = self.provider.generate(variant.template()).await?;
        let keyset = Keyset::from_handle(handle)?;
        let public = self.public_keyset(&keyset).await?;
        info!(
            family = %family,
            variant = variant.name(),
            provider = self.provider.name(),
            "Generated keyset with public keyset"
        );
        Ok(PrivateKeyset::new(keyset, public))
    }

    /// Append a new enabled, non-primary key
    pub async fn add<F: Family>(&self, keyset: &Keyset<F>, variant: F::Variant) -> KeyResult<Keyset<F>> {
        let (next, id) = self.add_key(keyset, variant).await?;
        info!(family = %F::KIND, key_id = %id, variant = variant.name(), "Added key");
        Ok(next)
    }

    /// Add a new key and make it primary in one step.
    ///
    /// The previous primary stays enabled so existing data keeps verifying.
    pub async fn rotate<F: Family>(&self, keyset: &Keyset<F>, variant: F::Variant) -> KeyResult<Keyset<F>> {
        let (added, id) = self.add_key(keyset, variant).await?;
        let mut builder = self.provider.builder(added.handle());
        builder.apply(Operation::SetPrimary, id)?;
        let rotated = Keyset::from_handle(builder.build()?)?;
        info!(
            family = %F::KIND,
            old_primary = ?keyset.primary_key_id(),
            new_primary = %id,
            "Rotated keyset"
        );
        Ok(rotated)
    }

    /// Disabled → Enabled. Already enabled keys are returned unchanged.
    pub fn enable<F: Family>(&self, keyset: &Keyset<F>, id: KeyId) -> KeyResult<Keyset<F>> {
        self.transition(keyset, Operation::Enable, id)
    }

    /// Enabled → Disabled. The primary cannot be disabled.
    pub fn disable<F: Family>(&self, keyset: &Keyset<F>, id: KeyId) -> KeyResult<Keyset<F>> {
        self.transition(keyset, Operation::Disable, id)
    }

    /// Move the primary designation to an enabled key
    pub fn set_primary<F: Family>(&self, keyset: &Keyset<F>, id: KeyId) -> KeyResult<Keyset<F>> {
        self.transition(keyset, Operation::SetPrimary, id)
    }

    /// Remove a disabled or destroyed key's entry
    pub fn delete<F: Family>(&self, keyset: &Keyset<F>, id: KeyId) -> KeyResult<Keyset<F>> {
        self.transition(keyset, Operation::Delete, id)
    }

    /// Erase a non-primary key's material, keeping its entry
    pub fn destroy<F: Family>(&self, keyset: &Keyset<F>, id: KeyId) -> KeyResult<Keyset<F>> {
        self.transition(keyset, Operation::Destroy, id)
    }

    /// Derive the public keyset of an asymmetric keyset.
    ///
    /// Destroyed keys have no material and are left out.
    pub async fn public_keyset<F: AsymmetricFamily>(&self, keyset: &Keyset<F>) -> KeyResult<PublicKeyset<F>> {
        let mut entries = Vec::with_capacity(keyset.len());
        for key in keyset.handle().keys() {
            if key.material().is_none() {
                continue;
            }
            let public_key = self.provider.public_key(key).await?;
            entries.push(PublicKeyEntry::new(key.id(), key.status(), key.template(), public_key));
        }
        PublicKeyset::new(keyset.primary_key_id(), entries)
            .map_err(|e| KeyError::PublicDerivation(e.to_string()))
    }

    /// Read an unencrypted keyset file
    pub async fn read_cleartext<F: Family>(
        &self,
        path: impl AsRef<Path>,
        _cleartext: CleartextAllowed<Keyset<F>>,
    ) -> KeyResult<Keyset<F>> {
        let path = path.as_ref();
        let bytes = storage::read_file(path).await?;
        let keyset = Keyset::from_handle(self.provider.deserialize(&bytes).await?)?;
        warn!(path = %path.display(), family = %F::KIND, "Read cleartext keyset");
        Ok(keyset)
    }

    /// Write a keyset unencrypted
    pub async fn save_cleartext<F: Family>(
        &self,
        keyset: &Keyset<F>,
        path: impl AsRef<Path>,
        _cleartext: CleartextAllowed<Keyset<F>>,
    ) -> KeyResult<()> {
        let path = path.as_ref();
        let bytes = zeroize::Zeroizing::new(self.provider.serialize(keyset.handle()).await?);
        storage::write_file(path, &bytes).await?;
        warn!(path = %path.display(), family = %F::KIND, "Wrote cleartext keyset");
        Ok(())
    }

    /// Write a keyset encrypted under `master_key`
    pub async fn save_encrypted<F: Family>(
        &self,
        keyset: &Keyset<F>,
        path: impl AsRef<Path>,
        master_key: &MasterKey,
    ) -> KeyResult<()> {
        let path = path.as_ref();
        let keyset_info = keyset.info();
        let aad = serde_json::to_vec(&keyset_info)?;
        let plaintext = zeroize::Zeroizing::new(self.provider.serialize(keyset.handle()).await?);
        let sealed = master_key.seal(&plaintext, &aad)?;

        let record = EncryptedKeysetRecord {
            version: RECORD_VERSION,
            keyset_info,
            ciphertext: hex::encode(sealed),
        };
        storage::write_file(path, &record.to_json()?).await?;
        info!(
            path = %path.display(),
            family = %F::KIND,
            master_key = %master_key.fingerprint(),
            "Wrote encrypted keyset"
        );
        Ok(())
    }

    /// Read a keyset written by [`save_encrypted`](Self::save_encrypted)
    pub async fn read_encrypted<F: Family>(
        &self,
        path: impl AsRef<Path>,
        master_key: &MasterKey,
    ) -> KeyResult<Keyset<F>> {
        let path = path.as_ref();
        let record = EncryptedKeysetRecord::from_json(&storage::read_file(path).await?)?;
        let aad = serde_json::to_vec(&record.keyset_info)?;
        let sealed = hex::decode(&record.ciphertext)
            .map_err(|e| KeyError::Format(format!("ciphertext is not hex: {}", e)))?;
        let plaintext = master_key.open(&sealed, &aad)?;

        let keyset = Keyset::from_handle(self.provider.deserialize(&plaintext).await?)?;
        debug!(path = %path.display(), family = %F::KIND, keys = keyset.len(), "Read encrypted keyset");
        Ok(keyset)
    }

    /// Cleartext header of an encrypted keyset file, read without the master
    /// key. It is only authenticated once the keyset itself is read with
    /// [`read_encrypted`](Self::read_encrypted).
    pub async fn read_encrypted_info(&self, path: impl AsRef<Path>) -> KeyResult<KeysetInfo> {
        let record = EncryptedKeysetRecord::from_json(&storage::read_file(path.as_ref()).await?)?;
        Ok(record.keyset_info)
    }

    /// Write a public keyset; public material needs no protection
    pub async fn save_public<F: AsymmetricFamily>(
        &self,
        public: &PublicKeyset<F>,
        path: impl AsRef<Path>,
    ) -> KeyResult<()> {
        let path = path.as_ref();
        storage::write_file(path, &public.to_record().to_json()?).await?;
        info!(path = %path.display(), family = %F::KIND, "Wrote public keyset");
        Ok(())
    }

    pub async fn read_public<F: AsymmetricFamily>(&self, path: impl AsRef<Path>) -> KeyResult<PublicKeyset<F>> {
        let record = PublicKeysetRecord::from_json(&storage::read_file(path.as_ref()).await?)?;
        PublicKeyset::from_record(record)
    }

    async fn add_key<F: Family>(&self, keyset: &Keyset<F>, variant: F::Variant) -> KeyResult<(Keyset<F>, KeyId)> {
        let mut builder = self.provider.builder(keyset.handle());
        let id = builder.allocate_id()?;
        let key = self.provider.new_key(variant.template(), id).await?;
        builder.add_key(key)?;
        Ok((Keyset::from_handle(builder.build()?)?, id))
    }

    fn transition<F: Family>(&self, keyset: &Keyset<F>, op: Operation, id: KeyId) -> KeyResult<Keyset<F>> {
        let status = keyset.status(id).ok_or(KeyError::UnknownKeyId(id))?;
        let is_primary = keyset.primary_key_id() == Some(id);
        let outcome = lifecycle::check(op, id, status, is_primary).map_err(|e| {
            warn!(family = %F::KIND, key_id = %id, operation = %op, error = %e, "Rejected key transition");
            e
        })?;

        let mut builder = self.provider.builder(keyset.handle());
        builder.apply(op, id)?;
        let next = Keyset::from_handle(builder.build()?)?;

        info!(
            family = %F::KIND,
            key_id = %id,
            operation = %op,
            outcome = ?outcome,
            "Applied key transition"
        );
        Ok(next)
    }
}
