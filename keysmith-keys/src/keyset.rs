//! Immutable, family-typed keyset values
//!
//! The provider handle inside a [`Keyset`] stays private to this crate;
//! callers inspect keysets through material-free accessors and reach
//! cleartext bytes only through the gated manager methods.
//!
//! ```compile_fail
//! use keysmith_keys::{Aead, Keyset};
//!
//! fn leak(keyset: &Keyset<Aead>) -> usize {
//!     keyset.handle().keys().len()
//! }
//! ```
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
use crate::family::{AsymmetricFamily, Family};
use crate::handle::KeysetHandle;
use crate::template::{self, KeyTemplate};
use keysmith_types::{
    validate_entries, FamilyKind, KeyId, KeyStatus, KeysetInfo, PublicKeyRecord,
    PublicKeysetRecord, RECORD_VERSION,
};
use std::fmt;
use std::marker::PhantomData;

/// Snapshot of a keyset of family `F`.
///
/// Never modified in place; keyset manager operations return a new value
/// and leave this one valid but stale.
pub struct Keyset<F: Family> {
    handle: KeysetHandle,
    _family: PhantomData<fn() -> F>,
}

impl<F: Family> Keyset<F> {
    /// Wrap a provider handle, checking every key belongs to `F`
    pub(crate) fn from_handle(handle: KeysetHandle) -> KeyResult<Self> {
        if let Some(foreign) = handle.keys().iter().find(|k| k.template().family != F::KIND) {
            return Err(KeyError::Format(format!(
                "keyset contains {} key {}, expected {}",
                foreign.template().family,
                foreign.id(),
                F::KIND
            )));
        }
        Ok(Self {
            handle,
            _family: PhantomData,
        })
    }

    pub(crate) fn handle(&self) -> &KeysetHandle {
        &self.handle
    }

    pub fn family(&self) -> FamilyKind {
        F::KIND
    }

    pub fn primary_key_id(&self) -> Option<KeyId> {
        self.handle.primary()
    }

    /// Template of the primary key
    pub fn primary_template(&self) -> Option<&'static KeyTemplate> {
        self.handle.primary_key().map(|k| k.template())
    }

    pub fn key_ids(&self) -> Vec<KeyId> {
        self.handle.keys().iter().map(|k| k.id()).collect()
    }

    pub fn status(&self, id: KeyId) -> Option<KeyStatus> {
        self.handle.key(id).map(|k| k.status())
    }

    pub fn contains(&self, id: KeyId) -> bool {
        self.handle.key(id).is_some()
    }

    /// Whether key `id` still holds secret material; false once destroyed
    pub fn has_material(&self, id: KeyId) -> bool {
        self.handle
            .key(id)
            .map_or(false, |k| k.material().is_some())
    }

    pub fn len(&self) -> usize {
        self.handle.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.keys().is_empty()
    }

    /// Material-free description
    pub fn info(&self) -> KeysetInfo {
        self.handle.info()
    }
}

impl<F: Family> Clone for Keyset<F> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
            _family: PhantomData,
        }
    }
}

impl<F: Family> fmt::Debug for Keyset<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyset")
            .field("family", &F::KIND)
            .field("primary", &self.handle.primary())
            .field("keys", &self.handle.keys())
            .finish()
    }
}

/// Public half of one asymmetric key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyEntry {
    id: KeyId,
    status: KeyStatus,
    template: &'static KeyTemplate,
    public_key: Vec<u8>,
}

impl PublicKeyEntry {
    pub(crate) fn new(
        id: KeyId,
        status: KeyStatus,
        template: &'static KeyTemplate,
        public_key: Vec<u8>,
    ) -> Self {
        Self {
            id,
            status,
            template,
            public_key,
        }
    }

    pub fn id(&self) -> KeyId {
        self.id
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn template(&self) -> &'static KeyTemplate {
        self.template
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }
}

/// Public keys derived from a private keyset. Immutable; has no lifecycle
/// operations and no access to private material.
pub struct PublicKeyset<F: AsymmetricFamily> {
    primary: Option<KeyId>,
    keys: Vec<PublicKeyEntry>,
    _family: PhantomData<fn() -> F>,
}

impl<F: AsymmetricFamily> PublicKeyset<F> {
    pub(crate) fn new(primary: Option<KeyId>, keys: Vec<PublicKeyEntry>) -> KeyResult<Self> {
        validate_entries(primary, keys.iter().map(|k| (k.id, k.status)))?;
        if let Some(foreign) = keys.iter().find(|k| k.template.family != F::KIND) {
            return Err(KeyError::Format(format!(
                "public keyset contains {} key {}, expected {}",
                foreign.template.family, foreign.id, F::KIND
            )));
        }
        Ok(Self {
            primary,
            keys,
            _family: PhantomData,
        })
    }

    pub fn primary_key_id(&self) -> Option<KeyId> {
        self.primary
    }

    pub fn primary(&self) -> Option<&PublicKeyEntry> {
        self.primary.and_then(|id| self.key(id))
    }

    pub fn keys(&self) -> &[PublicKeyEntry] {
        &self.keys
    }

    pub fn key(&self, id: KeyId) -> Option<&PublicKeyEntry> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub(crate) fn to_record(&self) -> PublicKeysetRecord {
        PublicKeysetRecord {
            version: RECORD_VERSION,
            family: F::KIND,
            primary_key_id: self.primary,
            keys: self
                .keys
                .iter()
                .map(|k| PublicKeyRecord {
                    id: k.id,
                    status: k.status,
                    type_url: k.template.type_url.to_string(),
                    public_key: hex::encode(&k.public_key),
                })
                .collect(),
        }
    }

    pub(crate) fn from_record(record: PublicKeysetRecord) -> KeyResult<Self> {
        if record.family != F::KIND {
            return Err(KeyError::Format(format!(
                "public keyset is {}, expected {}",
                record.family,
                F::KIND
            )));
        }
        let keys = record
            .keys
            .into_iter()
            .map(|k| {
                let template = template::by_type_url(&k.type_url)
                    .map_err(|_| KeyError::Format(format!("unknown key type: {}", k.type_url)))?;
                let public_key = hex::decode(&k.public_key).map_err(|e| {
                    KeyError::Format(format!("public key {} is not hex: {}", k.id, e))
                })?;
                Ok(PublicKeyEntry::new(k.id, k.status, template, public_key))
            })
            .collect::<KeyResult<Vec<_>>>()?;
        Self::new(record.primary_key_id, keys)
    }
}

impl<F: AsymmetricFamily> Clone for PublicKeyset<F> {
    fn clone(&self) -> Self {
        Self {
            primary: self.primary,
            keys: self.keys.clone(),
            _family: PhantomData,
        }
    }
}

impl<F: AsymmetricFamily> fmt::Debug for PublicKeyset<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeyset")
            .field("family", &F::KIND)
            .field("primary", &self.primary)
            .field("keys", &self.keys)
            .finish()
    }
}

/// Private keyset together with the public keyset derived from it at
/// generation time
pub struct PrivateKeyset<F: AsymmetricFamily> {
    keyset: Keyset<F>,
    public: PublicKeyset<F>,
}

impl<F: AsymmetricFamily> PrivateKeyset<F> {
    pub(crate) fn new(keyset: Keyset<F>, public: PublicKeyset<F>) -> Self {
        Self { keyset, public }
    }

    pub fn keyset(&self) -> &Keyset<F> {
        &self.keyset
    }

    pub fn public(&self) -> &PublicKeyset<F> {
        &self.public
    }

    pub fn into_keyset(self) -> Keyset<F> {
        self.keyset
    }

    pub fn into_parts(self) -> (Keyset<F>, PublicKeyset<F>) {
        (self.keyset, self.public)
    }
}

impl<F: AsymmetricFamily> fmt::Debug for PrivateKeyset<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyset")
            .field("keyset", &self.keyset)
            .field("public", &self.public)
            .finish()
    }
}
