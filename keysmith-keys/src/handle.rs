//! Opaque keyset handles and the copy-on-write builder
//!
//! A [`KeysetHandle`] owns key material. It is never modified after
//! construction: every change goes through a [`KeysetBuilder`] seeded
//! with a deep copy of an existing handle, which emits a new handle.
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
use crate::lifecycle::{self, Operation, Outcome};
use crate::template::KeyTemplate;
use keysmith_types::{validate_entries, KeyId, KeyInfo, KeyStatus, KeysetInfo};
use std::fmt;
use zeroize::Zeroizing;

/// Secret key bytes, zeroized on drop
#[derive(Clone)]
pub struct KeyMaterial(Zeroizing<Vec<u8>>);

impl KeyMaterial {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {}])", self.0.len())
    }
}

/// One key version inside a handle
#[derive(Debug, Clone)]
pub struct KeyData {
    id: KeyId,
    status: KeyStatus,
    template: &'static KeyTemplate,
    created_at: i64,
    material: Option<KeyMaterial>,
}

impl KeyData {
    /// A freshly generated, enabled key
    pub fn new(id: KeyId, template: &'static KeyTemplate, material: KeyMaterial) -> Self {
        Self {
            id,
            status: KeyStatus::Enabled,
            template,
            created_at: chrono::Utc::now().timestamp(),
            material: Some(material),
        }
    }

    /// Rebuild a key from stored fields
    pub fn restore(
        id: KeyId,
        status: KeyStatus,
        template: &'static KeyTemplate,
        created_at: i64,
        material: Option<KeyMaterial>,
    ) -> KeyResult<Self> {
        match (status, &material) {
            (KeyStatus::Destroyed, Some(_)) => Err(KeyError::Format(format!(
                "destroyed key {} carries material",
                id
            ))),
            (KeyStatus::Enabled | KeyStatus::Disabled, None) => {
                Err(KeyError::Format(format!("key {} has no material", id)))
            }
            _ => Ok(Self {
                id,
                status,
                template,
                created_at,
                material,
            }),
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

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Secret material; `None` once destroyed
    pub fn material(&self) -> Option<&KeyMaterial> {
        self.material.as_ref()
    }

    pub fn info(&self) -> KeyInfo {
        KeyInfo {
            id: self.id,
            status: self.status,
            family: self.template.family,
            variant: self.template.variant.to_string(),
            type_url: self.template.type_url.to_string(),
            created_at: self.created_at,
        }
    }
}

/// Provider-side keyset state
#[derive(Debug, Clone)]
pub struct KeysetHandle {
    primary: Option<KeyId>,
    next_key_id: KeyId,
    keys: Vec<KeyData>,
}

impl KeysetHandle {
    /// A single-key handle with that key as primary
    pub fn with_primary(key: KeyData) -> KeyResult<Self> {
        let next_key_id = key
            .id
            .next()
            .ok_or_else(|| KeyError::Generation("key id space exhausted".to_string()))?;
        Self::from_parts(Some(key.id), next_key_id, vec![key])
    }

    /// Assemble a handle from stored parts, checking keyset invariants
    pub fn from_parts(
        primary: Option<KeyId>,
        next_key_id: KeyId,
        keys: Vec<KeyData>,
    ) -> KeyResult<Self> {
        validate_entries(primary, keys.iter().map(|k| (k.id, k.status)))?;
        if let Some(key) = keys.iter().find(|k| k.id >= next_key_id) {
            return Err(KeyError::Format(format!(
                "key {} is not below next key id {}",
                key.id, next_key_id
            )));
        }
        Ok(Self {
            primary,
            next_key_id,
            keys,
        })
    }

    pub fn primary(&self) -> Option<KeyId> {
        self.primary
    }

    pub fn primary_key(&self) -> Option<&KeyData> {
        self.primary.and_then(|id| self.key(id))
    }

    pub fn next_key_id(&self) -> KeyId {
        self.next_key_id
    }

    pub fn keys(&self) -> &[KeyData] {
        &self.keys
    }

    pub fn key(&self, id: KeyId) -> Option<&KeyData> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub fn info(&self) -> KeysetInfo {
        KeysetInfo {
            primary_key_id: self.primary,
            keys: self.keys.iter().map(KeyData::info).collect(),
        }
    }
}

/// Working copy of a keyset. Mutations here never reach the handle it was
/// seeded from.
#[derive(Debug)]
pub struct KeysetBuilder {
    primary: Option<KeyId>,
    next_key_id: KeyId,
    keys: Vec<KeyData>,
}

impl KeysetBuilder {
    pub fn from_handle(handle: &KeysetHandle) -> Self {
        Self {
            primary: handle.primary,
            next_key_id: handle.next_key_id,
            keys: handle.keys.clone(),
        }
    }

    /// Reserve the next key id of this lineage
    pub fn allocate_id(&mut self) -> KeyResult<KeyId> {
        let id = self.next_key_id;
        self.next_key_id = id
            .next()
            .ok_or_else(|| KeyError::Generation("key id space exhausted".to_string()))?;
        Ok(id)
    }

    /// Append a key whose id came from [`allocate_id`](Self::allocate_id)
    pub fn add_key(&mut self, key: KeyData) -> KeyResult<()> {
        if key.id >= self.next_key_id || self.keys.iter().any(|k| k.id == key.id) {
            return Err(KeyError::Generation(format!(
                "key id {} was not allocated by this keyset",
                key.id
            )));
        }
        self.keys.push(key);
        Ok(())
    }

    /// Apply one lifecycle operation to key `id`
    pub fn apply(&mut self, op: Operation, id: KeyId) -> KeyResult<Outcome> {
        let is_primary = self.primary == Some(id);
        let index = self
            .keys
            .iter()
            .position(|k| k.id == id)
            .ok_or(KeyError::UnknownKeyId(id))?;

        let outcome = lifecycle::check(op, id, self.keys[index].status, is_primary)?;
        match outcome {
            Outcome::Status(status) => {
                let key = &mut self.keys[index];
                key.status = status;
                if status == KeyStatus::Destroyed {
                    key.material = None;
                }
            }
            Outcome::Promote => self.primary = Some(id),
            Outcome::Remove => {
                self.keys.remove(index);
            }
            Outcome::Unchanged => {}
        }
        Ok(outcome)
    }

    pub fn build(self) -> KeyResult<KeysetHandle> {
        KeysetHandle::from_parts(self.primary, self.next_key_id, self.keys)
    }
}
