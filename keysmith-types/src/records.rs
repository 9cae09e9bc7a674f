//! Serialized keyset records and material-free keyset views
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


use crate::error::{Result, TypesError};
use crate::key::{FamilyKind, KeyId, KeyStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current layout version of every record in this module
pub const RECORD_VERSION: u32 = 1;

/// One key version as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: KeyId,
    pub status: KeyStatus,
    pub type_url: String,
    /// Unix timestamp (seconds) of key generation
    pub created_at: i64,
    /// Hex-encoded key material; absent once the key is destroyed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

/// Cleartext keyset layout written by the local crypto provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetRecord {
    pub version: u32,
    pub primary_key_id: Option<KeyId>,
    /// Next id to allocate. Greater than every id ever used in this keyset.
    pub next_key_id: KeyId,
    pub keys: Vec<KeyRecord>,
}

impl KeysetRecord {
    /// Decode and validate a record
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: KeysetRecord = serde_json::from_slice(bytes)?;
        if record.version != RECORD_VERSION {
            return Err(TypesError::UnsupportedVersion(record.version));
        }
        record.validate()?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Check the structural keyset invariants
    pub fn validate(&self) -> Result<()> {
        validate_entries(
            self.primary_key_id,
            self.keys.iter().map(|k| (k.id, k.status)),
        )?;

        for key in &self.keys {
            if key.id >= self.next_key_id {
                return Err(TypesError::Validation(format!(
                    "key {} is not below next_key_id {}",
                    key.id, self.next_key_id
                )));
            }
            match (key.status, &key.material) {
                (KeyStatus::Destroyed, Some(_)) => {
                    return Err(TypesError::Validation(format!(
                        "destroyed key {} still carries material",
                        key.id
                    )));
                }
                (KeyStatus::Enabled | KeyStatus::Disabled, None) => {
                    return Err(TypesError::Validation(format!(
                        "key {} has no material",
                        key.id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Checks id uniqueness and the primary-key rules over `(id, status)` pairs.
///
/// The primary, when set, must name an Enabled key. When any key is
/// Enabled a primary must be set.
pub fn validate_entries(
    primary: Option<KeyId>,
    entries: impl IntoIterator<Item = (KeyId, KeyStatus)>,
) -> Result<()> {
    let mut seen = HashSet::new();
    let mut any_enabled = false;
    let mut primary_status = None;

    for (id, status) in entries {
        if !seen.insert(id) {
            return Err(TypesError::Validation(format!("duplicate key id {}", id)));
        }
        any_enabled |= status == KeyStatus::Enabled;
        if Some(id) == primary {
            primary_status = Some(status);
        }
    }

    match (primary, primary_status) {
        (Some(id), None) => Err(TypesError::Validation(format!(
            "primary key {} is not in the keyset",
            id
        ))),
        (Some(id), Some(status)) if status != KeyStatus::Enabled => Err(TypesError::Validation(
            format!("primary key {} is {}", id, status),
        )),
        (None, _) if any_enabled => Err(TypesError::Validation(
            "keyset has enabled keys but no primary".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Material-free description of one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub id: KeyId,
    pub status: KeyStatus,
    pub family: FamilyKind,
    pub variant: String,
    pub type_url: String,
    pub created_at: i64,
}

/// Material-free description of a keyset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysetInfo {
    pub primary_key_id: Option<KeyId>,
    pub keys: Vec<KeyInfo>,
}

impl KeysetInfo {
    pub fn key(&self, id: KeyId) -> Option<&KeyInfo> {
        self.keys.iter().find(|k| k.id == id)
    }

    pub fn ids(&self) -> Vec<KeyId> {
        self.keys.iter().map(|k| k.id).collect()
    }

    pub fn status_of(&self, id: KeyId) -> Option<KeyStatus> {
        self.key(id).map(|k| k.status)
    }
}

/// Public half of one asymmetric key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    pub id: KeyId,
    pub status: KeyStatus,
    pub type_url: String,
    /// Hex-encoded public key bytes
    pub public_key: String,
}

/// Public keyset layout; contains no secret material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeysetRecord {
    pub version: u32,
    pub family: FamilyKind,
    pub primary_key_id: Option<KeyId>,
    pub keys: Vec<PublicKeyRecord>,
}

impl PublicKeysetRecord {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: PublicKeysetRecord = serde_json::from_slice(bytes)?;
        if record.version != RECORD_VERSION {
            return Err(TypesError::UnsupportedVersion(record.version));
        }
        validate_entries(
            record.primary_key_id,
            record.keys.iter().map(|k| (k.id, k.status)),
        )?;
        Ok(record)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Envelope for a keyset encrypted under a master key.
///
/// The info header is readable without the master key so tooling can list
/// keys; it carries no material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKeysetRecord {
    pub version: u32,
    pub keyset_info: KeysetInfo,
    /// Hex-encoded nonce || ciphertext
    pub ciphertext: String,
}

impl EncryptedKeysetRecord {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let record: EncryptedKeysetRecord = serde_json::from_slice(bytes)?;
        if record.version != RECORD_VERSION {
            return Err(TypesError::UnsupportedVersion(record.version));
        }
        Ok(record)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}
