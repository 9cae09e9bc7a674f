//! Key identifiers, lifecycle status and algorithm families
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
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one key version within a keyset.
///
/// Always positive. Ids are allocated from a per-keyset counter and are
/// never handed out twice within the same keyset lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct KeyId(u32);

impl KeyId {
    /// First id handed out in a fresh keyset
    pub const FIRST: KeyId = KeyId(1);

    pub fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(TypesError::InvalidKeyId(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// The id following this one, or `None` once the id space is exhausted
    pub fn next(self) -> Option<KeyId> {
        self.0.checked_add(1).map(KeyId)
    }
}

impl TryFrom<u32> for KeyId {
    type Error = TypesError;

    fn try_from(value: u32) -> Result<Self> {
        KeyId::new(value)
    }
}

impl From<KeyId> for u32 {
    fn from(id: KeyId) -> Self {
        id.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a single key version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Usable; may be primary
    Enabled,
    /// Kept for reference, not usable until re-enabled
    Disabled,
    /// Material erased. Terminal.
    Destroyed,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Enabled => "enabled",
            KeyStatus::Disabled => "disabled",
            KeyStatus::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Algorithm family of a keyset, as a runtime tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyKind {
    /// Authenticated encryption with associated data
    Aead,
    /// Message authentication codes
    Mac,
    /// Digital signatures
    Signature,
    /// Public-key (hybrid) encryption
    HybridEncryption,
}

impl FamilyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyKind::Aead => "aead",
            FamilyKind::Mac => "mac",
            FamilyKind::Signature => "signature",
            FamilyKind::HybridEncryption => "hybrid_encryption",
        }
    }

    /// Whether keys of this family have a public half
    pub fn is_asymmetric(&self) -> bool {
        matches!(self, FamilyKind::Signature | FamilyKind::HybridEncryption)
    }
}

impl fmt::Display for FamilyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FamilyKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "aead" => Ok(FamilyKind::Aead),
            "mac" => Ok(FamilyKind::Mac),
            "signature" => Ok(FamilyKind::Signature),
            "hybrid" | "hybrid_encryption" => Ok(FamilyKind::HybridEncryption),
            other => Err(TypesError::Validation(format!("Unknown family: {}", other))),
        }
    }
}
