//! Error types for keyset management
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


use keysmith_types::{KeyId, KeyStatus, TypesError};
use thiserror::Error;

/// Keyset management errors
#[derive(Error, Debug)]
pub enum KeyError {
    /// The template registry has no entry for the requested variant.
    /// Reaching this through typed variants is a programming error.
    #[error("Unsupported {family} variant: {variant}")]
    UnsupportedVariant { family: String, variant: String },

    #[error("Key generation failed: {0}")]
    Generation(String),

    #[error("Public key derivation failed: {0}")]
    PublicDerivation(String),

    #[error("Unknown key id: {0}")]
    UnknownKeyId(KeyId),

    #[error("Invalid transition: cannot {operation} key {id} ({status}): {reason}")]
    InvalidTransition {
        id: KeyId,
        status: KeyStatus,
        operation: &'static str,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid keyset format: {0}")]
    Format(String),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Decryption error: {0}")]
    Decryption(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl KeyError {
    /// Errors that indicate a bug rather than a bad request or environment
    pub fn is_fatal(&self) -> bool {
        matches!(self, KeyError::UnsupportedVariant { .. })
    }
}

impl From<TypesError> for KeyError {
    fn from(err: TypesError) -> Self {
        KeyError::Format(err.to_string())
    }
}

impl From<serde_json::Error> for KeyError {
    fn from(err: serde_json::Error) -> Self {
        KeyError::Format(err.to_string())
    }
}

/// Result type for keyset operations
pub type KeyResult<T> = Result<T, KeyError>;
