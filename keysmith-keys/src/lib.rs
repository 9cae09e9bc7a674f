//! Keyset management for Keysmith
//!
//! Versioned keysets of a single algorithm family with per-key lifecycle
//! state, copy-on-write mutation, and persistence that is encrypted by
//! default and cleartext only behind an explicit capability.
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


pub mod envelope;
pub mod error;
pub mod family;
pub mod gate;
pub mod handle;
pub mod keyset;
pub mod lifecycle;
pub mod local_provider;
pub mod manager;
pub mod provider;
pub mod service_integration;
pub mod storage;
pub mod template;

pub use envelope::MasterKey;
pub use error::{KeyError, KeyResult};
pub use family::{
    Aead, AeadVariant, AsymmetricFamily, Family, HybridEncryption, HybridVariant, Mac, MacVariant,
    Signature, SignatureVariant, SymmetricFamily, Variant,
};
pub use gate::{acknowledge_cleartext_risk, CleartextAllowed};
pub use handle::{KeyData, KeyMaterial, KeysetBuilder, KeysetHandle};
pub use keyset::{Keyset, PrivateKeyset, PublicKeyEntry, PublicKeyset};
pub use keysmith_types::{FamilyKind, KeyId, KeyStatus, KeysetInfo};
pub use local_provider::LocalCryptoProvider;
pub use manager::KeysetManager;
pub use provider::CryptoProvider;
pub use service_integration::*;
pub use template::KeyTemplate;
