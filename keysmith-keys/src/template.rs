//! Key template registry
//!
//! Maps every declared (family, variant) pair to the parameters a crypto
//! provider needs to materialize a key of that type.
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
use keysmith_types::FamilyKind;

/// Concrete algorithm a provider instantiates for a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
    HmacSha256,
    HmacSha512,
    Ed25519,
    X25519,
}

/// Provider instantiation parameters for one algorithm variant
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct KeyTemplate {
    pub type_url: &'static str,
    pub family: FamilyKind,
    pub variant: &'static str,
    pub primitive: Primitive,
    /// Size in bytes of the secret material
    pub key_size: usize,
}

pub static AES128_GCM: KeyTemplate = KeyTemplate {
    type_url: "keysmith.aead.aes128-gcm",
    family: FamilyKind::Aead,
    variant: "aes128-gcm",
    primitive: Primitive::Aes128Gcm,
    key_size: 16,
};

pub static AES256_GCM: KeyTemplate = KeyTemplate {
    type_url: "keysmith.aead.aes256-gcm",
    family: FamilyKind::Aead,
    variant: "aes256-gcm",
    primitive: Primitive::Aes256Gcm,
    key_size: 32,
};

pub static CHACHA20_POLY1305: KeyTemplate = KeyTemplate {
    type_url: "keysmith.aead.chacha20-poly1305",
    family: FamilyKind::Aead,
    variant: "chacha20-poly1305",
    primitive: Primitive::ChaCha20Poly1305,
    key_size: 32,
};

pub static HMAC_SHA256: KeyTemplate = KeyTemplate {
    type_url: "keysmith.mac.hmac-sha256",
    family: FamilyKind::Mac,
    variant: "hmac-sha256",
    primitive: Primitive::HmacSha256,
    key_size: 32,
};

pub static HMAC_SHA512: KeyTemplate = KeyTemplate {
    type_url: "keysmith.mac.hmac-sha512",
    family: FamilyKind::Mac,
    variant: "hmac-sha512",
    primitive: Primitive::HmacSha512,
    key_size: 64,
};

pub static ED25519: KeyTemplate = KeyTemplate {
    type_url: "keysmith.signature.ed25519",
    family: FamilyKind::Signature,
    variant: "ed25519",
    primitive: Primitive::Ed25519,
    key_size: 32,
};

pub static X25519_HKDF_SHA256_AES128_GCM: KeyTemplate = KeyTemplate {
    type_url: "keysmith.hybrid.x25519-hkdf-sha256-aes128-gcm",
    family: FamilyKind::HybridEncryption,
    variant: "x25519-hkdf-sha256-aes128-gcm",
    primitive: Primitive::X25519,
    key_size: 32,
};

pub static X25519_HKDF_SHA256_AES256_GCM: KeyTemplate = KeyTemplate {
    type_url: "keysmith.hybrid.x25519-hkdf-sha256-aes256-gcm",
    family: FamilyKind::HybridEncryption,
    variant: "x25519-hkdf-sha256-aes256-gcm",
    primitive: Primitive::X25519,
    key_size: 32,
};

static REGISTRY: [&KeyTemplate; 8] = [
    &AES128_GCM,
    &AES256_GCM,
    &CHACHA20_POLY1305,
    &HMAC_SHA256,
    &HMAC_SHA512,
    &ED25519,
    &X25519_HKDF_SHA256_AES128_GCM,
    &X25519_HKDF_SHA256_AES256_GCM,
];

/// Every registered template
pub fn templates() -> &'static [&'static KeyTemplate] {
    &REGISTRY
}

/// Look up a template by family and variant name (case-insensitive)
pub fn lookup(family: FamilyKind, variant: &str) -> KeyResult<&'static KeyTemplate> {
    REGISTRY
        .iter()
        .copied()
        .find(|t| t.family == family && t.variant.eq_ignore_ascii_case(variant))
        .ok_or_else(|| KeyError::UnsupportedVariant {
            family: family.to_string(),
            variant: variant.to_string(),
        })
}

/// Look up the template a stored key was generated from
pub fn by_type_url(type_url: &str) -> KeyResult<&'static KeyTemplate> {
    REGISTRY
        .iter()
        .copied()
        .find(|t| t.type_url == type_url)
        .ok_or_else(|| KeyError::UnsupportedVariant {
            family: "unknown".to_string(),
            variant: type_url.to_string(),
        })
}
