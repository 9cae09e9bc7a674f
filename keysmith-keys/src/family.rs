//! Algorithm family markers and their variants
//!
//! Families are uninhabited marker types used to index keysets, so a
//! `Keyset<Aead>` can never be passed where a `Keyset<Mac>` is expected.
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
use crate::template::{self, KeyTemplate};
use keysmith_types::FamilyKind;
use std::fmt;

mod sealed {
    pub trait Sealed {}
}

/// An algorithm family. Implemented only by the markers in this module.
pub trait Family: sealed::Sealed + Send + Sync + 'static {
    const KIND: FamilyKind;
    type Variant: Variant<Family = Self>;
}

/// Families whose keys are a single secret
pub trait SymmetricFamily: Family {}

/// Families whose keys have a derivable public half
pub trait AsymmetricFamily: Family {}

/// One algorithm variant of a family
pub trait Variant: Copy + fmt::Debug + Eq + Send + Sync + 'static {
    type Family: Family<Variant = Self>;

    /// Every declared variant
    const ALL: &'static [Self];

    fn template(self) -> &'static KeyTemplate;

    fn name(self) -> &'static str {
        self.template().variant
    }

    /// Parse a variant name as used in configuration
    fn from_name(name: &str) -> KeyResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| KeyError::UnsupportedVariant {
                family: <Self::Family as Family>::KIND.to_string(),
                variant: name.to_string(),
            })
    }
}

/// Authenticated encryption family
#[derive(Debug)]
pub enum Aead {}

/// Message authentication family
#[derive(Debug)]
pub enum Mac {}

/// Digital signature family
#[derive(Debug)]
pub enum Signature {}

/// Hybrid public-key encryption family
#[derive(Debug)]
pub enum HybridEncryption {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadVariant {
    Aes128Gcm,
    Aes256Gcm,
    ChaCha20Poly1305,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacVariant {
    HmacSha256,
    HmacSha512,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureVariant {
    Ed25519,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HybridVariant {
    X25519HkdfSha256Aes128Gcm,
    X25519HkdfSha256Aes256Gcm,
}

impl sealed::Sealed for Aead {}
impl sealed::Sealed for Mac {}
impl sealed::Sealed for Signature {}
impl sealed::Sealed for HybridEncryption {}

impl Family for Aead {
    const KIND: FamilyKind = FamilyKind::Aead;
    type Variant = AeadVariant;
}

impl Family for Mac {
    const KIND: FamilyKind = FamilyKind::Mac;
    type Variant = MacVariant;
}

impl Family for Signature {
    const KIND: FamilyKind = FamilyKind::Signature;
    type Variant = SignatureVariant;
}

impl Family for HybridEncryption {
    const KIND: FamilyKind = FamilyKind::HybridEncryption;
    type Variant = HybridVariant;
}

impl SymmetricFamily for Aead {}
impl SymmetricFamily for Mac {}
impl AsymmetricFamily for Signature {}
impl AsymmetricFamily for HybridEncryption {}

impl Variant for AeadVariant {
    type Family = Aead;
    const ALL: &'static [Self] = &[
        AeadVariant::Aes128Gcm,
        AeadVariant::Aes256Gcm,
        AeadVariant::ChaCha20Poly1305,
    ];

    fn template(self) -> &'static KeyTemplate {
        match self {
            AeadVariant::Aes128Gcm => &template::AES128_GCM,
            AeadVariant::Aes256Gcm => &template::AES256_GCM,
            AeadVariant::ChaCha20Poly1305 => &template::CHACHA20_POLY1305,
        }
    }
}

impl Variant for MacVariant {
    type Family = Mac;
    const ALL: &'static [Self] = &[MacVariant::HmacSha256, MacVariant::HmacSha512];

    fn template(self) -> &'static KeyTemplate {
        match self {
            MacVariant::HmacSha256 => &template::HMAC_SHA256,
            MacVariant::HmacSha512 => &template::HMAC_SHA512,
        }
    }
}

impl Variant for SignatureVariant {
    type Family = Signature;
    const ALL: &'static [Self] = &[SignatureVariant::Ed25519];

    fn template(self) -> &'static KeyTemplate {
        match self {
            SignatureVariant::Ed25519 => &template::ED25519,
        }
    }
}

impl Variant for HybridVariant {
    type Family = HybridEncryption;
    const ALL: &'static [Self] = &[
        HybridVariant::X25519HkdfSha256Aes128Gcm,
        HybridVariant::X25519HkdfSha256Aes256Gcm,
    ];

    fn template(self) -> &'static KeyTemplate {
        match self {
            HybridVariant::X25519HkdfSha256Aes128Gcm => &template::X25519_HKDF_SHA256_AES128_GCM,
            HybridVariant::X25519HkdfSha256Aes256Gcm => &template::X25519_HKDF_SHA256_AES256_GCM,
        }
    }
}
