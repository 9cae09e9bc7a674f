//! Cleartext persistence capability
//!
//! Reading or writing unencrypted key material requires a
//! [`CleartextAllowed`] token. The token has no public fields and no
//! `Default`; the only ways to obtain one are named after the risk they
//! accept, so every cleartext call site carries a visible opt-in.
//!
//! ```compile_fail
//! use keysmith_keys::{Aead, CleartextAllowed, Keyset};
//! use std::marker::PhantomData;
//!
//! let token: CleartextAllowed<Keyset<Aead>> = CleartextAllowed { _target: PhantomData };
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


use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use tracing::warn;

/// Proof that the caller accepted the risk of cleartext persistence of `T`.
///
/// Pure access control: zero-sized, no runtime behavior beyond the audit
/// log line emitted when it is acquired.
pub struct CleartextAllowed<T> {
    _target: PhantomData<fn() -> T>,
}

impl<T> CleartextAllowed<T> {
    /// Acquire the capability for `T`, accepting that key material will
    /// touch durable storage unencrypted.
    pub fn acknowledge_cleartext_risk() -> Self {
        warn!(
            target_type = type_name::<T>(),
            "Cleartext key material persistence acknowledged"
        );
        Self {
            _target: PhantomData,
        }
    }
}

impl<T> Clone for CleartextAllowed<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CleartextAllowed<T> {}

impl<T> fmt::Debug for CleartextAllowed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CleartextAllowed<{}>", type_name::<T>())
    }
}

/// Run `f` with the cleartext capability for `T`.
pub fn acknowledge_cleartext_risk<T, R>(f: impl FnOnce(CleartextAllowed<T>) -> R) -> R {
    f(CleartextAllowed::acknowledge_cleartext_risk())
}
