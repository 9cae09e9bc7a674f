//! Helpers for host applications embedding the keyset manager
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
use crate::family::{AsymmetricFamily, SymmetricFamily, Variant};
use crate::keyset::Keyset;
use crate::local_provider::LocalCryptoProvider;
use crate::manager::KeysetManager;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Keyset manager backed by the in-process provider
pub fn init_keyset_manager() -> Arc<KeysetManager> {
    info!(provider = "local", "Initializing keyset manager");
    Arc::new(KeysetManager::new(Arc::new(LocalCryptoProvider::new())))
}

/// Master key from a configured secret, or a random one when none is set.
///
/// A random key only lives as long as the process; keysets written with it
/// cannot be read back after a restart.
pub fn master_key_or_generate(secret: Option<&str>) -> MasterKey {
    match secret {
        Some(secret) if !secret.is_empty() => MasterKey::from_secret(secret),
        _ => {
            warn!("No master key configured, generating an ephemeral one. This should be set in production!");
            MasterKey::generate()
        }
    }
}

fn is_not_found(err: &KeyError) -> bool {
    matches!(err, KeyError::Io(e) if e.kind() == ErrorKind::NotFound)
}

/// Read an encrypted symmetric keyset, generating and saving one if the
/// file does not exist yet
pub async fn load_or_generate_symmetric<V>(
    manager: &KeysetManager,
    path: &Path,
    master_key: &MasterKey,
    variant: V,
) -> KeyResult<Keyset<V::Family>>
where
    V: Variant,
    V::Family: SymmetricFamily,
{
    match manager.read_encrypted(path, master_key).await {
        Ok(keyset) => {
            info!(path = %path.display(), "Loaded keyset");
            Ok(keyset)
        }
        Err(e) if is_not_found(&e) => {
            warn!(path = %path.display(), variant = variant.name(), "Keyset not found, generating a new one");
            let keyset = manager.generate_new_symmetric(variant).await?;
            manager.save_encrypted(&keyset, path, master_key).await?;
            Ok(keyset)
        }
        Err(e) => Err(e),
    }
}

/// Asymmetric counterpart of [`load_or_generate_symmetric`]. The public
/// keyset can be re-derived with [`KeysetManager::public_keyset`].
pub async fn load_or_generate_asymmetric<V>(
    manager: &KeysetManager,
    path: &Path,
    master_key: &MasterKey,
    variant: V,
) -> KeyResult<Keyset<V::Family>>
where
    V: Variant,
    V::Family: AsymmetricFamily,
{
    match manager.read_encrypted(path, master_key).await {
        Ok(keyset) => {
            info!(path = %path.display(), "Loaded keyset");
            Ok(keyset)
        }
        Err(e) if is_not_found(&e) => {
            warn!(path = %path.display(), variant = variant.name(), "Keyset not found, generating a new one");
            let keyset = manager.generate_new_asymmetric(variant).await?.into_keyset();
            manager.save_encrypted(&keyset, path, master_key).await?;
            Ok(keyset)
        }
        Err(e) => Err(e),
    }
}
