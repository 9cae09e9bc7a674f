//! Command line definition and family dispatch
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


use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use keysmith_config::KeysmithConfig;
use keysmith_keys::lifecycle::Operation;
use keysmith_keys::{
    Aead, AsymmetricFamily, Family, FamilyKind, HybridEncryption, KeyId, Keyset, KeysetInfo,
    KeysetManager, Mac, MasterKey, Signature, SymmetricFamily, Variant,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "keysmith-tool")]
#[command(about = "Generate, rotate and inspect encrypted keysets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// One key inside an existing keyset file
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct KeyTarget {
    /// Encrypted keyset file
    pub file: PathBuf,
    /// Key id within the keyset
    #[arg(value_parser = parse_key_id)]
    pub id: KeyId,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a single-key keyset
    Generate {
        /// aead, mac, signature or hybrid
        #[arg(value_parser = parse_family)]
        family: FamilyKind,
        /// Keyset file to create
        file: PathBuf,
        /// Algorithm variant; defaults to the configured one for the family
        variant: Option<String>,
    },
    /// Add an enabled, non-primary key
    Add {
        file: PathBuf,
        variant: Option<String>,
    },
    /// Add a key and make it primary
    Rotate {
        file: PathBuf,
        variant: Option<String>,
    },
    /// Re-enable a disabled key
    Enable(KeyTarget),
    /// Disable a non-primary key
    Disable(KeyTarget),
    /// Make an enabled key primary
    SetPrimary(KeyTarget),
    /// Remove a disabled or destroyed key
    Delete(KeyTarget),
    /// Erase a non-primary key's material, keeping its entry
    Destroy(KeyTarget),
    /// Print keyset metadata
    Info { file: PathBuf },
    /// Write the public keyset of a signature or hybrid keyset
    Public { file: PathBuf, out: PathBuf },
}

impl Command {
    fn lifecycle(&self) -> Option<(Operation, &KeyTarget)> {
        match self {
            Command::Enable(target) => Some((Operation::Enable, target)),
            Command::Disable(target) => Some((Operation::Disable, target)),
            Command::SetPrimary(target) => Some((Operation::SetPrimary, target)),
            Command::Delete(target) => Some((Operation::Delete, target)),
            Command::Destroy(target) => Some((Operation::Destroy, target)),
            _ => None,
        }
    }
}

fn parse_family(s: &str) -> Result<FamilyKind, String> {
    s.parse::<FamilyKind>().map_err(|e| e.to_string())
}

fn parse_key_id(s: &str) -> Result<KeyId, String> {
    let value: u32 = s.parse().map_err(|_| format!("invalid key id: {}", s))?;
    KeyId::try_from(value).map_err(|e| e.to_string())
}

pub struct Context {
    pub manager: Arc<KeysetManager>,
    pub master_key: MasterKey,
    pub config: KeysmithConfig,
}

impl Context {
    /// Every file the tool writes must be readable by a later run, so a
    /// configured master key is required.
    pub fn from_config(config: KeysmithConfig, manager: Arc<KeysetManager>) -> Result<Self> {
        let secret = config
            .master_key()
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| {
                anyhow!("KEYSMITH_MASTER_KEY is not set; keyset files cannot be written without it")
            })?;
        let master_key = MasterKey::from_secret(secret);
        Ok(Self {
            manager,
            master_key,
            config,
        })
    }

    fn default_variant(&self, family: FamilyKind) -> String {
        let defaults = self.config.default_variants();
        match family {
            FamilyKind::Aead => defaults.aead,
            FamilyKind::Mac => defaults.mac,
            FamilyKind::Signature => defaults.signature,
            FamilyKind::HybridEncryption => defaults.hybrid,
        }
    }

    fn variant<F: Family>(&self, name: Option<&str>) -> Result<F::Variant> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.default_variant(F::KIND),
        };
        Ok(F::Variant::from_name(&name)?)
    }
}

/// Run one command; returns the text to print on stdout
pub async fn run(ctx: &Context, command: Command) -> Result<String> {
    let info = match &command {
        Command::Generate {
            family,
            file,
            variant,
        } => {
            let path = ctx.config.keyset_path(file);
            if tokio::fs::try_exists(&path).await? {
                bail!("Refusing to overwrite {}", path.display());
            }
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let variant = variant.as_deref();
            match family {
                FamilyKind::Aead => generate_symmetric::<Aead>(ctx, variant, &path).await?,
                FamilyKind::Mac => generate_symmetric::<Mac>(ctx, variant, &path).await?,
                FamilyKind::Signature => {
                    generate_asymmetric::<Signature>(ctx, variant, &path).await?
                }
                FamilyKind::HybridEncryption => {
                    generate_asymmetric::<HybridEncryption>(ctx, variant, &path).await?
                }
            }
        }
        Command::Public { file, out } => {
            let path = ctx.config.keyset_path(file);
            let out = ctx.config.keyset_path(out);
            match stored_family(ctx, &path).await? {
                FamilyKind::Signature => export_public::<Signature>(ctx, &path, &out).await?,
                FamilyKind::HybridEncryption => {
                    export_public::<HybridEncryption>(ctx, &path, &out).await?
                }
                other => bail!("{} keysets have no public keys", other),
            }
        }
        Command::Add { file, .. }
        | Command::Rotate { file, .. }
        | Command::Info { file }
        | Command::Enable(KeyTarget { file, .. })
        | Command::Disable(KeyTarget { file, .. })
        | Command::SetPrimary(KeyTarget { file, .. })
        | Command::Delete(KeyTarget { file, .. })
        | Command::Destroy(KeyTarget { file, .. }) => {
            let path = ctx.config.keyset_path(file);
            match stored_family(ctx, &path).await? {
                FamilyKind::Aead => update::<Aead>(ctx, &command, &path).await?,
                FamilyKind::Mac => update::<Mac>(ctx, &command, &path).await?,
                FamilyKind::Signature => update::<Signature>(ctx, &command, &path).await?,
                FamilyKind::HybridEncryption => {
                    update::<HybridEncryption>(ctx, &command, &path).await?
                }
            }
        }
    };
    Ok(serde_json::to_string_pretty(&info)?)
}

/// Family recorded in the cleartext header of an encrypted keyset file.
/// The header is authenticated when the keyset itself is read.
async fn stored_family(ctx: &Context, path: &Path) -> Result<FamilyKind> {
    let info = ctx
        .manager
        .read_encrypted_info(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    info.keys
        .first()
        .map(|key| key.family)
        .ok_or_else(|| anyhow!("{} holds an empty keyset", path.display()))
}

async fn generate_symmetric<F: SymmetricFamily>(
    ctx: &Context,
    variant: Option<&str>,
    path: &Path,
) -> Result<KeysetInfo> {
    let variant = ctx.variant::<F>(variant)?;
    let keyset = ctx.manager.generate_new_symmetric(variant).await?;
    ctx.manager
        .save_encrypted(&keyset, path, &ctx.master_key)
        .await?;
    info!(path = %path.display(), variant = variant.name(), "Keyset written");
    Ok(keyset.info())
}

async fn generate_asymmetric<F: AsymmetricFamily>(
    ctx: &Context,
    variant: Option<&str>,
    path: &Path,
) -> Result<KeysetInfo> {
    let variant = ctx.variant::<F>(variant)?;
    let keyset = ctx
        .manager
        .generate_new_asymmetric(variant)
        .await?
        .into_keyset();
    ctx.manager
        .save_encrypted(&keyset, path, &ctx.master_key)
        .await?;
    info!(path = %path.display(), variant = variant.name(), "Keyset written");
    Ok(keyset.info())
}

async fn export_public<F: AsymmetricFamily>(
    ctx: &Context,
    path: &Path,
    out: &Path,
) -> Result<KeysetInfo> {
    let keyset: Keyset<F> = ctx.manager.read_encrypted(path, &ctx.master_key).await?;
    let public = ctx.manager.public_keyset(&keyset).await?;
    ctx.manager.save_public(&public, out).await?;
    info!(path = %out.display(), keys = public.keys().len(), "Public keyset written");
    Ok(keyset.info())
}

async fn update<F: Family>(ctx: &Context, command: &Command, path: &Path) -> Result<KeysetInfo> {
    let keyset: Keyset<F> = ctx.manager.read_encrypted(path, &ctx.master_key).await?;
    let updated = match command {
        Command::Info { .. } => return Ok(keyset.info()),
        Command::Add { variant, .. } => {
            let variant = ctx.variant::<F>(variant.as_deref())?;
            ctx.manager.add(&keyset, variant).await?
        }
        Command::Rotate { variant, .. } => {
            let variant = ctx.variant::<F>(variant.as_deref())?;
            ctx.manager.rotate(&keyset, variant).await?
        }
        other => match other.lifecycle() {
            Some((Operation::Enable, target)) => ctx.manager.enable(&keyset, target.id)?,
            Some((Operation::Disable, target)) => ctx.manager.disable(&keyset, target.id)?,
            Some((Operation::SetPrimary, target)) => ctx.manager.set_primary(&keyset, target.id)?,
            Some((Operation::Delete, target)) => ctx.manager.delete(&keyset, target.id)?,
            Some((Operation::Destroy, target)) => ctx.manager.destroy(&keyset, target.id)?,
            None => bail!("Command does not update an existing keyset"),
        },
    };
    ctx.manager
        .save_encrypted(&updated, path, &ctx.master_key)
        .await?;
    info!(path = %path.display(), "Keyset updated");
    Ok(updated.info())
}
