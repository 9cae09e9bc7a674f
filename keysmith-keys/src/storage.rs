//! Keyset file I/O
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
use rand::rngs::OsRng;
use rand::RngCore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Keyset files larger than this are rejected before parsing
pub const MAX_KEYSET_FILE_BYTES: u64 = 4 * 1024 * 1024;

/// Read a whole keyset file
pub(crate) async fn read_file(path: &Path) -> KeyResult<Vec<u8>> {
    let len = fs::metadata(path).await?.len();
    if len > MAX_KEYSET_FILE_BYTES {
        return Err(KeyError::Format(format!(
            "{} is {} bytes, limit is {}",
            path.display(),
            len,
            MAX_KEYSET_FILE_BYTES
        )));
    }
    Ok(fs::read(path).await?)
}

/// Replace `path` with `bytes` via a temp file in the same directory and a
/// rename. Owner-only permissions on unix.
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> KeyResult<()> {
    let tmp = temp_path(path)?;

    let mut opts = fs::OpenOptions::new();
    opts.create_new(true).write(true);
    #[cfg(unix)]
    {
        opts.mode(0o600);
    }

    let mut file = opts.open(&tmp).await?;
    let written = async {
        file.write_all(bytes).await?;
        file.sync_all().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    drop(file);

    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }

    debug!(path = %path.display(), bytes = bytes.len(), "Keyset file written");
    Ok(())
}

fn temp_path(path: &Path) -> KeyResult<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        KeyError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid keyset path: {}", path.display()),
        ))
    })?;
    let mut rnd = [0u8; 8];
    OsRng.fill_bytes(&mut rnd);
    Ok(parent.join(format!(".keyset.{}.tmp", hex::encode(rnd))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyset.json");

        write_file(&path, b"first").await.unwrap();
        write_file(&path, b"second").await.unwrap();
        assert_eq!(read_file(&path).await.unwrap(), b"second");

        // no temp files left behind
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyset.json");
        write_file(&path, b"secret").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_file(&dir.path().join("absent.json")).await.unwrap_err();
        assert!(matches!(err, KeyError::Io(_)));
    }

    #[tokio::test]
    async fn test_oversized_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let at_limit = dir.path().join("at_limit.json");
        let over_limit = dir.path().join("over_limit.json");
        std::fs::File::create(&at_limit)
            .unwrap()
            .set_len(MAX_KEYSET_FILE_BYTES)
            .unwrap();
        std::fs::File::create(&over_limit)
            .unwrap()
            .set_len(MAX_KEYSET_FILE_BYTES + 1)
            .unwrap();

        assert_eq!(
            read_file(&at_limit).await.unwrap().len() as u64,
            MAX_KEYSET_FILE_BYTES
        );
        let err = read_file(&over_limit).await.unwrap_err();
        assert!(matches!(err, KeyError::Format(_)));
    }
}
