// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The single bearer-token slot.
//!
//! One slot per client. `set` overwrites unconditionally (last writer wins);
//! there is no multi-session support.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use super::{StoragePaths, StorageResult};

/// Storage backend for the bearer token.
pub trait TokenStore: Send {
    /// Current token, or `None` when the slot is empty.
    fn get(&self) -> StorageResult<Option<String>>;

    /// Replace whatever is in the slot.
    fn set(&mut self, token: &str) -> StorageResult<()>;

    /// Empty the slot. Emptying an empty slot is not an error.
    fn remove(&mut self) -> StorageResult<()>;
}

/// Durable token slot backed by a single file.
///
/// Survives process restarts, which is what lets a login from one CLI
/// invocation be reused by the next.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    paths: StoragePaths,
}

impl FileTokenStore {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.paths.token_file()) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, token: &str) -> StorageResult<()> {
        let path = self.paths.token_file();
        fs::create_dir_all(self.paths.root())?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        let written =
            write_private(&temp_path, token).and_then(|()| fs::rename(&temp_path, &path));

        if let Err(e) = written {
            // Never leave a partial token behind
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        match fs::remove_file(self.paths.token_file()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    restrict_permissions(&file)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

#[cfg(unix)]
fn restrict_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

/// Process-local token slot. Used in tests and for one-shot sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> StorageResult<Option<String>> {
        Ok(self.token.clone())
    }

    fn set(&mut self, token: &str) -> StorageResult<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        self.token = None;
        Ok(())
    }
}
