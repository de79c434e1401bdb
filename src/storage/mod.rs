// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Client Storage Module
//!
//! Holds the one piece of state the client persists: the bearer token.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   token       # raw JWT, owner-only permissions
//! ```
//!
//! Writes go through a temp file and a rename so a crash never leaves a
//! half-written token behind.

pub mod paths;
pub mod token_store;

pub use paths::StoragePaths;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

use std::io;

/// Error type for token storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
