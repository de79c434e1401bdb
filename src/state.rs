// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session context: the one token slot, shared by everything that needs it.
//!
//! The slot sits behind a mutex so that the guard's "read token, decode,
//! maybe clear" sequence is atomic with respect to logins, logouts and
//! other evaluations, even if navigation checks run on several threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::auth::claims::{decode_claims, TokenClaims};
use crate::storage::{MemoryTokenStore, StorageResult, TokenStore};

#[derive(Clone)]
pub struct SessionContext {
    slot: Arc<Mutex<Box<dyn TokenStore>>>,
}

impl SessionContext {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    /// Exclusive access to the slot.
    ///
    /// A panic while holding the lock cannot leave the slot half-updated
    /// (every store operation is a single call), so poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<dyn TokenStore>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current token, if any. Storage failures read as an empty slot.
    pub fn token(&self) -> Option<String> {
        match self.lock().get() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read token slot");
                None
            }
        }
    }

    /// Store a freshly issued token, replacing any previous one.
    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        self.lock().set(token)
    }

    /// Empty the slot (logout).
    pub fn clear(&self) -> StorageResult<()> {
        self.lock().remove()
    }

    /// Token present, decodable and not expired at `now`.
    ///
    /// Unlike the guard this never clears anything.
    pub fn is_authenticated_at(&self, now: i64) -> bool {
        self.user_info()
            .is_some_and(|claims| !claims.is_expired_at(now))
    }

    /// Decoded claims of the current token, ignoring expiry.
    pub fn user_info(&self) -> Option<TokenClaims> {
        let token = self.token()?;
        match decode_claims(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                warn!(error_code = e.error_code(), "Failed to decode stored token");
                None
            }
        }
    }

    /// Whether the current token's role is one of `roles`.
    pub fn has_role(&self, roles: &[&str]) -> bool {
        self.user_info()
            .and_then(|claims| claims.rol)
            .is_some_and(|rol| roles.contains(&rol.as_str()))
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(MemoryTokenStore::new())
    }
}
