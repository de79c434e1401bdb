// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session guard: classifies the stored token for a navigation request.
//!
//! ## Evaluation Order
//!
//! First matching rule wins:
//!
//! 1. no token (or empty) → `Unauthenticated`
//! 2. token does not decode → `Invalid`
//! 3. `exp` in the past → `Expired` (and the slot is cleared)
//! 4. roles required and `rol` not among them → `Unauthorized`
//! 5. otherwise → `Authorized(claims)`
//!
//! So a token that is both expired and of the wrong role reports `Expired`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use super::claims::{decode_claims, TokenClaims};
use super::error::TokenError;
use super::roles::RequiredRoles;
use crate::state::SessionContext;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Unix time in milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock pinned to one instant, given in unix seconds.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0.saturating_mul(1000)
    }
}

/// Outcome of evaluating the session for one route.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No token present.
    Unauthenticated,
    /// Token present but unreadable.
    Invalid(TokenError),
    /// Token readable but past its `exp`.
    Expired,
    /// Token valid, but its role is not accepted by the route.
    Unauthorized {
        required: RequiredRoles,
        role: Option<String>,
    },
    /// Token valid, unexpired, and role-matched.
    Authorized(TokenClaims),
}

impl SessionState {
    pub fn is_authorized(&self) -> bool {
        matches!(self, SessionState::Authorized(_))
    }

    /// Claims, when authorized.
    pub fn claims(&self) -> Option<&TokenClaims> {
        match self {
            SessionState::Authorized(claims) => Some(claims),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Invalid(_) => "invalid",
            SessionState::Expired => "expired",
            SessionState::Unauthorized { .. } => "unauthorized",
            SessionState::Authorized(_) => "authorized",
        }
    }
}

/// Classify a token against a route's role requirement at time `now`
/// (unix seconds).
///
/// Pure: no I/O, no side effects. [`SessionGuard::evaluate`] wraps this
/// with the slot read and the expiry cleanup.
pub fn classify(token: Option<&str>, required: &RequiredRoles, now: i64) -> SessionState {
    classify_at_millis(token, required, now.saturating_mul(1000))
}

/// [`classify`] against a millisecond clock.
pub fn classify_at_millis(
    token: Option<&str>,
    required: &RequiredRoles,
    now_ms: i64,
) -> SessionState {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return SessionState::Unauthenticated;
    };

    let claims = match decode_claims(token) {
        Ok(claims) => claims,
        Err(e) => return SessionState::Invalid(e),
    };

    if claims.is_expired_at_millis(now_ms) {
        return SessionState::Expired;
    }

    if !required.permits(claims.role()) {
        return SessionState::Unauthorized {
            required: required.clone(),
            role: claims.rol,
        };
    }

    SessionState::Authorized(claims)
}

/// Evaluates the session held in a [`SessionContext`].
#[derive(Clone)]
pub struct SessionGuard {
    session: SessionContext,
    clock: Arc<dyn Clock>,
}

impl SessionGuard {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a custom clock (tests pin "now" with [`FixedClock`]).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Evaluate the stored token for a route requiring `required`.
    ///
    /// Read, classify and (on expiry) clear all happen under the slot lock,
    /// so concurrent evaluations see a consistent slot. Never fails: storage
    /// errors on read count as "no token", and a failed clear is logged.
    pub fn evaluate(&self, required: &RequiredRoles) -> SessionState {
        let mut slot = self.session.lock();

        let token = slot.get().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read token slot, treating as signed out");
            None
        });

        let state = classify_at_millis(token.as_deref(), required, self.clock.now_millis());

        if state == SessionState::Expired {
            if let Err(e) = slot.remove() {
                warn!(error = %e, "Failed to clear expired token");
            }
        }

        debug!(state = state.label(), required = %required, "Session evaluated");
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::test_tokens::{token, token_with_payload};
    use crate::storage::MemoryTokenStore;

    const NOW: i64 = 1_750_000_000;

    fn guard_with(token: Option<String>) -> SessionGuard {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        };
        SessionGuard::new(SessionContext::new(store)).with_clock(FixedClock(NOW))
    }

    fn admin_only() -> RequiredRoles {
        RequiredRoles::of(["admin"])
    }

    #[test]
    fn absent_and_empty_tokens_are_unauthenticated() {
        assert_eq!(
            classify(None, &admin_only(), NOW),
            SessionState::Unauthenticated
        );
        assert_eq!(
            classify(Some(""), &RequiredRoles::any(), NOW),
            SessionState::Unauthenticated
        );
    }

    #[test]
    fn empty_slot_is_unauthenticated_without_mutation() {
        let guard = guard_with(None);
        assert_eq!(guard.evaluate(&admin_only()), SessionState::Unauthenticated);
        assert_eq!(guard.session().token(), None);
    }

    #[test]
    fn garbage_token_is_invalid_and_kept() {
        let guard = guard_with(Some("not-a-real-token".to_string()));
        let state = guard.evaluate(&RequiredRoles::any());
        assert_eq!(state, SessionState::Invalid(TokenError::Malformed));
        assert_eq!(guard.session().token().as_deref(), Some("not-a-real-token"));
    }

    #[test]
    fn null_claims_are_invalid() {
        let state = classify(Some(token_with_payload("null").as_str()), &RequiredRoles::any(), NOW);
        assert_eq!(state, SessionState::Invalid(TokenError::EmptyClaims));
    }

    #[test]
    fn expired_token_is_cleared() {
        let guard = guard_with(Some(token(Some(NOW - 100), "admin")));
        assert_eq!(guard.evaluate(&RequiredRoles::any()), SessionState::Expired);
        assert_eq!(guard.session().token(), None);

        // Next evaluation short-circuits on the empty slot
        assert_eq!(
            guard.evaluate(&RequiredRoles::any()),
            SessionState::Unauthenticated
        );
    }

    #[test]
    fn expiry_wins_over_role_mismatch() {
        let guard = guard_with(Some(token(Some(NOW - 100), "admin")));
        assert_eq!(guard.evaluate(&admin_only()), SessionState::Expired);

        let guard = guard_with(Some(token(Some(NOW - 100), "viewer")));
        assert_eq!(guard.evaluate(&admin_only()), SessionState::Expired);
        assert_eq!(guard.session().token(), None);
    }

    #[test]
    fn wrong_role_is_unauthorized_and_token_kept() {
        let t = token(Some(NOW + 3600), "viewer");
        let guard = guard_with(Some(t.clone()));
        assert_eq!(
            guard.evaluate(&admin_only()),
            SessionState::Unauthorized {
                required: admin_only(),
                role: Some("viewer".to_string()),
            }
        );
        assert_eq!(guard.session().token(), Some(t));
    }

    #[test]
    fn missing_role_is_unauthorized_when_roles_required() {
        let t = token_with_payload(&format!(r#"{{"exp":{}}}"#, NOW + 60));
        let state = classify(Some(t.as_str()), &admin_only(), NOW);
        assert!(matches!(state, SessionState::Unauthorized { role: None, .. }));
    }

    #[test]
    fn any_role_passes_when_none_required() {
        let guard = guard_with(Some(token(Some(NOW + 3600), "admin")));
        let state = guard.evaluate(&RequiredRoles::any());
        assert!(state.is_authorized());
        assert_eq!(state.claims().and_then(|c| c.role()), Some("admin"));
    }

    #[test]
    fn matching_role_is_authorized() {
        let guard = guard_with(Some(token(Some(NOW + 3600), "admin")));
        assert!(guard.evaluate(&admin_only()).is_authorized());
    }

    #[test]
    fn exp_equal_to_now_is_still_valid() {
        let state = classify(Some(token(Some(NOW), "admin").as_str()), &RequiredRoles::any(), NOW);
        assert!(state.is_authorized());
    }

    #[test]
    fn sub_second_past_exp_is_expired() {
        struct MillisClock(i64);
        impl Clock for MillisClock {
            fn now_millis(&self) -> i64 {
                self.0
            }
        }

        let session = SessionContext::new(MemoryTokenStore::with_token(token(Some(NOW), "admin")));
        let guard = SessionGuard::new(session).with_clock(MillisClock(NOW * 1000 + 900));
        assert_eq!(guard.evaluate(&RequiredRoles::any()), SessionState::Expired);
        assert_eq!(guard.session().token(), None);
    }

    #[test]
    fn mistyped_claims_do_not_invalidate() {
        for payload in [
            format!(r#"{{"exp":{},"rol":"admin","nombre":5}}"#, NOW + 60),
            format!(r#"{{"exp":{},"rol":"admin","id_usuario":7.5}}"#, NOW + 60),
            format!(r#"{{"exp":{},"rol":5}}"#, NOW + 60),
            r#"{"exp":"soon","rol":"admin"}"#.to_string(),
        ] {
            let t = token_with_payload(&payload);
            let state = classify(Some(t.as_str()), &RequiredRoles::any(), NOW);
            assert!(state.is_authorized(), "{payload} -> {}", state.label());
        }
    }

    #[test]
    fn mistyped_role_fails_required_roles() {
        let t = token_with_payload(&format!(r#"{{"exp":{},"rol":5}}"#, NOW + 60));
        let state = classify(Some(t.as_str()), &admin_only(), NOW);
        assert!(matches!(state, SessionState::Unauthorized { role: None, .. }));
    }

    #[test]
    fn tokens_without_exp_never_expire() {
        for now in [0, NOW, i64::MAX] {
            let state = classify(Some(token(None, "viewer").as_str()), &RequiredRoles::any(), now);
            assert_ne!(state, SessionState::Expired);
            assert!(state.is_authorized());
        }
    }

    #[test]
    fn evaluation_is_idempotent_for_valid_tokens() {
        let guard = guard_with(Some(token(Some(NOW + 3600), "admin")));
        let first = guard.evaluate(&RequiredRoles::any());
        let second = guard.evaluate(&RequiredRoles::any());
        assert!(first.is_authorized());
        assert_eq!(first, second);
    }

    #[test]
    fn role_property_over_required_sets() {
        let cases: &[(&str, &[&str], bool)] = &[
            ("admin", &[], true),
            ("admin", &["admin"], true),
            ("admin", &["operador", "admin"], true),
            ("viewer", &["admin"], false),
            ("viewer", &["admin", "operador"], false),
        ];
        for (rol, required, authorized) in cases {
            let required = RequiredRoles::of(required.iter().copied());
            let guard = guard_with(Some(token(Some(NOW + 10), rol)));
            let state = guard.evaluate(&required);
            assert_eq!(state.is_authorized(), *authorized, "rol={rol} required={required}");
            if !authorized {
                assert!(matches!(state, SessionState::Unauthorized { .. }));
                assert!(guard.session().token().is_some());
            }
        }
    }

    #[test]
    fn concurrent_evaluations_agree() {
        let guard = guard_with(Some(token(Some(NOW - 1), "admin")));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                std::thread::spawn(move || guard.evaluate(&RequiredRoles::any()))
            })
            .collect();

        let states: Vec<SessionState> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let expired = states.iter().filter(|s| **s == SessionState::Expired).count();

        // Exactly one evaluation sees the dead token; the rest find the slot empty
        assert_eq!(expired, 1);
        assert_eq!(states.len() - expired, 7);
        assert!(states
            .iter()
            .all(|s| matches!(s, SessionState::Expired | SessionState::Unauthenticated)));
    }
}
