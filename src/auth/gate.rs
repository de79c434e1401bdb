// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Protect-route wrapper.
//!
//! Turns a [`SessionState`] into what the shell must do next:
//!
//! | State | Notification | Navigation |
//! |-------|--------------|------------|
//! | `Unauthenticated` | none | redirect to entry |
//! | `Invalid` | generic auth error | redirect to entry |
//! | `Expired` | session expired | redirect to entry |
//! | `Unauthorized` | permission denied | redirect to entry |
//! | `Authorized` | none | allow, with claims |
//!
//! Every redirect carries the requested location so login can send the
//! user back to it.

use std::sync::Arc;

use tracing::{info, warn};

use super::claims::TokenClaims;
use super::guard::{SessionGuard, SessionState};
use super::roles::RequiredRoles;
use crate::notify::{Notification, Notifier};

/// The application's single public entry route.
pub const ENTRY_ROUTE: &str = "/";

pub const MSG_SESSION_EXPIRED: &str =
    "Tu sesión ha expirado. Por favor, inicia sesión nuevamente.";
pub const MSG_FORBIDDEN: &str = "No tienes permisos para acceder a esta página";
pub const MSG_AUTH_ERROR: &str = "Error de autenticación";

/// Where to send a denied navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: String,
    /// Originally requested location, for post-login redirect.
    pub from: Option<String>,
}

/// Result of passing a navigation through the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Allow(TokenClaims),
    Redirect(Redirect),
}

#[derive(Clone)]
pub struct RouteGate {
    guard: SessionGuard,
    notifier: Arc<dyn Notifier>,
    entry_route: String,
}

impl RouteGate {
    pub fn new(guard: SessionGuard, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            guard,
            notifier,
            entry_route: ENTRY_ROUTE.to_string(),
        }
    }

    /// Override the redirect target for denied navigations.
    pub fn with_entry_route(mut self, route: impl Into<String>) -> Self {
        self.entry_route = route.into();
        self
    }

    pub fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn entry_route(&self) -> &str {
        &self.entry_route
    }

    /// Evaluate the session for `location` and react to the result.
    pub fn protect(&self, location: &str, required: &RequiredRoles) -> Navigation {
        let state = self.guard.evaluate(required);
        self.react(location, state)
    }

    /// Emit the notification for `state` and decide the navigation.
    pub fn react(&self, location: &str, state: SessionState) -> Navigation {
        match state {
            SessionState::Authorized(claims) => return Navigation::Allow(claims),
            SessionState::Unauthenticated => {}
            SessionState::Invalid(e) => {
                warn!(
                    location,
                    error_code = e.error_code(),
                    error = %e,
                    "Stored token could not be decoded"
                );
                self.notifier.notify(Notification::error(MSG_AUTH_ERROR));
            }
            SessionState::Expired => {
                info!(location, "Session expired");
                self.notifier.notify(Notification::error(MSG_SESSION_EXPIRED));
            }
            SessionState::Unauthorized { required, role } => {
                info!(
                    location,
                    required = %required,
                    role = role.as_deref().unwrap_or("-"),
                    "Role not permitted"
                );
                self.notifier.notify(Notification::error(MSG_FORBIDDEN));
            }
        }

        Navigation::Redirect(Redirect {
            to: self.entry_route.clone(),
            from: Some(location.to_string()),
        })
    }
}
