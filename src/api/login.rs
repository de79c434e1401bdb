// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and logout.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::ApiClient;
use crate::auth::gate::Redirect;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse};
use crate::notify::{Notification, Notifier};
use crate::state::SessionContext;
use crate::storage::{StorageError, StorageResult};

pub const MSG_LOGIN_SUCCESS: &str = "Inicio de sesión exitoso";
pub const MSG_LOGIN_FAILED: &str = "Error al iniciar sesión";

/// Where a successful login lands when no location was preserved.
pub const DEFAULT_LANDING_ROUTE: &str = "/dashboard";

/// Why a login attempt did not produce a session.
///
/// `Display` is the user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The API answered with an error status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The API could not be reached.
    #[error("Error de conexión con el servidor")]
    Connection,
    /// The API answered 2xx without a token.
    #[error("Error al iniciar sesión")]
    MissingToken,
    /// The token could not be stored.
    #[error("No se pudo guardar la sesión: {0}")]
    Storage(#[from] StorageError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        if err.is_connection_error() {
            return LoginError::Connection;
        }
        let message = err
            .data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .unwrap_or(MSG_LOGIN_FAILED)
            .to_string();
        LoginError::Rejected {
            status: err.status,
            message,
        }
    }
}

#[derive(Clone)]
pub struct LoginService {
    client: ApiClient,
    session: SessionContext,
    notifier: Arc<dyn Notifier>,
}

impl LoginService {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        let session = client.session().clone();
        Self {
            client,
            session,
            notifier,
        }
    }

    /// Exchange credentials for a token and store it.
    ///
    /// Any previous token is overwritten. On success returns the location
    /// to continue to: the one the gate preserved in `redirect`, else the
    /// dashboard. Success and failure are both notified.
    pub async fn login(
        &self,
        request: &LoginRequest,
        redirect: Option<&Redirect>,
    ) -> Result<String, LoginError> {
        let outcome = match self.authenticate(request).await {
            Ok(token) => self.session.set_token(&token).map_err(LoginError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!(correo = %request.correo, "Login succeeded");
                self.notifier.notify(Notification::success(MSG_LOGIN_SUCCESS));
                Ok(landing_route(redirect))
            }
            Err(e) => {
                warn!(correo = %request.correo, error = %e, "Login failed");
                self.notifier.notify(Notification::error(e.to_string()));
                Err(e)
            }
        }
    }

    async fn authenticate(&self, request: &LoginRequest) -> Result<String, LoginError> {
        let response = self.client.post_anonymous("/login", request).await?;
        let body: LoginResponse = response.json().unwrap_or_default();
        body.token
            .filter(|t| !t.is_empty())
            .ok_or(LoginError::MissingToken)
    }

    /// Drop the stored token.
    pub fn logout(&self) -> StorageResult<()> {
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }
}

/// Post-login destination.
pub fn landing_route(redirect: Option<&Redirect>) -> String {
    redirect
        .and_then(|r| r.from.clone())
        .unwrap_or_else(|| DEFAULT_LANDING_ROUTE.to_string())
}
