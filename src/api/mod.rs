// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for the dispatch API.
//!
//! Every call sends `Content-Type: application/json` and, when the session
//! holds a token, `Authorization: Bearer <token>`. Non-2xx responses come
//! back as a structured [`ApiError`]; a `204` is a success without body.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::state::SessionContext;

pub mod despachos;
pub mod login;

pub use despachos::DespachoService;
pub use login::{LoginError, LoginService};

/// Successful API response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `None` for `204 No Content`.
    pub data: Option<Value>,
    pub success: bool,
}

impl ApiResponse {
    fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT.as_u16(),
            data: None,
            success: true,
        }
    }

    /// Deserialize the body. A missing body deserializes from `null`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let status = self.status;
        serde_json::from_value(self.data.unwrap_or(Value::Null))
            .map_err(|e| ApiError::unexpected_body(status, e))
    }
}

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credentials {
    Bearer,
    Anonymous,
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: SessionContext,
    http: Client,
}

impl ApiClient {
    /// Create a client for `base_url`, reading the token from `session`.
    pub fn new(base_url: &Url, session: SessionContext, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::new(0, format!("failed to build HTTP client: {e}"), Value::Null))?;

        Ok(Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            session,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, endpoint, None::<&()>, Credentials::Bearer)
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, endpoint, Some(body), Credentials::Bearer)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::PUT, endpoint, Some(body), Credentials::Bearer)
            .await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, endpoint, None::<&()>, Credentials::Bearer)
            .await
    }

    /// POST without the bearer header (login).
    pub async fn post_anonymous<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, endpoint, Some(body), Credentials::Anonymous)
            .await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        credentials: Credentials,
    ) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, %url, "API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");

        if credentials == Credentials::Bearer {
            if let Some(token) = self.session.token() {
                request = request.bearer_auth(token);
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "API request failed");
            ApiError::connection()
        })?;

        handle_response(response).await
    }
}

async fn handle_response(response: reqwest::Response) -> Result<ApiResponse, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.json::<Value>().await.ok();
        let err = ApiError::from_response(status.as_u16(), body);
        debug!(status = err.status, message = %err.message, "API error response");
        return Err(err);
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(ApiResponse::no_content());
    }

    let data = response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::unexpected_body(status.as_u16(), e))?;

    Ok(ApiResponse {
        status: status.as_u16(),
        data: Some(data),
        success: true,
    })
}
