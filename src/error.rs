// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use serde_json::Value;

/// Message used when the server could not be reached at all.
pub const MSG_CONNECTION: &str = "Error de conexión con el servidor";

/// Message used when an error response has no readable body.
pub const MSG_UNKNOWN_SERVER_ERROR: &str = "Error desconocido del servidor";

/// Structured failure of an API call.
///
/// `status` is the HTTP status, or `0` when no response was received.
/// `data` is the error body as returned by the server (or a synthesized
/// `{ "message": ... }` when the body was unreadable).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub data: Value,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, data: Value) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// Transport-level failure (DNS, refused connection, timeout, ...).
    pub fn connection() -> Self {
        Self::new(0, MSG_CONNECTION, Value::Null)
    }

    /// Build from a non-2xx status and its (possibly absent) JSON body.
    ///
    /// The body's `message` wins; otherwise `Error: <status>`.
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        let data = body.unwrap_or_else(|| serde_json::json!({ "message": MSG_UNKNOWN_SERVER_ERROR }));
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Error: {status}"));
        Self::new(status, message, data)
    }

    pub fn is_connection_error(&self) -> bool {
        self.status == 0
    }

    /// A successful response whose body did not have the expected shape.
    pub fn unexpected_body(status: u16, detail: impl std::fmt::Display) -> Self {
        Self::new(
            status,
            format!("Respuesta inesperada del servidor: {detail}"),
            Value::Null,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connection_error_has_status_zero() {
        let err = ApiError::connection();
        assert_eq!(err.status, 0);
        assert_eq!(err.message, MSG_CONNECTION);
        assert!(err.is_connection_error());
    }

    #[test]
    fn server_message_is_used() {
        let err = ApiError::from_response(401, Some(json!({"message": "Credenciales inválidas"})));
        assert_eq!(err.status, 401);
        assert_eq!(err.message, "Credenciales inválidas");
        assert_eq!(err.data["message"], "Credenciales inválidas");
    }

    #[test]
    fn missing_message_falls_back_to_status() {
        let err = ApiError::from_response(500, Some(json!({"detail": "boom"})));
        assert_eq!(err.message, "Error: 500");
        assert_eq!(err.data["detail"], "boom");
    }

    #[test]
    fn unreadable_body_uses_unknown_error() {
        let err = ApiError::from_response(502, None);
        assert_eq!(err.message, MSG_UNKNOWN_SERVER_ERROR);
        assert_eq!(err.data["message"], MSG_UNKNOWN_SERVER_ERROR);
        assert!(!err.is_connection_error());
    }

    #[test]
    fn display_is_the_message() {
        assert_eq!(ApiError::connection().to_string(), MSG_CONNECTION);
    }
}
