// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the local (unverified) token decoder.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::TokenError;
use crate::models::Identifier;

/// Claims carried in the payload segment of a dispatch API token.
///
/// The token is issued and signed by the API; the client only reads it.
/// Known claims of an unexpected JSON type read as absent rather than
/// failing the whole decode. Unknown claims are preserved in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiration timestamp (seconds since epoch, may be fractional)
    #[serde(default, deserialize_with = "de_timestamp")]
    pub exp: Option<f64>,

    /// Role identifier (e.g. "admin", "operador")
    #[serde(default, deserialize_with = "de_text")]
    pub rol: Option<String>,

    /// User ID used to scope despacho queries
    #[serde(default, deserialize_with = "de_identifier")]
    pub id_usuario: Option<Identifier>,

    /// Display name
    #[serde(default, deserialize_with = "de_text")]
    pub nombre: Option<String>,

    /// Any other claims (iat, sub, correo, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl TokenClaims {
    /// Expiry instant, if the token has one.
    ///
    /// An `exp` of zero is treated as absent.
    pub fn expires_at(&self) -> Option<f64> {
        self.exp.filter(|exp| *exp != 0.0)
    }

    /// Whether the token is past its expiry at `now` (unix seconds).
    ///
    /// Tokens without `exp` never expire.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.is_expired_at_millis(now.saturating_mul(1000))
    }

    /// Same as [`is_expired_at`](Self::is_expired_at), against a
    /// millisecond clock so sub-second instants past `exp` count.
    pub fn is_expired_at_millis(&self, now_ms: i64) -> bool {
        matches!(self.expires_at(), Some(exp) if exp * 1000.0 < now_ms as f64)
    }

    /// Role claim, if present.
    pub fn role(&self) -> Option<&str> {
        self.rol.as_deref()
    }

    /// User ID claim, if present.
    pub fn user_id(&self) -> Option<&Identifier> {
        self.id_usuario.as_ref()
    }

    /// Display name, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        self.nombre.as_deref().unwrap_or("Usuario")
    }
}

/// Decode the claims of a `header.payload.signature` token.
///
/// The signature is NOT verified: the API that issued the token is trusted
/// and re-checks it on every request. This only reads the payload so the
/// client can gate navigation locally.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let data = jsonwebtoken::dangerous::insecure_decode::<Value>(token).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::Json(_) | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                TokenError::InvalidPayload(e.to_string())
            }
            _ => TokenError::Malformed,
        }
    })?;

    match data.claims {
        Value::Null => Err(TokenError::EmptyClaims),
        Value::Object(map) if map.is_empty() => Err(TokenError::EmptyClaims),
        value @ Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| TokenError::InvalidPayload(e.to_string())),
        other => Err(TokenError::InvalidPayload(format!(
            "expected a JSON object, found {other}"
        ))),
    }
}

/// Numeric `exp`, integer or fractional. Anything else reads as no expiry.
fn de_timestamp<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

/// String claim; other JSON types read as absent.
fn de_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// Integer or string user ID. Non-integer numbers keep their JSON text.
fn de_identifier<'de, D>(deserializer: D) -> Result<Option<Identifier>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => Some(match n.as_i64() {
            Some(id) => Identifier::Number(id),
            None => Identifier::Text(n.to_string()),
        }),
        Some(Value::String(s)) => Some(Identifier::Text(s)),
        _ => None,
    })
}
