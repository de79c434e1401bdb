// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token decode errors.

/// Reasons a stored token could not be turned into claims.
///
/// These never escape the session guard; they are folded into
/// [`SessionState::Invalid`](super::SessionState::Invalid) and only used
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token is not a three-segment `header.payload.signature` string,
    /// or a segment is not valid base64url.
    #[error("Token is malformed")]
    Malformed,
    /// Payload segment decoded but is not a JSON claims object.
    #[error("Token payload is not a claims object: {0}")]
    InvalidPayload(String),
    /// Payload is JSON `null` or an object with no claims.
    #[error("Token carries no claims")]
    EmptyClaims,
}

impl TokenError {
    /// Short machine-readable code for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed_token",
            TokenError::InvalidPayload(_) => "invalid_payload",
            TokenError::EmptyClaims => "empty_claims",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(TokenError::Malformed.error_code(), "malformed_token");
        assert_eq!(
            TokenError::InvalidPayload("x".into()).error_code(),
            "invalid_payload"
        );
        assert_eq!(TokenError::EmptyClaims.error_code(), "empty_claims");
    }

    #[test]
    fn display_includes_detail() {
        let err = TokenError::InvalidPayload("expected map".into());
        assert_eq!(
            err.to_string(),
            "Token payload is not a claims object: expected map"
        );
    }
}
