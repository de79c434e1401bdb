// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side session checks for the dispatch API's JWTs.
//!
//! ## Flow
//!
//! 1. `POST /login` returns a JWT, stored in the single token slot
//! 2. Each navigation to a protected route runs the [`SessionGuard`]:
//!    - decodes the payload locally (signature is NOT checked; the API does that)
//!    - checks `exp` against the clock, clearing the slot when it has passed
//!    - checks `rol` against the route's [`RequiredRoles`]
//! 3. The [`RouteGate`] turns the outcome into a notification and a navigation
//!
//! The token is never re-validated against the server on navigation.

pub mod claims;
pub mod error;
pub mod gate;
pub mod guard;
pub mod roles;

pub use claims::{decode_claims, TokenClaims};
pub use error::TokenError;
pub use gate::{Navigation, Redirect, RouteGate, ENTRY_ROUTE};
pub use guard::{
    classify, classify_at_millis, Clock, FixedClock, SessionGuard, SessionState, SystemClock,
};
pub use roles::RequiredRoles;
