// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Despacho Console - session-guarded client for the Betondecken dispatch API
//!
//! The session is a single JWT kept in a durable slot. Every protected
//! navigation is checked by a session guard that decodes the token
//! (without verifying its signature), drops it once expired, and
//! enforces the route's role requirement.
//!
//! ## Modules
//!
//! - `auth` - Token claims, session guard and route gate
//! - `storage` - Durable and in-memory token slots
//! - `state` - Shared session context
//! - `api` - HTTP client, login and despacho queries (reqwest)
//! - `app` - Application shell and page rendering
//! - `routes` - Route table
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod storage;
