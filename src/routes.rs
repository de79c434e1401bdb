// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Application route table.
//!
//! | Path | Page | Access |
//! |------|------|--------|
//! | `/` | Welcome | public |
//! | `/login` | Login | public |
//! | `/dashboard` | Dashboard | any authenticated user |
//! | anything else | NotFound | public |

use crate::auth::{Navigation, Redirect, RequiredRoles, RouteGate, TokenClaims};

/// Pages the shell knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Welcome,
    Login,
    Dashboard,
    NotFound,
}

/// Who may open a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected(RequiredRoles),
}

#[derive(Debug, Clone)]
struct RouteDef {
    path: String,
    page: Page,
    access: Access,
}

/// What the shell should do for a requested location.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Render {
        page: Page,
        /// Present for protected pages.
        claims: Option<TokenClaims>,
    },
    Redirect(Redirect),
}

#[derive(Clone)]
pub struct AppRouter {
    gate: RouteGate,
    routes: Vec<RouteDef>,
}

impl AppRouter {
    /// Router with the application's standard routes.
    pub fn new(gate: RouteGate) -> Self {
        Self::empty(gate)
            .route("/", Page::Welcome, Access::Public)
            .route("/login", Page::Login, Access::Public)
            .route(
                "/dashboard",
                Page::Dashboard,
                Access::Protected(RequiredRoles::any()),
            )
    }

    /// Router with no routes; everything resolves to `NotFound`.
    pub fn empty(gate: RouteGate) -> Self {
        Self {
            gate,
            routes: Vec::new(),
        }
    }

    /// Register (or replace) a route.
    pub fn route(mut self, path: &str, page: Page, access: Access) -> Self {
        let path = normalize(path);
        self.routes.retain(|r| r.path != path);
        self.routes.push(RouteDef { path, page, access });
        self
    }

    pub fn gate(&self) -> &RouteGate {
        &self.gate
    }

    /// Resolve `location` (path plus optional query) to a page or redirect.
    ///
    /// Protected routes run through the gate, which may notify and clear
    /// an expired token.
    pub fn resolve(&self, location: &str) -> Resolved {
        let path = normalize(location);
        let Some(route) = self.routes.iter().find(|r| r.path == path) else {
            return Resolved::Render {
                page: Page::NotFound,
                claims: None,
            };
        };

        match &route.access {
            Access::Public => Resolved::Render {
                page: route.page,
                claims: None,
            },
            Access::Protected(required) => match self.gate.protect(location, required) {
                Navigation::Allow(claims) => Resolved::Render {
                    page: route.page,
                    claims: Some(claims),
                },
                Navigation::Redirect(redirect) => Resolved::Redirect(redirect),
            },
        }
    }
}

/// Strip query/fragment and trailing slashes; `""` becomes `/`.
fn normalize(location: &str) -> String {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
