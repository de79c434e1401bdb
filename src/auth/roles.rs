// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role requirements for protected routes.
//!
//! Roles are plain strings drawn from the API's vocabulary. The client does
//! not interpret them beyond exact membership checks; there is no hierarchy.

use std::collections::BTreeSet;
use std::fmt;

/// Administrative role.
pub const ROLE_ADMIN: &str = "admin";

/// Dispatch operator role.
pub const ROLE_OPERATOR: &str = "operador";

/// Set of roles a route accepts.
///
/// An empty set means "any authenticated user".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredRoles(BTreeSet<String>);

impl RequiredRoles {
    /// No role restriction.
    pub fn any() -> Self {
        Self::default()
    }

    /// Accept exactly the given roles.
    pub fn of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    /// Whether a token carrying `role` may pass.
    ///
    /// A missing role only passes when nothing is required.
    pub fn permits(&self, role: Option<&str>) -> bool {
        if self.is_empty() {
            return true;
        }
        role.is_some_and(|r| self.contains(r))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for RequiredRoles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "*");
        }
        let joined: Vec<&str> = self.iter().collect();
        write!(f, "{}", joined.join(","))
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredRoles {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::of(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_permits_everyone() {
        let roles = RequiredRoles::any();
        assert!(roles.permits(Some("viewer")));
        assert!(roles.permits(None));
    }

    #[test]
    fn membership_is_exact() {
        let roles = RequiredRoles::of([ROLE_ADMIN]);
        assert!(roles.permits(Some("admin")));
        assert!(!roles.permits(Some("Admin")));
        assert!(!roles.permits(Some("viewer")));
    }

    #[test]
    fn missing_role_fails_when_required() {
        let roles = RequiredRoles::of([ROLE_ADMIN, ROLE_OPERATOR]);
        assert!(!roles.permits(None));
    }

    #[test]
    fn display_lists_roles_sorted() {
        let roles: RequiredRoles = ["operador", "admin"].into_iter().collect();
        assert_eq!(roles.to_string(), "admin,operador");
        assert_eq!(RequiredRoles::any().to_string(), "*");
    }
}
