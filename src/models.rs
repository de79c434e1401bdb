// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures exchanged with the dispatch API.
//!
//! ## Model Categories
//!
//! - **Identifiers**: IDs the API sends as either numbers or strings
//! - **Login**: credentials in, token out
//! - **Despachos**: dispatch records, their status, search and edit form

use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Identifier Type
// =============================================================================

/// An ID the API may send as a JSON number or a JSON string.
///
/// Both forms render the same way, which is what search and URL building use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Identifier {
    Number(i64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{n}"),
            Identifier::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Identifier::Number(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::Text(value.to_string())
    }
}

// =============================================================================
// Login Models
// =============================================================================

/// Credentials posted to `/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub correo: String,
    pub contrasena: String,
}

/// Body returned by a successful `/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

// =============================================================================
// Despacho Models
// =============================================================================

/// A dispatch record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Despacho {
    pub codigo_despacho: Identifier,
    /// `YYYY-MM-DD`, a full ISO timestamp, or `DD/MM/YYYY`
    #[serde(default)]
    pub fecha: Option<String>,
    /// `HH:MM` (24h)
    #[serde(default)]
    pub hora: Option<String>,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Despacho {
    pub fn status(&self) -> DespachoStatus {
        DespachoStatus::parse(self.estado.as_deref())
    }

    /// Whether this record matches a dashboard search term.
    ///
    /// The code is matched as-is; date and hour case-insensitively.
    pub fn matches(&self, term: &str) -> bool {
        if self.codigo_despacho.to_string().contains(term) {
            return true;
        }
        let term = term.to_lowercase();
        [&self.fecha, &self.hora]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Keep the records matching `term`, in order. An empty term keeps all.
pub fn filter_despachos<'a>(despachos: &'a [Despacho], term: &str) -> Vec<&'a Despacho> {
    despachos.iter().filter(|d| d.matches(term)).collect()
}

/// Dispatch lifecycle states the dashboard distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DespachoStatus {
    Pendiente,
    EnProceso,
    Completado,
    Cancelado,
    /// Unknown or missing state
    Other,
}

impl DespachoStatus {
    /// Parse the API's `estado` text (case-insensitive).
    pub fn parse(estado: Option<&str>) -> Self {
        match estado.map(str::to_lowercase).as_deref() {
            Some("pendiente") => DespachoStatus::Pendiente,
            Some("en proceso") => DespachoStatus::EnProceso,
            Some("completado") => DespachoStatus::Completado,
            Some("cancelado") => DespachoStatus::Cancelado,
            _ => DespachoStatus::Other,
        }
    }

    /// Badge marker for terminal rendering.
    pub fn badge(&self) -> &'static str {
        match self {
            DespachoStatus::Pendiente => "…",
            DespachoStatus::EnProceso => "→",
            DespachoStatus::Completado => "✓",
            DespachoStatus::Cancelado => "✗",
            DespachoStatus::Other => "·",
        }
    }
}

/// Prefilled values for the edit dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDespachoForm {
    /// Date part only (`YYYY-MM-DD`)
    pub fecha: String,
    pub hora: String,
    pub codigo_despacho: Identifier,
}

impl From<&Despacho> for EditDespachoForm {
    fn from(despacho: &Despacho) -> Self {
        let fecha = despacho
            .fecha
            .as_deref()
            .and_then(|f| f.split('T').next())
            .unwrap_or_default()
            .to_string();

        Self {
            fecha,
            hora: despacho.hora.clone().unwrap_or_default(),
            codigo_despacho: despacho.codigo_despacho.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn despacho(codigo: i64, fecha: &str, hora: &str, estado: &str) -> Despacho {
        serde_json::from_value(json!({
            "codigo_despacho": codigo,
            "fecha": fecha,
            "hora": hora,
            "estado": estado,
        }))
        .unwrap()
    }

    #[test]
    fn identifier_accepts_numbers_and_strings() {
        let n: Identifier = serde_json::from_value(json!(42)).unwrap();
        let s: Identifier = serde_json::from_value(json!("D-42")).unwrap();
        assert_eq!(n, Identifier::Number(42));
        assert_eq!(s.to_string(), "D-42");
    }

    #[test]
    fn despacho_keeps_extra_fields() {
        let d: Despacho = serde_json::from_value(json!({
            "codigo_despacho": 1,
            "obra": "Torre Norte",
        }))
        .unwrap();
        assert_eq!(d.fecha, None);
        assert_eq!(d.extra["obra"], "Torre Norte");
    }

    #[test]
    fn search_matches_code_date_and_hour() {
        let list = vec![
            despacho(1024, "2025-04-28", "13:30", "Pendiente"),
            despacho(2048, "2025-05-01", "08:00", "Completado"),
        ];

        assert_eq!(filter_despachos(&list, "").len(), 2);
        assert_eq!(filter_despachos(&list, "102")[0].codigo_despacho, Identifier::Number(1024));
        assert_eq!(filter_despachos(&list, "05-01")[0].codigo_despacho, Identifier::Number(2048));
        assert_eq!(filter_despachos(&list, "13:3").len(), 1);
        assert!(filter_despachos(&list, "9999").is_empty());
    }

    #[test]
    fn search_on_text_fields_ignores_case() {
        let list = vec![despacho(1, "28/ABR/2025", "08:00", "Pendiente")];
        assert_eq!(filter_despachos(&list, "abr").len(), 1);
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!(DespachoStatus::parse(Some("PENDIENTE")), DespachoStatus::Pendiente);
        assert_eq!(DespachoStatus::parse(Some("En Proceso")), DespachoStatus::EnProceso);
        assert_eq!(DespachoStatus::parse(Some("completado")), DespachoStatus::Completado);
        assert_eq!(DespachoStatus::parse(Some("Cancelado")), DespachoStatus::Cancelado);
        assert_eq!(DespachoStatus::parse(Some("archivado")), DespachoStatus::Other);
        assert_eq!(DespachoStatus::parse(None), DespachoStatus::Other);
    }

    #[test]
    fn edit_form_takes_date_part() {
        let d = despacho(7, "2025-04-28T00:00:00.000Z", "13:30", "Pendiente");
        let form = EditDespachoForm::from(&d);
        assert_eq!(form.fecha, "2025-04-28");
        assert_eq!(form.hora, "13:30");
        assert_eq!(form.codigo_despacho, Identifier::Number(7));
    }

    #[test]
    fn edit_form_defaults_missing_fields() {
        let d: Despacho = serde_json::from_value(json!({"codigo_despacho": "X1"})).unwrap();
        let form = EditDespachoForm::from(&d);
        assert_eq!(form.fecha, "");
        assert_eq!(form.hora, "");
    }
}
