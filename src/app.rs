// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Application shell: wires the session, route gate and API services, and
//! renders pages as plain text.

use std::sync::Arc;

use tracing::{debug, info};
use url::form_urlencoded;

use crate::api::{ApiClient, DespachoService, LoginError, LoginService};
use crate::auth::{
    Clock, Redirect, RequiredRoles, RouteGate, SessionGuard, SessionState, SystemClock,
    TokenClaims,
};
use crate::config::Config;
use crate::error::ApiError;
use crate::format::{format_date, format_time};
use crate::models::{filter_despachos, Despacho, LoginRequest};
use crate::notify::{Notification, Notifier};
use crate::routes::{AppRouter, Page, Resolved};
use crate::state::SessionContext;
use crate::storage::{FileTokenStore, StoragePaths, StorageResult};

/// Query parameter carrying the dashboard search term.
pub const SEARCH_PARAM: &str = "buscar";

pub const MSG_LOGGED_OUT: &str = "Sesión cerrada";
pub const MSG_NO_DESPACHOS: &str = "No se encontraron despachos";
pub const MSG_LOAD_FAILED: &str = "Ocurrió un error al cargar los despachos";

/// Redirect chains longer than this render the not-found page.
const MAX_REDIRECTS: usize = 3;

/// A rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    /// Location actually rendered, after redirects.
    pub location: String,
    pub page: Page,
    /// Location the gate turned away, if any.
    pub redirected_from: Option<String>,
    pub body: String,
}

pub struct App {
    session: SessionContext,
    router: AppRouter,
    login: LoginService,
    despachos: DespachoService,
    notifier: Arc<dyn Notifier>,
}

impl App {
    /// Build the application with the durable token store under
    /// `config.data_dir` and the system clock.
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let store = FileTokenStore::new(StoragePaths::new(&config.data_dir));
        Self::assemble(SessionContext::new(store), SystemClock, config, notifier)
    }

    pub fn assemble(
        session: SessionContext,
        clock: impl Clock + 'static,
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let guard = SessionGuard::new(session.clone()).with_clock(clock);
        let gate = RouteGate::new(guard, notifier.clone());
        let client = ApiClient::new(&config.api_url, session.clone(), config.http_timeout)?;

        Ok(Self {
            router: AppRouter::new(gate),
            login: LoginService::new(client.clone(), notifier.clone()),
            despachos: DespachoService::new(client, config.read_retries),
            session,
            notifier,
        })
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn router(&self) -> &AppRouter {
        &self.router
    }

    /// Navigate to `location`, following gate redirects.
    pub async fn open(&self, location: &str) -> Screen {
        let mut location = location.to_string();
        let mut redirected_from = None;

        for _ in 0..MAX_REDIRECTS {
            match self.router.resolve(&location) {
                Resolved::Render { page, claims } => {
                    let body = self.render(page, &location, claims.as_ref()).await;
                    return Screen {
                        location,
                        page,
                        redirected_from,
                        body,
                    };
                }
                Resolved::Redirect(Redirect { to, from }) => {
                    debug!(%to, "Navigation redirected");
                    redirected_from = from;
                    location = to;
                }
            }
        }

        Screen {
            body: render_not_found(),
            location,
            page: Page::NotFound,
            redirected_from,
        }
    }

    /// Log in and open the landing location.
    ///
    /// `from` is the location a previous navigation was turned away from.
    pub async fn login(&self, request: &LoginRequest, from: Option<String>) -> Result<Screen, LoginError> {
        let redirect = from.map(|from| Redirect {
            to: self.router.gate().entry_route().to_string(),
            from: Some(from),
        });
        let landing = self.login.login(request, redirect.as_ref()).await?;
        Ok(self.open(&landing).await)
    }

    pub fn logout(&self) -> StorageResult<()> {
        self.login.logout()?;
        self.notifier.notify(Notification::info(MSG_LOGGED_OUT));
        Ok(())
    }

    /// Evaluate the stored session as a protected page would.
    pub fn status(&self) -> SessionState {
        self.router.gate().guard().evaluate(&RequiredRoles::any())
    }

    async fn render(&self, page: Page, location: &str, claims: Option<&TokenClaims>) -> String {
        match (page, claims) {
            (Page::Welcome, _) => render_welcome(),
            (Page::Login, _) => render_login(),
            (Page::Dashboard, Some(claims)) => {
                let term = search_term(location).unwrap_or_default();
                let despachos = match claims.user_id() {
                    Some(id) => self.despachos.list_for_user(id).await,
                    None => Err(ApiError::new(0, MSG_LOAD_FAILED, serde_json::Value::Null)),
                };
                render_dashboard(claims, &term, despachos)
            }
            (Page::Dashboard, None) | (Page::NotFound, _) => render_not_found(),
        }
    }
}

/// Dashboard location with an optional search term.
pub fn dashboard_location(term: Option<&str>) -> String {
    match term.filter(|t| !t.is_empty()) {
        Some(term) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(SEARCH_PARAM, term)
                .finish();
            format!("/dashboard?{query}")
        }
        None => "/dashboard".to_string(),
    }
}

fn search_term(location: &str) -> Option<String> {
    let (_, query) = location.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == SEARCH_PARAM)
        .map(|(_, value)| value.into_owned())
}

fn render_welcome() -> String {
    [
        "Betondecken",
        "",
        "Consulta y gestiona tus despachos.",
        "Inicia sesión con `despacho login <correo>` para continuar.",
    ]
    .join("\n")
}

fn render_login() -> String {
    [
        "Bienvenido",
        "",
        "Uso: despacho login <correo> [--redirect <ruta>]",
        "La contraseña se lee de DESPACHO_CONTRASENA o de la entrada estándar.",
    ]
    .join("\n")
}

fn render_not_found() -> String {
    "404 - Página no encontrada".to_string()
}

fn render_dashboard(
    claims: &TokenClaims,
    term: &str,
    despachos: Result<Vec<Despacho>, ApiError>,
) -> String {
    let mut lines = vec![
        "Dashboard".to_string(),
        format!("Bienvenido, {}", claims.display_name()),
        format!("Rol: {}", claims.role().unwrap_or("-")),
    ];
    if !term.is_empty() {
        lines.push(format!("Buscar: {term}"));
    }
    lines.push(String::new());

    match despachos {
        Err(e) => {
            let message = if e.message.is_empty() {
                MSG_LOAD_FAILED.to_string()
            } else {
                e.message
            };
            lines.push("Error".to_string());
            lines.push(message);
        }
        Ok(list) => {
            let visible = filter_despachos(&list, term);
            info!(total = list.len(), shown = visible.len(), "Despachos loaded");
            if visible.is_empty() {
                lines.push(MSG_NO_DESPACHOS.to_string());
            } else {
                lines.extend(render_table(&visible));
            }
        }
    }

    lines.join("\n")
}

fn render_table(despachos: &[&Despacho]) -> Vec<String> {
    let header = ["ID", "Fecha", "Hora", "Estado"].map(str::to_string);
    let rows: Vec<[String; 4]> = despachos
        .iter()
        .map(|d| {
            let estado = d.estado.clone().unwrap_or_default();
            [
                d.codigo_despacho.to_string(),
                format_date(d.fecha.as_deref().unwrap_or_default()),
                format_time(d.hora.as_deref().unwrap_or_default()),
                format!("{} {}", d.status().badge(), estado).trim_end().to_string(),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String; 4]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    std::iter::once(line(&header))
        .chain(rows.iter().map(line))
        .collect()
}
