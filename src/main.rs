// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::DateTime;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use despacho_console::app::{dashboard_location, App, Screen};
use despacho_console::auth::SessionState;
use despacho_console::config::{Config, LogFormat, API_URL_ENV, DATA_DIR_ENV};
use despacho_console::models::LoginRequest;
use despacho_console::notify::ConsoleNotifier;

#[derive(Parser, Debug)]
#[command(name = "despacho", version, about = "Consola de despachos Betondecken")]
struct Cli {
    /// Base URL of the dispatch API (overrides API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the session token (overrides DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token.
    Login {
        correo: String,

        /// Password. Read from stdin when not given.
        #[arg(long, env = "DESPACHO_CONTRASENA", hide_env_values = true)]
        contrasena: Option<String>,

        /// Location to continue to after login (defaults to /dashboard)
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Drop the stored session token.
    Logout,

    /// Show the state of the stored session.
    Status,

    /// Open an application location, e.g. `/dashboard?buscar=101`.
    Open {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Open the dashboard, optionally filtered.
    Dashboard {
        #[arg(long)]
        buscar: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::from_lookup(|key| match key {
        API_URL_ENV if cli.api_url.is_some() => cli.api_url.clone(),
        DATA_DIR_ENV if cli.data_dir.is_some() => {
            cli.data_dir.as_ref().map(|p| p.display().to_string())
        }
        _ => std::env::var(key).ok(),
    })
    .context("Invalid configuration")?;

    init_tracing(config.log_format);

    let app = App::new(&config, Arc::new(ConsoleNotifier)).context("Failed to build HTTP client")?;

    match cli.cmd {
        Command::Login {
            correo,
            contrasena,
            redirect,
        } => {
            let contrasena = match contrasena {
                Some(c) => c,
                None => read_password()?,
            };
            let request = LoginRequest { correo, contrasena };
            match app.login(&request, redirect).await {
                Ok(screen) => print_screen(&screen),
                // Already reported through the notifier.
                Err(_) => return Ok(ExitCode::FAILURE),
            }
        }
        Command::Logout => {
            app.logout().context("Failed to remove session token")?;
        }
        Command::Status => {
            let state = app.status();
            print_status(&state);
            if !state.is_authorized() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Open { path } => print_screen(&app.open(&path).await),
        Command::Dashboard { buscar } => {
            print_screen(&app.open(&dashboard_location(buscar.as_deref())).await)
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn read_password() -> anyhow::Result<String> {
    eprint!("Contraseña: ");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("A password is required");
    }
    Ok(password)
}

fn print_screen(screen: &Screen) {
    if let Some(from) = &screen.redirected_from {
        eprintln!("{from} requiere iniciar sesión; mostrando {}", screen.location);
    }
    println!("{}", screen.body);
}

fn print_status(state: &SessionState) {
    match state {
        SessionState::Authorized(claims) => {
            println!("Sesión activa: {}", claims.display_name());
            println!("Rol: {}", claims.role().unwrap_or("-"));
            if let Some(id) = claims.user_id() {
                println!("Usuario: {id}");
            }
            match claims
                .expires_at()
                .and_then(|exp| DateTime::from_timestamp_millis((exp * 1000.0) as i64))
            {
                Some(at) => println!("Expira: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
                None => println!("Expira: nunca"),
            }
        }
        SessionState::Unauthenticated => println!("Sin sesión"),
        SessionState::Expired => println!("La sesión había expirado y se eliminó"),
        SessionState::Invalid(e) => println!("Token almacenado inválido ({})", e.error_code()),
        SessionState::Unauthorized { role, .. } => {
            println!("Rol sin acceso: {}", role.as_deref().unwrap_or("-"))
        }
    }
}
