// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Date and hour formatting for display (Spanish locale).
//!
//! Inputs come straight from the API and are not always well formed.
//! Empty input renders as an empty string; anything unparseable is shown
//! unchanged rather than as a garbled date.

use chrono::{Datelike, NaiveDate};

const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// `2025-04-28` (or `28/04/2025`, or `2025-04-28T..`) → `Lunes, 28 de Abril del 2025`.
pub fn format_date(fecha: &str) -> String {
    if fecha.is_empty() {
        return String::new();
    }

    match parse_date(fecha) {
        Some(date) => format!(
            "{}, {} de {} del {}",
            WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
            date.day(),
            MONTHS[date.month0() as usize],
            date.year()
        ),
        None => fecha.to_string(),
    }
}

fn parse_date(fecha: &str) -> Option<NaiveDate> {
    if fecha.contains('/') {
        let mut parts = fecha.split('/').map(str::trim);
        let day = parts.next()?.parse().ok()?;
        let month = parts.next()?.parse().ok()?;
        let year = parts.next()?.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let date_part = fecha.split('T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// `13:30` → `1:30 PM`, `00:00` → `12:00 AM`, `08:00` → `8:00 AM`.
///
/// Minutes are kept exactly as given; seconds, if any, are dropped.
pub fn format_time(hora: &str) -> String {
    if hora.is_empty() {
        return String::new();
    }

    let mut parts = hora.split(':');
    let (Some(hours), Some(minutes)) = (parts.next(), parts.next()) else {
        return hora.to_string();
    };
    let Some(hours) = hours.trim().parse::<u32>().ok().filter(|h| *h < 24) else {
        return hora.to_string();
    };

    let period = if hours >= 12 { "PM" } else { "AM" };
    let display = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };

    format!("{display}:{minutes} {period}")
}

/// Inverse of [`format_time`]: `1:30 PM` → `13:30`.
pub fn time_to_24h(display: &str) -> Option<String> {
    let (clock, period) = display.trim().split_once(' ')?;
    let (hours, minutes) = clock.split_once(':')?;
    let hours: u32 = hours.parse().ok().filter(|h| (1..=12).contains(h))?;

    let hours = match (period, hours) {
        ("AM", 12) => 0,
        ("AM", h) => h,
        ("PM", 12) => 12,
        ("PM", h) => h + 12,
        _ => return None,
    };

    Some(format!("{hours:02}:{minutes}"))
}

/// `Lunes, 28 de Abril del 2025 a las 1:30 PM`. Empty if either part is.
pub fn format_date_time(fecha: &str, hora: &str) -> String {
    if fecha.is_empty() || hora.is_empty() {
        return String::new();
    }
    format!("{} a las {}", format_date(fecha), format_time(hora))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_date("2025-04-28"), "Lunes, 28 de Abril del 2025");
        assert_eq!(format_date("2024-12-01"), "Domingo, 1 de Diciembre del 2024");
    }

    #[test]
    fn formats_slash_dates() {
        assert_eq!(format_date("28/04/2025"), "Lunes, 28 de Abril del 2025");
        assert_eq!(format_date("3/5/2025"), "Sábado, 3 de Mayo del 2025");
    }

    #[test]
    fn formats_full_timestamps_by_date_part() {
        assert_eq!(
            format_date("2025-04-28T00:00:00.000Z"),
            "Lunes, 28 de Abril del 2025"
        );
    }

    #[test]
    fn bad_dates_pass_through() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("mañana"), "mañana");
        assert_eq!(format_date("2025-02-30"), "2025-02-30");
    }

    #[test]
    fn formats_hours() {
        assert_eq!(format_time("13:30"), "1:30 PM");
        assert_eq!(format_time("00:00"), "12:00 AM");
        assert_eq!(format_time("08:00"), "8:00 AM");
        assert_eq!(format_time("12:15"), "12:15 PM");
        assert_eq!(format_time("23:59:59"), "11:59 PM");
    }

    #[test]
    fn bad_hours_pass_through() {
        assert_eq!(format_time(""), "");
        assert_eq!(format_time("1330"), "1330");
        assert_eq!(format_time("25:00"), "25:00");
        assert_eq!(format_time("xx:00"), "xx:00");
    }

    #[test]
    fn twelve_hour_round_trip() {
        for hour in 0..24 {
            let original = format!("{hour:02}:45");
            let shown = format_time(&original);
            assert_eq!(time_to_24h(&shown), Some(original), "via {shown}");
        }
    }

    #[test]
    fn to_24h_rejects_garbage() {
        assert_eq!(time_to_24h("13:30 PM"), None);
        assert_eq!(time_to_24h("1:30"), None);
        assert_eq!(time_to_24h("1:30 XM"), None);
    }

    #[test]
    fn joins_date_and_time() {
        assert_eq!(
            format_date_time("2025-04-28", "13:30"),
            "Lunes, 28 de Abril del 2025 a las 1:30 PM"
        );
        assert_eq!(format_date_time("", "13:30"), "");
        assert_eq!(format_date_time("2025-04-28", ""), "");
    }
}
