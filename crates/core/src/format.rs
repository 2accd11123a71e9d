//! Display formatting for banner fields.
//!
//! Timestamps follow the EMR house style `DD - MMM - YYYY`, with `@ HH:mm`
//! appended for visit start times. The age string coarsens with age the way
//! clinicians expect: days under one month, months under one year, whole
//! years after that.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Format a visit start time, e.g. `01 - Jan - 2023 @ 09:00`.
pub fn format_visit_started(started: &DateTime<Utc>) -> String {
    started.format("%d - %b - %Y @ %H:%M").to_string()
}

/// Format a birth date, e.g. `20 - Mar - 1992`.
pub fn format_birth_date(birth_date: NaiveDate) -> String {
    birth_date.format("%d - %b - %Y").to_string()
}

/// Human-readable age at `today` for a patient born on `birth_date`.
///
/// Future birth dates clamp to `0 days`.
pub fn age(birth_date: NaiveDate, today: NaiveDate) -> String {
    if birth_date > today {
        return "0 days".to_string();
    }

    let mut months =
        (today.year() - birth_date.year()) * 12 + (today.month() as i32 - birth_date.month() as i32);
    if today.day() < birth_date.day() {
        months -= 1;
    }

    if months < 1 {
        let days = (today - birth_date).num_days();
        return if days == 1 {
            "1 day".to_string()
        } else {
            format!("{days} days")
        };
    }

    if months < 12 {
        return if months == 1 {
            "1 month".to_string()
        } else {
            format!("{months} months")
        };
    }

    let years = months / 12;
    if years == 1 {
        "1 yr".to_string()
    } else {
        format!("{years} yrs")
    }
}

/// Capitalise the first character and lowercase the rest, e.g.
/// `male` → `Male`, `FEMALE` → `Female`.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}
