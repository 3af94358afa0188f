use std::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

const WEEKDAYS: [&str; 7] = [
    "segunda-feira",
    "terça-feira",
    "quarta-feira",
    "quinta-feira",
    "sexta-feira",
    "sábado",
    "domingo",
];

const MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Parse a server timestamp. Offset-less values are stored in UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `YYYY-MM-DD` (optionally followed by a time) as `dd/mm/yyyy`.
pub fn format_date_br(raw: &str) -> Option<String> {
    let date_part = raw.trim().get(..10)?;
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some(date.format("%d/%m/%Y").to_string())
}

pub fn format_datetime_br<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%d/%m/%Y %H:%M:%S").to_string()
}

pub fn format_clock_hm<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    dt.format("%H:%M").to_string()
}

/// Heading date, e.g. `sábado, 1 de março de 2025`.
pub fn format_long_date_br(date: NaiveDate) -> String {
    let weekday = WEEKDAYS[date.weekday().num_days_from_monday() as usize];
    let month = MONTHS[date.month0() as usize];
    format!("{weekday}, {} de {month} de {}", date.day(), date.year())
}

/// Whole minutes as `"Xh Ym"`, or `"Ym"` under an hour.
pub fn format_elapsed_minutes(total_minutes: i64) -> String {
    let minutes = total_minutes.max(0);
    let hours = minutes / 60;
    let mut out = String::with_capacity(8);
    if hours > 0 {
        let _ = write!(out, "{hours}h {}m", minutes % 60);
    } else {
        let _ = write!(out, "{minutes}m");
    }
    out
}

pub fn time_online_since(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_elapsed_minutes((now - since).num_minutes())
}
