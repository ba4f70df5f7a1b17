//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use std::fmt::Write;

/// Languages with month and weekday names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    PtBr,
    En,
}

const PT_BR_MONTHS: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
    "Outubro", "Novembro", "Dezembro",
];
const PT_BR_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];
const PT_BR_WEEKDAYS: [&str; 7] = [
    "Segunda-feira",
    "Terça-feira",
    "Quarta-feira",
    "Quinta-feira",
    "Sexta-feira",
    "Sábado",
    "Domingo",
];
const PT_BR_WEEKDAYS_SHORT: [&str; 7] = ["Seg", "Ter", "Qua", "Qui", "Sex", "Sáb", "Dom"];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const EN_WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

impl Locale {
    /// Resolve a language tag such as `pt-BR` or `en-US`; anything unknown is English
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.to_ascii_lowercase();
        if lower == "pt" || lower.starts_with("pt-") || lower.starts_with("pt_") {
            Locale::PtBr
        } else {
            Locale::En
        }
    }

    fn month(self, month0: usize, short: bool) -> &'static str {
        match (self, short) {
            (Locale::PtBr, false) => PT_BR_MONTHS[month0],
            (Locale::PtBr, true) => PT_BR_MONTHS_SHORT[month0],
            (Locale::En, false) => EN_MONTHS[month0],
            (Locale::En, true) => EN_MONTHS_SHORT[month0],
        }
    }

    fn weekday(self, day0: usize, short: bool) -> &'static str {
        match (self, short) {
            (Locale::PtBr, false) => PT_BR_WEEKDAYS[day0],
            (Locale::PtBr, true) => PT_BR_WEEKDAYS_SHORT[day0],
            (Locale::En, false) => EN_WEEKDAYS[day0],
            (Locale::En, true) => EN_WEEKDAYS_SHORT[day0],
        }
    }
}

/// Moment.js-style tokens, longest first so `MMMM` wins over `MM`
const TOKENS: [&str; 12] = [
    "YYYY", "MMMM", "dddd", "MMM", "ddd", "YY", "MM", "DD", "HH", "hh", "mm", "ss",
];

/// Format a date using a Moment.js-compatible format string with localized names.
/// Text inside `[...]` is copied verbatim.
///
/// # Examples
/// ```ignore
/// format_date(&date, "DD MMM YYYY", Locale::PtBr) // -> "19 Abr 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, locale: Locale) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            match rest.find(']') {
                Some(end) => {
                    out.push_str(&rest[1..end]);
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push_str(&rest[1..]);
                    rest = "";
                }
            }
            continue;
        }

        match TOKENS.iter().find(|t| rest.starts_with(*t)) {
            Some(token) => {
                write_token(&mut out, date, token, locale);
                rest = &rest[token.len()..];
            }
            None => {
                out.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    out
}

fn write_token<Tz: TimeZone>(out: &mut String, date: &DateTime<Tz>, token: &str, locale: Locale) {
    let month0 = date.month0() as usize;
    let day0 = date.weekday().num_days_from_monday() as usize;
    // Writing into a String cannot fail
    let _ = match token {
        "YYYY" => write!(out, "{:04}", date.year()),
        "YY" => write!(out, "{:02}", date.year().rem_euclid(100)),
        "MMMM" => write!(out, "{}", locale.month(month0, false)),
        "MMM" => write!(out, "{}", locale.month(month0, true)),
        "MM" => write!(out, "{:02}", date.month()),
        "DD" => write!(out, "{:02}", date.day()),
        "dddd" => write!(out, "{}", locale.weekday(day0, false)),
        "ddd" => write!(out, "{}", locale.weekday(day0, true)),
        "HH" => write!(out, "{:02}", date.hour()),
        "hh" => write!(out, "{:02}", date.hour12().1),
        "mm" => write!(out, "{:02}", date.minute()),
        "ss" => write!(out, "{:02}", date.second()),
        _ => write!(out, "{}", token),
    };
}

/// Parse a timestamp as delivered by the content API into `tz`.
///
/// Accepts RFC 3339, `2021-04-19T00:00:00+0000`, offset-less
/// `2021-04-19T00:00:00` and plain `2021-04-19`. Values without an offset
/// are wall-clock time in `tz`.
pub fn parse_cms_date<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<DateTime<Tz>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.with_timezone(tz));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(local_time(tz, &dt));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(local_time(tz, &d.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Wall-clock time in `tz`; a time skipped by a DST jump is read as UTC
fn local_time<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Tz> {
    tz.from_local_datetime(naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(naive))
}

/// Format a date in ISO 8601 / XML format, for `<time datetime>`
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
