// src/normalize.rs
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::taxonomy::Category;

static YMD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("static date pattern"));

/// Lower-case, NFKD-decompose, drop combining marks, trim.
/// "  Göteborg " → "goteborg".
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Canonical category for a raw field, or `None` when it is not a taxonomy member.
pub fn normalize_category(raw: Option<&str>) -> Option<Category> {
    let code = raw?.trim().to_uppercase();
    Category::from_code(&code)
}

/// Strict `YYYY-MM-DD`. Partial dates, other separators, surrounding text and
/// impossible calendar days are all rejected.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let caps = YMD_RE.captures(s)?;
    let y: i32 = caps.get(1)?.as_str().parse().ok()?;
    let m: u32 = caps.get(2)?.as_str().parse().ok()?;
    let d: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Coordinates arrive as numbers or numeric strings; anything else is absent.
pub fn parse_coord(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Country keys compare upper-cased; empty means "no country".
pub fn normalize_country(s: &str) -> Option<String> {
    let c = s.trim().to_uppercase();
    (!c.is_empty()).then_some(c)
}

pub fn normalize_place(s: &str) -> Option<String> {
    let p = s.trim();
    (!p.is_empty()).then(|| p.to_string())
}

pub fn format_ymd(d: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day())
}

pub fn format_ym(d: NaiveDate) -> String {
    format!("{:04}-{:02}", d.year(), d.month())
}
