// src/kpi.rs
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{FilterState, FilteredRecord};
use crate::normalize::{format_ymd, normalize_country};
use crate::taxonomy::Category;
use crate::temporal::date_span;

/// Shown when no filtered record carries a date.
pub const NO_SPAN: &str = "–";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total: usize,
    pub active_categories: usize,
    pub countries: usize,
    pub date_span: String,
    pub stats_line: String,
}

pub fn compute_kpis(list: &[FilteredRecord<'_>], state: &FilterState) -> Kpis {
    let countries: BTreeSet<String> = list
        .iter()
        .filter_map(|f| normalize_country(&f.record.country))
        .collect();

    let date_span = match date_span(list) {
        Some((lo, hi)) => format!("{} – {}", format_ymd(lo), format_ymd(hi)),
        None => NO_SPAN.to_string(),
    };

    Kpis {
        total: list.len(),
        active_categories: state.active.len(),
        countries: countries.len(),
        date_span,
        stats_line: format!("{} matches", list.len()),
    }
}

/// Headline before any filtering: collection size and taxonomy size.
pub fn collection_line(raw_len: usize) -> String {
    format!("{} events • {} categories", raw_len, Category::ALL.len())
}
