use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::taxonomy::Category;

/// One incident as delivered by ingestion. Read-only to the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(alias = "cat", deserialize_with = "lenient_opt_string")]
    pub category: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(alias = "city", deserialize_with = "lenient_string")]
    pub place: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(deserialize_with = "lenient_string")]
    pub url: String,
    #[serde(alias = "latitude")]
    pub lat: Option<Value>, // number | numeric string | absent
    #[serde(alias = "lon", alias = "longitude")]
    pub lng: Option<Value>,
}

// Hand-maintained event files carry nulls and bare numbers in text fields;
// those become text instead of failing the whole collection.
fn lenient_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    lenient_opt_string(d).map(Option::unwrap_or_default)
}

/// A record that survived filtering, annotated with its canonical category
/// and parsed date so downstream views never re-parse.
#[derive(Debug, Clone, Copy)]
pub struct FilteredRecord<'a> {
    pub record: &'a Record,
    pub category: Category,
    pub date: Option<NaiveDate>,
}

/// What the UI collaborator controls. Empty `active` matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub active: BTreeSet<Category>,
    pub query: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            active: Category::ALL.into_iter().collect(),
            query: String::new(),
            from: None,
            to: None,
        }
    }
}

/// Filter-state changes the UI can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAction {
    SelectAll,
    SelectNone,
    Toggle(Category),
    SetQuery(String),
    SetDateBounds { from: String, to: String },
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accepts_short_field_names() {
        let r: Record = serde_json::from_str(
            r#"{"cat":"drone","title":"t","country":"se","date":"2024-03-01","lat":59.3,"lng":"18.1"}"#,
        )
        .unwrap();
        assert_eq!(r.category.as_deref(), Some("drone"));
        assert_eq!(r.lat, Some(serde_json::json!(59.3)));
        assert_eq!(r.lng, Some(serde_json::json!("18.1")));
        assert!(r.place.is_empty());
    }

    #[test]
    fn record_coerces_odd_text_values() {
        let r: Record =
            serde_json::from_str(r#"{"cat":null,"title":null,"place":42,"summary":[1]}"#).unwrap();
        assert!(r.category.is_none());
        assert_eq!(r.title, "");
        assert_eq!(r.place, "42");
        assert_eq!(r.summary, "");
    }

    #[test]
    fn record_tolerates_missing_fields() {
        let r: Record = serde_json::from_str("{}").unwrap();
        assert!(r.category.is_none());
        assert!(r.lat.is_none());
    }

    #[test]
    fn default_state_activates_every_category() {
        let s = FilterState::default();
        assert_eq!(s.active.len(), Category::ALL.len());
        assert!(s.query.is_empty());
        assert!(s.from.is_none() && s.to.is_none());
    }
}
