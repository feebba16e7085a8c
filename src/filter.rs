// src/filter.rs
use tracing::debug;

use crate::models::{FilterAction, FilterState, FilteredRecord, Record};
use crate::normalize::{normalize_category, normalize_text, parse_date};
use crate::taxonomy::Category;

/// Project `records` through `state`, preserving input order.
///
/// Steps per record: canonical category in the active set, then inclusive
/// date bounds (an undated record fails any bound that is set), then every
/// query term must occur in the normalized haystack.
pub fn filter<'a, I>(records: I, state: &FilterState) -> Vec<FilteredRecord<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let terms = query_terms(&state.query);
    let mut out = Vec::new();

    for r in records {
        let Some(category) = normalize_category(r.category.as_deref()) else {
            continue;
        };
        if !state.active.contains(&category) {
            continue;
        }

        let date = parse_date(&r.date);
        if let Some(from) = state.from {
            if date.map_or(true, |d| d < from) {
                continue;
            }
        }
        if let Some(to) = state.to {
            if date.map_or(true, |d| d > to) {
                continue;
            }
        }

        if !terms.is_empty() {
            let hay = haystack(r, category);
            if !terms.iter().all(|t| hay.contains(t.as_str())) {
                continue;
            }
        }

        out.push(FilteredRecord { record: r, category, date });
    }
    out
}

/// Whitespace-split, normalized, empties dropped.
pub fn query_terms(query: &str) -> Vec<String> {
    normalize_text(query)
        .split_whitespace()
        .map(normalize_text)
        .filter(|t| !t.is_empty())
        .collect()
}

fn haystack(r: &Record, category: Category) -> String {
    normalize_text(
        &[
            r.title.as_str(),
            r.place.as_str(),
            r.summary.as_str(),
            r.source.as_str(),
            r.country.as_str(),
            category.code(),
            r.url.as_str(),
        ]
        .join(" "),
    )
}

impl FilterState {
    pub fn select_all(&mut self) {
        self.active = Category::ALL.into_iter().collect();
    }

    pub fn select_none(&mut self) {
        self.active.clear();
    }

    pub fn toggle(&mut self, c: Category) {
        if !self.active.remove(&c) {
            self.active.insert(c);
        }
    }

    pub fn set_query(&mut self, q: &str) {
        self.query = q.to_string();
    }

    /// Bounds come from date inputs as text; anything but `YYYY-MM-DD` clears the bound.
    pub fn set_date_bounds(&mut self, from: &str, to: &str) {
        self.from = parse_date(from.trim());
        self.to = parse_date(to.trim());
    }

    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    pub fn apply(&mut self, action: FilterAction) {
        debug!("Filter action - {:?}", action);
        match action {
            FilterAction::SelectAll => self.select_all(),
            FilterAction::SelectNone => self.select_none(),
            FilterAction::Toggle(c) => self.toggle(c),
            FilterAction::SetQuery(q) => self.set_query(&q),
            FilterAction::SetDateBounds { from, to } => self.set_date_bounds(&from, &to),
            FilterAction::Reset => self.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn rec(cat: &str, country: &str, date: &str, title: &str) -> Record {
        Record {
            category: Some(cat.to_string()),
            country: country.to_string(),
            date: date.to_string(),
            title: title.to_string(),
            ..Record::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn unknown_categories_never_pass() {
        let rs = vec![rec("DRONE", "SE", "2024-03-01", ""), rec("BOGUS", "SE", "2024-03-03", "")];
        let out = filter(&rs, &FilterState::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Drone);
    }

    #[test]
    fn empty_active_set_matches_nothing() {
        let rs = vec![rec("DRONE", "SE", "2024-03-01", "")];
        let mut st = FilterState::default();
        st.select_none();
        assert!(filter(&rs, &st).is_empty());
    }

    #[test]
    fn inactive_category_is_dropped() {
        let rs = vec![rec("drone", "SE", "", ""), rec("mil", "NO", "", "")];
        let mut st = FilterState::default();
        st.toggle(Category::Drone);
        let out = filter(&rs, &st);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category, Category::Mil);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let rs = vec![
            rec("DRONE", "SE", "2024-02-29", ""),
            rec("DRONE", "SE", "2024-03-01", ""),
            rec("DRONE", "SE", "2024-03-05", ""),
            rec("DRONE", "SE", "2024-03-06", ""),
        ];
        let mut st = FilterState::default();
        st.set_date_bounds("2024-03-01", "2024-03-05");
        let dates: Vec<_> = filter(&rs, &st).iter().map(|f| f.date).collect();
        assert_eq!(dates, vec![ymd(2024, 3, 1), ymd(2024, 3, 5)]);
    }

    #[test]
    fn undated_records_fail_active_bounds_only() {
        let rs = vec![rec("DRONE", "SE", "", ""), rec("DRONE", "SE", "03/01/2024", "")];
        let mut st = FilterState::default();
        assert_eq!(filter(&rs, &st).len(), 2);
        st.set_date_bounds("", "2030-01-01");
        assert!(filter(&rs, &st).is_empty());
        st.set_date_bounds("2000-01-01", "");
        assert!(filter(&rs, &st).is_empty());
    }

    #[test]
    fn search_is_conjunctive() {
        let rs = vec![
            rec("DRONE", "Sweden", "", "Drone over airport"),
            rec("DRONE", "Norway", "", "Drone sighting"),
            rec("MIL", "Sweden", "", "Exercise"),
        ];
        let mut st = FilterState::default();
        st.set_query("drone sweden");
        let out = filter(&rs, &st);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].record.title, "Drone over airport");
    }

    #[test]
    fn search_folds_diacritics_and_sees_category_code() {
        let mut r = rec("hybrid", "SE", "", "Påverkanskampanj");
        r.place = "Göteborg".into();
        let rs = vec![r];
        let mut st = FilterState::default();
        st.set_query("  GOTEBORG   paverkan ");
        assert_eq!(filter(&rs, &st).len(), 1);
        st.set_query("HYBRID");
        assert_eq!(filter(&rs, &st).len(), 1);
        st.set_query("göteborg drone");
        assert!(filter(&rs, &st).is_empty());
    }

    #[test]
    fn search_covers_url_and_source() {
        let mut r = rec("INTEL", "DE", "", "x");
        r.url = "https://example.org/spy-case".into();
        r.source = "Reuters".into();
        let rs = vec![r];
        let mut st = FilterState::default();
        st.set_query("reuters spy-case");
        assert_eq!(filter(&rs, &st).len(), 1);
    }

    #[test]
    fn output_keeps_input_order_and_parsed_dates() {
        let rs = vec![
            rec("MIL", "A", "2024-01-03", ""),
            rec("DRONE", "B", "2024-01-01", ""),
            rec("GPS", "C", "2024-01-02", ""),
        ];
        let out = filter(&rs, &FilterState::default());
        let countries: Vec<_> = out.iter().map(|f| f.record.country.as_str()).collect();
        assert_eq!(countries, vec!["A", "B", "C"]);
        assert_eq!(out[1].date, ymd(2024, 1, 1));
    }

    #[test]
    fn actions_drive_state() {
        let mut st = FilterState::default();
        st.apply(FilterAction::SelectNone);
        assert!(st.active.is_empty());
        st.apply(FilterAction::Toggle(Category::Gps));
        assert_eq!(st.active.len(), 1);
        st.apply(FilterAction::SetQuery("x".into()));
        st.apply(FilterAction::SetDateBounds { from: "2024-01-01".into(), to: "bad".into() });
        assert_eq!(st.from, ymd(2024, 1, 1));
        assert_eq!(st.to, None);
        st.apply(FilterAction::Reset);
        assert_eq!(st, FilterState::default());
        st.apply(FilterAction::SelectNone);
        st.apply(FilterAction::SelectAll);
        assert_eq!(st.active.len(), 11);
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        (
            prop::sample::select(vec!["DRONE", "mil", "BOGUS", "", "gps", "POLICY"]),
            prop::sample::select(vec!["SE", "NO", "fi", ""]),
            prop::sample::select(vec!["2024-01-01", "2024-02-15", "2023-12-31", "", "bad"]),
            prop::sample::select(vec!["drone seen", "cable cut", "Spy trial", ""]),
        )
            .prop_map(|(c, k, d, t)| rec(c, k, d, t))
    }

    fn arb_state() -> impl Strategy<Value = FilterState> {
        (
            prop::collection::btree_set(prop::sample::select(Category::ALL.to_vec()), 0..12),
            prop::sample::select(vec!["", "drone", "se spy", "cable"]),
            prop::sample::select(vec!["", "2024-01-01"]),
            prop::sample::select(vec!["", "2024-02-01"]),
        )
            .prop_map(|(active, q, from, to)| {
                let mut st = FilterState { active, ..FilterState::default() };
                st.set_query(q);
                st.set_date_bounds(from, to);
                st
            })
    }

    proptest! {
        #[test]
        fn nothing_matches_without_categories(rs in prop::collection::vec(arb_record(), 0..40)) {
            let mut st = FilterState::default();
            st.select_none();
            prop_assert!(filter(&rs, &st).is_empty());
        }

        #[test]
        fn filtering_is_idempotent(
            rs in prop::collection::vec(arb_record(), 0..40),
            st in arb_state(),
        ) {
            let once = filter(&rs, &st);
            let twice = filter(once.iter().map(|f| f.record), &st);
            prop_assert_eq!(once.len(), twice.len());
            for (a, b) in once.iter().zip(&twice) {
                prop_assert!(std::ptr::eq(a.record, b.record));
                prop_assert_eq!(a.category, b.category);
                prop_assert_eq!(a.date, b.date);
            }
        }

        #[test]
        fn survivors_are_taxonomy_members(rs in prop::collection::vec(arb_record(), 0..40)) {
            for f in filter(&rs, &FilterState::default()) {
                prop_assert_ne!(f.record.category.as_deref().map(str::trim), Some("BOGUS"));
                prop_assert_ne!(f.record.category.as_deref().map(str::trim), Some(""));
            }
        }
    }
}
