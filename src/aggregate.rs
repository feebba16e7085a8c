// src/aggregate.rs
use std::collections::BTreeMap;

use crate::models::FilteredRecord;
use crate::normalize::{normalize_country, normalize_place};
use crate::taxonomy::Category;

/// Group key → count. Ordered by key so ranking ties resolve the same way on every run.
pub type Counts<K> = BTreeMap<K, usize>;

/// Ranked `(key, count)` pairs, highest count first.
pub type Ranked<K> = Vec<(K, usize)>;

/// Keys that can be present yet meaningless ("", "   ").
pub trait GroupKey: Ord + Clone {
    fn is_blank(&self) -> bool {
        false
    }
}

impl GroupKey for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl GroupKey for Category {}

impl GroupKey for (Category, String) {
    fn is_blank(&self) -> bool {
        self.1.is_blank()
    }
}

/// Count items per key; `None` and blank keys are skipped.
pub fn count_by<T, K, F>(items: &[T], key_fn: F) -> Counts<K>
where
    K: GroupKey,
    F: Fn(&T) -> Option<K>,
{
    let mut m = Counts::new();
    for it in items {
        match key_fn(it) {
            Some(k) if !k.is_blank() => *m.entry(k).or_insert(0) += 1,
            _ => {}
        }
    }
    m
}

/// First `n` entries by count descending. Equal counts fall back to key ascending.
pub fn top_n<K: Ord + Clone>(counts: &Counts<K>, n: usize) -> Ranked<K> {
    let mut v: Ranked<K> = counts.iter().map(|(k, c)| (k.clone(), *c)).collect();
    v.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    v.truncate(n);
    v
}

/// Non-zero categories in taxonomy order (pie slices).
pub fn category_distribution(list: &[FilteredRecord<'_>]) -> Vec<(Category, usize)> {
    let counts = count_by(list, |f| Some(f.category));
    Category::ALL
        .into_iter()
        .filter_map(|c| counts.get(&c).map(|&n| (c, n)))
        .collect()
}

pub fn country_counts(list: &[FilteredRecord<'_>]) -> Counts<String> {
    count_by(list, |f| normalize_country(&f.record.country))
}

pub fn top_countries(list: &[FilteredRecord<'_>], n: usize) -> Ranked<String> {
    top_n(&country_counts(list), n)
}

/// Top places, ascending so a horizontal bar chart puts the largest on top.
pub fn top_places_ascending(list: &[FilteredRecord<'_>], n: usize) -> Ranked<String> {
    let mut v = top_n(&count_by(list, |f| normalize_place(&f.record.place)), n);
    v.reverse();
    v
}

/// Per category, its `n` strongest countries. Categories without any
/// country-bearing record are absent.
pub fn countries_per_category(
    list: &[FilteredRecord<'_>],
    n: usize,
) -> BTreeMap<Category, Ranked<String>> {
    let pairs = count_by(list, |f| {
        normalize_country(&f.record.country).map(|c| (f.category, c))
    });

    let mut per_cat: BTreeMap<Category, Counts<String>> = BTreeMap::new();
    for ((cat, country), cnt) in pairs {
        per_cat.entry(cat).or_default().insert(country, cnt);
    }
    per_cat
        .into_iter()
        .map(|(cat, counts)| (cat, top_n(&counts, n)))
        .collect()
}
