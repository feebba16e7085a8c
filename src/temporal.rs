// src/temporal.rs
use chrono::{Datelike, Duration, NaiveDate};
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::aggregate::{count_by, Counts};
use crate::models::FilteredRecord;
use crate::normalize::{format_ym, format_ymd};
use crate::taxonomy::Category;

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// ISO-8601 week of a date: owning year, week number, weekday (Monday = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
    pub weekday: usize,
}

impl IsoWeek {
    /// Shift to the Thursday of the week; that Thursday's year owns the week.
    /// Week 1 is the one holding January 4th.
    pub fn of(date: NaiveDate) -> IsoWeek {
        let weekday = date.weekday().num_days_from_monday() as i64;
        let thursday = date + Duration::days(3 - weekday);
        let year = thursday.year();

        let jan4 = NaiveDate::from_ymd_opt(year, 1, 4).unwrap_or(thursday);
        let first_thursday =
            jan4 + Duration::days(3 - jan4.weekday().num_days_from_monday() as i64);

        let days = (thursday - first_thursday).num_days() as f64;
        let week = 1 + (days / 7.0).round() as u32;
        IsoWeek {
            year,
            week,
            weekday: weekday as usize,
        }
    }

    /// "2024-W01"
    pub fn key(&self) -> String {
        format!("{}-W{:02}", self.year, self.week)
    }
}

fn dated<'a>(list: &'a [FilteredRecord<'a>]) -> impl Iterator<Item = NaiveDate> + 'a {
    list.iter().filter_map(|f| f.date)
}

/// `YYYY-MM-DD` → count, ascending. Undated records are ignored.
pub fn day_counts(list: &[FilteredRecord<'_>]) -> Counts<String> {
    count_by(list, |f| f.date.map(format_ymd))
}

/// `YYYY-MM` → count, ascending.
pub fn month_counts(list: &[FilteredRecord<'_>]) -> Counts<String> {
    count_by(list, |f| f.date.map(format_ym))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Series {
    pub x: Vec<String>,
    pub y: Vec<usize>,
}

impl Series {
    pub fn total(&self) -> usize {
        self.y.iter().sum()
    }
}

pub fn day_series(list: &[FilteredRecord<'_>]) -> Series {
    let (x, y) = day_counts(list).into_iter().unzip();
    Series { x, y }
}

/// Running total over the day series; never decreases.
pub fn cumulative_series(list: &[FilteredRecord<'_>]) -> Series {
    let days = day_series(list);
    let y = days
        .y
        .iter()
        .scan(0usize, |acc, &n| {
            *acc += n;
            Some(*acc)
        })
        .collect();
    Series { x: days.x, y }
}

/// One stacked-bar trace per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySeries {
    pub category: Category,
    pub y: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthMatrix {
    pub months: Vec<String>,
    pub series: Vec<CategorySeries>,
}

/// Months (ascending) × categories (taxonomy order); all-zero categories are dropped.
pub fn month_category_matrix(list: &[FilteredRecord<'_>]) -> MonthMatrix {
    let cells = count_by(list, |f| f.date.map(|d| (f.category, format_ym(d))));
    let months: Vec<String> = month_counts(list).into_keys().collect();

    let series = Category::ALL
        .into_iter()
        .map(|cat| CategorySeries {
            category: cat,
            y: months
                .iter()
                .map(|m| cells.get(&(cat, m.clone())).copied().unwrap_or(0))
                .collect(),
        })
        .filter(|s| s.y.iter().sum::<usize>() > 0)
        .collect();

    MonthMatrix { months, series }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarGrid {
    /// Row keys, "{isoYear}-W{week:02}", ascending.
    pub weeks: Vec<String>,
    pub weekdays: Vec<String>,
    /// `cells[row][weekday]`
    pub cells: Vec<[usize; 7]>,
}

impl CalendarGrid {
    pub fn total(&self) -> usize {
        self.cells.iter().flatten().sum()
    }
}

/// ISO-week rows × weekday columns. Only weeks with at least one record appear.
pub fn calendar_grid(list: &[FilteredRecord<'_>]) -> CalendarGrid {
    // rows keyed by the week's Monday so days of one week share a row
    let mut rows: BTreeMap<IsoWeek, [usize; 7]> = BTreeMap::new();
    for d in dated(list) {
        let w = IsoWeek::of(d);
        rows.entry(IsoWeek { weekday: 0, ..w }).or_insert([0; 7])[w.weekday] += 1;
    }

    let (weeks, cells) = rows.into_iter().map(|(w, row)| (w.key(), row)).unzip();

    CalendarGrid {
        weeks,
        weekdays: WEEKDAYS.iter().map(|s| s.to_string()).collect(),
        cells,
    }
}

/// Earliest and latest dated record.
pub fn date_span(list: &[FilteredRecord<'_>]) -> Option<(NaiveDate, NaiveDate)> {
    dated(list).minmax().into_option()
}
