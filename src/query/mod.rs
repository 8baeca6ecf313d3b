// src/query/mod.rs
//
// Derived views over a parsed batch. Every function here is a pure function
// of (records, criteria); nothing is cached between calls.

pub mod sort;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::genres::{localize, GenreLocale};
use crate::record::{columns, Record};
pub use sort::{sort_records, SortKey};

/// Years at or outside these bounds never reach the chart.
pub const MIN_CHART_YEAR: i32 = 1800;
pub const MAX_CHART_YEAR: i32 = 2100;

/// One bar of the titles-per-year chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub year: String,
    pub count: usize,
}

/// Records that are movies with a non-empty year. Input order is kept.
pub fn qualifying_movies(records: &[Record]) -> Vec<&Record> {
    records.iter().filter(|r| r.is_movie()).collect()
}

/// Count qualifying records per distinct year value, ascending by numeric year.
///
/// Points are keyed by the year string itself, the same key the per-year
/// detail view matches on, so `"1999"` and `"01999"` stay separate points.
pub fn year_chart(records: &[Record]) -> Vec<ChartPoint> {
    let mut counts: BTreeMap<(i32, &str), usize> = BTreeMap::new();
    for record in qualifying_movies(records) {
        let Some(y) = record.year_number() else {
            continue;
        };
        if y > MIN_CHART_YEAR && y < MAX_CHART_YEAR {
            *counts.entry((y, record.year())).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|((_, year), count)| ChartPoint {
            year: year.to_string(),
            count,
        })
        .collect()
}

/// Case-insensitive title search over qualifying records, best rated first.
///
/// A blank query yields nothing rather than the whole list. Otherwise the
/// query is matched as typed, surrounding spaces included.
pub fn search_titles<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let mut hits: Vec<&Record> = qualifying_movies(records)
        .into_iter()
        .filter(|r| r.title().to_lowercase().contains(&needle))
        .collect();
    sort_records(&mut hits, SortKey::RatingDesc);
    hits
}

/// Smallest and largest numeric year among `records`.
pub fn year_bounds(records: &[&Record]) -> Option<(i32, i32)> {
    let mut years = records.iter().filter_map(|r| r.year_number());
    let first = years.next()?;
    Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
}

/// How the year facet narrows the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearPredicate {
    /// Year field equals this value exactly (the per-year detail view).
    Exact(String),
    /// Numeric year within `[min, max]`; a missing bound defaults to the
    /// observed minimum or maximum of the data.
    Range { min: Option<i32>, max: Option<i32> },
}

impl Default for YearPredicate {
    fn default() -> Self {
        YearPredicate::Range {
            min: None,
            max: None,
        }
    }
}

/// Criteria for the faceted listing. All set predicates must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetFilter {
    pub year: YearPredicate,
    /// Localized genre names; a record must carry every one of them.
    pub genres: BTreeSet<String>,
    /// Raw "Your Rating" values; empty means any.
    pub ratings: BTreeSet<String>,
    /// Case-insensitive substring of the directors field; blank means any.
    pub director: String,
    pub sort: SortKey,
    pub locale: GenreLocale,
}

impl FacetFilter {
    /// Same facets, pinned to one year.
    pub fn for_year(&self, year: impl Into<String>) -> Self {
        Self {
            year: YearPredicate::Exact(year.into()),
            ..self.clone()
        }
    }

    fn matches_year(&self, record: &Record, bounds: Option<(i32, i32)>) -> bool {
        match &self.year {
            YearPredicate::Exact(year) => record.year() == year,
            YearPredicate::Range { min, max } => {
                let Some(y) = record.year_number() else {
                    return false;
                };
                let lo = min.or(bounds.map(|b| b.0));
                let hi = max.or(bounds.map(|b| b.1));
                lo.map_or(true, |lo| y >= lo) && hi.map_or(true, |hi| y <= hi)
            }
        }
    }

    fn matches_genres(&self, record: &Record) -> bool {
        if self.genres.is_empty() || !record.has_column(columns::GENRES) {
            return true;
        }
        let have: HashSet<&str> = record.genres().map(|g| localize(g, self.locale)).collect();
        self.genres.iter().all(|g| have.contains(g.as_str()))
    }

    fn matches_rating(&self, record: &Record) -> bool {
        self.ratings.is_empty() || self.ratings.contains(record.rating())
    }

    fn matches_director(&self, record: &Record) -> bool {
        let needle = self.director.trim().to_lowercase();
        if needle.is_empty() || !record.has_column(columns::DIRECTORS) {
            return true;
        }
        record.directors().to_lowercase().contains(&needle)
    }

    pub fn matches(&self, record: &Record, bounds: Option<(i32, i32)>) -> bool {
        self.matches_year(record, bounds)
            && self.matches_genres(record)
            && self.matches_rating(record)
            && self.matches_director(record)
    }
}

/// Apply `filter` to the qualifying records and sort the survivors.
pub fn filter_and_sort<'a>(records: &'a [Record], filter: &FacetFilter) -> Vec<&'a Record> {
    let base = qualifying_movies(records);
    let bounds = year_bounds(&base);
    let mut out: Vec<&Record> = base
        .into_iter()
        .filter(|r| filter.matches(r, bounds))
        .collect();
    sort_records(&mut out, filter.sort);
    out
}

/// Choices for the facet controls, drawn from the qualifying records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FacetOptions {
    /// Localized genre names, alphabetical.
    pub genres: Vec<String>,
    /// Distinct rating values, highest first; non-numeric values last.
    pub ratings: Vec<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

pub fn facet_options(records: &[Record], locale: GenreLocale) -> FacetOptions {
    let base = qualifying_movies(records);

    let genres: BTreeSet<String> = base
        .iter()
        .flat_map(|r| r.genres())
        .map(|g| localize(g, locale).to_string())
        .collect();

    let distinct: BTreeSet<&str> = base
        .iter()
        .map(|r| r.rating())
        .filter(|r| !r.trim().is_empty())
        .collect();
    let mut ratings: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    ratings.sort_by(|a, b| match (a.trim().parse::<i32>(), b.trim().parse::<i32>()) {
        (Ok(a), Ok(b)) => b.cmp(&a),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });

    let bounds = year_bounds(&base);
    FacetOptions {
        genres: genres.into_iter().collect(),
        ratings,
        min_year: bounds.map(|b| b.0),
        max_year: bounds.map(|b| b.1),
    }
}
