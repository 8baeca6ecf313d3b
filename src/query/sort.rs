// src/query/sort.rs

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

use crate::record::{columns, Record};

/// Orderings offered by the listing views.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    RatingDesc,
    RatingAsc,
    TitleAsc,
    TitleDesc,
    OriginalTitleAsc,
    OriginalTitleDesc,
    YearAsc,
    YearDesc,
    DateRatedAsc,
    DateRatedDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 10] = [
        SortKey::RatingDesc,
        SortKey::RatingAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::OriginalTitleAsc,
        SortKey::OriginalTitleDesc,
        SortKey::YearAsc,
        SortKey::YearDesc,
        SortKey::DateRatedAsc,
        SortKey::DateRatedDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::RatingDesc => "rating_desc",
            SortKey::RatingAsc => "rating_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
            SortKey::OriginalTitleAsc => "original_title_asc",
            SortKey::OriginalTitleDesc => "original_title_desc",
            SortKey::YearAsc => "year_asc",
            SortKey::YearDesc => "year_desc",
            SortKey::DateRatedAsc => "date_rated_asc",
            SortKey::DateRatedDesc => "date_rated_desc",
        }
    }

    fn is_descending(&self) -> bool {
        matches!(
            self,
            SortKey::RatingDesc
                | SortKey::TitleDesc
                | SortKey::OriginalTitleDesc
                | SortKey::YearDesc
                | SortKey::DateRatedDesc
        )
    }
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SortKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| anyhow::anyhow!("unknown sort key {:?}", s))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compare optional values; `None` always sorts after `Some`, in either direction.
fn missing_last<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive first, byte order to break ties.
fn text_order(a: &str, b: &str, descending: bool) -> Ordering {
    let ord = a
        .to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b));
    if descending {
        ord.reverse()
    } else {
        ord
    }
}

/// Stable in-place sort of `records` by `key`.
///
/// Sorting by date rated when the file has no "Date Rated" column leaves
/// the input order untouched.
pub fn sort_records(records: &mut [&Record], key: SortKey) {
    let desc = key.is_descending();
    match key {
        SortKey::RatingDesc | SortKey::RatingAsc => {
            records.sort_by(|a, b| missing_last(a.rating_number(), b.rating_number(), desc))
        }
        SortKey::TitleAsc | SortKey::TitleDesc => {
            records.sort_by(|a, b| text_order(a.title(), b.title(), desc))
        }
        SortKey::OriginalTitleAsc | SortKey::OriginalTitleDesc => {
            records.sort_by(|a, b| text_order(a.original_title(), b.original_title(), desc))
        }
        SortKey::YearAsc | SortKey::YearDesc => {
            records.sort_by(|a, b| missing_last(a.year_number(), b.year_number(), desc))
        }
        SortKey::DateRatedAsc | SortKey::DateRatedDesc => {
            let has_column = records
                .first()
                .is_some_and(|r| r.has_column(columns::DATE_RATED));
            if has_column {
                records.sort_by(|a, b| missing_last(a.date_rated(), b.date_rated(), desc));
            }
        }
    }
}
