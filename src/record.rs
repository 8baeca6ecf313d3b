// src/record.rs

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Column names as they appear in a ratings export header.
pub mod columns {
    pub const CONST: &str = "Const";
    pub const YOUR_RATING: &str = "Your Rating";
    pub const DATE_RATED: &str = "Date Rated";
    pub const TITLE: &str = "Title";
    pub const ORIGINAL_TITLE: &str = "Original Title";
    pub const URL: &str = "URL";
    /// The two accepted spellings of the title-type column.
    pub const TITLE_TYPE: &str = "Title Type";
    pub const TITLE_TYPE_ALT: &str = "TitleType";
    pub const IMDB_RATING: &str = "IMDb Rating";
    pub const RUNTIME: &str = "Runtime (mins)";
    pub const YEAR: &str = "Year";
    pub const GENRES: &str = "Genres";
    pub const NUM_VOTES: &str = "Num Votes";
    pub const RELEASE_DATE: &str = "Release Date";
    pub const DIRECTORS: &str = "Directors";
}

/// Date formats tried, in order, when reading the "Date Rated" column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// One data row, keyed by the header names of the file it came from.
///
/// Records are built once by the parser and never mutated afterwards.
/// Accessors for well-known columns return `""` (or `None`) when the column
/// is absent, so callers never have to care which optional columns a given
/// export carries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Value of `column`, or `""` if the column is missing.
    pub fn field(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn id(&self) -> &str {
        self.field(columns::CONST)
    }

    pub fn title(&self) -> &str {
        self.field(columns::TITLE)
    }

    /// Original title, falling back to the title when the column is absent.
    pub fn original_title(&self) -> &str {
        self.get(columns::ORIGINAL_TITLE)
            .unwrap_or_else(|| self.title())
    }

    pub fn url(&self) -> &str {
        self.field(columns::URL)
    }

    pub fn year(&self) -> &str {
        self.field(columns::YEAR)
    }

    pub fn year_number(&self) -> Option<i32> {
        self.year().trim().parse().ok()
    }

    pub fn rating(&self) -> &str {
        self.field(columns::YOUR_RATING)
    }

    pub fn rating_number(&self) -> Option<i32> {
        self.rating().trim().parse().ok()
    }

    /// Title type under either accepted header spelling.
    pub fn title_type(&self) -> &str {
        self.get(columns::TITLE_TYPE)
            .or_else(|| self.get(columns::TITLE_TYPE_ALT))
            .unwrap_or("")
    }

    pub fn directors(&self) -> &str {
        self.field(columns::DIRECTORS)
    }

    /// Genres as listed in the record, split on commas and trimmed.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.field(columns::GENRES)
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    pub fn date_rated(&self) -> Option<NaiveDate> {
        let raw = self.get(columns::DATE_RATED)?.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
    }

    /// A qualifying movie has title type "movie" (any case) and a year.
    pub fn is_movie(&self) -> bool {
        self.title_type().trim().eq_ignore_ascii_case("movie") && !self.year().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::from_pairs([
            ("Const", "tt0133093"),
            ("Title", "The Matrix"),
            ("Year", "1999"),
            ("Your Rating", "9"),
            ("Title Type", "Movie"),
            ("Genres", "Action, Sci-Fi"),
            ("Date Rated", "2021-03-14"),
        ])
    }

    #[test]
    fn accessors_read_well_known_columns() {
        let r = sample();
        assert_eq!(r.id(), "tt0133093");
        assert_eq!(r.title(), "The Matrix");
        assert_eq!(r.year_number(), Some(1999));
        assert_eq!(r.rating_number(), Some(9));
        assert_eq!(r.genres().collect::<Vec<_>>(), vec!["Action", "Sci-Fi"]);
        assert_eq!(r.date_rated(), NaiveDate::from_ymd_opt(2021, 3, 14));
    }

    #[test]
    fn missing_columns_read_as_empty() {
        let r = sample();
        assert_eq!(r.url(), "");
        assert_eq!(r.directors(), "");
        assert!(r.get("URL").is_none());
        assert_eq!(r.original_title(), "The Matrix");
    }

    #[test]
    fn title_type_accepts_both_spellings() {
        let r = Record::from_pairs([("TitleType", "movie"), ("Year", "2001")]);
        assert_eq!(r.title_type(), "movie");
        assert!(r.is_movie());

        let no_year = Record::from_pairs([("Title Type", "movie"), ("Year", "")]);
        assert!(!no_year.is_movie());

        let series = Record::from_pairs([("Title Type", "tvSeries"), ("Year", "2001")]);
        assert!(!series.is_movie());
    }

    #[test]
    fn date_rated_accepts_fallback_formats() {
        let r = Record::from_pairs([("Date Rated", "03/14/2021")]);
        assert_eq!(r.date_rated(), NaiveDate::from_ymd_opt(2021, 3, 14));
        let bad = Record::from_pairs([("Date Rated", "yesterday")]);
        assert_eq!(bad.date_rated(), None);
    }
}
