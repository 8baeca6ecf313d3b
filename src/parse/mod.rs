// src/parse/mod.rs
//
// Turns the raw text of a ratings export into flat `Record`s.
//
// Known limitations, kept for compatibility with existing exports:
//  - delimiter detection only counts commas vs. semicolons in the header, so a
//    semicolon-delimited header whose names contain more commas than there are
//    real delimiters is read as comma-delimited;
//  - quoted fields are not unescaped (`""` stays `""`), and a quoted field
//    holding both `""` and the delimiter may be split incorrectly.

pub mod utils;

use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::record::Record;
use utils::{clean_str, count_unquoted, split_quoted};

const BOM: char = '\u{feff}';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Semicolon,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
        }
    }

    /// Comma wins unless the header holds strictly more semicolons.
    pub fn detect(header: &str) -> Self {
        let commas = count_unquoted(header, ',');
        let semicolons = count_unquoted(header, ';');
        if commas >= semicolons {
            Delimiter::Comma
        } else {
            Delimiter::Semicolon
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => f.write_str("comma"),
            Delimiter::Semicolon => f.write_str("semicolon"),
        }
    }
}

/// Strip a BOM, trim, split into lines and drop blank ones.
fn non_blank_lines(text: &str) -> Vec<&str> {
    text.strip_prefix(BOM)
        .unwrap_or(text)
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

fn split_fields(line: &str, delim: Delimiter) -> Vec<String> {
    split_quoted(line, delim.as_char())
        .into_iter()
        .map(clean_str)
        .collect()
}

/// Parse delimited text into records.
///
/// Returns an empty vector when there is no header plus at least one data
/// line. Data lines whose field count differs from the header's are logged
/// and skipped; they never stop the lines after them from being parsed.
#[instrument(level = "debug", skip(text), fields(bytes = text.len()))]
pub fn parse_records(text: &str) -> Vec<Record> {
    let lines = non_blank_lines(text);
    if lines.len() < 2 {
        debug!(lines = lines.len(), "not enough lines for header + data");
        return Vec::new();
    }

    let delim = Delimiter::detect(lines[0]);
    let headers = split_fields(lines[0], delim);
    debug!(%delim, columns = headers.len(), "parsed header");

    let mut records = Vec::with_capacity(lines.len() - 1);
    let mut skipped = 0usize;
    for (idx, line) in lines.iter().enumerate().skip(1) {
        let values = split_fields(line, delim);
        if values.len() != headers.len() {
            warn!(
                line = idx + 1,
                expected = headers.len(),
                found = values.len(),
                "skipping row with mismatched field count"
            );
            skipped += 1;
            continue;
        }
        let record = Record::from_pairs(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), values.get(i).cloned().unwrap_or_default())),
        );
        records.push(record);
    }

    info!(records = records.len(), skipped, "parsed ratings file");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,ratingscope::parse=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn sorted_keys(r: &Record) -> Vec<&str> {
        let mut keys: Vec<&str> = r.columns().collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn parses_every_row_of_a_clean_file() {
        init_test_logging();
        let text = "Const,Title,Year\ntt1,Alien,1979\ntt2,Heat,1995\ntt3,Up,2009\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 3);
        for r in &records {
            assert_eq!(sorted_keys(r), vec!["Const", "Title", "Year"]);
        }
        assert_eq!(records[1].title(), "Heat");
    }

    #[test]
    fn skips_rows_with_wrong_field_count() {
        init_test_logging();
        let text = "Const,Title,Year\n\
                    tt1,One,2001\n\
                    tt2,Two,2002\n\
                    tt3,Three,2003,extra\n\
                    tt4,Four,2004\n\
                    tt5,Five,2005\n";
        let records = parse_records(text);
        let ids: Vec<&str> = records.iter().map(Record::id).collect();
        assert_eq!(ids, vec!["tt1", "tt2", "tt4", "tt5"]);
    }

    #[test]
    fn detects_delimiter_from_header() {
        assert_eq!(Delimiter::detect("Const,Title,Year"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("Const;Title;Year"), Delimiter::Semicolon);
        assert_eq!(Delimiter::detect("Const,Title;Year"), Delimiter::Comma);
        assert_eq!(Delimiter::detect("Const"), Delimiter::Comma);
    }

    #[test]
    fn parses_semicolon_files() {
        let text = "Const;Title;Genres\r\ntt1;Amélie;Comedy, Romance\r\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Amélie");
        assert_eq!(records[0].field("Genres"), "Comedy, Romance");
    }

    #[test]
    fn quoted_field_with_comma_stays_whole() {
        let text = "Const,Title,Genres\ntt1,\"Casablanca\",\"Drama, Romance\"\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field("Genres"), "Drama, Romance");
        assert_eq!(records[0].title(), "Casablanca");
    }

    #[test]
    fn strips_bom_and_blank_lines() {
        let text = "\u{feff}\"Const\",\"Title\"\n\n  \ntt1,Solaris\n\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), "tt1");
        assert_eq!(records[0].title(), "Solaris");
    }

    #[test]
    fn header_only_or_empty_input_yields_nothing() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("\u{feff}   \n").is_empty());
        assert!(parse_records("Const,Title,Year\n").is_empty());
    }

    #[test]
    fn parsing_is_repeatable() {
        let text = "Const,Title\ntt1,A\ntt2,B\n";
        assert_eq!(parse_records(text), parse_records(text));
    }
}
