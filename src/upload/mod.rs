// src/upload/mod.rs

pub mod error;

use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::parse::parse_records;
use crate::query::qualifying_movies;
use crate::record::{columns, Record};
pub use error::UploadError;

pub const CSV_MIME: &str = "text/csv";

/// Columns a ratings export must carry, in reporting order. The title-type
/// column is checked separately because it has two spellings.
const REQUIRED_COLUMNS: &[&str] = &[
    columns::CONST,
    columns::TITLE,
    columns::YEAR,
    columns::YOUR_RATING,
    columns::URL,
];

/// A file picked by the user, as handed over by the file-selection surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
    /// Declared MIME type, if the surface supplied one.
    pub mime: Option<String>,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, mime: Option<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            mime,
        }
    }

    /// Handle for a local path; the name is the file name and the MIME
    /// type is declared only for `.csv` files.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime = name
            .to_lowercase()
            .ends_with(".csv")
            .then(|| CSV_MIME.to_string());
        Self { path, name, mime }
    }

    /// Only `.csv`-named or `text/csv`-typed files are accepted.
    pub fn is_accepted(&self) -> bool {
        self.name.to_lowercase().ends_with(".csv")
            || self
                .mime
                .as_deref()
                .is_some_and(|m| m.trim().eq_ignore_ascii_case(CSV_MIME))
    }
}

/// Tag for one upload attempt. Later attempts get larger ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UploadId(pub u64);

impl UploadId {
    pub fn next(self) -> Self {
        UploadId(self.0 + 1)
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upload#{}", self.0)
    }
}

/// Read the whole file as text. Invalid UTF-8 is replaced, not rejected.
#[instrument(level = "debug", skip(file), fields(name = %file.name))]
pub async fn read_text(file: &FileHandle) -> Result<String, UploadError> {
    let bytes = fs::read(&file.path).await.map_err(UploadError::Read)?;
    debug!(bytes = bytes.len(), "read upload");
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Names of required columns absent from `record`, with the title-type
/// pair reported once as "Title Type".
pub fn missing_columns(record: &Record) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !record.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !record.has_column(columns::TITLE_TYPE) && !record.has_column(columns::TITLE_TYPE_ALT) {
        missing.push(columns::TITLE_TYPE.to_string());
    }
    missing
}

/// Parse uploaded text and check it is a usable ratings export.
pub fn validate(text: &str) -> Result<Vec<Record>, UploadError> {
    let records = parse_records(text);
    let Some(first) = records.first() else {
        return Err(UploadError::Empty);
    };

    let missing = missing_columns(first);
    if !missing.is_empty() {
        return Err(UploadError::MissingColumns(missing));
    }

    if qualifying_movies(&records).is_empty() {
        return Err(UploadError::NoMovies);
    }
    Ok(records)
}

/// Gate, read and validate one file end to end.
#[instrument(level = "info", skip(file), fields(name = %file.name))]
pub async fn load(file: &FileHandle) -> Result<Vec<Record>, UploadError> {
    if !file.is_accepted() {
        return Err(UploadError::InvalidFileType {
            name: file.name.clone(),
        });
    }
    let text = read_text(file).await?;
    let records = validate(&text)?;
    info!(records = records.len(), "upload accepted");
    Ok(records)
}
