use thiserror::Error;

/// Why an upload attempt produced no data. Each variant's message is what
/// goes into the user-facing error slot.
#[derive(Error, Debug)]
pub enum UploadError {
    /// Name/MIME gate failed; nothing was read.
    #[error("invalid file type: please upload a .csv file")]
    InvalidFileType { name: String },

    #[error("could not read file.")]
    Read(#[source] std::io::Error),

    /// Parsing produced zero records.
    #[error("file is empty or invalid format.")]
    Empty,

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no movies found: check that the \"Title Type\" column contains \"movie\"")]
    NoMovies,
}
