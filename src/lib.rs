pub mod config;
pub mod genres;
pub mod parse;
pub mod query;
pub mod record;
pub mod state;
pub mod upload;

pub use parse::parse_records;
pub use query::{ChartPoint, FacetFilter, FacetOptions, YearPredicate};
pub use record::Record;
pub use state::{Action, AppState};
pub use upload::{FileHandle, UploadError, UploadId};
