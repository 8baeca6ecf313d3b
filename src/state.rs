// src/state.rs
//
// Single owner of the application's state. `AppState::apply` is a pure
// transition: it never mutates in place and every view is recomputed from
// the returned value.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::query::{
    facet_options, filter_and_sort, search_titles, year_chart, ChartPoint, FacetFilter,
    FacetOptions,
};
use crate::record::Record;
use crate::upload::{self, FileHandle, UploadError, UploadId};

/// Where the upload workflow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Empty,
    /// A read is in flight for this upload; only its result is accepted.
    Loading { id: UploadId, file_name: String },
    Loaded { file_name: String },
    Failed,
}

/// Discrete, named transitions.
#[derive(Debug)]
pub enum Action {
    /// The user picked a file. Clears any error and all derived state.
    UploadStarted(FileHandle),
    /// The read for upload `id` finished.
    ReadFinished {
        id: UploadId,
        result: Result<String, UploadError>,
    },
    SetSearch(String),
    SetFilter(FacetFilter),
    /// A chart bar was clicked: open the detail view for that year.
    SelectYear(String),
    CloseDetail,
    EscapePressed,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub phase: Phase,
    records: Arc<[Record]>,
    chart: Arc<[ChartPoint]>,
    pub error: Option<String>,
    pub search: String,
    pub filter: FacetFilter,
    pub detail_year: Option<String>,
    /// Filter restored on every new upload (sort and locale from config).
    defaults: FacetFilter,
    last_upload: UploadId,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FacetFilter::default())
    }
}

impl AppState {
    pub fn new(defaults: FacetFilter) -> Self {
        Self {
            phase: Phase::Empty,
            records: Arc::from(Vec::new()),
            chart: Arc::from(Vec::new()),
            error: None,
            search: String::new(),
            filter: defaults.clone(),
            detail_year: None,
            defaults,
            last_upload: UploadId::default(),
        }
    }

    pub fn apply(&self, action: Action) -> AppState {
        match action {
            Action::UploadStarted(file) => self.start_upload(file),
            Action::ReadFinished { id, result } => self.finish_read(id, result),
            Action::SetSearch(query) if self.is_loaded() => AppState {
                search: query,
                ..self.clone()
            },
            Action::SetFilter(filter) if self.is_loaded() => AppState {
                filter,
                ..self.clone()
            },
            Action::SelectYear(year) if self.is_loaded() => AppState {
                detail_year: Some(year),
                ..self.clone()
            },
            Action::CloseDetail | Action::EscapePressed => AppState {
                detail_year: None,
                ..self.clone()
            },
            other => {
                debug!(action = ?other, phase = ?self.phase, "ignored action before data is loaded");
                self.clone()
            }
        }
    }

    fn reset(&self) -> AppState {
        AppState {
            last_upload: self.last_upload,
            ..AppState::new(self.defaults.clone())
        }
    }

    fn start_upload(&self, file: FileHandle) -> AppState {
        let id = self.last_upload.next();
        let mut next = self.reset();
        next.last_upload = id;
        if !file.is_accepted() {
            let err = UploadError::InvalidFileType {
                name: file.name.clone(),
            };
            warn!(name = %file.name, mime = ?file.mime, "rejected upload");
            next.phase = Phase::Failed;
            next.error = Some(err.to_string());
            return next;
        }
        info!(%id, name = %file.name, "upload started");
        next.phase = Phase::Loading {
            id,
            file_name: file.name,
        };
        next
    }

    fn finish_read(&self, id: UploadId, result: Result<String, UploadError>) -> AppState {
        let file_name = match &self.phase {
            Phase::Loading {
                id: pending,
                file_name,
            } if *pending == id => file_name.clone(),
            _ => {
                debug!(%id, phase = ?self.phase, "discarding stale read result");
                return self.clone();
            }
        };

        match result.and_then(|text| upload::validate(&text)) {
            Ok(records) => {
                let chart = year_chart(&records);
                info!(%id, records = records.len(), years = chart.len(), "upload loaded");
                AppState {
                    phase: Phase::Loaded { file_name },
                    records: Arc::from(records),
                    chart: Arc::from(chart),
                    ..self.reset()
                }
            }
            Err(err) => {
                warn!(%id, error = ?err, "upload failed");
                AppState {
                    phase: Phase::Failed,
                    error: Some(err.to_string()),
                    ..self.reset()
                }
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.phase, Phase::Loaded { .. })
    }

    /// The upload whose read result is currently awaited.
    pub fn pending_upload(&self) -> Option<UploadId> {
        match self.phase {
            Phase::Loading { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn chart(&self) -> &[ChartPoint] {
        &self.chart
    }

    pub fn search_results(&self) -> Vec<&Record> {
        search_titles(&self.records, &self.search)
    }

    /// The main list under the current facets.
    pub fn listing(&self) -> Vec<&Record> {
        filter_and_sort(&self.records, &self.filter)
    }

    /// Records for the open year detail, if one is open.
    pub fn year_detail(&self) -> Option<Vec<&Record>> {
        let year = self.detail_year.as_ref()?;
        Some(filter_and_sort(&self.records, &self.filter.for_year(year.as_str())))
    }

    pub fn facet_options(&self) -> FacetOptions {
        facet_options(&self.records, self.filter.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortKey;

    const GOOD: &str = "Const,Your Rating,Title,URL,Title Type,Year,Genres\n\
                        tt1,8,Heat,u1,movie,1995,\"Crime, Drama\"\n\
                        tt2,9,Ran,u2,movie,1985,\"Drama, War\"\n\
                        tt3,7,Se7en,u3,movie,1995,\"Crime, Mystery\"\n";

    fn csv(name: &str) -> FileHandle {
        FileHandle::new(format!("/tmp/{}", name), name, None)
    }

    fn loaded() -> AppState {
        let s = AppState::default().apply(Action::UploadStarted(csv("a.csv")));
        let id = s.pending_upload().expect("loading");
        s.apply(Action::ReadFinished {
            id,
            result: Ok(GOOD.to_string()),
        })
    }

    #[test]
    fn upload_moves_empty_to_loaded() {
        let s = AppState::default();
        assert_eq!(s.phase, Phase::Empty);
        let s = loaded();
        assert!(s.is_loaded());
        assert_eq!(s.records().len(), 3);
        assert_eq!(
            s.chart(),
            &[
                ChartPoint { year: "1985".into(), count: 1 },
                ChartPoint { year: "1995".into(), count: 2 },
            ]
        );
    }

    #[test]
    fn invalid_type_fails_without_loading() {
        let s = AppState::default().apply(Action::UploadStarted(csv("a.txt")));
        assert_eq!(s.phase, Phase::Failed);
        assert_eq!(s.pending_upload(), None);
        assert_eq!(
            s.error.as_deref(),
            Some("invalid file type: please upload a .csv file")
        );
    }

    #[test]
    fn failure_clears_previous_data_and_new_upload_clears_error() {
        let s = loaded().apply(Action::UploadStarted(csv("b.csv")));
        assert!(s.records().is_empty());
        let id = s.pending_upload().expect("loading");
        let s = s.apply(Action::ReadFinished {
            id,
            result: Ok("Const,Title\n".into()),
        });
        assert_eq!(s.phase, Phase::Failed);
        assert_eq!(s.error.as_deref(), Some("file is empty or invalid format."));
        assert!(s.chart().is_empty());

        let s = s.apply(Action::UploadStarted(csv("c.csv")));
        assert_eq!(s.error, None);
    }

    #[test]
    fn stale_read_does_not_overwrite_newer_upload() {
        let s = AppState::default().apply(Action::UploadStarted(csv("slow.csv")));
        let slow = s.pending_upload().expect("loading");
        let s = s.apply(Action::UploadStarted(csv("fast.csv")));
        let fast = s.pending_upload().expect("loading");
        assert_ne!(slow, fast);

        let s = s.apply(Action::ReadFinished {
            id: fast,
            result: Ok(GOOD.to_string()),
        });
        let s = s.apply(Action::ReadFinished {
            id: slow,
            result: Ok("Const,Title\n".into()),
        });
        assert_eq!(
            s.phase,
            Phase::Loaded {
                file_name: "fast.csv".into()
            }
        );
        assert_eq!(s.records().len(), 3);
        assert_eq!(s.error, None);
    }

    #[test]
    fn views_follow_criteria() {
        let s = loaded().apply(Action::SetSearch("se7".into()));
        let hits: Vec<&str> = s.search_results().iter().map(|r| r.title()).collect();
        assert_eq!(hits, vec!["Se7en"]);

        let s = s.apply(Action::SetSearch(String::new()));
        assert!(s.search_results().is_empty());

        let listing: Vec<&str> = s.listing().iter().map(|r| r.title()).collect();
        assert_eq!(listing, vec!["Ran", "Heat", "Se7en"]);

        let filter = FacetFilter {
            sort: SortKey::TitleAsc,
            genres: ["Crime".to_string()].into_iter().collect(),
            ..s.filter.clone()
        };
        let s = s.apply(Action::SetFilter(filter));
        let listing: Vec<&str> = s.listing().iter().map(|r| r.title()).collect();
        assert_eq!(listing, vec!["Heat", "Se7en"]);
    }

    #[test]
    fn year_detail_opens_and_closes() {
        let s = loaded();
        assert!(s.year_detail().is_none());

        let s = s.apply(Action::SelectYear("1995".into()));
        let titles: Vec<&str> = s
            .year_detail()
            .unwrap_or_default()
            .iter()
            .map(|r| r.title())
            .collect();
        assert_eq!(titles, vec!["Heat", "Se7en"]);

        assert!(s.apply(Action::EscapePressed).year_detail().is_none());
        assert!(s.apply(Action::CloseDetail).year_detail().is_none());
    }

    #[test]
    fn criteria_ignored_until_loaded() {
        let s = AppState::default().apply(Action::SelectYear("1995".into()));
        assert_eq!(s.detail_year, None);
        assert_eq!(s.phase, Phase::Empty);
    }

    #[test]
    fn new_upload_restores_default_filter() {
        let defaults = FacetFilter {
            sort: SortKey::YearAsc,
            ..FacetFilter::default()
        };
        let s = AppState::new(defaults.clone()).apply(Action::UploadStarted(csv("a.csv")));
        let id = s.pending_upload().expect("loading");
        let s = s
            .apply(Action::ReadFinished {
                id,
                result: Ok(GOOD.into()),
            })
            .apply(Action::SetFilter(FacetFilter::default()))
            .apply(Action::UploadStarted(csv("b.csv")));
        assert_eq!(s.filter, defaults);
    }
}
