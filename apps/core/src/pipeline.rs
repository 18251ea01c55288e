use crate::config::Config;
use crate::contract::{SearchRequest, SearchResult};
use crate::lookup::{LookupError, LookupService};
use crate::registry::{FileRegistry, RegistryError};
use crate::render::{render_results, ResultsView};
use crate::selection::{Selection, SelectionEntry, SelectionError};

pub const INVALID_INPUT_MESSAGE: &str = "Please Select a file and enter a keyword to search.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    InvalidInput,
    RequestFailed(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput => write!(f, "{INVALID_INPUT_MESSAGE}"),
            Self::RequestFailed(reason) => write!(f, "Error fetching data: {reason}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<LookupError> for SearchError {
    fn from(value: LookupError) -> Self {
        Self::RequestFailed(value.to_string())
    }
}

/// Validates the inputs of a search. Requires a selected file and a query that is not
/// blank after trimming.
pub fn build_request(
    selected_file: Option<&str>,
    raw_query: &str,
) -> Result<SearchRequest, SearchError> {
    match selected_file {
        Some(file_name) if !raw_query.trim().is_empty() => {
            Ok(SearchRequest::new(file_name, raw_query.trim()))
        }
        _ => Err(SearchError::InvalidInput),
    }
}

/// Identifies one issued search. Only the newest ticket may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub ticket: SearchTicket,
    pub request: SearchRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    Failed(SearchError),
    /// A newer search was issued before this one resolved.
    Discarded,
}

/// Everything the front end shows: registry, file selection and the results area.
#[derive(Debug, Clone)]
pub struct AppState {
    registry: FileRegistry,
    selection: Selection,
    results: ResultsView,
    latest_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(FileRegistry::default())
    }
}

impl AppState {
    pub fn new(registry: FileRegistry) -> Self {
        let selection = Selection::from_registry(&registry);
        Self {
            registry,
            selection,
            results: ResultsView::Placeholder,
            latest_generation: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(FileRegistry::seeded(config.max_files, config.seed_files.as_slice()))
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn results(&self) -> &ResultsView {
        &self.results
    }

    pub fn add_file(&mut self, name: &str) -> Result<(), RegistryError> {
        self.registry.add_file(name)?;
        self.selection.render(&self.registry);
        Ok(())
    }

    pub fn select(&mut self, id: &str) -> Result<&SelectionEntry, SelectionError> {
        self.selection.select(id)
    }

    pub fn select_index(&mut self, index: usize) -> Result<&SelectionEntry, SelectionError> {
        self.selection.select_index(index)
    }

    /// Validates input and clears the results area. The caller performs the lookup and
    /// hands the outcome to [`AppState::complete_search`].
    pub fn begin_search(&mut self, raw_query: &str) -> Result<PendingSearch, SearchError> {
        let request = match build_request(self.selection.get_selected(), raw_query) {
            Ok(request) => request,
            Err(error) => {
                self.results = ResultsView::Placeholder;
                return Err(error);
            }
        };

        self.latest_generation += 1;
        self.results = ResultsView::Cleared;
        Ok(PendingSearch {
            ticket: SearchTicket {
                generation: self.latest_generation,
                file_name: request.payload.pdf_file_name.clone(),
            },
            request,
        })
    }

    pub fn complete_search(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<Option<SearchResult>, LookupError>,
    ) -> Completion {
        if ticket.generation != self.latest_generation {
            return Completion::Discarded;
        }

        match outcome {
            Ok(result) => {
                self.results = render_results(result.as_ref(), &ticket.file_name);
                Completion::Rendered
            }
            Err(error) => {
                let error = SearchError::from(error);
                if let SearchError::RequestFailed(reason) = &error {
                    self.results = ResultsView::Error(reason.clone());
                }
                Completion::Failed(error)
            }
        }
    }

    /// Runs one search to completion against `lookup`.
    pub async fn search<L: LookupService>(
        &mut self,
        lookup: &L,
        raw_query: &str,
    ) -> Result<(), SearchError> {
        let pending = self.begin_search(raw_query)?;
        let outcome = lookup.lookup(&pending.request).await;
        match self.complete_search(&pending.ticket, outcome) {
            Completion::Failed(error) => Err(error),
            Completion::Rendered | Completion::Discarded => Ok(()),
        }
    }
}
