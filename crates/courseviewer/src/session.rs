//! Application session: loaded catalog, active filters and the selection.
//!
//! The catalog moves through `Empty -> Loading -> Populated`. Each load is
//! tagged with a [`TermRequest`]; a completion whose tag is not the pending
//! one is discarded, so a slow response can never overwrite a newer load.

use crate::catalog::{build_catalog, filter_catalog, Catalog, Course, FilterCriteria, Term};
use crate::client::CatalogClient;
use crate::error::CatalogError;
use crate::selection::SelectionSet;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

/// Tag identifying one in-flight term load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRequest {
    id: u64,
    term_code: String,
}

impl TermRequest {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn term_code(&self) -> &str {
        &self.term_code
    }
}

/// A catalog committed for a term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCatalog {
    pub term_code: String,
    pub catalog: Catalog,
    pub loaded_at: DateTime<Utc>,
}

/// Where the session's catalog is in its load cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    #[default]
    Empty,
    Loading(TermRequest),
    Populated(LoadedCatalog),
}

impl CatalogState {
    pub fn is_loading(&self) -> bool {
        matches!(self, CatalogState::Loading(_))
    }

    fn name(&self) -> &'static str {
        match self {
            CatalogState::Empty => "empty",
            CatalogState::Loading(_) => "loading",
            CatalogState::Populated(_) => "populated",
        }
    }
}

/// Result of handing a response back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response belonged to the pending request and was applied
    Applied,
    /// The response was for a superseded or cancelled request and was ignored
    Stale,
}

/// Session state owned by the presentation layer.
///
/// All mutation goes through the methods below; there is no shared global
/// store.
#[derive(Debug, Default)]
pub struct Session {
    state: CatalogState,
    terms: Vec<Term>,
    criteria: FilterCriteria,
    selection: SelectionSet,
    /// Term of the catalog the current selection was made against
    selection_term: Option<String>,
    /// Term of the most recent committed catalog, kept across `reset`
    last_term: Option<String>,
    next_request_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Terms from the most recent successful term fetch
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// The full catalog, if one is loaded
    pub fn catalog(&self) -> Option<&Catalog> {
        match &self.state {
            CatalogState::Populated(loaded) => Some(&loaded.catalog),
            _ => None,
        }
    }

    /// Term code of the loaded catalog
    pub fn loaded_term(&self) -> Option<&str> {
        match &self.state {
            CatalogState::Populated(loaded) => Some(&loaded.term_code),
            _ => None,
        }
    }

    /// The catalog narrowed by the active filters; empty when nothing is loaded.
    pub fn filtered(&self) -> Catalog {
        self.catalog()
            .map(|catalog| filter_catalog(catalog, &self.criteria))
            .unwrap_or_default()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Replaces the active filters.
    pub fn apply_filters(&mut self, criteria: FilterCriteria) {
        info!(?criteria, "Applying filters");
        self.criteria = criteria;
    }

    /// Adds or removes a section from the selection.
    ///
    /// The selection is tied to the term of the last committed catalog, even
    /// if that catalog has since been reset.
    pub fn toggle_selection(&mut self, course: &Course) -> &SelectionSet {
        self.selection_term = self.last_term.clone();
        self.selection.toggle(course)
    }

    /// Empties the selection.
    pub fn reset_selection(&mut self) {
        info!(cleared = self.selection.len(), "Resetting selection");
        self.selection.clear();
        self.selection_term = None;
    }

    /// Replaces the known term list wholesale.
    pub fn set_terms(&mut self, terms: Vec<Term>) {
        self.terms = terms;
    }

    /// Starts a load for `term_code`.
    ///
    /// The previous catalog is dropped here rather than on commit so two
    /// catalogs are never held at once. The selection is cleared unless it was
    /// made against `term_code`.
    ///
    /// # Returns
    /// * `Ok(TermRequest)` - Tag to pass to [`Session::commit`] or [`Session::fail`]
    /// * `Err(CatalogError::AlreadyLoading)` - A load is pending; it is left untouched
    pub fn begin_load(&mut self, term_code: &str) -> Result<TermRequest, CatalogError> {
        if let CatalogState::Loading(pending) = &self.state {
            warn!(
                pending = %pending.term_code,
                requested = %term_code,
                "Rejecting load while another is in flight"
            );
            return Err(CatalogError::AlreadyLoading {
                term_code: pending.term_code.clone(),
            });
        }

        if !self.selection.is_empty() && self.selection_term.as_deref() != Some(term_code) {
            self.reset_selection();
        }

        self.next_request_id += 1;
        let request = TermRequest {
            id: self.next_request_id,
            term_code: term_code.to_string(),
        };

        info!(
            from = self.state.name(),
            term_code = %term_code,
            request_id = request.id,
            "Beginning catalog load"
        );
        self.state = CatalogState::Loading(request.clone());
        Ok(request)
    }

    /// Installs `catalog` if `request` is still the pending load.
    ///
    /// Selected sections missing from the new catalog are dropped.
    pub fn commit(&mut self, request: &TermRequest, catalog: Catalog) -> Completion {
        if !self.is_pending(request) {
            warn!(
                term_code = %request.term_code,
                request_id = request.id,
                "Discarding stale catalog response"
            );
            return Completion::Stale;
        }

        info!(
            term_code = %request.term_code,
            request_id = request.id,
            categories = catalog.len(),
            sections = catalog.course_count(),
            "Catalog loaded"
        );

        let before = self.selection.len();
        self.selection.retain(|course| catalog.find(&course.course_id).is_some());
        if self.selection.len() < before {
            info!(
                term_code = %request.term_code,
                dropped = before - self.selection.len(),
                "Dropped selected sections missing from catalog"
            );
        }
        if !self.selection.is_empty() {
            self.selection_term = Some(request.term_code.clone());
        }
        self.last_term = Some(request.term_code.clone());

        self.state = CatalogState::Populated(LoadedCatalog {
            term_code: request.term_code.clone(),
            catalog,
            loaded_at: Utc::now(),
        });
        Completion::Applied
    }

    /// Abandons `request`, returning the session to `Empty`.
    ///
    /// # Returns
    /// * `Err(error)` - The request was pending; the error is handed back to the caller
    /// * `Ok(Completion::Stale)` - The request had already been superseded
    pub fn fail(
        &mut self,
        request: &TermRequest,
        error: CatalogError,
    ) -> Result<Completion, CatalogError> {
        if !self.is_pending(request) {
            warn!(
                term_code = %request.term_code,
                request_id = request.id,
                error = %error,
                "Ignoring failure of stale request"
            );
            return Ok(Completion::Stale);
        }

        error!(
            term_code = %request.term_code,
            request_id = request.id,
            error = %error,
            "Catalog load failed"
        );
        self.state = CatalogState::Empty;
        Err(error)
    }

    /// Drops the catalog from any state; a pending load becomes stale.
    pub fn reset(&mut self) {
        info!(from = self.state.name(), "Resetting catalog");
        self.state = CatalogState::Empty;
    }

    fn is_pending(&self, request: &TermRequest) -> bool {
        matches!(&self.state, CatalogState::Loading(pending) if pending == request)
    }

    /// Fetches the term list and replaces the known terms.
    ///
    /// On failure the previous list is kept.
    pub async fn refresh_terms(&mut self, client: &CatalogClient) -> Result<&[Term], CatalogError> {
        let terms = client.fetch_terms().await?;
        self.set_terms(terms);
        Ok(&self.terms)
    }

    /// Loads the catalog for `term_code`: begin, fetch, build, then commit or fail.
    ///
    /// # Arguments
    /// * `client` - Service client
    /// * `term_code` - Must be one of [`Session::terms`]
    /// * `refresh` - Ask the service to rebuild its cached copy
    pub async fn load_term(
        &mut self,
        client: &CatalogClient,
        term_code: &str,
        refresh: bool,
    ) -> Result<Completion, CatalogError> {
        let term = self
            .terms
            .iter()
            .find(|t| t.code == term_code)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTerm {
                term_code: term_code.to_string(),
            })?;

        let request = self.begin_load(&term.code)?;
        let result = client
            .fetch_courses(&term, refresh)
            .await
            .and_then(build_catalog);

        match result {
            Ok(catalog) => Ok(self.commit(&request, catalog)),
            Err(e) => self.fail(&request, e),
        }
    }
}
