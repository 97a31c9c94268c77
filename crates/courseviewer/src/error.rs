//! Error types shared by the catalog, session and client layers.

use thiserror::Error;

/// Errors that can occur while building, loading or filtering a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A course record violates the identity-key contract
    #[error("Malformed course record at index {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A term load is already pending for this session
    #[error("A load for term {term_code} is already in progress")]
    AlreadyLoading { term_code: String },

    /// Transport, HTTP status or payload parse failure
    #[error("Fetch failed: {message}")]
    FetchFailure { message: String },

    /// The service has no cached data for the requested term yet
    #[error("No cached course data: {message}")]
    CacheMiss { message: String },

    /// The term code is not in the most recently fetched term list
    #[error("Unknown term code: {term_code}")]
    UnknownTerm { term_code: String },

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CatalogError {
    /// Returns true if the session is left consistent and the caller may retry.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            CatalogError::MalformedRecord { .. } | CatalogError::Config { .. }
        )
    }

    /// Returns true if the caller should re-request with the refresh flag set.
    pub fn needs_refresh(&self) -> bool {
        matches!(self, CatalogError::CacheMiss { .. })
    }

    /// Short text suitable for showing to a student.
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::MalformedRecord { .. } => {
                "The server sent course data that could not be read.".to_string()
            }
            CatalogError::AlreadyLoading { .. } => {
                "Courses are still loading, please wait.".to_string()
            }
            CatalogError::FetchFailure { .. } => "Could not connect to the server.".to_string(),
            CatalogError::CacheMiss { message } => message.clone(),
            CatalogError::UnknownTerm { .. } => "Please select a term.".to_string(),
            CatalogError::Config { .. } => "The application is misconfigured.".to_string(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::FetchFailure {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for CatalogError {
    fn from(err: url::ParseError) -> Self {
        CatalogError::Config {
            message: format!("invalid service URL: {}", err),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::FetchFailure {
            message: format!("invalid response body: {}", err),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Config {
            message: err.to_string(),
        }
    }
}
