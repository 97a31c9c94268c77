//! HTTP client for the remote term and course listing service.
//!
//! Two read endpoints are consumed:
//! 1. `fetch_all_terms` returns `[{ code, description }, ...]`
//! 2. `fetch_courses?term_name=..&term_code=..&refresh_course_data=..` returns
//!    the flat list of section records for one term
//!
//! Failures come back as `{ "error": { "code", "message" } }`; the
//! `NO_CACHE_FILE_EXISTS` code is reported separately from other failures.

use crate::catalog::{RawCourse, Term};
use crate::config::ServiceConfig;
use crate::error::CatalogError;
use chrono::Utc;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Instant;
use tracing::{error, info, warn};
use url::Url;

/// Endpoint names relative to the service base URL.
const TERMS_PATH: &str = "fetch_all_terms";
const COURSES_PATH: &str = "fetch_courses";

/// Error code the service uses when it has not cached a term yet.
const NO_CACHE_CODE: &str = "NO_CACHE_FILE_EXISTS";

/// Structured error object returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: ServiceError,
}

/// Client for the course listing service.
pub struct CatalogClient {
    client: Client,
    base_url: Url,
}

impl CatalogClient {
    /// Creates a client with the configured timeouts and user agent.
    pub fn new(config: &ServiceConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CatalogError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        // Url::join drops the last path segment unless it ends with a slash
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        Ok(Self { client, base_url })
    }

    /// Returns the base URL requests are made against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches the list of available terms.
    pub async fn fetch_terms(&self) -> Result<Vec<Term>, CatalogError> {
        let correlation_id = generate_correlation_id();
        let url = self.base_url.join(TERMS_PATH)?;

        info!(
            correlation_id = %correlation_id,
            url = %url,
            "Fetching term list"
        );

        let start = Instant::now();
        let response = self.send(url, &correlation_id).await?;
        let terms: Vec<Term> = read_json(response, &correlation_id).await?;

        info!(
            correlation_id = %correlation_id,
            terms = terms.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Received term list"
        );
        Ok(terms)
    }

    /// Fetches the flat section list for a term.
    ///
    /// # Arguments
    /// * `term` - The term; its description is sent as `term_name`
    /// * `refresh` - Asks the service to rebuild its cached copy first
    ///
    /// # Returns
    /// * `Ok(Vec<RawCourse>)` - Records in service order, not yet validated
    /// * `Err(CatalogError::CacheMiss)` - The service has no data for the term yet
    /// * `Err(CatalogError::FetchFailure)` - Any other failure
    pub async fn fetch_courses(
        &self,
        term: &Term,
        refresh: bool,
    ) -> Result<Vec<RawCourse>, CatalogError> {
        let correlation_id = generate_correlation_id();
        let mut url = self.base_url.join(COURSES_PATH)?;
        url.query_pairs_mut()
            .append_pair("term_name", &term.description)
            .append_pair("term_code", &term.code)
            .append_pair("refresh_course_data", if refresh { "true" } else { "false" });

        info!(
            correlation_id = %correlation_id,
            term_code = %term.code,
            refresh = refresh,
            "Fetching courses"
        );

        let start = Instant::now();
        let response = self.send(url, &correlation_id).await?;
        let records: Vec<RawCourse> = read_json(response, &correlation_id).await?;

        info!(
            correlation_id = %correlation_id,
            term_code = %term.code,
            sections = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Received courses"
        );
        Ok(records)
    }

    async fn send(&self, url: Url, correlation_id: &str) -> Result<Response, CatalogError> {
        self.client.get(url).send().await.map_err(|e| {
            error!(
                correlation_id = %correlation_id,
                error = %e,
                "Request to course service failed"
            );
            CatalogError::from(e)
        })
    }
}

/// Decodes a success body, or classifies an error body.
async fn read_json<T>(response: Response, correlation_id: &str) -> Result<T, CatalogError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let err = classify_failure(status, &text);
        warn!(
            correlation_id = %correlation_id,
            status = %status,
            error = %err,
            "Course service returned an error"
        );
        return Err(err);
    }

    Ok(serde_json::from_str(&text)?)
}

/// Maps a non-success response to a [`CatalogError`].
fn classify_failure(status: StatusCode, body: &str) -> CatalogError {
    match serde_json::from_str::<ServiceErrorBody>(body) {
        Ok(ServiceErrorBody { error }) if error.code == NO_CACHE_CODE => CatalogError::CacheMiss {
            message: error.message,
        },
        Ok(ServiceErrorBody { error }) => CatalogError::FetchFailure {
            message: format!("status {}: {} ({})", status, error.message, error.code),
        },
        Err(_) => CatalogError::FetchFailure {
            message: format!("status {}", status),
        },
    }
}

/// Tags one request in the logs, e.g. `cv-143015042-9f3a`.
fn generate_correlation_id() -> String {
    let suffix: u16 = rand::thread_rng().gen();
    format!("cv-{}-{:04x}", Utc::now().format("%H%M%S%3f"), suffix)
}
