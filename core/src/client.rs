//! Stateless HTTP request builder and response parser for the task API.
//!
//! # Design
//! `TodoistClient` holds only its configuration (base URL, API key, timeout,
//! TLS policy, decode limits) and carries no mutable state between calls.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Transport failures reported by the host convert into `ApiError::Network`
//! through `From<TransportError>`.

use std::time::Duration;

use tracing::{error, info};

use crate::decode::{decode_tasks, DecodeLimits, DecodedTasks};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.todoist.com/rest/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest body excerpt kept in `ApiError::HttpStatus`, in characters.
const BODY_EXCERPT_LEN: usize = 128;

/// Synchronous, stateless client for the task API.
#[derive(Debug, Clone)]
pub struct TodoistClient {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    verify_tls: bool,
    limits: DecodeLimits,
}

impl Default for TodoistClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl TodoistClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            limits: DecodeLimits::default(),
        }
    }

    /// An empty key counts as no key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.set_api_key(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Turning verification off trusts any certificate the server presents.
    pub fn with_verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        let key = api_key.into();
        self.api_key = (!key.is_empty()).then_some(key);
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn build_list_tasks(&self) -> Result<HttpRequest, ApiError> {
        let auth = self.authorization()?;
        Ok(self.request(
            HttpMethod::Get,
            format!("{}/tasks", self.base_url),
            vec![auth],
            None,
        ))
    }

    pub fn build_complete_task(&self, task_id: &str) -> Result<HttpRequest, ApiError> {
        let auth = self.authorization()?;
        if !is_path_safe(task_id) {
            return Err(ApiError::InvalidTaskId);
        }
        Ok(self.request(
            HttpMethod::Post,
            format!("{}/tasks/{task_id}/close", self.base_url),
            vec![auth, ("Content-Length".to_string(), "0".to_string())],
            Some(Vec::new()),
        ))
    }

    /// Any 2xx status is accepted and the body decoded.
    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<DecodedTasks, ApiError> {
        if !response.is_success() {
            let err = status_error(&response);
            error!(%err, "error fetching tasks");
            return Err(err);
        }
        let decoded = decode_tasks(&response.body, self.limits).map_err(|e| {
            error!(error = %e, "error parsing tasks JSON");
            ApiError::from(e)
        })?;
        info!(count = decoded.tasks.len(), "fetched tasks");
        Ok(decoded)
    }

    /// Only `204 No Content` means the task was closed; any other status,
    /// 2xx included, is a failure.
    pub fn parse_complete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.status == 204 {
            return Ok(());
        }
        let err = status_error(&response);
        error!(%err, "error completing task");
        Err(err)
    }

    fn authorization(&self) -> Result<(String, String), ApiError> {
        let key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;
        Ok(("Authorization".to_string(), format!("Bearer {key}")))
    }

    fn request(
        &self,
        method: HttpMethod,
        url: String,
        headers: Vec<(String, String)>,
        body: Option<Vec<u8>>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: self.timeout,
            verify_tls: self.verify_tls,
        }
    }
}

/// Ids go into the URL path verbatim, so they must stay one segment.
fn is_path_safe(task_id: &str) -> bool {
    !task_id.is_empty()
        && !task_id
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace() || c.is_control())
}

fn status_error(response: &HttpResponse) -> ApiError {
    let body = String::from_utf8_lossy(&response.body)
        .chars()
        .take(BODY_EXCERPT_LEN)
        .collect();
    ApiError::HttpStatus {
        status: response.status,
        body,
    }
}
