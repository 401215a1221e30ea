//! Error types for the decoder and the API client.
//!
//! # Design
//! `DecodeError` covers only structural failures of a response body. Missing
//! or mistyped fields inside a task object are not errors; the decoder
//! substitutes defaults. `ApiError` wraps the decoder's taxonomy at the
//! client boundary and adds credential, transport and status failures.

use crate::http::TransportError;

/// Structural failures of a task-list body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty response")]
    EmptyResponse,

    /// The body is not valid JSON. Carries the parser's diagnostic.
    #[error("JSON parse error: {0}")]
    MalformedJson(String),

    /// Valid JSON, but the top-level value is not an array.
    #[error("JSON is not an array")]
    UnexpectedShape,
}

/// Errors returned by `TodoistClient` build and parse methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No API key configured; nothing was sent.
    #[error("API key not set")]
    MissingApiKey,

    #[error("task id is empty")]
    InvalidTaskId,

    /// The request never produced an HTTP status.
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// The server answered, but not with the status the operation needs.
    /// `body` is a short excerpt for diagnostics.
    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("parse error: {0}")]
    ParseError(#[from] DecodeError),
}
