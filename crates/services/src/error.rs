//! Shared error types for the services crate.

use thiserror::Error;

use storage::sqlite::SqliteInitError;

/// Errors raised while building a `ProviderConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderConfigError {
    #[error("provider API key is empty")]
    MissingApiKey,
    #[error("invalid provider base URL")]
    InvalidBaseUrl,
}

/// Errors from a single provider call. These stay inside the provider: callers of
/// `ContentProvider` only ever see `None`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    #[error("content provider is not configured")]
    Disabled,
    #[error("content provider returned an empty response")]
    EmptyResponse,
    #[error("content provider request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

/// Configuration errors while driving a lesson. Fatal for the current lesson view;
/// callers send the learner home.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RunnerError {
    #[error("unknown lesson: {id}")]
    UnknownLesson { id: String },
    #[error("item index {index} is out of range for a lesson with {len} items")]
    ItemIndexOutOfRange { index: usize, len: usize },
    #[error("action not allowed in the current lesson state")]
    InvalidState,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
