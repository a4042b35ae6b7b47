//! Runtime error types.

use courier_core::{ApiError, BoxError};
use thiserror::Error;

pub use crate::config::{ConfigError, ConfigResult};

/// Why the polling loop stopped.
///
/// The loop only ends with an error: cancellation is reported as
/// [`PollingError::Cancelled`] so callers can tell it apart from a fault.
#[derive(Error, Debug)]
pub enum PollingError {
    #[error("polling was cancelled")]
    Cancelled,

    #[error("failed to fetch updates: {0}")]
    Fetch(#[source] ApiError),

    #[error("failed to remove webhook before polling: {0}")]
    DeleteWebhook(#[source] ApiError),

    #[error("failed to handle update {update_id}: {source}")]
    Dispatch {
        update_id: i64,
        #[source]
        source: BoxError,
    },

    #[error("polling task ended unexpectedly: {0}")]
    Aborted(String),
}

impl PollingError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors surfaced by [`CourierRuntime`](crate::CourierRuntime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no Bot API client: enable the `http-client` feature or supply one")]
    NoApiClient,

    #[error("failed to create Bot API client: {0}")]
    Client(#[source] ApiError),

    #[error("failed to register webhook: {0}")]
    Webhook(#[source] ApiError),

    #[error("webhook server failed: {0}")]
    Server(#[from] std::io::Error),

    #[error(transparent)]
    Polling(#[from] PollingError),

    #[error("delivery mode {0:?} is not available; enable the matching transport feature")]
    ModeUnavailable(crate::config::DeliveryMode),
}

pub type PollingResult<T> = Result<T, PollingError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
