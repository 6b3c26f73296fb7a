//! Remote subscription API seam.
//!
//! The backend worker is generic over [`SubscriptionApi`] so headless tests can
//! swap the reqwest client for [`MemoryApi`].

pub mod http;
pub mod memory;

pub use http::HttpSubscriptionApi;
pub use memory::{MemoryApi, MemoryOp};

use std::future::Future;
use std::time::Duration;
use subtrack_core::{
    analytics::CategoryTotal,
    models::{Category, Subscription, SubscriptionPayload},
    AppError, ErrorKind,
};
use thiserror::Error;

/// Failure of a single remote call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no active session")]
    MissingSession,

    #[error("not authorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::MissingSession | ApiError::Unauthorized { .. } => ErrorKind::Auth,
            _ => ErrorKind::Remote,
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err.kind() {
            ErrorKind::Auth => AppError::Auth(err.to_string()),
            _ => AppError::Remote(err.to_string()),
        }
    }
}

/// Operations exposed by the subscription service.
///
/// Every call is authenticated by the implementation; callers never pass
/// credentials.
pub trait SubscriptionApi: Send + 'static {
    fn list_subscriptions(&self) -> impl Future<Output = Result<Vec<Subscription>, ApiError>>;

    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>>;

    fn create_subscription(
        &self,
        payload: &SubscriptionPayload,
    ) -> impl Future<Output = Result<(), ApiError>>;

    fn update_subscription(
        &self,
        id: &str,
        payload: &SubscriptionPayload,
    ) -> impl Future<Output = Result<(), ApiError>>;

    fn delete_subscription(&self, id: &str) -> impl Future<Output = Result<(), ApiError>>;

    /// Server-computed per-category spend totals.
    fn category_totals(&self) -> impl Future<Output = Result<Vec<CategoryTotal>, ApiError>>;
}
