//! Authenticated-session context.
//!
//! The identity provider is external; this module only holds the bearer token
//! it handed out and answers "is a valid token available right now". One
//! context is created per process, shared through `Arc`, and injected into the
//! Collection Store and the HTTP API at construction.

use chrono::{DateTime, Utc};
use std::sync::{PoisonError, RwLock};
use subtrack_core::AppError;
use tracing::info;

#[derive(Debug, Clone)]
struct SessionToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Holder of the current bearer token, with explicit init/teardown.
#[derive(Debug, Default)]
pub struct SessionContext {
    token: RwLock<Option<SessionToken>>,
}

impl SessionContext {
    /// Create a context with no session; data operations fail until [`init`](Self::init).
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with `token`, optionally expiring at `expires_at`.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when the token is blank.
    pub fn init(
        &self,
        token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        let value = token.into().trim().to_string();
        if value.is_empty() {
            return Err(AppError::Auth("identity provider returned an empty token".to_string()));
        }
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(SessionToken { value, expires_at });
        info!("session initialized");
        Ok(())
    }

    /// Forget the current token. Later data operations fail with an auth error.
    pub fn teardown(&self) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("session torn down");
        }
    }

    /// Whether a non-expired token is available.
    pub fn is_ready(&self) -> bool {
        self.bearer_token().is_ok()
    }

    /// The current bearer token.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] when no session exists or the token expired.
    pub fn bearer_token(&self) -> Result<String, AppError> {
        self.bearer_token_at(Utc::now())
    }

    pub(crate) fn bearer_token_at(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let slot = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            None => Err(AppError::Auth("no active session".to_string())),
            Some(token) if token.expires_at.is_some_and(|at| at <= now) => {
                Err(AppError::Auth("session token expired".to_string()))
            }
            Some(token) => Ok(token.value.clone()),
        }
    }
}
