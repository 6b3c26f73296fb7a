//! In-memory [`SubscriptionApi`] for headless tests and offline demos.
//!
//! Clones share state, so a test can keep one handle for assertions while the
//! backend worker owns another.

use super::{ApiError, SubscriptionApi};
use crate::session::SessionContext;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use subtrack_core::{
    analytics::{totals_by_category, CategoryTotal},
    models::{Category, CategoryRef, Subscription, SubscriptionPayload},
};

/// Operation selector for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryOp {
    ListSubscriptions,
    ListCategories,
    Create,
    Update,
    Delete,
    CategoryTotals,
}

#[derive(Debug, Default)]
struct MemoryState {
    subscriptions: Vec<Subscription>,
    categories: Vec<Category>,
    failures: HashMap<MemoryOp, String>,
    calls: HashMap<MemoryOp, usize>,
    delay: Option<Duration>,
    session: Option<Arc<SessionContext>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryApi {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryApi {
    pub fn new(categories: Vec<Category>, subscriptions: Vec<Subscription>) -> Self {
        let api = Self::default();
        {
            let mut state = api.lock();
            state.categories = categories;
            state.subscriptions = subscriptions;
        }
        api
    }

    /// Reject authenticated calls with a 401 while `session` is not ready.
    /// Category and totals reads stay anonymous, as on the real service.
    pub fn require_session(self, session: Arc<SessionContext>) -> Self {
        self.lock().session = Some(session);
        self
    }

    /// Make every future call of `op` fail with `message` until cleared.
    pub fn fail(&self, op: MemoryOp, message: impl Into<String>) {
        self.lock().failures.insert(op, message.into());
    }

    pub fn clear_failure(&self, op: MemoryOp) {
        self.lock().failures.remove(&op);
    }

    /// Sleep this long inside every call.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    pub fn calls(&self, op: MemoryOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock().subscriptions.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the call, then apply the configured delay and failure.
    async fn enter(&self, op: MemoryOp) -> Result<(), ApiError> {
        let delay = {
            let mut state = self.lock();
            *state.calls.entry(op).or_insert(0) += 1;
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.lock();
        let anonymous = matches!(op, MemoryOp::ListCategories | MemoryOp::CategoryTotals);
        if let Some(session) = state.session.as_ref().filter(|_| !anonymous) {
            if !session.is_ready() {
                return Err(ApiError::Unauthorized {
                    status: 401,
                    message: "missing or expired bearer token".to_string(),
                });
            }
        }
        match state.failures.get(&op) {
            Some(message) => Err(ApiError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn record_from_payload(
        state: &MemoryState,
        id: String,
        payload: &SubscriptionPayload,
    ) -> Result<Subscription, ApiError> {
        let category = state
            .categories
            .iter()
            .find(|c| c.category_id == payload.category_id)
            .ok_or_else(|| ApiError::Status {
                status: 400,
                message: format!("unknown category '{}'", payload.category_id),
            })?;
        Ok(Subscription {
            subscription_id: id,
            service_name: payload.service_name.clone(),
            amount: payload.amount,
            currency: payload.currency,
            next_payment_date: payload.next_payment_date,
            category: CategoryRef {
                category_id: category.category_id.clone(),
                category_name: category.category_name.clone(),
            },
        })
    }
}

impl SubscriptionApi for MemoryApi {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, ApiError> {
        self.enter(MemoryOp::ListSubscriptions).await?;
        Ok(self.lock().subscriptions.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.enter(MemoryOp::ListCategories).await?;
        Ok(self.lock().categories.clone())
    }

    async fn create_subscription(&self, payload: &SubscriptionPayload) -> Result<(), ApiError> {
        self.enter(MemoryOp::Create).await?;
        let mut state = self.lock();
        let record = Self::record_from_payload(&state, uuid::Uuid::new_v4().to_string(), payload)?;
        state.subscriptions.push(record);
        Ok(())
    }

    async fn update_subscription(
        &self,
        id: &str,
        payload: &SubscriptionPayload,
    ) -> Result<(), ApiError> {
        self.enter(MemoryOp::Update).await?;
        let mut state = self.lock();
        let index = state
            .subscriptions
            .iter()
            .position(|s| s.subscription_id == id)
            .ok_or_else(|| ApiError::NotFound(format!("subscription '{}'", id)))?;
        let record = Self::record_from_payload(&state, id.to_string(), payload)?;
        state.subscriptions[index] = record;
        Ok(())
    }

    async fn delete_subscription(&self, id: &str) -> Result<(), ApiError> {
        self.enter(MemoryOp::Delete).await?;
        let mut state = self.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.subscription_id != id);
        if state.subscriptions.len() == before {
            return Err(ApiError::NotFound(format!("subscription '{}'", id)));
        }
        Ok(())
    }

    async fn category_totals(&self) -> Result<Vec<CategoryTotal>, ApiError> {
        self.enter(MemoryOp::CategoryTotals).await?;
        Ok(totals_by_category(&self.lock().subscriptions))
    }
}
