//! Collection Store: the canonical in-memory subscription and category sets.
//!
//! The store never mutates its sets speculatively. Commands go to the backend
//! worker; the local sets change only when [`CollectionStore::apply_event`]
//! sees the matching completion.

use crate::backend::{BackendHandle, CoreCmd, CoreErrorSource, CoreEvent};
use crate::session::SessionContext;
use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::time::Duration;
use subtrack_core::{
    analytics::CategoryTotal,
    models::{sort_categories, Category, Subscription, SubscriptionDraft},
    validate_draft, AppError, ErrorKind,
};
use tracing::{debug, info, warn};

/// What changed after applying one backend event.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreUpdate {
    SubscriptionsReplaced { count: usize },
    CategoriesReplaced { count: usize },
    /// Create accepted; a full reload has been issued.
    Created,
    /// Update accepted; a full reload has been issued.
    Updated { id: String },
    /// Delete accepted; `removed` is false when the id was no longer held locally.
    Deleted { id: String, removed: bool },
    CategoryTotals { items: Vec<CategoryTotal> },
    Failed {
        source: CoreErrorSource,
        kind: ErrorKind,
        message: String,
    },
}

pub struct CollectionStore {
    backend: BackendHandle,
    session: Arc<SessionContext>,
    subscriptions: Vec<Subscription>,
    categories: Vec<Category>,
    pending: usize,
}

impl CollectionStore {
    pub fn new(backend: BackendHandle, session: Arc<SessionContext>) -> Self {
        Self {
            backend,
            session,
            subscriptions: Vec::new(),
            categories: Vec::new(),
            pending: 0,
        }
    }

    /// Subscriptions in the order the remote `list()` returned them.
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    /// Categories sorted by display name, case-insensitive.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Requests sent to the backend whose completion has not been applied yet.
    pub fn pending_requests(&self) -> usize {
        self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending == 0
    }

    /// Request a full refresh of the subscription set.
    ///
    /// # Errors
    /// Returns [`AppError::Auth`] without contacting the server when no session
    /// is ready.
    pub fn load(&mut self) -> Result<(), AppError> {
        self.require_session()?;
        self.send(CoreCmd::LoadSubscriptions)
    }

    /// Request the category reference set. Categories are readable anonymously.
    pub fn load_categories(&mut self) -> Result<(), AppError> {
        self.send(CoreCmd::LoadCategories)
    }

    /// Request per-category totals for the analytics chart.
    pub fn load_category_totals(&mut self) -> Result<(), AppError> {
        self.send(CoreCmd::LoadCategoryTotals)
    }

    /// Validate `draft` and, if it passes, request a remote create.
    ///
    /// # Errors
    /// [`AppError::Validation`] with per-field messages (nothing is sent), or
    /// [`AppError::Auth`] when no session is ready.
    pub fn create(&mut self, draft: &SubscriptionDraft) -> Result<(), AppError> {
        self.create_at(draft, Local::now().naive_local())
    }

    /// [`create`](Self::create) with an explicit validation moment.
    pub fn create_at(
        &mut self,
        draft: &SubscriptionDraft,
        now: NaiveDateTime,
    ) -> Result<(), AppError> {
        let payload = validate_draft(draft, &self.categories, now).map_err(AppError::Validation)?;
        self.require_session()?;
        self.send(CoreCmd::CreateSubscription { payload })
    }

    /// Validate `draft` and, if it passes, request a remote update of `id`.
    ///
    /// # Errors
    /// Same as [`create`](Self::create).
    pub fn update(&mut self, id: &str, draft: &SubscriptionDraft) -> Result<(), AppError> {
        self.update_at(id, draft, Local::now().naive_local())
    }

    pub fn update_at(
        &mut self,
        id: &str,
        draft: &SubscriptionDraft,
        now: NaiveDateTime,
    ) -> Result<(), AppError> {
        let payload = validate_draft(draft, &self.categories, now).map_err(AppError::Validation)?;
        self.require_session()?;
        self.send(CoreCmd::UpdateSubscription {
            id: id.to_string(),
            payload,
        })
    }

    /// Request a remote delete of `id`.
    pub fn delete(&mut self, id: &str) -> Result<(), AppError> {
        self.require_session()?;
        self.send(CoreCmd::DeleteSubscription { id: id.to_string() })
    }

    /// Next backend event without blocking.
    ///
    /// A vanished worker with requests outstanding is reported once as a
    /// [`CoreErrorSource::Backend`] error and the pending count is cleared.
    pub fn try_next_event(&mut self) -> Option<CoreEvent> {
        match self.backend.evt_rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => self.backend_gone(),
        }
    }

    /// Next backend event, waiting up to `timeout`.
    pub fn next_event_timeout(&mut self, timeout: Duration) -> Option<CoreEvent> {
        match self.backend.evt_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => self.backend_gone(),
        }
    }

    /// Reconcile local state with one backend completion.
    pub fn apply_event(&mut self, event: CoreEvent) -> StoreUpdate {
        self.pending = self.pending.saturating_sub(1);
        match event {
            CoreEvent::SubscriptionsLoaded { items } => {
                let count = items.len();
                self.subscriptions = items;
                debug!("subscription set replaced ({} records)", count);
                StoreUpdate::SubscriptionsReplaced { count }
            }
            CoreEvent::CategoriesLoaded { mut items } => {
                sort_categories(&mut items);
                let count = items.len();
                self.categories = items;
                StoreUpdate::CategoriesReplaced { count }
            }
            CoreEvent::SubscriptionCreated => match self.load() {
                Ok(()) => StoreUpdate::Created,
                Err(err) => Self::reload_failed(err),
            },
            CoreEvent::SubscriptionUpdated { id } => match self.load() {
                Ok(()) => StoreUpdate::Updated { id },
                Err(err) => Self::reload_failed(err),
            },
            CoreEvent::SubscriptionDeleted { id } => {
                let before = self.subscriptions.len();
                self.subscriptions.retain(|s| s.subscription_id != id);
                let removed = self.subscriptions.len() != before;
                if !removed {
                    info!("deleted subscription {} was not held locally", id);
                }
                StoreUpdate::Deleted { id, removed }
            }
            CoreEvent::CategoryTotalsLoaded { items } => StoreUpdate::CategoryTotals { items },
            CoreEvent::Error {
                source,
                kind,
                message,
            } => StoreUpdate::Failed {
                source,
                kind,
                message,
            },
        }
    }

    fn require_session(&self) -> Result<(), AppError> {
        self.session.bearer_token().map(|_| ())
    }

    fn send(&mut self, cmd: CoreCmd) -> Result<(), AppError> {
        self.backend
            .cmd_tx
            .send(cmd)
            .map_err(|_| AppError::Remote("background worker is not running".to_string()))?;
        self.pending += 1;
        Ok(())
    }

    fn backend_gone(&mut self) -> Option<CoreEvent> {
        if self.pending == 0 {
            return None;
        }
        warn!(
            "backend worker disconnected with {} request(s) outstanding",
            self.pending
        );
        // apply_event decrements once for the synthesized error.
        self.pending = 1;
        Some(CoreEvent::Error {
            source: CoreErrorSource::Backend,
            kind: ErrorKind::Remote,
            message: "background worker disconnected".to_string(),
        })
    }

    fn reload_failed(err: AppError) -> StoreUpdate {
        StoreUpdate::Failed {
            source: CoreErrorSource::LoadSubscriptions,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
