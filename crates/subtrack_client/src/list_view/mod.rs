//! List view controller.
//!
//! Owns the Collection Store, the current [`ViewState`], and the preference
//! hook that persists every view-state change. Front ends call the `set_*` and
//! `submit_*` methods on user input, [`SubscriptionListView::poll`] once per
//! tick, and [`SubscriptionListView::view`] to render.

mod feedback;

pub use feedback::{StatusMessage, ToastMessage, STATUS_TTL, TOAST_LIMIT, TOAST_TTL};

use crate::backend::CoreEvent;
use crate::store::{CollectionStore, StoreUpdate};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use subtrack_core::{
    analytics::{ChartOrder, ChartState},
    models::{Category, Subscription, SubscriptionDraft},
    preferences::{PreferenceStore, ViewPreferences},
    derive_view, AppError, ErrorKind, ValidationErrors, ViewOutcome, ViewState,
};
use tracing::warn;

pub struct SubscriptionListView<S> {
    store: CollectionStore,
    prefs: ViewPreferences<S>,
    state: ViewState,
    page_size: usize,
    field_errors: ValidationErrors,
    auth_required: bool,
    last_error: Option<String>,
    status: Option<StatusMessage>,
    toasts: VecDeque<ToastMessage>,
    chart: ChartState,
}

impl<S: PreferenceStore> SubscriptionListView<S> {
    /// Build a controller whose view state is restored from `prefs`.
    pub fn new(store: CollectionStore, prefs: ViewPreferences<S>, page_size: usize) -> Self {
        let state = prefs.load();
        Self {
            store,
            prefs,
            state,
            page_size: page_size.max(1),
            field_errors: ValidationErrors::default(),
            auth_required: false,
            last_error: None,
            status: None,
            toasts: VecDeque::with_capacity(TOAST_LIMIT),
            chart: ChartState::default(),
        }
    }

    /// Populate categories and subscriptions. Call again after re-login.
    pub fn start(&mut self) {
        self.load_categories();
        match self.store.load() {
            Ok(()) => self.auth_required = false,
            Err(err) => self.report_error("Loading subscriptions failed", err),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn store(&self) -> &CollectionStore {
        &self.store
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        self.store.subscriptions()
    }

    pub fn categories(&self) -> &[Category] {
        self.store.categories()
    }

    pub fn preferences(&self) -> &ViewPreferences<S> {
        &self.prefs
    }

    /// Per-field messages from the last rejected create/update.
    pub fn field_errors(&self) -> &ValidationErrors {
        &self.field_errors
    }

    pub fn clear_field_errors(&mut self) {
        self.field_errors = ValidationErrors::default();
    }

    /// Set by auth failures; the front end should prompt for a new login.
    pub fn auth_required(&self) -> bool {
        self.auth_required
    }

    /// Most recent auth or remote failure message, cleared on read.
    pub fn take_last_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn chart(&self) -> &ChartState {
        &self.chart
    }

    pub fn is_busy(&self) -> bool {
        !self.store.is_idle()
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.state.search_text == text {
            return;
        }
        self.state.search_text = text;
        let result = self.prefs.persist_search_text(&self.state.search_text);
        self.report_persist(result);
    }

    /// Select a category filter; `None` (or an empty id) clears it.
    pub fn set_selected_category(&mut self, category_id: Option<String>) {
        let category_id = category_id.filter(|id| !id.is_empty());
        if self.state.selected_category_id == category_id {
            return;
        }
        self.state.selected_category_id = category_id;
        let result = self
            .prefs
            .persist_selected_category(self.state.selected_category_id.as_deref());
        self.report_persist(result);
    }

    /// Request a one-based page; out-of-range pages are clamped by [`view`](Self::view).
    pub fn set_page(&mut self, page: usize) {
        let page = page.max(1);
        if self.state.current_page == page {
            return;
        }
        self.state.current_page = page;
        let result = self.prefs.persist_page(page);
        self.report_persist(result);
    }

    /// Derive the visible page.
    ///
    /// When the requested page is out of range the clamped page is written back
    /// into the view state and preference storage before returning.
    pub fn view(&mut self) -> ViewOutcome<'_> {
        let clamped = match derive_view(self.store.subscriptions(), &self.state, self.page_size) {
            ViewOutcome::Page(page) if page.page_was_clamped => Some(page.page),
            _ => None,
        };
        if let Some(page) = clamped {
            self.state.current_page = page;
            let result = self.prefs.persist_page(page);
            self.report_persist(result);
        }
        derive_view(self.store.subscriptions(), &self.state, self.page_size)
    }

    /// Validate and send a create. Returns whether the request went out.
    pub fn submit_create(&mut self, draft: &SubscriptionDraft) -> bool {
        let result = self.store.create(draft);
        self.after_submit("Creating the subscription failed", result)
    }

    /// Validate and send an update of `id`. Returns whether the request went out.
    pub fn submit_update(&mut self, id: &str, draft: &SubscriptionDraft) -> bool {
        let result = self.store.update(id, draft);
        self.after_submit("Updating the subscription failed", result)
    }

    pub fn request_delete(&mut self, id: &str) -> bool {
        match self.store.delete(id) {
            Ok(()) => true,
            Err(err) => {
                self.report_error("Deleting the subscription failed", err);
                false
            }
        }
    }

    /// Fetch only the category set; works without a session.
    pub fn load_categories(&mut self) -> bool {
        match self.store.load_categories() {
            Ok(()) => true,
            Err(err) => {
                self.report_error("Loading categories failed", err);
                false
            }
        }
    }

    /// Fetch chart data from the server.
    pub fn load_category_totals(&mut self) -> bool {
        match self.store.load_category_totals() {
            Ok(()) => true,
            Err(err) => {
                self.report_error("Loading category totals failed", err);
                false
            }
        }
    }

    /// Sort the chart, or re-fetch the server order for [`ChartOrder::Server`].
    pub fn set_chart_order(&mut self, order: ChartOrder) {
        match order {
            ChartOrder::Server => {
                self.load_category_totals();
            }
            other => self.chart.set_order(other),
        }
    }

    /// Apply every backend event that is already available.
    ///
    /// # Returns
    /// Number of events applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.store.try_next_event() {
            self.apply_event(event);
            applied += 1;
        }
        self.expire_feedback(Instant::now());
        applied
    }

    /// Apply events until no request is outstanding or `timeout` elapses.
    ///
    /// # Returns
    /// `true` when the store became idle in time.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.store.is_idle() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.store.next_event_timeout(remaining) {
                Some(event) => self.apply_event(event),
                None if self.store.is_idle() => break,
                None => return false,
            }
        }
        true
    }

    /// Reconcile one backend event with the store and the feedback surfaces.
    pub fn apply_event(&mut self, event: CoreEvent) {
        match self.store.apply_event(event) {
            StoreUpdate::SubscriptionsReplaced { .. } => {
                self.auth_required = false;
            }
            StoreUpdate::CategoriesReplaced { .. } => {}
            StoreUpdate::Created => {
                self.clear_field_errors();
                self.set_status("Subscription created.");
            }
            StoreUpdate::Updated { .. } => {
                self.clear_field_errors();
                self.set_status("Subscription updated.");
            }
            StoreUpdate::Deleted { .. } => self.set_status("Subscription deleted."),
            StoreUpdate::CategoryTotals { items } => self.chart.replace(items),
            StoreUpdate::Failed {
                source,
                kind,
                message,
            } => {
                let text = format!("{}: {}", source.describe(), message);
                self.last_error = Some(text.clone());
                if kind == ErrorKind::Auth {
                    self.auth_required = true;
                    self.set_status(format!("{}. Please sign in again.", text));
                } else {
                    self.set_status(text);
                }
            }
        }
    }

    fn after_submit(&mut self, action: &str, result: Result<(), AppError>) -> bool {
        match result {
            Ok(()) => {
                self.clear_field_errors();
                true
            }
            Err(AppError::Validation(errors)) => {
                self.field_errors = errors;
                false
            }
            Err(err) => {
                self.report_error(action, err);
                false
            }
        }
    }

    fn report_error(&mut self, action: &str, err: AppError) {
        if err.kind() == ErrorKind::Auth {
            self.auth_required = true;
        }
        let text = format!("{}: {}", action, err);
        self.last_error = Some(text.clone());
        self.set_status(text);
    }

    fn report_persist(&mut self, result: Result<(), AppError>) {
        if let Err(err) = result {
            warn!("failed to persist view preferences: {}", err);
            self.set_status(format!("Could not save view preferences: {}", err));
        }
    }
}
