//! Protocol types for the backend worker.

use subtrack_core::{
    analytics::CategoryTotal,
    models::{Category, Subscription, SubscriptionPayload},
    ErrorKind,
};

/// Commands issued by the controller for the backend worker to execute.
#[derive(Debug, Clone)]
pub enum CoreCmd {
    /// Fetch the full subscription collection.
    LoadSubscriptions,
    /// Fetch the category reference set.
    LoadCategories,
    /// Create a subscription from an already-validated payload.
    CreateSubscription { payload: SubscriptionPayload },
    /// Replace the fields of an existing subscription.
    UpdateSubscription {
        id: String,
        payload: SubscriptionPayload,
    },
    DeleteSubscription { id: String },
    /// Fetch per-category spend totals for the analytics chart.
    LoadCategoryTotals,
}

impl CoreCmd {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            CoreCmd::LoadSubscriptions => "load_subscriptions",
            CoreCmd::LoadCategories => "load_categories",
            CoreCmd::CreateSubscription { .. } => "create_subscription",
            CoreCmd::UpdateSubscription { .. } => "update_subscription",
            CoreCmd::DeleteSubscription { .. } => "delete_subscription",
            CoreCmd::LoadCategoryTotals => "load_category_totals",
        }
    }
}

/// Which request an [`CoreEvent::Error`] belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreErrorSource {
    LoadSubscriptions,
    LoadCategories,
    Create,
    Update { id: String },
    Delete { id: String },
    CategoryTotals,
    /// The worker went away with requests still outstanding.
    Backend,
}

impl CoreErrorSource {
    /// Short human label used as a status prefix.
    pub fn describe(&self) -> &'static str {
        match self {
            CoreErrorSource::LoadSubscriptions => "Loading subscriptions failed",
            CoreErrorSource::LoadCategories => "Loading categories failed",
            CoreErrorSource::Create => "Creating the subscription failed",
            CoreErrorSource::Update { .. } => "Updating the subscription failed",
            CoreErrorSource::Delete { .. } => "Deleting the subscription failed",
            CoreErrorSource::CategoryTotals => "Loading category totals failed",
            CoreErrorSource::Backend => "Background worker stopped",
        }
    }
}

/// Events produced by the backend worker in response to commands.
///
/// Exactly one event is emitted per command.
#[derive(Debug, Clone)]
pub enum CoreEvent {
    SubscriptionsLoaded { items: Vec<Subscription> },
    CategoriesLoaded { items: Vec<Category> },
    /// The server accepted the create; the caller should reload.
    SubscriptionCreated,
    /// The server accepted the update; the caller should reload.
    SubscriptionUpdated { id: String },
    SubscriptionDeleted { id: String },
    CategoryTotalsLoaded { items: Vec<CategoryTotal> },
    Error {
        source: CoreErrorSource,
        kind: ErrorKind,
        message: String,
    },
}
