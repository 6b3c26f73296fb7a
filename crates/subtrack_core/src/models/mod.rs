//! Data models exchanged with the remote subscription API.

/// Category records and their display ordering.
pub mod category;
/// Supported payment currencies.
pub mod currency;
/// Subscription records, drafts, and normalized payloads.
pub mod subscription;


pub use category::{sort_categories, Category};
pub use currency::Currency;
pub use subscription::{CategoryRef, Subscription, SubscriptionDraft, SubscriptionPayload};
