//! Shared test-only helpers for subtrack_client.

use chrono::{Duration, Local, NaiveDate};
use subtrack_core::models::{Category, CategoryRef, Currency, Subscription, SubscriptionDraft};

pub(crate) fn category(id: &str, name: &str) -> Category {
    Category {
        category_id: id.to_string(),
        category_name: name.to_string(),
    }
}

/// Builds a USD subscription due on 2030-01-01, named after its category.
pub(crate) fn subscription(id: &str, name: &str, category: &Category) -> Subscription {
    Subscription {
        subscription_id: id.to_string(),
        service_name: name.to_string(),
        amount: 9.99,
        currency: Currency::Usd,
        next_payment_date: NaiveDate::from_ymd_opt(2030, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date"),
        category: CategoryRef {
            category_id: category.category_id.clone(),
            category_name: category.category_name.clone(),
        },
    }
}

/// A draft that passes validation against `category_id`, due in 30 days.
pub(crate) fn valid_draft(name: &str, category_id: &str) -> SubscriptionDraft {
    SubscriptionDraft {
        service_name: name.to_string(),
        next_payment_date: (Local::now().date_naive() + Duration::days(30))
            .format("%Y-%m-%d")
            .to_string(),
        amount: "12.50".to_string(),
        currency: "EUR".to_string(),
        category_id: category_id.to_string(),
    }
}

/// Two categories with ten subscriptions: seven in `cat-a`, three in `cat-b`.
pub(crate) fn seeded_collection() -> (Vec<Category>, Vec<Subscription>) {
    let streaming = category("cat-a", "Streaming");
    let tools = category("cat-b", "Tools");
    let mut subscriptions = Vec::new();
    for n in 0..7 {
        subscriptions.push(subscription(
            &format!("sub-a{}", n),
            &format!("Stream {}", n),
            &streaming,
        ));
    }
    for n in 0..3 {
        subscriptions.push(subscription(
            &format!("sub-b{}", n),
            &format!("Tool {}", n),
            &tools,
        ));
    }
    (vec![streaming, tools], subscriptions)
}
