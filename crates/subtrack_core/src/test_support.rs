//! Shared test-only helpers for subtrack_core.

use crate::models::{Category, CategoryRef, Currency, Subscription};
use chrono::NaiveDate;
use std::sync::{Mutex, OnceLock};

/// Serializes tests that mutate process environment variables.
pub(crate) fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Restores an environment variable value on drop.
pub(crate) struct EnvGuard {
    key: String,
    previous: Option<String>,
}

impl EnvGuard {
    #[allow(unused_unsafe)]
    pub(crate) fn set(key: &str, value: &str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: callers hold `env_lock` while the guard is alive.
        unsafe { std::env::set_var(key, value) };
        Self {
            key: key.to_string(),
            previous,
        }
    }

    #[allow(unused_unsafe)]
    pub(crate) fn remove(key: &str) -> Self {
        let previous = std::env::var(key).ok();
        // SAFETY: callers hold `env_lock` while the guard is alive.
        unsafe { std::env::remove_var(key) };
        Self {
            key: key.to_string(),
            previous,
        }
    }
}

impl Drop for EnvGuard {
    #[allow(unused_unsafe)]
    fn drop(&mut self) {
        // SAFETY: see `set`/`remove`.
        unsafe {
            match self.previous.as_deref() {
                Some(previous) => std::env::set_var(&self.key, previous),
                None => std::env::remove_var(&self.key),
            }
        }
    }
}

pub(crate) fn category(id: &str, name: &str) -> Category {
    Category {
        category_id: id.to_string(),
        category_name: name.to_string(),
    }
}

/// Builds a USD subscription due on 2030-01-01 in the given category.
pub(crate) fn subscription(id: &str, name: &str, category_id: &str) -> Subscription {
    Subscription {
        subscription_id: id.to_string(),
        service_name: name.to_string(),
        amount: 9.99,
        currency: Currency::Usd,
        next_payment_date: NaiveDate::from_ymd_opt(2030, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date"),
        category: CategoryRef {
            category_id: category_id.to_string(),
            category_name: format!("Category {}", category_id),
        },
    }
}
