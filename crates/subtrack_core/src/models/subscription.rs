//! Subscription records, drafts, and normalized payloads.

use super::currency::Currency;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A recurring-payment record as confirmed by the remote API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub subscription_id: String,
    pub service_name: String,
    pub amount: f64,
    pub currency: Currency,
    #[serde(with = "wire_date")]
    pub next_payment_date: NaiveDateTime,
    pub category: CategoryRef,
}

/// Denormalized category reference embedded in each subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub category_id: String,
    #[serde(default)]
    pub category_name: String,
}

/// Unvalidated, user-entered fields for a create or update request.
///
/// Every field is kept as typed so validation can report per-field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionDraft {
    pub service_name: String,
    pub next_payment_date: String,
    pub amount: String,
    pub currency: String,
    pub category_id: String,
}

impl SubscriptionDraft {
    /// Pre-fill an edit form from an existing record.
    ///
    /// The date keeps only its calendar-date part; the time of day is always
    /// normalized back to midnight on submit.
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self {
            service_name: subscription.service_name.clone(),
            next_payment_date: subscription
                .next_payment_date
                .date()
                .format("%Y-%m-%d")
                .to_string(),
            amount: subscription.amount.to_string(),
            currency: subscription.currency.code().to_string(),
            category_id: subscription.category.category_id.clone(),
        }
    }
}

/// Validated, normalized body for create/update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayload {
    pub service_name: String,
    #[serde(with = "wire_date")]
    pub next_payment_date: NaiveDateTime,
    pub amount: f64,
    pub currency: Currency,
    pub category_id: String,
}

/// Date-time wire encoding: `YYYY-MM-DDTHH:MM:SS` without offset.
///
/// Decoding is lenient about what the server sends back: a bare date, a
/// naive date-time with optional fractional seconds, or RFC 3339 (converted
/// to UTC).
pub mod wire_date {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date-time '{}'", raw)))
    }

    /// Parse any accepted wire shape.
    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        let trimmed = raw.trim();
        if let Ok(value) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(value);
        }
        if let Ok(value) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(value.naive_utc());
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}
