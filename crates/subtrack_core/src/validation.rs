//! Local draft validation and payload normalization.
//!
//! Drafts are checked before any remote call; a failing draft never reaches
//! the network layer.

use crate::models::{Category, Currency, SubscriptionDraft, SubscriptionPayload};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::BTreeMap;
use std::fmt;

/// Draft fields that can carry an inline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    ServiceName,
    NextPaymentDate,
    Amount,
    Currency,
    CategoryId,
}

impl DraftField {
    /// Field name as used by the remote API and entry forms.
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::ServiceName => "serviceName",
            DraftField::NextPaymentDate => "nextPaymentDate",
            DraftField::Amount => "amount",
            DraftField::Currency => "currency",
            DraftField::CategoryId => "categoryId",
        }
    }
}

/// Field name → human-readable message for every failing field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<DraftField, String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: DraftField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (DraftField, &str)> {
        self.fields
            .iter()
            .map(|(field, message)| (*field, message.as_str()))
    }

    fn insert(&mut self, field: DraftField, message: impl Into<String>) {
        self.fields.insert(field, message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field.as_str(), message)?;
            first = false;
        }
        Ok(())
    }
}

fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    // Edit forms hand back `YYYY-MM-DD`; pre-filled values may still carry a
    // `THH:MM[:SS]` suffix. The suffix must parse but only the date is kept.
    let raw = raw.trim();
    let (date_part, time_part) = match raw.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (raw, None),
    };
    if let Some(time) = time_part {
        NaiveTime::parse_from_str(time, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
            .ok()?;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn supported_currency_list() -> String {
    Currency::ALL
        .iter()
        .map(|currency| currency.code())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a draft against the loaded categories at moment `now`.
///
/// # Arguments
/// - `draft`: Raw user input.
/// - `categories`: Currently loaded categories; `categoryId` must name one.
/// - `now`: Validation moment; the normalized payment moment (the chosen date
///   at midnight) must be strictly later.
///
/// # Returns
/// The normalized [`SubscriptionPayload`] on success.
///
/// # Errors
/// Returns [`ValidationErrors`] listing every failing field.
pub fn validate_draft(
    draft: &SubscriptionDraft,
    categories: &[Category],
    now: NaiveDateTime,
) -> Result<SubscriptionPayload, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let service_name = draft.service_name.trim();
    if service_name.is_empty() {
        errors.insert(DraftField::ServiceName, "Service Name is required.");
    }

    let next_payment_date = if draft.next_payment_date.trim().is_empty() {
        errors.insert(DraftField::NextPaymentDate, "Please enter a valid date.");
        None
    } else {
        match parse_calendar_date(&draft.next_payment_date).and_then(|d| d.and_hms_opt(0, 0, 0)) {
            Some(moment) if moment > now => Some(moment),
            Some(_) => {
                errors.insert(
                    DraftField::NextPaymentDate,
                    "Next payment date must be in the future.",
                );
                None
            }
            None => {
                errors.insert(DraftField::NextPaymentDate, "Please enter a valid date.");
                None
            }
        }
    };

    let amount_raw = draft.amount.trim();
    let amount = if amount_raw.is_empty() {
        errors.insert(DraftField::Amount, "Amount is required.");
        None
    } else {
        match amount_raw.parse::<f64>() {
            Ok(value) if !value.is_finite() => {
                errors.insert(DraftField::Amount, "Amount must be a number.");
                None
            }
            Ok(value) if value <= 0.0 => {
                errors.insert(DraftField::Amount, "Amount must be greater than zero.");
                None
            }
            Ok(value) => Some(value),
            Err(_) => {
                errors.insert(DraftField::Amount, "Amount must be a number.");
                None
            }
        }
    };

    let currency = if draft.currency.trim().is_empty() {
        errors.insert(DraftField::Currency, "Currency is required.");
        None
    } else {
        match draft.currency.parse::<Currency>() {
            Ok(currency) => Some(currency),
            Err(_) => {
                errors.insert(
                    DraftField::Currency,
                    format!("Currency must be one of {}.", supported_currency_list()),
                );
                None
            }
        }
    };

    let category_id = draft.category_id.trim();
    if category_id.is_empty() {
        errors.insert(DraftField::CategoryId, "Category is required.");
    } else if !categories.iter().any(|c| c.category_id == category_id) {
        errors.insert(DraftField::CategoryId, "Unknown category.");
    }

    match (next_payment_date, amount, currency) {
        (Some(next_payment_date), Some(amount), Some(currency)) if errors.is_empty() => {
            Ok(SubscriptionPayload {
                service_name: service_name.to_string(),
                next_payment_date,
                amount,
                currency,
                category_id: category_id.to_string(),
            })
        }
        _ => Err(errors),
    }
}
