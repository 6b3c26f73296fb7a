//! Text and JSON renderings for CLI output.

use serde_json::{json, Value};
use subtrack_core::{
    analytics::CategoryTotal,
    models::{Category, Subscription},
    ViewOutcome,
};

fn encode(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| format!("output encoding error: {}", err))
}

fn subscription_row(subscription: &Subscription) -> String {
    format!(
        "{:<36} {:<28} {:>10.2} {:<3} {} {}",
        subscription.subscription_id,
        subscription.service_name,
        subscription.amount,
        subscription.currency,
        subscription.next_payment_date.format("%Y-%m-%d"),
        subscription.category.category_name
    )
}

/// Render a derived page as rows followed by `Page x/y`.
///
/// A suppressed view (empty collection) renders nothing in text mode.
pub(crate) fn format_list_output(outcome: &ViewOutcome<'_>, json: bool) -> Result<String, String> {
    let Some(page) = outcome.page() else {
        if json {
            return encode(&json!({
                "items": [],
                "page": 1,
                "totalPages": 0,
                "filteredCount": 0,
                "suppressed": true,
            }));
        }
        return Ok(String::new());
    };

    if json {
        let items = serde_json::to_value(&page.items)
            .map_err(|err| format!("output encoding error: {}", err))?;
        return encode(&json!({
            "items": items,
            "page": page.page,
            "totalPages": page.total_pages,
            "filteredCount": page.filtered_count,
            "suppressed": false,
        }));
    }

    let mut rows: Vec<String> = page.items.iter().map(|s| subscription_row(s)).collect();
    if rows.is_empty() {
        rows.push("No matching subscriptions.".to_string());
    }
    let shown_page = if page.total_pages == 0 { 0 } else { page.page };
    rows.push(format!("Page {}/{}", shown_page, page.total_pages));
    Ok(rows.join("\n"))
}

pub(crate) fn format_categories_output(categories: &[Category], json: bool) -> Result<String, String> {
    if json {
        let value = serde_json::to_value(categories)
            .map_err(|err| format!("output encoding error: {}", err))?;
        return encode(&value);
    }
    Ok(categories
        .iter()
        .map(|c| format!("{:<36} {}", c.category_id, c.category_name))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub(crate) fn format_totals_output(points: &[CategoryTotal], json: bool) -> Result<String, String> {
    if json {
        let value = serde_json::to_value(points)
            .map_err(|err| format!("output encoding error: {}", err))?;
        return encode(&value);
    }
    Ok(points
        .iter()
        .map(|p| format!("{:<30} {:>12.2}", p.title, p.value))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// One-line confirmation for create/update/delete.
pub(crate) fn format_mutation_output(verb: &str, target: &str, json: bool) -> Result<String, String> {
    if json {
        return encode(&json!({ "status": verb.to_lowercase(), "target": target }));
    }
    Ok(format!("{} subscription: {}", verb, target))
}
