//! Per-category spend totals for the analytics chart.

use crate::models::Subscription;
use serde::{Deserialize, Serialize};

/// One bar of the chart, as served by `/subscriptions/total-amounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub title: String,
    pub value: f64,
}

/// Sum subscription amounts per category display name.
///
/// Amounts are added as-is regardless of currency, matching the server
/// endpoint. Bars come out in first-seen order.
pub fn totals_by_category(subscriptions: &[Subscription]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for subscription in subscriptions {
        let title = if subscription.category.category_name.trim().is_empty() {
            subscription.category.category_id.as_str()
        } else {
            subscription.category.category_name.as_str()
        };
        match totals.iter_mut().find(|total| total.title == title) {
            Some(total) => total.value += subscription.amount,
            None => totals.push(CategoryTotal {
                title: title.to_string(),
                value: subscription.amount,
            }),
        }
    }
    totals
}

/// Bar ordering selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartOrder {
    /// Order returned by the server (the "reset" state).
    #[default]
    Server,
    Ascending,
    Descending,
}

/// Chart data plus the active ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    server_points: Vec<CategoryTotal>,
    order: ChartOrder,
}

impl ChartState {
    /// Replace the data with a fresh server response and reset the ordering.
    pub fn replace(&mut self, points: Vec<CategoryTotal>) {
        self.server_points = points;
        self.order = ChartOrder::Server;
    }

    pub fn set_order(&mut self, order: ChartOrder) {
        self.order = order;
    }

    pub fn order(&self) -> ChartOrder {
        self.order
    }

    pub fn is_empty(&self) -> bool {
        self.server_points.is_empty()
    }

    /// Bars in display order.
    pub fn points(&self) -> Vec<CategoryTotal> {
        let mut points = self.server_points.clone();
        match self.order {
            ChartOrder::Server => {}
            ChartOrder::Ascending => points.sort_by(|a, b| a.value.total_cmp(&b.value)),
            ChartOrder::Descending => points.sort_by(|a, b| b.value.total_cmp(&a.value)),
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::subscription;

    fn titles(points: &[CategoryTotal]) -> Vec<&str> {
        points.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn totals_group_by_category_in_first_seen_order() {
        let mut a = subscription("1", "Netflix", "cat-b");
        a.amount = 10.0;
        let mut b = subscription("2", "Dropbox", "cat-a");
        b.amount = 4.5;
        let mut c = subscription("3", "Hulu", "cat-b");
        c.amount = 2.5;

        let totals = totals_by_category(&[a, b, c]);
        assert_eq!(titles(&totals), vec!["Category cat-b", "Category cat-a"]);
        assert_eq!(totals[0].value, 12.5);
        assert_eq!(totals[1].value, 4.5);
    }

    #[test]
    fn chart_sorts_and_resets_to_server_order() {
        let mut chart = ChartState::default();
        chart.replace(vec![
            CategoryTotal {
                title: "b".to_string(),
                value: 2.0,
            },
            CategoryTotal {
                title: "c".to_string(),
                value: 3.0,
            },
            CategoryTotal {
                title: "a".to_string(),
                value: 1.0,
            },
        ]);

        chart.set_order(ChartOrder::Ascending);
        assert_eq!(titles(&chart.points()), vec!["a", "b", "c"]);
        chart.set_order(ChartOrder::Descending);
        assert_eq!(titles(&chart.points()), vec!["c", "b", "a"]);

        let fresh = chart.points();
        chart.replace(fresh.into_iter().rev().collect());
        assert_eq!(chart.order(), ChartOrder::Server);
        assert_eq!(titles(&chart.points()), vec!["a", "b", "c"]);
    }
}
