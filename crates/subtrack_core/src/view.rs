//! Pure filter + pagination over the subscription collection.
//!
//! Nothing here performs I/O or keeps state between calls; the list view
//! re-runs [`derive_view`] whenever the collection or the view state changes.

use crate::models::Subscription;

/// What the user is currently looking at: search text, category filter, page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_text: String,
    /// `None` means "no category filter".
    pub selected_category_id: Option<String>,
    /// One-based page number.
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            selected_category_id: None,
            current_page: 1,
        }
    }
}

/// One rendered page of the filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    /// Records on this page, in remote `list()` order.
    pub items: Vec<&'a Subscription>,
    /// The page actually shown, after clamping.
    pub page: usize,
    /// `ceil(filtered_count / page_size)`; zero when nothing matches.
    pub total_pages: usize,
    pub filtered_count: usize,
    /// The requested page was out of range and has been replaced by `page`.
    /// Callers must write `page` back into their persisted view state.
    pub page_was_clamped: bool,
}

/// Result of deriving the visible list.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome<'a> {
    /// The full collection is empty: render nothing at all, not even an
    /// empty-state message or pagination controls.
    Suppressed,
    Page(PageView<'a>),
}

impl<'a> ViewOutcome<'a> {
    /// The page view, when the list is not suppressed.
    pub fn page(&self) -> Option<&PageView<'a>> {
        match self {
            ViewOutcome::Suppressed => None,
            ViewOutcome::Page(page) => Some(page),
        }
    }
}

fn normalized_category(selected: Option<&str>) -> Option<&str> {
    selected.filter(|id| !id.is_empty())
}

/// Whether `subscription` passes both the search and the category filter.
///
/// `search_folded` must already be lower-cased.
pub fn matches_filters(
    subscription: &Subscription,
    search_folded: &str,
    selected_category_id: Option<&str>,
) -> bool {
    let matches_search = search_folded.is_empty()
        || subscription
            .service_name
            .to_lowercase()
            .contains(search_folded);
    let matches_category = match normalized_category(selected_category_id) {
        Some(id) => subscription.category.category_id == id,
        None => true,
    };
    matches_search && matches_category
}

/// Keep every record matching the search text and category, preserving order.
pub fn filter_subscriptions<'a>(
    subscriptions: &'a [Subscription],
    search_text: &str,
    selected_category_id: Option<&str>,
) -> Vec<&'a Subscription> {
    let folded = search_text.to_lowercase();
    subscriptions
        .iter()
        .filter(|subscription| matches_filters(subscription, &folded, selected_category_id))
        .collect()
}

/// Number of pages needed for `count` records.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Clamp a requested one-based page into `[1, max(total_pages, 1)]`.
pub fn clamp_page(requested: usize, total_pages: usize) -> usize {
    requested.clamp(1, total_pages.max(1))
}

/// Derive the visible page from the collection and the view state.
///
/// # Arguments
/// - `subscriptions`: Full collection in remote `list()` order.
/// - `state`: Current search text, category filter, and requested page.
/// - `page_size`: Records per page (values below 1 are treated as 1).
///
/// # Returns
/// [`ViewOutcome::Suppressed`] when the collection is empty, otherwise the
/// clamped page slice plus pagination metadata.
pub fn derive_view<'a>(
    subscriptions: &'a [Subscription],
    state: &ViewState,
    page_size: usize,
) -> ViewOutcome<'a> {
    if subscriptions.is_empty() {
        return ViewOutcome::Suppressed;
    }

    let page_size = page_size.max(1);
    let filtered = filter_subscriptions(
        subscriptions,
        &state.search_text,
        state.selected_category_id.as_deref(),
    );
    let filtered_count = filtered.len();
    let total_pages = total_pages(filtered_count, page_size);
    let page = clamp_page(state.current_page, total_pages);
    let items = filtered
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    ViewOutcome::Page(PageView {
        items,
        page,
        total_pages,
        filtered_count,
        page_was_clamped: page != state.current_page,
    })
}
