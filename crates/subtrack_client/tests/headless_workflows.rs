//! End-to-end list view workflows over the real backend worker and the
//! in-memory API.

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use subtrack_client::api::MemoryOp;
use subtrack_client::{spawn_backend, CollectionStore, MemoryApi, SessionContext, SubscriptionListView};
use subtrack_core::models::{Category, CategoryRef, Currency, Subscription, SubscriptionDraft};
use subtrack_core::preferences::{FilePreferences, MemoryPreferences, PreferenceStore, ViewPreferences};
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(5);

fn category(id: &str, name: &str) -> Category {
    Category {
        category_id: id.to_string(),
        category_name: name.to_string(),
    }
}

fn subscription(id: &str, name: &str, category: &Category) -> Subscription {
    Subscription {
        subscription_id: id.to_string(),
        service_name: name.to_string(),
        amount: 5.0,
        currency: Currency::Usd,
        next_payment_date: NaiveDate::from_ymd_opt(2030, 6, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("date"),
        category: CategoryRef {
            category_id: category.category_id.clone(),
            category_name: category.category_name.clone(),
        },
    }
}

fn seeded_api() -> MemoryApi {
    let video = category("cat-video", "Video");
    let music = category("cat-music", "Music");
    let mut items = Vec::new();
    for n in 0..7 {
        items.push(subscription(&format!("v{}", n), &format!("Video {}", n), &video));
    }
    for n in 0..3 {
        items.push(subscription(&format!("m{}", n), &format!("Music {}", n), &music));
    }
    MemoryApi::new(vec![video, music], items)
}

fn future_draft(name: &str, category_id: &str) -> SubscriptionDraft {
    SubscriptionDraft {
        service_name: name.to_string(),
        next_payment_date: (Local::now().date_naive() + ChronoDuration::days(10))
            .format("%Y-%m-%d")
            .to_string(),
        amount: "3.99".to_string(),
        currency: "usd".to_string(),
        category_id: category_id.to_string(),
    }
}

fn start_view<S: PreferenceStore>(
    api: MemoryApi,
    session: Arc<SessionContext>,
    prefs: S,
) -> SubscriptionListView<S> {
    let store = CollectionStore::new(spawn_backend(api, WAIT), session);
    let mut view = SubscriptionListView::new(store, ViewPreferences::new(prefs), 9);
    view.start();
    assert!(view.wait_idle(WAIT), "initial load should finish");
    view
}

fn ready_session() -> Arc<SessionContext> {
    let session = Arc::new(SessionContext::new());
    session.init("token", None).expect("session");
    session
}

#[test]
fn paginates_and_clamps_after_category_filter() {
    let mut view = start_view(seeded_api(), ready_session(), MemoryPreferences::new());

    {
        let outcome = view.view();
        let page = outcome.page().expect("page");
        assert_eq!(page.items.len(), 9);
        assert_eq!(page.total_pages, 2);
    }

    view.set_page(2);
    view.set_selected_category(Some("cat-music".to_string()));
    let outcome = view.view();
    let page = outcome.page().expect("page");
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.items.len(), 3);
}

#[test]
fn create_then_delete_keeps_collection_consistent() {
    let api = seeded_api();
    let mut view = start_view(api.clone(), ready_session(), MemoryPreferences::new());

    assert!(view.submit_create(&future_draft("Podcast Plus", "cat-music")));
    assert!(view.wait_idle(WAIT));
    assert_eq!(view.subscriptions().len(), 11);
    assert_eq!(api.calls(MemoryOp::ListSubscriptions), 2);
    let created = view
        .subscriptions()
        .iter()
        .find(|s| s.service_name == "Podcast Plus")
        .expect("created record")
        .clone();
    assert_eq!(created.category.category_name, "Music");

    assert!(view.request_delete(&created.subscription_id));
    assert!(view.wait_idle(WAIT));
    assert_eq!(view.subscriptions().len(), 10);
    assert!(view
        .subscriptions()
        .iter()
        .all(|s| s.subscription_id != created.subscription_id));
    // Delete reconciles locally; no extra list call.
    assert_eq!(api.calls(MemoryOp::ListSubscriptions), 2);
}

#[test]
fn failed_update_leaves_state_and_reports() {
    let api = seeded_api();
    let mut view = start_view(api.clone(), ready_session(), MemoryPreferences::new());
    let before = view.subscriptions().to_vec();

    api.fail(MemoryOp::Update, "maintenance window");
    assert!(view.submit_update("v0", &future_draft("Renamed", "cat-video")));
    assert!(view.wait_idle(WAIT));

    assert_eq!(view.subscriptions(), before.as_slice());
    let status = view.status_text().expect("status");
    assert!(status.contains("maintenance window"), "status: {}", status);
    assert!(!view.auth_required());
}

#[test]
fn expired_session_surfaces_auth_required() {
    let session = ready_session();
    let api = seeded_api().require_session(session.clone());
    let mut view = start_view(api.clone(), session.clone(), MemoryPreferences::new());
    assert_eq!(view.subscriptions().len(), 10);

    session.teardown();
    view.start();
    assert!(view.wait_idle(WAIT));
    assert!(view.auth_required());
    // Categories stay readable; subscriptions were never re-requested.
    assert_eq!(api.calls(MemoryOp::ListSubscriptions), 1);
    assert_eq!(view.subscriptions().len(), 10);
}

#[test]
fn preferences_persist_across_restarts_on_disk() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("view_prefs.json");

    {
        let prefs = FilePreferences::open(&path).expect("open prefs");
        let mut view = start_view(seeded_api(), ready_session(), prefs);
        view.set_search_text("netflix");
        view.set_selected_category(Some("cat-1".to_string()));
        view.set_page(2);
    }

    let prefs = FilePreferences::open(&path).expect("reopen prefs");
    let view = start_view(seeded_api(), ready_session(), prefs);
    let state = view.state();
    assert_eq!(state.search_text, "netflix");
    assert_eq!(state.selected_category_id.as_deref(), Some("cat-1"));
    assert_eq!(state.current_page, 2);
}

#[test]
fn category_totals_feed_the_chart() {
    let mut view = start_view(seeded_api(), ready_session(), MemoryPreferences::new());
    assert!(view.load_category_totals());
    assert!(view.wait_idle(WAIT));

    let points = view.chart().points();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].title, "Video");
    assert!((points[0].value - 35.0).abs() < 1e-9);
}

#[test]
fn categories_load_anonymously_through_worker() {
    let api = MemoryApi::new(vec![category("cat-video", "Video")], Vec::new());
    let store = CollectionStore::new(spawn_backend(api, WAIT), Arc::new(SessionContext::new()));
    let mut view = SubscriptionListView::new(store, ViewPreferences::new(MemoryPreferences::new()), 9);

    assert!(view.load_categories());
    assert!(view.wait_idle(WAIT));
    assert_eq!(view.categories().len(), 1);
    assert_eq!(view.take_last_error(), None);
    assert!(!view.auth_required());
}
