use super::output::{
    format_categories_output, format_list_output, format_mutation_output, format_totals_output,
};
use super::{resolve_config, Cli, Commands, DraftOverrides, SortArg};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use subtrack_core::{
    analytics::CategoryTotal,
    derive_view,
    models::{Category, CategoryRef, Currency, Subscription, SubscriptionDraft},
    Config, ViewState,
};

fn subscription(id: &str, name: &str) -> Subscription {
    Subscription {
        subscription_id: id.to_string(),
        service_name: name.to_string(),
        amount: 7.5,
        currency: Currency::Eur,
        next_payment_date: NaiveDate::from_ymd_opt(2030, 4, 2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("date"),
        category: CategoryRef {
            category_id: "cat-1".to_string(),
            category_name: "Streaming".to_string(),
        },
    }
}

#[test]
fn cli_parses_list_filters() {
    let cli = Cli::try_parse_from([
        "subtrack", "list", "--search", "net", "--category", "cat-1", "--page", "2",
    ])
    .expect("cli should parse list");
    match cli.command {
        Commands::List {
            search,
            category,
            all_categories,
            page,
        } => {
            assert_eq!(search.as_deref(), Some("net"));
            assert_eq!(category.as_deref(), Some("cat-1"));
            assert!(!all_categories);
            assert_eq!(page, Some(2));
        }
        _ => panic!("expected list command"),
    }
}

#[test]
fn cli_rejects_category_with_all_categories() {
    let parsed = Cli::try_parse_from([
        "subtrack",
        "list",
        "--category",
        "cat-1",
        "--all-categories",
    ]);
    assert!(parsed.is_err());
}

#[test]
fn cli_parses_analytics_sort() {
    let cli = Cli::try_parse_from(["subtrack", "analytics", "--sort", "desc"])
        .expect("cli should parse analytics");
    match cli.command {
        Commands::Analytics { sort } => assert_eq!(sort, Some(SortArg::Desc)),
        _ => panic!("expected analytics command"),
    }
}

#[test]
fn flags_override_environment_config() {
    let config = resolve_config(
        Config::default(),
        Some(" http://api.example:9000 ".to_string()),
        Some("tok".to_string()),
        Some(5),
        Some(PathBuf::from("/tmp/prefs.json")),
    );
    assert_eq!(config.api_url, "http://api.example:9000");
    assert_eq!(config.token.as_deref(), Some("tok"));
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.preferences_path, PathBuf::from("/tmp/prefs.json"));

    let untouched = resolve_config(Config::default(), None, Some("  ".to_string()), Some(0), None);
    assert_eq!(untouched.token, None);
    assert_eq!(untouched.request_timeout, Config::default().request_timeout);
}

#[test]
fn update_overrides_only_supplied_fields() {
    let mut draft = SubscriptionDraft::from_subscription(&subscription("sub-1", "Netflix"));
    DraftOverrides {
        amount: Some("9.99".to_string()),
        ..DraftOverrides::default()
    }
    .apply(&mut draft);
    assert_eq!(draft.service_name, "Netflix");
    assert_eq!(draft.amount, "9.99");
    assert_eq!(draft.next_payment_date, "2030-04-02");
    assert_eq!(draft.currency, "EUR");
}

#[test]
fn list_output_ends_with_page_marker() {
    let items = vec![subscription("sub-1", "Netflix"), subscription("sub-2", "Hulu")];
    let outcome = derive_view(&items, &ViewState::default(), 9);
    let text = format_list_output(&outcome, false).expect("text");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("sub-1"));
    assert!(lines[0].contains("2030-04-02"));
    assert_eq!(lines[2], "Page 1/1");
}

#[test]
fn list_output_for_no_matches_and_empty_collection() {
    let items = vec![subscription("sub-1", "Netflix")];
    let state = ViewState {
        search_text: "zzz".to_string(),
        ..ViewState::default()
    };
    let text = format_list_output(&derive_view(&items, &state, 9), false).expect("text");
    assert_eq!(text, "No matching subscriptions.\nPage 0/0");

    let empty: Vec<Subscription> = Vec::new();
    let outcome = derive_view(&empty, &ViewState::default(), 9);
    assert_eq!(format_list_output(&outcome, false).expect("text"), "");
    let json = format_list_output(&outcome, true).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["suppressed"], true);
}

#[test]
fn list_json_uses_wire_field_names() {
    let items = vec![subscription("sub-1", "Netflix")];
    let json = format_list_output(&derive_view(&items, &ViewState::default(), 9), true)
        .expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["totalPages"], 1);
    assert_eq!(value["items"][0]["subscriptionId"], "sub-1");
    assert_eq!(value["items"][0]["nextPaymentDate"], "2030-04-02T00:00:00");
}

#[test]
fn categories_and_totals_render_rows() {
    let categories = vec![Category {
        category_id: "cat-1".to_string(),
        category_name: "Streaming".to_string(),
    }];
    let text = format_categories_output(&categories, false).expect("text");
    assert!(text.starts_with("cat-1"));
    assert!(text.ends_with("Streaming"));

    let totals = vec![CategoryTotal {
        title: "Streaming".to_string(),
        value: 21.5,
    }];
    let text = format_totals_output(&totals, false).expect("text");
    assert!(text.ends_with("21.50"));
}

#[test]
fn mutation_output_text_and_json() {
    assert_eq!(
        format_mutation_output("Deleted", "sub-42", false).expect("text"),
        "Deleted subscription: sub-42"
    );
    let json = format_mutation_output("Deleted", "sub-42", true).expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["status"], "deleted");
}
