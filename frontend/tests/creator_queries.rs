mod common;

use std::rc::Rc;
use common::{capture_logs, logged, MemoryStore};
use creator_app::api::cache::{QueryClient, QueryOutcome};
use creator_app::api::creators::{creator_plans_key, creator_status_key, fetch_creator_plans, fetch_creator_status};
use creator_app::api::QueryError;
use futures::executor::block_on;
use log::Level;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use shared::{has_creator_access, SubscriptionStatus};

fn plan_rows() -> Vec<Value> {
    vec![
        json!({ "id": "studio", "name": "Studio", "description": "For teams", "video_limit": 500, "price_monthly": 99, "is_active": true, "sort_order": 3 }),
        json!({ "id": "legacy", "name": "Legacy", "description": null, "video_limit": 5, "price_monthly": 1, "is_active": false, "sort_order": 0 }),
        json!({ "id": "starter", "name": "Starter", "description": null, "video_limit": 10, "price_monthly": 9, "is_active": true, "sort_order": 1 }),
        json!({ "id": "pro", "name": "Pro", "description": "Most popular", "video_limit": 100, "price_monthly": 29, "is_active": true, "sort_order": 2 }),
    ]
}

fn profile_rows() -> Vec<Value> {
    vec![
        json!({ "id": "u1", "email": "u1@example.com", "is_creator": true, "creator_plan_id": null, "subscription_status": "active_trial", "trial_ends_at": "2025-01-01" }),
        json!({ "id": "u2", "email": "u2@example.com", "is_creator": true, "creator_plan_id": "pro", "subscription_status": "canceled", "trial_ends_at": null }),
        json!({ "id": "u3", "email": "u3@example.com", "is_creator": false, "creator_plan_id": null, "subscription_status": "active_paid", "trial_ends_at": null }),
    ]
}

fn store() -> Rc<MemoryStore> {
    Rc::new(
        MemoryStore::new()
            .with_table("creator_plans", plan_rows())
            .with_table("profiles", profile_rows()),
    )
}

#[test]
fn test_plan_catalog_returns_active_plans_in_order() {
    let store = store();
    let client = QueryClient::new();

    let plans = block_on(fetch_creator_plans(&client, store.clone())).unwrap();

    let ids: Vec<&str> = plans.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["starter", "pro", "studio"]);
    assert!(plans.iter().all(|p| p.is_active));
    assert!(plans.windows(2).all(|pair| pair[0].sort_order <= pair[1].sort_order));

    let query = &store.queries()[0];
    assert_eq!(query.table, "creator_plans");
    assert_eq!(query.to_query_string(), "select=%2A&is_active=eq.true&order=sort_order.asc");
}

#[test]
fn test_plan_catalog_is_cached() {
    let store = store();
    let client = QueryClient::new();

    let first = block_on(fetch_creator_plans(&client, store.clone())).unwrap();
    let second = block_on(fetch_creator_plans(&client, store.clone())).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.calls(), 1);
    assert!(client.peek(&creator_plans_key()).is_some());
}

#[test]
fn test_plan_catalog_transport_error_is_logged_once() {
    capture_logs();
    let store = store();
    store.fail_with(QueryError::Transport("connection reset".to_string()));
    let client = QueryClient::new();

    let err = block_on(fetch_creator_plans(&client, store.clone())).unwrap_err();

    assert_eq!(err, QueryError::Transport("connection reset".to_string()));
    let errors = logged(Level::Error);
    assert_eq!(errors.len(), 1, "expected one error entry, got {:?}", errors);
    assert!(errors[0].contains("creator plans"));
    assert!(errors[0].contains("connection reset"));
    assert_eq!(client.peek(&creator_plans_key()), None);
}

#[test]
fn test_status_without_user_never_calls_store() {
    let store = store();
    let client = QueryClient::new();

    let missing = block_on(fetch_creator_status(&client, store.clone(), None)).unwrap();
    let empty = block_on(fetch_creator_status(&client, store.clone(), Some(""))).unwrap();

    assert_eq!(missing, QueryOutcome::Disabled);
    assert_eq!(empty, QueryOutcome::Disabled);
    assert_eq!(missing.ready().flatten(), None);
    assert_eq!(store.calls(), 0);
    assert_eq!(client.stats().total_entries, 0);
}

#[test]
fn test_trial_creator_has_access() {
    let store = store();
    let client = QueryClient::new();

    let status = block_on(fetch_creator_status(&client, store.clone(), Some("u1")))
        .unwrap()
        .ready()
        .flatten()
        .unwrap();

    assert!(status.is_creator);
    assert_eq!(status.subscription_status, SubscriptionStatus::ActiveTrial);
    assert_eq!(status.creator_plan_id, None);
    assert!(status.trial_ends_at.is_some());
    assert!(has_creator_access(Some(&status)));

    let query = &store.queries()[0];
    assert_eq!(query.table, "profiles");
    assert!(query.single);
    assert!(!query.columns.contains(&"email".to_string()));
}

#[test]
fn test_canceled_creator_has_no_access() {
    let store = store();
    let client = QueryClient::new();

    let status = block_on(fetch_creator_status(&client, store.clone(), Some("u2")))
        .unwrap()
        .ready()
        .flatten();

    assert_eq!(status.as_ref().map(|s| s.subscription_status), Some(SubscriptionStatus::Canceled));
    assert!(!has_creator_access(status.as_ref()));
}

#[test]
fn test_paid_non_creator_has_no_access() {
    let store = store();
    let client = QueryClient::new();

    let status = block_on(fetch_creator_status(&client, store.clone(), Some("u3")))
        .unwrap()
        .ready()
        .flatten();

    assert!(!has_creator_access(status.as_ref()));
}

#[test]
fn test_status_is_refetched_on_every_access() {
    let store = store();
    let client = QueryClient::new();

    for _ in 0..3 {
        block_on(fetch_creator_status(&client, store.clone(), Some("u1"))).unwrap();
    }

    assert_eq!(store.calls(), 3);
    assert!(client.peek(&creator_status_key("u1")).is_some());
}

#[test]
fn test_status_keys_are_per_user() {
    let store = store();
    let client = QueryClient::new();

    block_on(fetch_creator_status(&client, store.clone(), Some("u1"))).unwrap();
    block_on(fetch_creator_status(&client, store.clone(), Some("u2"))).unwrap();

    assert_eq!(client.stats().total_entries, 2);
    assert_ne!(
        client.peek(&creator_status_key("u1")),
        client.peek(&creator_status_key("u2"))
    );
}

#[test]
fn test_unknown_profile_surfaces_store_error() {
    capture_logs();
    let store = store();
    let client = QueryClient::new();

    let err = block_on(fetch_creator_status(&client, store.clone(), Some("ghost"))).unwrap_err();

    assert!(matches!(err, QueryError::Remote { status: 406, .. }));
    let errors = logged(Level::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("ghost"));
}

#[test]
fn test_undecodable_status_is_logged_once() {
    capture_logs();
    let store = Rc::new(MemoryStore::new().with_table(
        "profiles",
        vec![json!({ "id": "u9", "is_creator": true, "creator_plan_id": null, "subscription_status": "vip", "trial_ends_at": null })],
    ));
    let client = QueryClient::new();

    let err = block_on(fetch_creator_status(&client, store.clone(), Some("u9"))).unwrap_err();

    assert!(matches!(err, QueryError::Decode(_)));
    let errors = logged(Level::Error);
    assert_eq!(errors.len(), 1, "expected one error entry, got {:?}", errors);
    assert!(errors[0].contains("u9"));
    assert_eq!(client.peek(&creator_status_key("u9")), None);
}

#[test]
fn test_undecodable_plans_are_not_cached() {
    capture_logs();
    let store = Rc::new(MemoryStore::new().with_table(
        "creator_plans",
        vec![json!({ "id": "nameless", "video_limit": 10, "price_monthly": 9, "is_active": true, "sort_order": 1 })],
    ));
    let client = QueryClient::new();

    let first = block_on(fetch_creator_plans(&client, store.clone())).unwrap_err();
    let second = block_on(fetch_creator_plans(&client, store.clone())).unwrap_err();

    assert!(matches!(first, QueryError::Decode(_)));
    assert_eq!(first, second);
    assert_eq!(store.calls(), 2);
    assert_eq!(client.peek(&creator_plans_key()), None);
    assert_eq!(client.stats().total_entries, 0);
    assert_eq!(logged(Level::Error).len(), 2);
}
