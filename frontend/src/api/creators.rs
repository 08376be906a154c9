use std::rc::Rc;
use log::{debug, error};
use serde_json::Value;
use shared::{CreatorPlan, CreatorStatus};
use crate::api::cache::{QueryClient, QueryKey, QueryOptions, QueryOutcome};
use crate::api::error::QueryError;
use crate::api::store::{RemoteStore, SelectQuery};
use crate::config::Config;

pub const CREATOR_PLANS_TABLE: &str = "creator_plans";
pub const PROFILES_TABLE: &str = "profiles";

/// Creator columns read from `profiles`.
pub const CREATOR_STATUS_COLUMNS: [&str; 4] = [
    "is_creator",
    "creator_plan_id",
    "subscription_status",
    "trial_ends_at",
];

pub fn creator_plans_key() -> QueryKey {
    QueryKey::new(["creator-plans"])
}

pub fn creator_status_key(user_id: &str) -> QueryKey {
    QueryKey::new(["creator-status", user_id])
}

pub fn creator_plans_options() -> QueryOptions {
    QueryOptions::stale_after(Config::plans_stale_time())
}

pub fn creator_status_options() -> QueryOptions {
    QueryOptions::stale_after(Config::status_stale_time())
}

pub fn creator_plans_query() -> SelectQuery {
    SelectQuery::from(CREATOR_PLANS_TABLE)
        .eq("is_active", true)
        .order("sort_order", true)
}

pub fn creator_status_query(user_id: &str) -> SelectQuery {
    SelectQuery::from(PROFILES_TABLE)
        .select(&CREATOR_STATUS_COLUMNS)
        .eq("id", user_id)
        .single()
}

/// Fetches and validates active plans, logging any failure once.
///
/// Only rows that decode are returned, so the cache never holds a payload
/// that would fail on the way out.
pub async fn load_creator_plans(store: Rc<dyn RemoteStore>) -> Result<Value, QueryError> {
    debug!("Fetching creator plans");
    let result = match store.select(&creator_plans_query()).await {
        Ok(rows) => decode_creator_plans(Value::Array(rows))
            .and_then(|plans| Ok(serde_json::to_value(plans)?)),
        Err(e) => Err(e),
    };
    match result {
        Ok(value) => {
            debug!("Fetched {} creator plans", value.as_array().map(Vec::len).unwrap_or_default());
            Ok(value)
        }
        Err(e) => {
            error!("Error fetching creator plans: {}", e);
            Err(e)
        }
    }
}

/// Fetches and validates one profile's creator columns, logging any failure once.
pub async fn load_creator_status(store: Rc<dyn RemoteStore>, user_id: String) -> Result<Value, QueryError> {
    debug!("Fetching creator status for user {}", user_id);
    let result = match store.select(&creator_status_query(&user_id)).await {
        Ok(rows) => decode_creator_status(rows.into_iter().next().unwrap_or(Value::Null))
            .and_then(|status| Ok(serde_json::to_value(status)?)),
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        error!("Error fetching creator status for user {}: {}", user_id, e);
    }
    result
}

/// Decodes plan rows, keeping only active plans in display order.
pub fn decode_creator_plans(value: Value) -> Result<Vec<CreatorPlan>, QueryError> {
    let mut plans: Vec<CreatorPlan> = serde_json::from_value(value)?;
    plans.retain(|plan| plan.is_active);
    plans.sort_by_key(|plan| plan.sort_order);
    Ok(plans)
}

pub fn decode_creator_status(value: Value) -> Result<Option<CreatorStatus>, QueryError> {
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

/// Active creator plans, ascending by sort order.
pub async fn fetch_creator_plans(
    client: &QueryClient,
    store: Rc<dyn RemoteStore>,
) -> Result<Vec<CreatorPlan>, QueryError> {
    let value = client
        .fetch(&creator_plans_key(), creator_plans_options(), move || load_creator_plans(store))
        .await?;
    decode_creator_plans(value)
}

/// Creator status of `user_id`; disabled without touching the store when there is no user.
pub async fn fetch_creator_status(
    client: &QueryClient,
    store: Rc<dyn RemoteStore>,
    user_id: Option<&str>,
) -> Result<QueryOutcome<Option<CreatorStatus>>, QueryError> {
    let Some(user_id) = user_id.filter(|id| !id.is_empty()) else {
        debug!("Creator status query disabled: no user id");
        return Ok(QueryOutcome::Disabled);
    };

    let owned_id = user_id.to_string();
    let value = client
        .fetch(&creator_status_key(user_id), creator_status_options(), move || {
            load_creator_status(store, owned_id)
        })
        .await?;
    decode_creator_status(value).map(QueryOutcome::Ready)
}
