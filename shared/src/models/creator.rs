use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::SharedError;

/// A purchasable creator plan as listed in the `creator_plans` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatorPlan {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Maximum number of videos a creator on this plan may publish
    pub video_limit: i32,

    /// Monthly price in whole currency units
    pub price_monthly: i32,

    pub is_active: bool,

    /// Display rank, ascending
    pub sort_order: i32,
}

impl CreatorPlan {
    pub fn formatted_price(&self) -> String {
        format!("${}/mo", self.price_monthly)
    }
}

/// Subscription lifecycle of a creator account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Inactive,
    ActiveTrial,
    ActivePaid,
    Canceled,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 4] = [
        SubscriptionStatus::Inactive,
        SubscriptionStatus::ActiveTrial,
        SubscriptionStatus::ActivePaid,
        SubscriptionStatus::Canceled,
    ];

    /// Whether this status currently entitles the account to creator features.
    pub fn is_active(self) -> bool {
        matches!(self, SubscriptionStatus::ActiveTrial | SubscriptionStatus::ActivePaid)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::ActiveTrial => "active_trial",
            SubscriptionStatus::ActivePaid => "active_paid",
            SubscriptionStatus::Canceled => "canceled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "active_trial" => Ok(SubscriptionStatus::ActiveTrial),
            "active_paid" => Ok(SubscriptionStatus::ActivePaid),
            "canceled" => Ok(SubscriptionStatus::Canceled),
            other => Err(SharedError::InvalidSubscriptionStatus(other.to_string())),
        }
    }
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<SubscriptionStatus, D::Error>
where
    D: serde::Deserializer<'de>,
{
    // A null column means the account never subscribed
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => raw.parse().map_err(serde::de::Error::custom),
        None => Ok(SubscriptionStatus::Inactive),
    }
}

/// Creator columns of a `profiles` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatorStatus {
    #[serde(default)]
    pub is_creator: bool,

    /// Weak reference to `CreatorPlan::id`; a trial may not have a plan yet
    #[serde(default)]
    pub creator_plan_id: Option<String>,

    #[serde(default, deserialize_with = "deserialize_status")]
    pub subscription_status: SubscriptionStatus,

    #[serde(default, with = "crate::timestamp::optional")]
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl CreatorStatus {
    pub fn grants_access(&self) -> bool {
        self.is_creator && self.subscription_status.is_active()
    }

    /// Finds the plan this status points at, if it is in `plans`.
    pub fn plan<'a>(&self, plans: &'a [CreatorPlan]) -> Option<&'a CreatorPlan> {
        let plan_id = self.creator_plan_id.as_deref()?;
        plans.iter().find(|plan| plan.id == plan_id)
    }
}

/// The single authorization decision for creator features.
pub fn has_creator_access(status: Option<&CreatorStatus>) -> bool {
    status.map(CreatorStatus::grants_access).unwrap_or(false)
}
