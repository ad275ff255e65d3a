use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::plan::PlanKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[display("pending")]
    Pending,
    #[display("approved")]
    Approved,
    #[display("rejected")]
    Rejected,
}

/// A user's "I paid, please activate" notice awaiting admin review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub plan: PlanKind,
    pub price: f64,
    pub requested_at: DateTime<Utc>,
    pub status: RequestStatus,
    #[serde(default)]
    pub decided_at: Option<DateTime<Utc>>,
}

impl PlanRequest {
    pub fn new(user_id: Uuid, user_name: String, plan: PlanKind, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            user_name,
            plan,
            price: plan.info().price,
            requested_at: now,
            status: RequestStatus::Pending,
            decided_at: None,
        }
    }
}
