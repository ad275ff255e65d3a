use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const RESET_CODE_TTL_MINUTES: i64 = 30;
pub const MAX_RESET_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetCode {
    pub code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attempts: u32,
}

impl ResetCode {
    pub fn new(code: String, now: DateTime<Utc>) -> Self {
        Self {
            code,
            created_at: now,
            attempts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > Duration::minutes(RESET_CODE_TTL_MINUTES)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_RESET_ATTEMPTS
    }

    pub fn remaining_attempts(&self) -> u32 {
        MAX_RESET_ATTEMPTS.saturating_sub(self.attempts)
    }
}
