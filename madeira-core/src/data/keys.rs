//! Key namespace of the flat store.

use uuid::Uuid;

pub const USERS: &str = "calc_madeira_auth";
pub const CURRENT_USER_ID: &str = "currentUserId";
pub const WOOD_LIST: &str = "woodList";
pub const CLIENTS: &str = "clients";
pub const CLIENTS_WITH_PHONE: &str = "clientsWithPhone";
pub const SPECIES: &str = "species";
pub const PAYMENT_TERMS: &str = "paymentTerms";
pub const SETTINGS: &str = "settings";
pub const NOTIFICATIONS: &str = "notifications";
pub const RESET_CODES: &str = "calc_madeira_reset_codes";
pub const PLAN_REQUESTS: &str = "pendingRequests";
pub const ADMIN_ACCESS: &str = "lastAdminAccess";
pub const SCHEMA_VERSION: &str = "schema_version";

pub const QUOTES_PREFIX: &str = "quotes_";
pub const PROFILE_PREFIX: &str = "profile_";

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

pub fn quotes(user_id: Uuid) -> String {
    format!("{QUOTES_PREFIX}{user_id}")
}

pub fn profile(user_id: Uuid) -> String {
    format!("{PROFILE_PREFIX}{user_id}")
}
