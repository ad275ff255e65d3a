pub mod error;
pub mod notification;
pub mod plan;
pub mod plan_request;
pub mod profile;
pub mod quote;
pub mod reset_code;
pub mod settings;
pub mod user;
pub mod wood;
