pub mod account_service;
pub mod admin_service;
pub mod auth_service;
pub mod calculator;
pub mod notification_service;
pub mod profile_service;
pub mod quote_service;
pub mod report_service;
pub mod settings_service;
pub mod suggestion_service;
