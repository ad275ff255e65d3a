pub mod keys;
pub mod notification_repository;
pub mod plan_request_repository;
pub mod profile_repository;
pub mod quote_repository;
pub mod reset_code_repository;
pub mod store;
pub mod suggestion_repository;
pub mod user_repository;
