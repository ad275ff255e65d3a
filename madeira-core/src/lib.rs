//! Wood-volume pricing: calculator, quote lists, accounts and printable quotes.

pub mod application;
pub mod context;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use context::AppContext;
pub use domain::error::DomainError;
