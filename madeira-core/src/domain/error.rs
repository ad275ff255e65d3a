use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::data::store::StorageError;

/// Field-level rejection from the calculator form. The first failing field wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    #[error("please enter a valid width")]
    InvalidWidth,
    #[error("please enter a valid thickness")]
    InvalidThickness,
    #[error("please enter a valid length")]
    InvalidLength,
    #[error("please enter a valid quantity")]
    InvalidQuantity,
    #[error("please enter a valid package quantity")]
    InvalidPackageQuantity,
    #[error("please enter a valid price")]
    InvalidPrice,
}

impl CalculationError {
    pub fn field(&self) -> &'static str {
        match self {
            CalculationError::InvalidWidth => "width",
            CalculationError::InvalidThickness => "thickness",
            CalculationError::InvalidLength => "length",
            CalculationError::InvalidQuantity => "quantity",
            CalculationError::InvalidPackageQuantity => "package_quantity",
            CalculationError::InvalidPrice => "price",
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Calculation(#[from] CalculationError),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("no account registered for {0}")]
    EmailNotFound(String),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("your trial period has expired, please choose a plan")]
    PlanExpired,
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("no pending password reset for {0}")]
    NoPendingReset(String),
    #[error("reset code expired, request a new one")]
    ResetCodeExpired,
    #[error("too many attempts, request a new reset code")]
    TooManyAttempts,
    #[error("invalid reset code ({remaining} attempts left)")]
    InvalidResetCode { remaining: u32 },
    #[error("add items to the list first")]
    EmptyWoodList,
    #[error("item not found at position {0}")]
    ItemNotFound(usize),
    #[error("quote not found: {0}")]
    QuoteNotFound(Uuid),
    #[error("no single quote matches {0}")]
    UnknownQuoteReference(String),
    #[error("notification not found: {0}")]
    NotificationNotFound(Uuid),
    #[error("payment term not found at position {0}")]
    PaymentTermNotFound(usize),
    #[error("default payment terms cannot be changed")]
    ProtectedPaymentTerm,
    #[error("payment term already exists: {0}")]
    DuplicatePaymentTerm(String),
    #[error("plan request not found: {0}")]
    PlanRequestNotFound(Uuid),
    #[error("admin access is not configured")]
    AdminDisabled,
    #[error("forbidden")]
    Forbidden,
    #[error("unauthorized")]
    Unauthorized,
    #[error("report unavailable: {0}")]
    ReportUnavailable(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl DomainError {
    /// Process exit code for the command-line front end.
    pub fn exit_code(&self) -> u8 {
        match self {
            DomainError::Calculation(_)
            | DomainError::Validation(_)
            | DomainError::InvalidPlan(_)
            | DomainError::EmptyWoodList
            | DomainError::ProtectedPaymentTerm => 2,
            DomainError::InvalidCredentials
            | DomainError::PlanExpired
            | DomainError::NoPendingReset(_)
            | DomainError::ResetCodeExpired
            | DomainError::TooManyAttempts
            | DomainError::InvalidResetCode { .. }
            | DomainError::AdminDisabled
            | DomainError::Forbidden
            | DomainError::Unauthorized => 3,
            DomainError::UserNotFound(_)
            | DomainError::EmailNotFound(_)
            | DomainError::ItemNotFound(_)
            | DomainError::QuoteNotFound(_)
            | DomainError::UnknownQuoteReference(_)
            | DomainError::NotificationNotFound(_)
            | DomainError::PaymentTermNotFound(_)
            | DomainError::PlanRequestNotFound(_) => 4,
            DomainError::UserAlreadyExists(_) | DomainError::DuplicatePaymentTerm(_) => 5,
            DomainError::ReportUnavailable(_)
            | DomainError::Storage(_)
            | DomainError::Internal(_) => 1,
        }
    }

    /// Machine-readable rendering, used by `--json` output.
    pub fn to_json(&self) -> serde_json::Value {
        let message = self.to_string();
        let details = match self {
            DomainError::Calculation(err) => Some(json!({ "field": err.field() })),
            DomainError::UserNotFound(resource)
            | DomainError::QuoteNotFound(resource)
            | DomainError::NotificationNotFound(resource)
            | DomainError::PlanRequestNotFound(resource) => Some(json!({ "resource": resource })),
            DomainError::InvalidResetCode { remaining } => {
                Some(json!({ "remaining_attempts": remaining }))
            }
            _ => None,
        };
        let body = ErrorBody {
            error: message.as_str(),
            details,
        };
        serde_json::to_value(body).unwrap_or_else(|_| json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calculation_errors_map_to_validation_exit_code() {
        let err: DomainError = CalculationError::InvalidPrice.into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_json()["details"]["field"], "price");
    }

    #[test]
    fn reset_code_mismatch_reports_remaining_attempts() {
        let err = DomainError::InvalidResetCode { remaining: 1 };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_json()["details"]["remaining_attempts"], 1);
    }
}
