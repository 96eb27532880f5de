//! Depot Error Types
//!
//! Defines all error types for the depot operations.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::core_types::{CustomerId, InvoiceId};

/// Convenience alias used by every fallible depot operation.
pub type Result<T> = std::result::Result<T, DepotError>;

/// Depot error types
///
/// Every variant is locally recoverable: the operator is told what went
/// wrong and the store is left exactly as it was before the operation.
#[derive(Error, Debug, Clone)]
pub enum DepotError {
    // === Input Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    #[error("Use either a single date or a date range, not both")]
    InvalidDateRange,

    // === Balance Errors ===
    #[error("Requested {requested} L exceeds available balance of {available} L")]
    InsufficientBalance {
        requested: Decimal,
        available: Decimal,
    },

    // === Lookup Errors ===
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("Invoice {0} not found")]
    InvoiceNotFound(InvoiceId),

    // === Verification Errors ===
    #[error("Fuel for invoice {0} has already been collected")]
    AlreadyCollected(InvoiceId),

    #[error("Presented customer ID does not match the invoice")]
    CustomerMismatch,

    // === Store Errors ===
    #[error("Duplicate value violates a uniqueness constraint: {0}")]
    UniqueConstraintViolation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DepotError {
    /// Get the stable error code reported to the operator interface.
    pub fn code(&self) -> &'static str {
        match self {
            DepotError::InvalidInput(_) => "INVALID_INPUT",
            DepotError::InvalidQuantity => "INVALID_QUANTITY",
            DepotError::InvalidDateRange => "INVALID_DATE_RANGE",
            DepotError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            DepotError::CustomerNotFound(_) | DepotError::InvoiceNotFound(_) => "NOT_FOUND",
            DepotError::AlreadyCollected(_) => "ALREADY_COLLECTED",
            DepotError::CustomerMismatch => "CUSTOMER_MISMATCH",
            DepotError::UniqueConstraintViolation(_) => "UNIQUE_CONSTRAINT_VIOLATION",
            DepotError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<sqlx::Error> for DepotError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = e {
            if db.is_unique_violation() {
                return DepotError::UniqueConstraintViolation(db.message().to_string());
            }
        }
        DepotError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DepotError::InvalidQuantity.code(), "INVALID_QUANTITY");
        assert_eq!(DepotError::CustomerNotFound(7).code(), "NOT_FOUND");
        assert_eq!(DepotError::InvoiceNotFound(7).code(), "NOT_FOUND");
        assert_eq!(DepotError::AlreadyCollected(1).code(), "ALREADY_COLLECTED");
        assert_eq!(
            DepotError::InsufficientBalance {
                requested: Decimal::from(60),
                available: Decimal::from(20),
            }
            .code(),
            "INSUFFICIENT_BALANCE"
        );
    }

    #[test]
    fn test_display() {
        let err = DepotError::InsufficientBalance {
            requested: Decimal::from(60),
            available: Decimal::from(20),
        };
        assert_eq!(
            err.to_string(),
            "Requested 60 L exceeds available balance of 20 L"
        );
        assert_eq!(
            DepotError::CustomerMismatch.to_string(),
            "Presented customer ID does not match the invoice"
        );
    }
}
