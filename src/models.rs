//! Core domain records and closed enumerations
//!
//! Fuel types, entry types and invoice states are closed sets. Operator
//! input is normalized case-insensitively at the boundary via `parse`;
//! text loaded back from the store goes through `from_db`, where an
//! unrecognized value means the store itself is damaged.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

use crate::core_types::{CustomerId, InvoiceId, OrderId, WithdrawalId};
use crate::error::DepotError;

// ============================================================================
// FuelType
// ============================================================================

/// Fuel grades the depot stocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FuelType {
    Diesel,
    Petrol,
}

impl FuelType {
    /// Canonical uppercase form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Diesel => "DIESEL",
            FuelType::Petrol => "PETROL",
        }
    }

    /// Parse operator input, case-insensitive.
    pub fn parse(input: &str) -> Result<Self, DepotError> {
        match input.trim().to_uppercase().as_str() {
            "DIESEL" => Ok(FuelType::Diesel),
            "PETROL" => Ok(FuelType::Petrol),
            other => Err(DepotError::InvalidInput(format!(
                "fuel type must be DIESEL or PETROL, got '{other}'"
            ))),
        }
    }

    /// Decode a value previously written by us.
    pub fn from_db(value: &str) -> Result<Self, DepotError> {
        match value {
            "DIESEL" => Ok(FuelType::Diesel),
            "PETROL" => Ok(FuelType::Petrol),
            other => Err(DepotError::Database(format!(
                "unexpected fuel_type in store: '{other}'"
            ))),
        }
    }
}

impl FromStr for FuelType {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FuelType::parse(s)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EntryType
// ============================================================================

/// Direction of a ledger entry.
///
/// CREDIT = entitlement gained (purchase).
/// DEBIT = entitlement consumed, recorded at collection-request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    Credit,
    Debit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Credit => "CREDIT",
            EntryType::Debit => "DEBIT",
        }
    }

    /// Parse operator input, case-insensitive.
    pub fn parse(input: &str) -> Result<Self, DepotError> {
        match input.trim().to_uppercase().as_str() {
            "CREDIT" => Ok(EntryType::Credit),
            "DEBIT" => Ok(EntryType::Debit),
            other => Err(DepotError::InvalidInput(format!(
                "entry type must be CREDIT or DEBIT, got '{other}'"
            ))),
        }
    }

    pub fn from_db(value: &str) -> Result<Self, DepotError> {
        match value {
            "CREDIT" => Ok(EntryType::Credit),
            "DEBIT" => Ok(EntryType::Debit),
            other => Err(DepotError::Database(format!(
                "unexpected entry_type in store: '{other}'"
            ))),
        }
    }
}

impl FromStr for EntryType {
    type Err = DepotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryType::parse(s)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// InvoiceStatus
// ============================================================================

/// Collection invoice lifecycle.
///
/// PENDING -> COLLECTED is the only legal transition; COLLECTED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceStatus {
    Pending,
    Collected,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::Collected => "COLLECTED",
        }
    }

    pub fn from_db(value: &str) -> Result<Self, DepotError> {
        match value {
            "PENDING" => Ok(InvoiceStatus::Pending),
            "COLLECTED" => Ok(InvoiceStatus::Collected),
            other => Err(DepotError::Database(format!(
                "unexpected invoice status in store: '{other}'"
            ))),
        }
    }

    /// Terminal states admit no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Collected)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Records
// ============================================================================

/// One purchase record. Immutable once created; the quantity withdrawn
/// against it is always derived from its withdrawal lines, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub fuel_type: FuelType,
    pub quantity_ordered: Decimal,
    pub order_date: NaiveDate,
}

/// One collection invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub invoice_id: InvoiceId,
    pub customer_id: CustomerId,
    pub fuel_type: FuelType,
    pub quantity_collected: Decimal,
    pub request_date: NaiveDate,
    pub status: InvoiceStatus,
}

/// One allocation line tying an invoice to the order it draws from.
/// Created atomically as a batch alongside its invoice; immutable after.
#[derive(Debug, Clone, PartialEq)]
pub struct Withdrawal {
    pub withdrawal_id: WithdrawalId,
    pub invoice_id: InvoiceId,
    pub order_id: OrderId,
    pub quantity_taken: Decimal,
}
