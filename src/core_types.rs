//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

/// Customer ID - surrogate key assigned by the store.
///
/// # Constraints:
/// - **Immutable**: Once assigned, NEVER changes
/// - **Sequential**: SQLite AUTOINCREMENT, never reused
pub type CustomerId = i64;

/// Order ID - identifies one purchase record.
///
/// Ascending order IDs define FIFO consumption order: the lowest
/// outstanding ID is always drawn down first.
pub type OrderId = i64;

/// Invoice ID - identifies one collection invoice.
pub type InvoiceId = i64;

/// Withdrawal ID - identifies one allocation line.
pub type WithdrawalId = i64;

/// Ledger entry ID - identifies one append-only ledger row.
pub type EntryId = i64;
