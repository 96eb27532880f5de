//! Customer registry
//!
//! SQLite-backed storage for the customers the depot owes fuel to.
//! Removing a customer cascades to their ledger entries.

pub mod models;
pub mod repository;

// Re-export commonly used types
pub use models::{Customer, CustomerPatch};
pub use repository::CustomerRepository;
