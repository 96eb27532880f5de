//! fueldepot - Fuel Depot Entitlement Engine
//!
//! Tracks the fuel a depot owes its customers. Purchases build
//! entitlement, collection requests consume it against a FIFO queue of
//! outstanding orders, and a warehouse verification step gates the
//! physical release.
//!
//! # Modules
//!
//! - [`core_types`] - Core ID type aliases
//! - [`models`] - Domain records and closed enumerations
//! - [`error`] - Error taxonomy
//! - [`db`] - SQLite pool and schema
//! - [`customer`] - Customer registry
//! - [`orders`] - Order book (purchase records)
//! - [`allocator`] - FIFO allocation engine
//! - [`invoice`] - Invoice lifecycle (PENDING -> COLLECTED)
//! - [`ledger`] - Append-only customer/warehouse ledgers
//! - [`reconciler`] - Running balance reconstruction
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing setup
//! - [`cli`] / [`commands`] - Operator interface

// Core types - must be first!
pub mod core_types;

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

// Persistence
pub mod db;

// Depot components
pub mod allocator;
pub mod customer;
pub mod invoice;
pub mod ledger;
pub mod orders;
pub mod reconciler;

// Operator interface
pub mod cli;
pub mod commands;


// Convenient re-exports at crate root
pub use allocator::{AllocationOutcome, Allocator};
pub use core_types::{CustomerId, EntryId, InvoiceId, OrderId, WithdrawalId};
pub use customer::{Customer, CustomerRepository};
pub use db::Database;
pub use error::{DepotError, Result};
pub use invoice::{InvoiceLifecycle, VerifiedInvoice};
pub use ledger::{CustomerLedger, DateFilter, WarehouseLedger};
pub use models::{EntryType, FuelType, Invoice, InvoiceStatus, Order, Withdrawal};
pub use orders::{OrderBook, OutstandingOrder};
pub use reconciler::{LedgerRow, Reconciler};
