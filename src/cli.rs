use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::core_types::{CustomerId, InvoiceId};
use crate::models::{EntryType, FuelType};

#[derive(Parser)]
#[command(
    name = "fueldepot",
    about = "Fuel depot entitlement tracking and collection invoicing",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration environment (reads config/<env>.yaml)
    #[arg(long, global = true, default_value = "dev")]
    pub env: String,
}

#[derive(Subcommand)]
pub enum Command {
    /// Record a fuel purchase for a customer
    Purchase(PurchaseArgs),
    /// Request a collection: allocates FIFO and issues a PENDING invoice
    Collect(CollectArgs),
    /// Warehouse verification of a collection invoice
    Verify(VerifyArgs),
    /// Confirm physical release of a verified invoice
    Release(ReleaseArgs),
    /// Show a customer's running ledger and final balance
    Ledger(LedgerArgs),
    /// Show the warehouse stock ledger
    WarehouseLedger(WarehouseLedgerArgs),
    /// Record a warehouse stock movement
    WarehouseRecord(WarehouseRecordArgs),
    /// Manage customers
    Customer(CustomerArgs),
}

#[derive(Args)]
pub struct PurchaseArgs {
    #[arg(long)]
    pub customer: CustomerId,
    /// DIESEL or PETROL (case-insensitive)
    #[arg(long)]
    pub fuel: FuelType,
    /// Liters purchased
    #[arg(long)]
    pub qty: Decimal,
    /// Purchase date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct CollectArgs {
    #[arg(long)]
    pub customer: CustomerId,
    #[arg(long)]
    pub fuel: FuelType,
    /// Liters to collect
    #[arg(long)]
    pub qty: Decimal,
    /// Request date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[arg(long)]
    pub invoice: InvoiceId,
    /// Customer ID presented at the warehouse
    #[arg(long)]
    pub customer: CustomerId,
}

#[derive(Args)]
pub struct ReleaseArgs {
    #[arg(long)]
    pub invoice: InvoiceId,
}

#[derive(Args)]
pub struct LedgerArgs {
    #[arg(long)]
    pub customer: CustomerId,
    #[arg(long)]
    pub fuel: FuelType,
    /// Restrict to a single day (YYYY-MM-DD)
    #[arg(long)]
    pub on: Option<String>,
    /// Range start (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<String>,
    /// Range end (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args)]
pub struct WarehouseLedgerArgs {
    #[arg(long)]
    pub fuel: Option<FuelType>,
    /// Restrict to a single day (YYYY-MM-DD)
    #[arg(long)]
    pub on: Option<String>,
    /// Range start (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<String>,
    /// Range end (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Args)]
pub struct WarehouseRecordArgs {
    /// CREDIT or DEBIT (case-insensitive)
    #[arg(long = "type")]
    pub entry_type: EntryType,
    #[arg(long)]
    pub fuel: FuelType,
    /// Liters moved (>= 0)
    #[arg(long)]
    pub qty: Decimal,
    /// Entry date (YYYY-MM-DD), defaults to now
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct CustomerArgs {
    #[command(subcommand)]
    pub command: CustomerCommand,
}

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Register a new customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Show a customer record
    Show {
        customer_id: CustomerId,
    },
    /// Update customer fields (omitted fields are left untouched)
    Update {
        customer_id: CustomerId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Remove a customer and their ledger entries
    Remove {
        customer_id: CustomerId,
    },
}
