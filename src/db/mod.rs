//! Database connection management
//!
//! SQLite-backed persistence. Quantities are stored as TEXT and
//! reconstructed as `Decimal` when rows are mapped; dates are ISO-8601
//! TEXT columns compared with SQLite's `date()`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::error::DepotError;

/// Idempotent schema, applied at startup.
///
/// `withdrawals` references both its invoice and the order it draws from;
/// `customer_ledger` cascades when its customer is removed.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS customers (
        customer_id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT,
        phone TEXT,
        address TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_customers_email ON customers(email)",
    "CREATE TABLE IF NOT EXISTS fuel_orders (
        order_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL,
        fuel_type TEXT NOT NULL,
        qty_ordered TEXT NOT NULL,
        order_date TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_fuel_orders_scope
        ON fuel_orders(customer_id, fuel_type)",
    "CREATE TABLE IF NOT EXISTS collection_invoices (
        invoice_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL,
        fuel_type TEXT NOT NULL,
        qty_collected TEXT NOT NULL,
        request_date TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'PENDING'
            CHECK (status IN ('PENDING','COLLECTED'))
    )",
    "CREATE TABLE IF NOT EXISTS withdrawals (
        withdrawal_id INTEGER PRIMARY KEY AUTOINCREMENT,
        invoice_id INTEGER NOT NULL,
        order_id INTEGER NOT NULL,
        qty_taken TEXT NOT NULL,
        FOREIGN KEY (invoice_id) REFERENCES collection_invoices(invoice_id),
        FOREIGN KEY (order_id) REFERENCES fuel_orders(order_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_withdrawals_order ON withdrawals(order_id)",
    "CREATE TABLE IF NOT EXISTS customer_ledger (
        entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id INTEGER NOT NULL,
        entry_type TEXT NOT NULL CHECK (entry_type IN ('DEBIT','CREDIT')),
        fuel_type TEXT NOT NULL,
        liters TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY (customer_id) REFERENCES customers(customer_id)
            ON DELETE CASCADE
    )",
    "CREATE INDEX IF NOT EXISTS idx_customer_ledger_customer
        ON customer_ledger(customer_id)",
    "CREATE TABLE IF NOT EXISTS warehouse_ledger (
        entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry_type TEXT NOT NULL CHECK (entry_type IN ('DEBIT','CREDIT')),
        fuel_type TEXT NOT NULL,
        liters TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )",
    "CREATE INDEX IF NOT EXISTS idx_warehouse_ledger_fuel
        ON warehouse_ledger(fuel_type)",
];

/// SQLite database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file and establish a connection pool.
    ///
    /// Foreign keys are enforced on every connection.
    pub async fn connect(path: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        tracing::info!(path, "SQLite connection pool established");
        Ok(Self { pool })
    }

    /// In-memory database for tests.
    ///
    /// Capped at one connection: each SQLite `:memory:` connection is its
    /// own database, so a wider pool would lose the schema.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply the schema. Safe to run on every startup.
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("schema initialized");
        Ok(())
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Reconstruct a `Decimal` from a TEXT column.
pub(crate) fn parse_decimal(value: &str, column: &str) -> Result<Decimal, DepotError> {
    value.trim().parse::<Decimal>().map_err(|_| {
        DepotError::Database(format!("invalid decimal in column '{column}': '{value}'"))
    })
}

/// Reconstruct a `NaiveDate` from an ISO-8601 TEXT column.
pub(crate) fn parse_date(value: &str, column: &str) -> Result<NaiveDate, DepotError> {
    NaiveDate::from_str(value.trim())
        .map_err(|_| DepotError::Database(format!("invalid date in column '{column}': '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_and_health() {
        let db = Database::in_memory().await.expect("open in-memory db");
        db.init_schema().await.expect("apply schema");
        db.health_check().await.expect("health check");
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        db.init_schema().await.expect("second run must not fail");
    }

    #[tokio::test]
    async fn test_connect_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot.db");
        let db = Database::connect(path.to_str().unwrap()).await.unwrap();
        db.init_schema().await.unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(
            parse_decimal("50.5", "qty").unwrap(),
            "50.5".parse::<Decimal>().unwrap()
        );
        assert!(parse_decimal("fifty", "qty").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-01-10", "order_date").is_ok());
        assert!(parse_date("10/01/2025", "order_date").is_err());
    }
}
