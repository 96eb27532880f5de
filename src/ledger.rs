//! Append-only transaction ledgers
//!
//! Two scopes share the same entry shape: the customer ledger (one row per
//! entitlement change, cascades with its customer) and the warehouse ledger
//! (depot-wide stock movements, no customer dimension). Entries are only
//! ever inserted; corrections are new entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

use crate::core_types::{CustomerId, EntryId};
use crate::customer::repository::ensure_exists;
use crate::db::{parse_decimal, Database};
use crate::error::{DepotError, Result};
use crate::models::{EntryType, FuelType};

// ============================================================================
// DateFilter
// ============================================================================

/// Date restriction on a ledger listing.
///
/// The operator supplies either one day or a (possibly half-open) range;
/// the store adapter translates it into the native query form. Asking for
/// both at once is `InvalidDateRange`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilter {
    On(NaiveDate),
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl DateFilter {
    /// Build a filter from raw operator input. `None` everywhere means
    /// no filter; malformed dates are `InvalidInput`.
    pub fn from_args(
        on: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Option<Self>> {
        if on.is_some() && (start.is_some() || end.is_some()) {
            return Err(DepotError::InvalidDateRange);
        }

        fn parse_iso(value: &str) -> Result<NaiveDate> {
            value.trim().parse::<NaiveDate>().map_err(|_| {
                DepotError::InvalidInput(format!("expected ISO-8601 date (YYYY-MM-DD), got '{value}'"))
            })
        }

        if let Some(on) = on {
            return Ok(Some(DateFilter::On(parse_iso(on)?)));
        }

        let start = start.map(parse_iso).transpose()?;
        let end = end.map(parse_iso).transpose()?;
        if start.is_none() && end.is_none() {
            return Ok(None);
        }
        Ok(Some(DateFilter::Range { start, end }))
    }

    /// Translate to a SQL predicate over `column` plus its bind values.
    pub(crate) fn sql(&self, column: &str) -> (String, Vec<String>) {
        match self {
            DateFilter::On(on) => (
                format!("date({column}) = date(?)"),
                vec![on.to_string()],
            ),
            DateFilter::Range {
                start: Some(start),
                end: Some(end),
            } => (
                format!("date({column}) BETWEEN date(?) AND date(?)"),
                vec![start.to_string(), end.to_string()],
            ),
            DateFilter::Range {
                start: Some(start),
                end: None,
            } => (
                format!("date({column}) >= date(?)"),
                vec![start.to_string()],
            ),
            DateFilter::Range {
                start: None,
                end: Some(end),
            } => (
                format!("date({column}) <= date(?)"),
                vec![end.to_string()],
            ),
            DateFilter::Range {
                start: None,
                end: None,
            } => (String::new(), Vec::new()),
        }
    }

    /// Whether `date` falls inside the filter window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            DateFilter::On(on) => date == *on,
            DateFilter::Range { start, end } => {
                start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
            }
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// One customer-scoped ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerLedgerEntry {
    pub entry_id: EntryId,
    pub customer_id: CustomerId,
    pub entry_type: EntryType,
    pub fuel_type: FuelType,
    pub liters: Decimal,
    pub created_at: String,
}

impl CustomerLedgerEntry {
    /// Signed contribution to the balance: credits add, debits subtract.
    pub fn delta(&self) -> Decimal {
        match self.entry_type {
            EntryType::Credit => self.liters,
            EntryType::Debit => -self.liters,
        }
    }
}

/// One warehouse-scoped ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct WarehouseLedgerEntry {
    pub entry_id: EntryId,
    pub entry_type: EntryType,
    pub fuel_type: FuelType,
    pub liters: Decimal,
    pub created_at: String,
}

impl WarehouseLedgerEntry {
    pub fn delta(&self) -> Decimal {
        match self.entry_type {
            EntryType::Credit => self.liters,
            EntryType::Debit => -self.liters,
        }
    }
}

fn check_liters(liters: Decimal) -> Result<()> {
    if liters < Decimal::ZERO {
        return Err(DepotError::InvalidInput(
            "liters must be >= 0".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// Customer ledger
// ============================================================================

/// Customer-scoped ledger repository
pub struct CustomerLedger;

impl CustomerLedger {
    /// Append an entry using an existing connection or transaction.
    ///
    /// The caller has already confirmed the customer exists.
    pub(crate) async fn record_in(
        conn: &mut SqliteConnection,
        customer_id: CustomerId,
        entry_type: EntryType,
        fuel_type: FuelType,
        liters: Decimal,
        recorded_on: Option<NaiveDate>,
    ) -> Result<EntryId> {
        check_liters(liters)?;

        let entry_id = match recorded_on {
            Some(date) => {
                sqlx::query_scalar::<_, i64>(
                    r#"INSERT INTO customer_ledger
                           (customer_id, entry_type, fuel_type, liters, created_at)
                       VALUES (?, ?, ?, ?, ?)
                       RETURNING entry_id"#,
                )
                .bind(customer_id)
                .bind(entry_type.as_str())
                .bind(fuel_type.as_str())
                .bind(liters.to_string())
                .bind(date.to_string())
                .fetch_one(&mut *conn)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"INSERT INTO customer_ledger
                           (customer_id, entry_type, fuel_type, liters)
                       VALUES (?, ?, ?, ?)
                       RETURNING entry_id"#,
                )
                .bind(customer_id)
                .bind(entry_type.as_str())
                .bind(fuel_type.as_str())
                .bind(liters.to_string())
                .fetch_one(&mut *conn)
                .await?
            }
        };

        Ok(entry_id)
    }

    /// Append an entry for a registered customer.
    pub async fn record(
        db: &Database,
        customer_id: CustomerId,
        entry_type: EntryType,
        fuel_type: FuelType,
        liters: Decimal,
        recorded_on: Option<NaiveDate>,
    ) -> Result<EntryId> {
        let mut conn = db.pool().acquire().await?;
        ensure_exists(&mut conn, customer_id).await?;
        Self::record_in(&mut conn, customer_id, entry_type, fuel_type, liters, recorded_on).await
    }

    /// List a customer's entries, oldest first, optionally restricted by
    /// fuel type and date window.
    pub async fn list(
        db: &Database,
        customer_id: CustomerId,
        fuel_type: Option<FuelType>,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<CustomerLedgerEntry>> {
        let mut where_parts = vec!["customer_id = ?".to_string()];
        let mut date_params: Vec<String> = Vec::new();

        if fuel_type.is_some() {
            where_parts.push("fuel_type = ?".to_string());
        }
        if let Some(filter) = filter {
            let (clause, params) = filter.sql("created_at");
            if !clause.is_empty() {
                where_parts.push(clause);
                date_params = params;
            }
        }

        let sql = format!(
            "SELECT entry_id, customer_id, entry_type, fuel_type, liters, created_at
             FROM customer_ledger WHERE {} ORDER BY entry_id",
            where_parts.join(" AND ")
        );

        let mut query = sqlx::query(&sql).bind(customer_id);
        if let Some(fuel_type) = fuel_type {
            query = query.bind(fuel_type.as_str());
        }
        for param in &date_params {
            query = query.bind(param.as_str());
        }

        let rows = query.fetch_all(db.pool()).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(CustomerLedgerEntry {
                entry_id: row.get("entry_id"),
                customer_id: row.get("customer_id"),
                entry_type: EntryType::from_db(row.get::<String, _>("entry_type").as_str())?,
                fuel_type: FuelType::from_db(row.get::<String, _>("fuel_type").as_str())?,
                liters: parse_decimal(row.get::<String, _>("liters").as_str(), "liters")?,
                created_at: row.get("created_at"),
            });
        }
        Ok(entries)
    }
}

// ============================================================================
// Warehouse ledger
// ============================================================================

/// Warehouse-scoped ledger repository
pub struct WarehouseLedger;

impl WarehouseLedger {
    /// Append a depot-wide stock movement.
    pub async fn record(
        db: &Database,
        entry_type: EntryType,
        fuel_type: FuelType,
        liters: Decimal,
        recorded_on: Option<NaiveDate>,
    ) -> Result<EntryId> {
        check_liters(liters)?;

        let entry_id = match recorded_on {
            Some(date) => {
                sqlx::query_scalar::<_, i64>(
                    r#"INSERT INTO warehouse_ledger (entry_type, fuel_type, liters, created_at)
                       VALUES (?, ?, ?, ?)
                       RETURNING entry_id"#,
                )
                .bind(entry_type.as_str())
                .bind(fuel_type.as_str())
                .bind(liters.to_string())
                .bind(date.to_string())
                .fetch_one(db.pool())
                .await?
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    r#"INSERT INTO warehouse_ledger (entry_type, fuel_type, liters)
                       VALUES (?, ?, ?)
                       RETURNING entry_id"#,
                )
                .bind(entry_type.as_str())
                .bind(fuel_type.as_str())
                .bind(liters.to_string())
                .fetch_one(db.pool())
                .await?
            }
        };

        Ok(entry_id)
    }

    /// List entries, oldest first, optionally restricted by fuel type and
    /// date window.
    pub async fn list(
        db: &Database,
        fuel_type: Option<FuelType>,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<WarehouseLedgerEntry>> {
        let mut where_parts: Vec<String> = Vec::new();
        let mut date_params: Vec<String> = Vec::new();

        if fuel_type.is_some() {
            where_parts.push("fuel_type = ?".to_string());
        }
        if let Some(filter) = filter {
            let (clause, params) = filter.sql("created_at");
            if !clause.is_empty() {
                where_parts.push(clause);
                date_params = params;
            }
        }

        let where_sql = if where_parts.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", where_parts.join(" AND "))
        };
        let sql = format!(
            "SELECT entry_id, entry_type, fuel_type, liters, created_at
             FROM warehouse_ledger {where_sql} ORDER BY entry_id"
        );

        let mut query = sqlx::query(&sql);
        if let Some(fuel_type) = fuel_type {
            query = query.bind(fuel_type.as_str());
        }
        for param in &date_params {
            query = query.bind(param.as_str());
        }

        let rows = query.fetch_all(db.pool()).await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(WarehouseLedgerEntry {
                entry_id: row.get("entry_id"),
                entry_type: EntryType::from_db(row.get::<String, _>("entry_type").as_str())?,
                fuel_type: FuelType::from_db(row.get::<String, _>("fuel_type").as_str())?,
                liters: parse_decimal(row.get::<String, _>("liters").as_str(), "liters")?,
                created_at: row.get("created_at"),
            });
        }
        Ok(entries)
    }
}
