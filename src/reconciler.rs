//! Balance reconciler
//!
//! Rebuilds a customer's full running balance from the order book and the
//! invoice history for audit display. The final balance must always equal
//! the allocator's view of `available` for the same scope: every purchase
//! is a credit-equivalent event, every collection request a debit, and
//! the two histories never diverge.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::Row;

use crate::core_types::CustomerId;
use crate::customer::repository::ensure_exists;
use crate::db::{parse_date, parse_decimal, Database};
use crate::error::Result;
use crate::ledger::DateFilter;
use crate::models::{EntryType, FuelType};

/// One line of the audit ledger, with the balance after the event.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub event_date: NaiveDate,
    pub entry_type: EntryType,
    pub fuel_type: FuelType,
    /// `ORD#<id>` for purchases, `INV#<id>` for collection requests.
    pub reference: String,
    pub quantity: Decimal,
    pub balance: Decimal,
}

/// Balance reconciliation over the order/invoice history
pub struct Reconciler;

impl Reconciler {
    /// Full running balance for the scope, oldest event first.
    ///
    /// Events are sorted by date; ties keep purchases ahead of
    /// collections and otherwise fall back to insertion (id) order, so
    /// the output is stable across runs.
    pub async fn running_balance(
        db: &Database,
        customer_id: CustomerId,
        fuel_type: FuelType,
        filter: Option<&DateFilter>,
    ) -> Result<Vec<LedgerRow>> {
        let mut conn = db.pool().acquire().await?;
        ensure_exists(&mut conn, customer_id).await?;

        struct Event {
            date: NaiveDate,
            entry_type: EntryType,
            reference: String,
            quantity: Decimal,
        }

        let mut events: Vec<Event> = Vec::new();

        let (order_clause, order_params) = match filter {
            Some(filter) => {
                let (clause, params) = filter.sql("order_date");
                (format!(" AND {clause}"), params)
            }
            None => (String::new(), Vec::new()),
        };
        let sql = format!(
            "SELECT order_id, qty_ordered, order_date
             FROM fuel_orders
             WHERE customer_id = ? AND fuel_type = ?{order_clause}
             ORDER BY order_id"
        );
        let mut query = sqlx::query(&sql).bind(customer_id).bind(fuel_type.as_str());
        for param in &order_params {
            query = query.bind(param.as_str());
        }
        for row in query.fetch_all(&mut *conn).await? {
            events.push(Event {
                date: parse_date(row.get::<String, _>("order_date").as_str(), "order_date")?,
                entry_type: EntryType::Credit,
                reference: format!("ORD#{}", row.get::<i64, _>("order_id")),
                quantity: parse_decimal(
                    row.get::<String, _>("qty_ordered").as_str(),
                    "qty_ordered",
                )?,
            });
        }

        let (invoice_clause, invoice_params) = match filter {
            Some(filter) => {
                let (clause, params) = filter.sql("request_date");
                (format!(" AND {clause}"), params)
            }
            None => (String::new(), Vec::new()),
        };
        let sql = format!(
            "SELECT invoice_id, qty_collected, request_date
             FROM collection_invoices
             WHERE customer_id = ? AND fuel_type = ?{invoice_clause}
             ORDER BY invoice_id"
        );
        let mut query = sqlx::query(&sql).bind(customer_id).bind(fuel_type.as_str());
        for param in &invoice_params {
            query = query.bind(param.as_str());
        }
        for row in query.fetch_all(&mut *conn).await? {
            events.push(Event {
                date: parse_date(
                    row.get::<String, _>("request_date").as_str(),
                    "request_date",
                )?,
                entry_type: EntryType::Debit,
                reference: format!("INV#{}", row.get::<i64, _>("invoice_id")),
                quantity: parse_decimal(
                    row.get::<String, _>("qty_collected").as_str(),
                    "qty_collected",
                )?,
            });
        }

        // Stable sort: equal dates preserve the credit-then-debit, id-order
        // sequence built above.
        events.sort_by_key(|e| e.date);

        let mut balance = Decimal::ZERO;
        let rows = events
            .into_iter()
            .map(|e| {
                match e.entry_type {
                    EntryType::Credit => balance += e.quantity,
                    EntryType::Debit => balance -= e.quantity,
                }
                LedgerRow {
                    event_date: e.date,
                    entry_type: e.entry_type,
                    fuel_type,
                    reference: e.reference,
                    quantity: e.quantity,
                    balance,
                }
            })
            .collect();

        Ok(rows)
    }

    /// Balance after the last event, zero for an empty history.
    pub fn final_balance(rows: &[LedgerRow]) -> Decimal {
        rows.last().map(|r| r.balance).unwrap_or(Decimal::ZERO)
    }
}
