//! Order book - outstanding purchase records
//!
//! A purchase creates one immutable order row and the matching CREDIT
//! ledger entry in a single transaction. How much of an order has been
//! drawn down is always recomputed from its withdrawal lines.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use std::collections::HashMap;

use crate::core_types::{CustomerId, OrderId};
use crate::customer::repository::ensure_exists;
use crate::db::{parse_date, parse_decimal, Database};
use crate::error::{DepotError, Result};
use crate::ledger::CustomerLedger;
use crate::models::{EntryType, FuelType, Order};

/// An order plus the quantity already withdrawn against it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutstandingOrder {
    pub order: Order,
    pub withdrawn: Decimal,
}

impl OutstandingOrder {
    /// Quantity still collectable from this order.
    pub fn remaining(&self) -> Decimal {
        self.order.quantity_ordered - self.withdrawn
    }
}

/// Order book repository
pub struct OrderBook;

impl OrderBook {
    /// Record a purchase: one order row plus its CREDIT ledger entry,
    /// atomically.
    pub async fn record_purchase(
        db: &Database,
        customer_id: CustomerId,
        fuel_type: FuelType,
        quantity: Decimal,
        order_date: NaiveDate,
    ) -> Result<OrderId> {
        if quantity <= Decimal::ZERO {
            return Err(DepotError::InvalidQuantity);
        }

        let mut tx = db.pool().begin().await?;
        ensure_exists(&mut tx, customer_id).await?;

        let order_id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO fuel_orders (customer_id, fuel_type, qty_ordered, order_date)
               VALUES (?, ?, ?, ?)
               RETURNING order_id"#,
        )
        .bind(customer_id)
        .bind(fuel_type.as_str())
        .bind(quantity.to_string())
        .bind(order_date.to_string())
        .fetch_one(&mut *tx)
        .await?;

        CustomerLedger::record_in(
            &mut tx,
            customer_id,
            EntryType::Credit,
            fuel_type,
            quantity,
            Some(order_date),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(order_id, customer_id, %fuel_type, %quantity, "purchase recorded");
        Ok(order_id)
    }

    /// Load the scope's orders in FIFO order (`order_id` ascending), each
    /// paired with its withdrawn-so-far sum.
    ///
    /// Sums are accumulated as `Decimal` here rather than in SQL, where
    /// the TEXT-stored quantities would be coerced to floats.
    pub(crate) async fn outstanding_in(
        conn: &mut SqliteConnection,
        customer_id: CustomerId,
        fuel_type: FuelType,
    ) -> Result<Vec<OutstandingOrder>> {
        let order_rows = sqlx::query(
            r#"SELECT order_id, customer_id, fuel_type, qty_ordered, order_date
               FROM fuel_orders
               WHERE customer_id = ? AND fuel_type = ?
               ORDER BY order_id"#,
        )
        .bind(customer_id)
        .bind(fuel_type.as_str())
        .fetch_all(&mut *conn)
        .await?;

        let withdrawal_rows = sqlx::query(
            r#"SELECT w.order_id, w.qty_taken
               FROM withdrawals w
               JOIN fuel_orders o ON o.order_id = w.order_id
               WHERE o.customer_id = ? AND o.fuel_type = ?"#,
        )
        .bind(customer_id)
        .bind(fuel_type.as_str())
        .fetch_all(&mut *conn)
        .await?;

        let mut withdrawn: HashMap<OrderId, Decimal> = HashMap::new();
        for row in withdrawal_rows {
            let order_id: OrderId = row.get("order_id");
            let taken = parse_decimal(row.get::<String, _>("qty_taken").as_str(), "qty_taken")?;
            *withdrawn.entry(order_id).or_insert(Decimal::ZERO) += taken;
        }

        let mut orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let order_id: OrderId = row.get("order_id");
            orders.push(OutstandingOrder {
                order: Order {
                    order_id,
                    customer_id: row.get("customer_id"),
                    fuel_type: FuelType::from_db(row.get::<String, _>("fuel_type").as_str())?,
                    quantity_ordered: parse_decimal(
                        row.get::<String, _>("qty_ordered").as_str(),
                        "qty_ordered",
                    )?,
                    order_date: parse_date(
                        row.get::<String, _>("order_date").as_str(),
                        "order_date",
                    )?,
                },
                withdrawn: withdrawn.get(&order_id).copied().unwrap_or(Decimal::ZERO),
            });
        }
        Ok(orders)
    }

    /// Pool-level variant of [`Self::outstanding_in`].
    pub async fn outstanding(
        db: &Database,
        customer_id: CustomerId,
        fuel_type: FuelType,
    ) -> Result<Vec<OutstandingOrder>> {
        let mut conn = db.pool().acquire().await?;
        Self::outstanding_in(&mut conn, customer_id, fuel_type).await
    }
}
