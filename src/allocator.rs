//! FIFO allocator
//!
//! Satisfies a collection request by drawing down the customer's oldest
//! outstanding orders first. A successful allocation writes the invoice,
//! its withdrawal lines and the DEBIT ledger entry in one transaction;
//! a failed one writes nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core_types::CustomerId;
use crate::customer::repository::ensure_exists;
use crate::db::Database;
use crate::error::{DepotError, Result};
use crate::ledger::CustomerLedger;
use crate::models::{EntryType, FuelType, Invoice, InvoiceStatus, Withdrawal};
use crate::orders::{OrderBook, OutstandingOrder};

/// Result of a successful allocation: the PENDING invoice and the
/// per-order withdrawal lines that back it.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub invoice: Invoice,
    pub withdrawals: Vec<Withdrawal>,
}

/// Sum of the positive remainders across the scope's orders.
fn available_of(orders: &[OutstandingOrder]) -> Decimal {
    orders
        .iter()
        .map(|o| o.remaining().max(Decimal::ZERO))
        .sum()
}

/// The FIFO allocation engine
pub struct Allocator;

impl Allocator {
    /// Reserve `requested` liters for collection.
    ///
    /// Entitlement is consumed now, at request time; the warehouse
    /// verification step only gates the physical release. The whole
    /// read-compute-write sequence runs inside one transaction, so two
    /// concurrent requests cannot both spend the same remainder.
    pub async fn allocate(
        db: &Database,
        customer_id: CustomerId,
        fuel_type: FuelType,
        requested: Decimal,
        request_date: NaiveDate,
    ) -> Result<AllocationOutcome> {
        if requested <= Decimal::ZERO {
            return Err(DepotError::InvalidQuantity);
        }

        let mut tx = db.pool().begin().await?;
        ensure_exists(&mut tx, customer_id).await?;

        let orders = OrderBook::outstanding_in(&mut tx, customer_id, fuel_type).await?;
        let available = available_of(&orders);

        if requested > available {
            // Dropping the transaction rolls back; no rows were written.
            return Err(DepotError::InsufficientBalance {
                requested,
                available,
            });
        }

        let invoice_id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO collection_invoices
                   (customer_id, fuel_type, qty_collected, request_date, status)
               VALUES (?, ?, ?, ?, 'PENDING')
               RETURNING invoice_id"#,
        )
        .bind(customer_id)
        .bind(fuel_type.as_str())
        .bind(requested.to_string())
        .bind(request_date.to_string())
        .fetch_one(&mut *tx)
        .await?;

        let mut withdrawals = Vec::new();
        let mut qty_left = requested;
        for outstanding in &orders {
            if qty_left == Decimal::ZERO {
                break;
            }
            let remaining = outstanding.remaining();
            if remaining <= Decimal::ZERO {
                continue;
            }
            let take = remaining.min(qty_left);

            let withdrawal_id = sqlx::query_scalar::<_, i64>(
                r#"INSERT INTO withdrawals (invoice_id, order_id, qty_taken)
                   VALUES (?, ?, ?)
                   RETURNING withdrawal_id"#,
            )
            .bind(invoice_id)
            .bind(outstanding.order.order_id)
            .bind(take.to_string())
            .fetch_one(&mut *tx)
            .await?;

            withdrawals.push(Withdrawal {
                withdrawal_id,
                invoice_id,
                order_id: outstanding.order.order_id,
                quantity_taken: take,
            });
            qty_left -= take;
        }

        CustomerLedger::record_in(
            &mut tx,
            customer_id,
            EntryType::Debit,
            fuel_type,
            requested,
            Some(request_date),
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            invoice_id,
            customer_id,
            %fuel_type,
            %requested,
            lines = withdrawals.len(),
            "collection request allocated"
        );

        Ok(AllocationOutcome {
            invoice: Invoice {
                invoice_id,
                customer_id,
                fuel_type,
                quantity_collected: requested,
                request_date,
                status: InvoiceStatus::Pending,
            },
            withdrawals,
        })
    }

    /// Current collectable balance for the scope.
    ///
    /// Always derived from the order book, the same way `allocate` sees
    /// it; the reconciler's ledger must agree with this number.
    pub async fn available(
        db: &Database,
        customer_id: CustomerId,
        fuel_type: FuelType,
    ) -> Result<Decimal> {
        let mut conn = db.pool().acquire().await?;
        ensure_exists(&mut conn, customer_id).await?;
        let orders = OrderBook::outstanding_in(&mut conn, customer_id, fuel_type).await?;
        Ok(available_of(&orders))
    }
}
