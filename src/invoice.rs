//! Invoice lifecycle manager
//!
//! A collection invoice starts PENDING and can only ever move to
//! COLLECTED. `verify` is the warehouse-side identity and state check and
//! never mutates; `confirm_release` performs the transition as a single
//! compare-and-swap UPDATE, so a second release attempt cannot slip
//! through between check and act.

use sqlx::Row;

use crate::core_types::{CustomerId, InvoiceId};
use crate::db::{parse_date, parse_decimal, Database};
use crate::error::{DepotError, Result};
use crate::models::{FuelType, Invoice, InvoiceStatus};

/// What the warehouse operator sees after a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedInvoice {
    pub invoice_id: InvoiceId,
    pub customer_id: CustomerId,
    pub fuel_type: FuelType,
    pub quantity: rust_decimal::Decimal,
    pub request_date: chrono::NaiveDate,
}

/// Invoice lifecycle operations
pub struct InvoiceLifecycle;

impl InvoiceLifecycle {
    /// Fetch an invoice by ID.
    pub async fn get(db: &Database, invoice_id: InvoiceId) -> Result<Option<Invoice>> {
        let row = sqlx::query(
            r#"SELECT invoice_id, customer_id, fuel_type, qty_collected, request_date, status
               FROM collection_invoices
               WHERE invoice_id = ?"#,
        )
        .bind(invoice_id)
        .fetch_optional(db.pool())
        .await?;

        match row {
            Some(row) => Ok(Some(Invoice {
                invoice_id: row.get("invoice_id"),
                customer_id: row.get("customer_id"),
                fuel_type: FuelType::from_db(row.get::<String, _>("fuel_type").as_str())?,
                quantity_collected: parse_decimal(
                    row.get::<String, _>("qty_collected").as_str(),
                    "qty_collected",
                )?,
                request_date: parse_date(
                    row.get::<String, _>("request_date").as_str(),
                    "request_date",
                )?,
                status: InvoiceStatus::from_db(row.get::<String, _>("status").as_str())?,
            })),
            None => Ok(None),
        }
    }

    /// Warehouse verification: identity and state checks, in that order,
    /// with no side effects on failure.
    pub async fn verify(
        db: &Database,
        invoice_id: InvoiceId,
        presented_customer_id: CustomerId,
    ) -> Result<VerifiedInvoice> {
        let invoice = Self::get(db, invoice_id)
            .await?
            .ok_or(DepotError::InvoiceNotFound(invoice_id))?;

        if invoice.status.is_terminal() {
            return Err(DepotError::AlreadyCollected(invoice_id));
        }
        if invoice.customer_id != presented_customer_id {
            return Err(DepotError::CustomerMismatch);
        }

        Ok(VerifiedInvoice {
            invoice_id: invoice.invoice_id,
            customer_id: invoice.customer_id,
            fuel_type: invoice.fuel_type,
            quantity: invoice.quantity_collected,
            request_date: invoice.request_date,
        })
    }

    /// Release the fuel: PENDING -> COLLECTED.
    ///
    /// The UPDATE re-checks the status in its own WHERE clause; zero rows
    /// affected means the invoice was missing or already collected, which
    /// a re-read distinguishes. Running this twice never releases twice.
    pub async fn confirm_release(db: &Database, invoice_id: InvoiceId) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE collection_invoices
               SET status = 'COLLECTED'
               WHERE invoice_id = ? AND status = 'PENDING'"#,
        )
        .bind(invoice_id)
        .execute(db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return match Self::get(db, invoice_id).await? {
                None => Err(DepotError::InvoiceNotFound(invoice_id)),
                Some(invoice) if invoice.status.is_terminal() => {
                    Err(DepotError::AlreadyCollected(invoice_id))
                }
                Some(_) => Err(DepotError::Database(format!(
                    "invoice {invoice_id} in unexpected state after release attempt"
                ))),
            };
        }

        tracing::info!(invoice_id, "fuel released, invoice collected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Allocator;
    use crate::customer::CustomerRepository;
    use crate::orders::OrderBook;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn db_with_pending_invoice() -> (Database, i64, i64) {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        let customer = CustomerRepository::create(&db, "Invoice Test", None, None, None)
            .await
            .unwrap();
        OrderBook::record_purchase(&db, customer, FuelType::Diesel, Decimal::from(80), date("2025-01-10"))
            .await
            .unwrap();
        let outcome = Allocator::allocate(&db, customer, FuelType::Diesel, Decimal::from(60), date("2025-01-11"))
            .await
            .unwrap();
        (db, customer, outcome.invoice.invoice_id)
    }

    #[tokio::test]
    async fn test_verify_happy_path_is_read_only() {
        let (db, customer, invoice_id) = db_with_pending_invoice().await;

        let verified = InvoiceLifecycle::verify(&db, invoice_id, customer).await.unwrap();
        assert_eq!(verified.fuel_type, FuelType::Diesel);
        assert_eq!(verified.quantity, Decimal::from(60));

        // Still pending; verification does not release.
        let invoice = InvoiceLifecycle::get(&db, invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_verify_unknown_invoice() {
        let (db, customer, _) = db_with_pending_invoice().await;
        let err = InvoiceLifecycle::verify(&db, 999, customer).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_verify_wrong_customer_never_transitions() {
        let (db, customer, invoice_id) = db_with_pending_invoice().await;

        let err = InvoiceLifecycle::verify(&db, invoice_id, customer + 1)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "CUSTOMER_MISMATCH");

        let invoice = InvoiceLifecycle::get(&db, invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirm_release_then_double_release() {
        let (db, customer, invoice_id) = db_with_pending_invoice().await;

        InvoiceLifecycle::confirm_release(&db, invoice_id).await.unwrap();
        let invoice = InvoiceLifecycle::get(&db, invoice_id).await.unwrap().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Collected);

        let err = InvoiceLifecycle::confirm_release(&db, invoice_id)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ALREADY_COLLECTED");

        // A collected invoice also fails re-verification.
        let err = InvoiceLifecycle::verify(&db, invoice_id, customer).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_COLLECTED");
    }

    #[tokio::test]
    async fn test_confirm_release_unknown_invoice() {
        let (db, _, _) = db_with_pending_invoice().await;
        let err = InvoiceLifecycle::confirm_release(&db, 999).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_already_collected_checked_before_identity() {
        let (db, _, invoice_id) = db_with_pending_invoice().await;
        InvoiceLifecycle::confirm_release(&db, invoice_id).await.unwrap();

        // Wrong customer AND collected: the state check wins.
        let err = InvoiceLifecycle::verify(&db, invoice_id, 424242).await.unwrap_err();
        assert_eq!(err.code(), "ALREADY_COLLECTED");
    }
}
