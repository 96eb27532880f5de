//! End-to-end QA scenarios against a file-backed store, through the
//! crate's public API only.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use fueldepot::{
    Allocator, CustomerRepository, Database, FuelType, InvoiceLifecycle, InvoiceStatus, OrderBook,
    Reconciler,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

async fn file_backed_db(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("qa_depot.db");
    let db = Database::connect(path.to_str().unwrap()).await.unwrap();
    db.init_schema().await.unwrap();
    db
}

#[tokio::test]
async fn qa_tc_full_lifecycle_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let invoice_id;
    let customer;
    {
        let db = file_backed_db(&dir).await;
        customer = CustomerRepository::create(&db, "QA Haulage", None, None, None)
            .await
            .unwrap();
        OrderBook::record_purchase(&db, customer, FuelType::Diesel, Decimal::from(50), date("2025-05-01"))
            .await
            .unwrap();
        OrderBook::record_purchase(&db, customer, FuelType::Diesel, Decimal::from(30), date("2025-05-02"))
            .await
            .unwrap();

        let outcome =
            Allocator::allocate(&db, customer, FuelType::Diesel, Decimal::from(60), date("2025-05-03"))
                .await
                .unwrap();
        invoice_id = outcome.invoice.invoice_id;
    }

    // Reopen the same file: state is durable, the invoice is still pending.
    let db = file_backed_db(&dir).await;
    let invoice = InvoiceLifecycle::get(&db, invoice_id).await.unwrap().unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);

    let verified = InvoiceLifecycle::verify(&db, invoice_id, customer).await.unwrap();
    assert_eq!(verified.quantity, Decimal::from(60));

    InvoiceLifecycle::confirm_release(&db, invoice_id).await.unwrap();
    let err = InvoiceLifecycle::confirm_release(&db, invoice_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ALREADY_COLLECTED");

    let rows = Reconciler::running_balance(&db, customer, FuelType::Diesel, None)
        .await
        .unwrap();
    assert_eq!(Reconciler::final_balance(&rows), Decimal::from(20));
}

#[tokio::test]
async fn qa_tc_identity_gate_blocks_wrong_customer() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_backed_db(&dir).await;

    let owner = CustomerRepository::create(&db, "Owner", None, None, None)
        .await
        .unwrap();
    let imposter = CustomerRepository::create(&db, "Imposter", None, None, None)
        .await
        .unwrap();

    OrderBook::record_purchase(&db, owner, FuelType::Petrol, Decimal::from(25), date("2025-05-01"))
        .await
        .unwrap();
    let outcome = Allocator::allocate(&db, owner, FuelType::Petrol, Decimal::from(25), date("2025-05-02"))
        .await
        .unwrap();

    let err = InvoiceLifecycle::verify(&db, outcome.invoice.invoice_id, imposter)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CUSTOMER_MISMATCH");

    // The failed verification changed nothing; the owner can still release.
    let invoice = InvoiceLifecycle::get(&db, outcome.invoice.invoice_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    InvoiceLifecycle::verify(&db, outcome.invoice.invoice_id, owner)
        .await
        .unwrap();
    InvoiceLifecycle::confirm_release(&db, outcome.invoice.invoice_id)
        .await
        .unwrap();
}
