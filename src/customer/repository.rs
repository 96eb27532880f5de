//! Repository layer for customer records

use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

use super::models::{Customer, CustomerPatch};
use crate::core_types::CustomerId;
use crate::db::Database;
use crate::error::{DepotError, Result};

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let v = v.trim().to_string();
        if v.is_empty() { None } else { Some(v) }
    })
}

/// Customer repository for CRUD operations
pub struct CustomerRepository;

impl CustomerRepository {
    /// Register a new customer.
    ///
    /// A duplicate email surfaces as `UniqueConstraintViolation`.
    pub async fn create(
        db: &Database,
        name: &str,
        email: Option<String>,
        phone: Option<String>,
        address: Option<String>,
    ) -> Result<CustomerId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DepotError::InvalidInput("name is required".to_string()));
        }

        let customer_id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO customers (name, email, phone, address)
               VALUES (?, ?, ?, ?)
               RETURNING customer_id"#,
        )
        .bind(name)
        .bind(none_if_blank(email))
        .bind(none_if_blank(phone))
        .bind(none_if_blank(address))
        .fetch_one(db.pool())
        .await?;

        tracing::info!(customer_id, "customer registered");
        Ok(customer_id)
    }

    /// Get customer by ID
    pub async fn get_by_id(db: &Database, customer_id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"SELECT customer_id, name, email, phone, address, created_at
               FROM customers WHERE customer_id = ?"#,
        )
        .bind(customer_id)
        .fetch_optional(db.pool())
        .await?;

        Ok(row.map(|r| Customer {
            customer_id: r.get("customer_id"),
            name: r.get("name"),
            email: r.get("email"),
            phone: r.get("phone"),
            address: r.get("address"),
            created_at: r.get("created_at"),
        }))
    }

    /// Apply a partial update. An empty patch is a no-op.
    pub async fn update(db: &Database, customer_id: CustomerId, patch: CustomerPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut tx = db.pool().begin().await?;

        let current = sqlx::query(
            r#"SELECT customer_id, name, email, phone, address, created_at
               FROM customers WHERE customer_id = ?"#,
        )
        .bind(customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DepotError::CustomerNotFound(customer_id))?;

        let name = match patch.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(DepotError::InvalidInput("name is required".to_string()));
                }
                name
            }
            None => current.get("name"),
        };
        let email = match patch.email {
            Some(email) => none_if_blank(Some(email)),
            None => current.get("email"),
        };
        let phone = match patch.phone {
            Some(phone) => none_if_blank(Some(phone)),
            None => current.get("phone"),
        };
        let address = match patch.address {
            Some(address) => none_if_blank(Some(address)),
            None => current.get("address"),
        };

        sqlx::query(
            r#"UPDATE customers
               SET name = ?, email = ?, phone = ?, address = ?
               WHERE customer_id = ?"#,
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(customer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove a customer. Their ledger entries go with them (cascade).
    pub async fn delete(db: &Database, customer_id: CustomerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = ?")
            .bind(customer_id)
            .execute(db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DepotError::CustomerNotFound(customer_id));
        }

        tracing::info!(customer_id, "customer removed");
        Ok(())
    }
}

/// Fail with `CustomerNotFound` unless the customer is registered.
pub(crate) async fn ensure_exists(
    conn: &mut SqliteConnection,
    customer_id: CustomerId,
) -> Result<()> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT customer_id FROM customers WHERE customer_id = ?",
    )
    .bind(customer_id)
    .fetch_optional(&mut *conn)
    .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DepotError::CustomerNotFound(customer_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = test_db().await;

        let id = CustomerRepository::create(
            &db,
            "Apex Haulage",
            Some("ops@apex.example".to_string()),
            None,
            None,
        )
        .await
        .unwrap();

        let customer = CustomerRepository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(customer.name, "Apex Haulage");
        assert_eq!(customer.email.as_deref(), Some("ops@apex.example"));
        assert!(customer.phone.is_none());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = test_db().await;
        let err = CustomerRepository::create(&db, "   ", None, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let email = Some("same@depot.example".to_string());

        let first = CustomerRepository::create(&db, "First", email.clone(), None, None)
            .await
            .unwrap();

        let err = CustomerRepository::create(&db, "Second", email, None, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "UNIQUE_CONSTRAINT_VIOLATION");

        // The first row is unaffected.
        let kept = CustomerRepository::get_by_id(&db, first).await.unwrap();
        assert!(kept.is_some());
    }

    #[tokio::test]
    async fn test_update_patch() {
        let db = test_db().await;
        let id = CustomerRepository::create(&db, "Old Name", None, None, None)
            .await
            .unwrap();

        CustomerRepository::update(
            &db,
            id,
            CustomerPatch {
                name: Some("New Name".to_string()),
                phone: Some("555-0100".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let customer = CustomerRepository::get_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(customer.name, "New Name");
        assert_eq!(customer.phone.as_deref(), Some("555-0100"));

        // Empty patch is a no-op.
        CustomerRepository::update(&db, id, CustomerPatch::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_missing_customer() {
        let db = test_db().await;
        let err = CustomerRepository::delete(&db, 999).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
