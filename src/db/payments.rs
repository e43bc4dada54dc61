// src/db/payments.rs

use sqlx::{FromRow, PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::models::{ListingRef, Payment, PaymentMethod, PaymentStatus, PaymentWithOwner, UserSummary};

#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub target: ListingRef,
    pub method: PaymentMethod,
    pub transaction_id: String,
    pub amount: f64,
    pub screenshot: String,
}

pub async fn insert(pool: &PgPool, payment: &NewPayment) -> Result<Payment, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        r#"INSERT INTO payments
               (order_type, order_id, method, transaction_id, amount, status, screenshot)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING *"#,
    )
    .bind(payment.target.kind().as_str())
    .bind(payment.target.id())
    .bind(payment.method.as_str())
    .bind(&payment.transaction_id)
    .bind(payment.amount)
    .bind(PaymentStatus::Pending.as_str())
    .bind(&payment.screenshot)
    .fetch_one(pool)
    .await
}

/// All payments, newest first, each with the owner of the listing it points at.
pub async fn list_with_owner(pool: &PgPool) -> Result<Vec<PaymentWithOwner>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT p.*,
                  u.id    AS owner_id,
                  u.name  AS owner_name,
                  u.email AS owner_email
           FROM payments p
           LEFT JOIN orders o      ON p.order_type = 'order'     AND o.id = p.order_id
           LEFT JOIN send_orders s ON p.order_type = 'sendOrder' AND s.id = p.order_id
           LEFT JOIN trips t       ON p.order_type = 'trip'      AND t.id = p.order_id
           LEFT JOIN users u       ON u.id = COALESCE(o.user_id, s.user_id, t.user_id)
           ORDER BY p.created_at DESC"#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|r| -> Result<PaymentWithOwner, sqlx::Error> {
            let owner_id: Option<Uuid> = r.try_get("owner_id")?;
            let user = match owner_id {
                Some(id) => Some(UserSummary {
                    id,
                    name: r.try_get("owner_name")?,
                    email: r.try_get("owner_email")?,
                }),
                None => None,
            };
            Ok(PaymentWithOwner {
                payment: Payment::from_row(r)?,
                user,
            })
        })
        .collect()
}

/// Payments of any type whose `order_id` is the given listing id.
pub async fn list_for_listing(pool: &PgPool, order_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
    sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at DESC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

/// Row-locks the payment until the surrounding transaction ends.
pub async fn find_for_update<'e, E>(executor: E, id: Uuid) -> Result<Option<Payment>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn set_status<'e, E>(
    executor: E,
    id: Uuid,
    status: PaymentStatus,
) -> Result<Payment, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Payment>(
        r#"UPDATE payments
           SET status = $1, updated_at = NOW()
           WHERE id = $2
           RETURNING *"#,
    )
    .bind(status.as_str())
    .bind(id)
    .fetch_one(executor)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM payments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
