// src/db/users.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{User, UserProfile};

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"SELECT id, name, email, password_hash, role
           FROM users
           WHERE lower(email) = lower($1)"#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

pub async fn list_profiles(pool: &PgPool) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"SELECT id, name, email, role, created_at
           FROM users
           ORDER BY created_at DESC"#,
    )
    .fetch_all(pool)
    .await
}

/// Deletes the user together with their listings (cascade). Returns the
/// stored images those listings referenced, or `None` when no such user exists.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Option<Vec<String>>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let images: Vec<String> = sqlx::query_scalar(
        r#"SELECT COALESCE(array_agg(img), '{}'::text[])
           FROM (
               SELECT unnest(images) AS img FROM orders WHERE user_id = $1
               UNION ALL
               SELECT unnest(images) AS img FROM send_orders WHERE user_id = $1
           ) owned"#,
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(None);
    }

    tx.commit().await?;
    Ok(Some(images))
}
