// src/db.rs
//
// Persistence on Postgres. Every listing kind lives in its own table; a
// `ListingRef` is resolved to that table through `ListingKind::table`.

pub mod community;
pub mod orders;
pub mod payments;
pub mod send_orders;
pub mod trips;
pub mod users;

use sqlx::{PgExecutor, Row};

use crate::models::{ListingRef, UserSummary};

pub async fn listing_exists<'e, E>(executor: E, target: ListingRef) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1) AS found",
        target.kind().table()
    );
    let row = sqlx::query(&sql)
        .bind(target.id())
        .fetch_one(executor)
        .await?;

    Ok(row.get("found"))
}

/// Owner of the referenced listing, if both the listing and the user still exist.
pub async fn listing_owner<'e, E>(
    executor: E,
    target: ListingRef,
) -> Result<Option<UserSummary>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"SELECT u.id, u.name, u.email
           FROM {} l
           JOIN users u ON u.id = l.user_id
           WHERE l.id = $1"#,
        target.kind().table()
    );
    let row = sqlx::query(&sql)
        .bind(target.id())
        .fetch_optional(executor)
        .await?;

    Ok(row.map(|r| UserSummary {
        id: r.get("id"),
        name: r.get("name"),
        email: r.get("email"),
    }))
}

/// Returns `false` when nothing was deleted.
pub async fn delete_listing<'e, E>(executor: E, target: ListingRef) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("DELETE FROM {} WHERE id = $1", target.kind().table());
    let result = sqlx::query(&sql)
        .bind(target.id())
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a paid-for order or send-order and hands back its stored images,
/// or `None` when the row was already gone.
pub async fn delete_paid_listing<'e, E>(
    executor: E,
    target: ListingRef,
) -> Result<Option<Vec<String>>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "DELETE FROM {} WHERE id = $1 RETURNING images",
        target.kind().table()
    );
    let row = sqlx::query(&sql)
        .bind(target.id())
        .fetch_optional(executor)
        .await?;

    row.map(|r| r.try_get::<Vec<String>, _>("images")).transpose()
}
