// src/db/orders.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{ListingRef, ListingStatus, Order};

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub sender_name: String,
    pub sender_phone: String,
    pub earliest_date: NaiveDate,
    pub last_date: NaiveDate,
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub description: Option<String>,
    pub images: Vec<String>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderChanges {
    pub sender_name: Option<String>,
    pub sender_phone: Option<String>,
    pub earliest_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<ListingStatus>,
}

pub async fn insert(pool: &PgPool, user_id: Uuid, order: &NewOrder) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"INSERT INTO orders
               (user_id, sender_name, sender_phone, earliest_date, last_date,
                from_city, to_city, weight, description, images)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(&order.sender_name)
    .bind(&order.sender_phone)
    .bind(order.earliest_date)
    .bind(order.last_date)
    .bind(&order.from)
    .bind(&order.to)
    .bind(order.weight)
    .bind(order.description.as_deref())
    .bind(&order.images)
    .fetch_one(pool)
    .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &OrderChanges,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"UPDATE orders SET
               sender_name   = COALESCE($2, sender_name),
               sender_phone  = COALESCE($3, sender_phone),
               earliest_date = COALESCE($4, earliest_date),
               last_date     = COALESCE($5, last_date),
               from_city     = COALESCE($6, from_city),
               to_city       = COALESCE($7, to_city),
               weight        = COALESCE($8, weight),
               description   = COALESCE($9, description),
               images        = COALESCE($10, images),
               status        = COALESCE($11, status),
               updated_at    = NOW()
           WHERE id = $1
           RETURNING *"#,
    )
    .bind(id)
    .bind(changes.sender_name.as_deref())
    .bind(changes.sender_phone.as_deref())
    .bind(changes.earliest_date)
    .bind(changes.last_date)
    .bind(changes.from.as_deref())
    .bind(changes.to.as_deref())
    .bind(changes.weight)
    .bind(changes.description.as_deref())
    .bind(changes.images.clone())
    .bind(changes.status.map(ListingStatus::as_str))
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    db::delete_listing(pool, ListingRef::Order(id)).await
}
