// src/db/send_orders.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{ListingRef, ListingStatus, SendOrder};

#[derive(Debug, Clone, PartialEq)]
pub struct NewSendOrder {
    pub earliest_date: NaiveDate,
    pub last_date: NaiveDate,
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub description: Option<String>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub terms_accepted: bool,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SendOrderChanges {
    pub earliest_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub weight: Option<f64>,
    pub description: Option<String>,
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub images: Option<Vec<String>>,
    pub status: Option<ListingStatus>,
}

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    order: &NewSendOrder,
) -> Result<SendOrder, sqlx::Error> {
    sqlx::query_as::<_, SendOrder>(
        r#"INSERT INTO send_orders
               (user_id, earliest_date, last_date, from_city, to_city, weight, description,
                receiver_name, receiver_phone, terms_accepted, images)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(order.earliest_date)
    .bind(order.last_date)
    .bind(&order.from)
    .bind(&order.to)
    .bind(order.weight)
    .bind(order.description.as_deref())
    .bind(&order.receiver_name)
    .bind(&order.receiver_phone)
    .bind(order.terms_accepted)
    .bind(&order.images)
    .fetch_one(pool)
    .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<SendOrder>, sqlx::Error> {
    sqlx::query_as::<_, SendOrder>("SELECT * FROM send_orders WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &SendOrderChanges,
) -> Result<Option<SendOrder>, sqlx::Error> {
    sqlx::query_as::<_, SendOrder>(
        r#"UPDATE send_orders SET
               earliest_date  = COALESCE($2, earliest_date),
               last_date      = COALESCE($3, last_date),
               from_city      = COALESCE($4, from_city),
               to_city        = COALESCE($5, to_city),
               weight         = COALESCE($6, weight),
               description    = COALESCE($7, description),
               receiver_name  = COALESCE($8, receiver_name),
               receiver_phone = COALESCE($9, receiver_phone),
               images         = COALESCE($10, images),
               status         = COALESCE($11, status),
               updated_at     = NOW()
           WHERE id = $1
           RETURNING *"#,
    )
    .bind(id)
    .bind(changes.earliest_date)
    .bind(changes.last_date)
    .bind(changes.from.as_deref())
    .bind(changes.to.as_deref())
    .bind(changes.weight)
    .bind(changes.description.as_deref())
    .bind(changes.receiver_name.as_deref())
    .bind(changes.receiver_phone.as_deref())
    .bind(changes.images.clone())
    .bind(changes.status.map(ListingStatus::as_str))
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    db::delete_listing(pool, ListingRef::SendOrder(id)).await
}
