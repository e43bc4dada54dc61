// src/db/trips.rs

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db;
use crate::models::{ListingRef, Trip};

#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub name: String,
    pub phone: String,
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub space: f64,
    pub price: f64,
    pub description: String,
    pub agree: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<NaiveDate>,
    pub space: Option<f64>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

/// Exact-match filters; dates are inclusive bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripSearch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

pub async fn insert(pool: &PgPool, user_id: Uuid, trip: &NewTrip) -> Result<Trip, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        r#"INSERT INTO trips
               (user_id, name, phone, from_city, to_city, travel_date, space, price, description, agree)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
           RETURNING *"#,
    )
    .bind(user_id)
    .bind(&trip.name)
    .bind(&trip.phone)
    .bind(&trip.from)
    .bind(&trip.to)
    .bind(trip.date)
    .bind(trip.space)
    .bind(trip.price)
    .bind(&trip.description)
    .bind(trip.agree)
    .fetch_one(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips ORDER BY created_at ASC")
        .fetch_all(pool)
        .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub fn search_query(search: &TripSearch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT * FROM trips WHERE TRUE");

    let text_filters = [
        ("from_city", &search.from),
        ("to_city", &search.to),
        ("name", &search.name),
        ("phone", &search.phone),
    ];
    for (column, value) in text_filters {
        if let Some(value) = value {
            qb.push(format!(" AND {column} = ")).push_bind(value.clone());
        }
    }
    if let Some(start) = search.start_date {
        qb.push(" AND travel_date >= ").push_bind(start);
    }
    if let Some(end) = search.end_date {
        qb.push(" AND travel_date <= ").push_bind(end);
    }
    qb.push(" ORDER BY travel_date ASC");
    qb
}

pub async fn search(pool: &PgPool, search: &TripSearch) -> Result<Vec<Trip>, sqlx::Error> {
    let mut qb = search_query(search);
    qb.build_query_as::<Trip>().fetch_all(pool).await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &TripChanges,
) -> Result<Option<Trip>, sqlx::Error> {
    sqlx::query_as::<_, Trip>(
        r#"UPDATE trips SET
               name        = COALESCE($2, name),
               phone       = COALESCE($3, phone),
               from_city   = COALESCE($4, from_city),
               to_city     = COALESCE($5, to_city),
               travel_date = COALESCE($6, travel_date),
               space       = COALESCE($7, space),
               price       = COALESCE($8, price),
               description = COALESCE($9, description),
               updated_at  = NOW()
           WHERE id = $1
           RETURNING *"#,
    )
    .bind(id)
    .bind(changes.name.as_deref())
    .bind(changes.phone.as_deref())
    .bind(changes.from.as_deref())
    .bind(changes.to.as_deref())
    .bind(changes.date)
    .bind(changes.space)
    .bind(changes.price)
    .bind(changes.description.as_deref())
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    db::delete_listing(pool, ListingRef::Trip(id)).await
}
