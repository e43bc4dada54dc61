// src/db/community.rs
//
// Feedback and contact messages.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Contact, Feedback};

pub async fn insert_feedback(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    email: &str,
    feedback: &str,
    rating: i32,
) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        r#"INSERT INTO feedback (user_id, name, email, feedback, rating)
           VALUES ($1, $2, $3, $4, $5)
           RETURNING id, name, email, feedback, rating, created_at"#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(feedback)
    .bind(rating)
    .fetch_one(pool)
    .await
}

pub async fn list_feedback(pool: &PgPool) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as::<_, Feedback>(
        r#"SELECT id, name, email, feedback, rating, created_at
           FROM feedback
           ORDER BY created_at DESC"#,
    )
    .fetch_all(pool)
    .await
}

pub async fn insert_contact(
    pool: &PgPool,
    user_id: Uuid,
    name: &str,
    email: &str,
    message: &str,
) -> Result<Contact, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"INSERT INTO contacts (user_id, name, email, message)
           VALUES ($1, $2, $3, $4)
           RETURNING id, name, email, message, created_at"#,
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(message)
    .fetch_one(pool)
    .await
}

pub async fn list_contacts(pool: &PgPool) -> Result<Vec<Contact>, sqlx::Error> {
    sqlx::query_as::<_, Contact>(
        r#"SELECT id, name, email, message, created_at
           FROM contacts
           ORDER BY created_at DESC"#,
    )
    .fetch_all(pool)
    .await
}
