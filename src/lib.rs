pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod models;
pub mod notifier;
pub mod transition;
pub mod uploads;
pub mod validation;
pub mod visibility;

use std::path::PathBuf;

use sqlx::PgPool;

use crate::notifier::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub upload_dir: PathBuf,
    pub mailer: Mailer,
}
