// src/main.rs
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pakcarry_api::config::Config;
use pakcarry_api::notifier::Mailer;
use pakcarry_api::{api, docs, AppState};

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{context}: {err}"))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("configuration", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| startup_error("failed to connect to DB", e))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| startup_error("failed to run migrations", e))?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let mailer = Mailer::from_config(config.smtp.as_ref())
        .map_err(|e| startup_error("mailer setup", e))?;

    let state = web::Data::new(AppState {
        pool,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl_days: config.token_ttl_days,
        upload_dir: config.upload_dir.clone(),
        mailer,
    });

    log::info!("listening on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(
                SwaggerUi::new("/docs/{_:.*}")
                    .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
            )
            .configure(api::configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await
}
