// src/api/trips.rs
//
// Trips are plain JSON resources. They stay listed whatever happens to the
// payments that reference them.

use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::api::auth::{AuthUser, JwtMiddleware};
use crate::db::trips;
use crate::error::AppError;
use crate::models::Trip;
use crate::validation::{self, TripInput, TripSearchQuery};
use crate::{notifier, AppState};

#[utoipa::path(
    post,
    path = "/trip",
    tag = "trips",
    request_body = TripInput,
    responses(
        (status = 201, description = "Trip created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[post("", wrap = "JwtMiddleware")]
pub async fn create_trip(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<TripInput>,
) -> Result<HttpResponse, AppError> {
    let input = validation::new_trip(&payload, Utc::now().date_naive())?;
    let trip = trips::insert(&state.pool, user.id, &input).await?;
    log::info!("trip created id={} user_id={}", trip.id, user.id);

    let confirmation = trip.clone();
    state
        .mailer
        .dispatch_to_user(state.pool.clone(), user.id, move |owner| {
            notifier::trip_confirmation(owner, &confirmation)
        });

    Ok(HttpResponse::Created().json(json!({
        "message": "Trip created successfully",
        "trip": trip,
    })))
}

#[utoipa::path(
    get,
    path = "/trip",
    tag = "trips",
    responses((status = 200, description = "All trips, oldest first", body = [Trip]))
)]
#[get("")]
pub async fn list_trips(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(trips::list_all(&state.pool).await?))
}

#[utoipa::path(
    get,
    path = "/trip/user-trips",
    tag = "trips",
    responses(
        (status = 200, description = "Caller's trips, newest first", body = [Trip]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("/user-trips", wrap = "JwtMiddleware")]
pub async fn list_user_trips(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(trips::list_for_user(&state.pool, user.id).await?))
}

#[utoipa::path(
    get,
    path = "/trip/search/list",
    tag = "trips",
    params(
        ("from" = Option<String>, Query, description = "Departure city"),
        ("to" = Option<String>, Query, description = "Destination city"),
        ("name" = Option<String>, Query, description = "Traveler name"),
        ("phone" = Option<String>, Query, description = "Traveler phone"),
        ("startDate" = Option<String>, Query, description = "Earliest travel date, YYYY-MM-DD"),
        ("endDate" = Option<String>, Query, description = "Latest travel date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Matching trips by travel date", body = [Trip]),
        (status = 400, description = "Malformed date")
    )
)]
#[get("/search/list")]
pub async fn search_trips(
    state: web::Data<AppState>,
    query: web::Query<TripSearchQuery>,
) -> Result<HttpResponse, AppError> {
    let search = validation::trip_search(&query)?;
    let found = trips::search(&state.pool, &search).await?;
    log::debug!("trip search {:?} matched {}", search, found.len());
    Ok(HttpResponse::Ok().json(found))
}

#[utoipa::path(
    get,
    path = "/trip/{id}",
    tag = "trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "Trip", body = Trip),
        (status = 404, description = "Trip not found")
    )
)]
#[get("/{id}")]
pub async fn get_trip(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let trip = trips::find(&state.pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Trip"))?;
    Ok(HttpResponse::Ok().json(trip))
}

#[utoipa::path(
    patch,
    path = "/trip/{id}",
    tag = "trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    request_body = TripInput,
    responses(
        (status = 200, description = "Trip updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Trip not found")
    ),
    security(("bearer_auth" = []))
)]
#[patch("/{id}", wrap = "JwtMiddleware")]
pub async fn update_trip(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
    payload: web::Json<TripInput>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = trips::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Trip"))?;
    user.authorize(existing.user_id)?;

    let changes = validation::trip_changes(&payload, Utc::now().date_naive())?;
    let trip = trips::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::NotFound("Trip"))?;
    log::info!("trip updated id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Trip updated successfully",
        "trip": trip,
    })))
}

#[utoipa::path(
    delete,
    path = "/trip/{id}",
    tag = "trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses(
        (status = 200, description = "Trip deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Trip not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}", wrap = "JwtMiddleware")]
pub async fn delete_trip(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = trips::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Trip"))?;
    user.authorize(existing.user_id)?;

    if !trips::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Trip"));
    }
    log::info!("trip deleted id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Trip deleted successfully" })))
}
