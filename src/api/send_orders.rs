// src/api/send_orders.rs

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::api::auth::{AuthUser, JwtMiddleware};
use crate::db::send_orders;
use crate::error::AppError;
use crate::models::SendOrder;
use crate::visibility::{self, ListingScope};
use crate::{notifier, uploads, validation, AppState};

#[utoipa::path(
    post,
    path = "/send-order",
    tag = "send-orders",
    request_body(content_type = "multipart/form-data", description = "Send-order fields plus up to 5 `images`"),
    responses(
        (status = 201, description = "Send order created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[post("", wrap = "JwtMiddleware")]
pub async fn create_send_order(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = uploads::read_form(payload, &state.upload_dir, uploads::LISTING_IMAGES).await?;
    let input = validation::new_send_order(&form, Utc::now().date_naive());
    let input = uploads::discard_on_err(&state.upload_dir, &form.files, input).await?;

    let inserted = send_orders::insert(&state.pool, user.id, &input).await;
    let order = uploads::discard_on_err(&state.upload_dir, &form.files, inserted).await?;
    log::info!("send order created id={} user_id={}", order.id, user.id);

    let confirmation = order.clone();
    state
        .mailer
        .dispatch_to_user(state.pool.clone(), user.id, move |owner| {
            notifier::send_order_confirmation(owner, &confirmation)
        });

    Ok(HttpResponse::Created().json(json!({
        "message": "Send order created successfully",
        "order": order,
    })))
}

#[utoipa::path(
    get,
    path = "/send-order",
    tag = "send-orders",
    responses((status = 200, description = "Open send orders, newest first", body = [SendOrder]))
)]
#[get("")]
pub async fn list_send_orders(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let listings = visibility::available_listings::<SendOrder>(&state.pool, ListingScope::All).await?;
    Ok(HttpResponse::Ok().json(listings))
}

#[utoipa::path(
    get,
    path = "/send-order/user-orders",
    tag = "send-orders",
    responses(
        (status = 200, description = "Caller's open send orders", body = [SendOrder]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("/user-orders", wrap = "JwtMiddleware")]
pub async fn list_user_send_orders(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let listings =
        visibility::available_listings::<SendOrder>(&state.pool, ListingScope::Owner(user.id)).await?;
    Ok(HttpResponse::Ok().json(listings))
}

#[utoipa::path(
    get,
    path = "/send-order/{id}",
    tag = "send-orders",
    params(("id" = Uuid, Path, description = "Send order id")),
    responses(
        (status = 200, description = "Send order", body = SendOrder),
        (status = 404, description = "Send order not found")
    )
)]
#[get("/{id}")]
pub async fn get_send_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = send_orders::find(&state.pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Send order"))?;
    Ok(HttpResponse::Ok().json(order))
}

#[utoipa::path(
    patch,
    path = "/send-order/{id}",
    tag = "send-orders",
    params(("id" = Uuid, Path, description = "Send order id")),
    request_body(content_type = "multipart/form-data", description = "Either `status` alone or the full send-order fields"),
    responses(
        (status = 200, description = "Send order updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Send order not found")
    ),
    security(("bearer_auth" = []))
)]
#[patch("/{id}", wrap = "JwtMiddleware")]
pub async fn update_send_order(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = send_orders::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Send order"))?;
    user.authorize(existing.user_id)?;

    let form = uploads::read_form(payload, &state.upload_dir, uploads::LISTING_IMAGES).await?;
    let changes = validation::send_order_changes(&form, Utc::now().date_naive());
    let changes = uploads::discard_on_err(&state.upload_dir, &form.files, changes).await?;

    let updated = send_orders::update(&state.pool, id, &changes)
        .await
        .map_err(AppError::from)
        .and_then(|row| row.ok_or(AppError::NotFound("Send order")));
    let order = uploads::discard_on_err(&state.upload_dir, &form.files, updated).await?;
    if changes.images.is_some() {
        uploads::discard(&state.upload_dir, &existing.images).await;
    }
    log::info!("send order updated id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Send order updated successfully",
        "order": order,
    })))
}

#[utoipa::path(
    delete,
    path = "/send-order/{id}",
    tag = "send-orders",
    params(("id" = Uuid, Path, description = "Send order id")),
    responses(
        (status = 200, description = "Send order deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Send order not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}", wrap = "JwtMiddleware")]
pub async fn delete_send_order(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = send_orders::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Send order"))?;
    user.authorize(existing.user_id)?;

    if !send_orders::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Send order"));
    }
    uploads::discard(&state.upload_dir, &existing.images).await;
    log::info!("send order deleted id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Send order deleted successfully" })))
}
