// src/api/orders.rs

use actix_multipart::Multipart;
use actix_web::{delete, get, patch, post, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::api::auth::{AuthUser, JwtMiddleware};
use crate::db::orders;
use crate::error::AppError;
use crate::models::Order;
use crate::visibility::{self, ListingScope};
use crate::{notifier, uploads, validation, AppState};

#[utoipa::path(
    post,
    path = "/orders",
    tag = "orders",
    request_body(content_type = "multipart/form-data", description = "Order fields plus up to 5 `images`"),
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[post("", wrap = "JwtMiddleware")]
pub async fn create_order(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form = uploads::read_form(payload, &state.upload_dir, uploads::LISTING_IMAGES).await?;
    let input = validation::new_order(&form);
    let input = uploads::discard_on_err(&state.upload_dir, &form.files, input).await?;

    let inserted = orders::insert(&state.pool, user.id, &input).await;
    let order = uploads::discard_on_err(&state.upload_dir, &form.files, inserted).await?;
    log::info!("order created id={} user_id={}", order.id, user.id);

    let confirmation = order.clone();
    state
        .mailer
        .dispatch_to_user(state.pool.clone(), user.id, move |owner| {
            notifier::order_confirmation(owner, &confirmation)
        });

    Ok(HttpResponse::Created().json(json!({
        "message": "Order created successfully",
        "order": order,
    })))
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    responses((status = 200, description = "Open orders, newest first", body = [Order]))
)]
#[get("")]
pub async fn list_orders(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let orders = visibility::available_listings::<Order>(&state.pool, ListingScope::All).await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/user-orders",
    tag = "orders",
    responses(
        (status = 200, description = "Caller's open orders", body = [Order]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("/user-orders", wrap = "JwtMiddleware")]
pub async fn list_user_orders(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    let orders =
        visibility::available_listings::<Order>(&state.pool, ListingScope::Owner(user.id)).await?;
    Ok(HttpResponse::Ok().json(orders))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 404, description = "Order not found")
    )
)]
#[get("/{id}")]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = orders::find(&state.pool, path.into_inner())
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    Ok(HttpResponse::Ok().json(order))
}

#[utoipa::path(
    patch,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body(content_type = "multipart/form-data", description = "Either `status` alone or the full order fields"),
    responses(
        (status = 200, description = "Order updated"),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
#[patch("/{id}", wrap = "JwtMiddleware")]
pub async fn update_order(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = orders::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    user.authorize(existing.user_id)?;

    let form = uploads::read_form(payload, &state.upload_dir, uploads::LISTING_IMAGES).await?;
    let changes = validation::order_changes(&form);
    let changes = uploads::discard_on_err(&state.upload_dir, &form.files, changes).await?;

    let updated = orders::update(&state.pool, id, &changes)
        .await
        .map_err(AppError::from)
        .and_then(|row| row.ok_or(AppError::NotFound("Order")));
    let order = uploads::discard_on_err(&state.upload_dir, &form.files, updated).await?;
    if changes.images.is_some() {
        uploads::discard(&state.upload_dir, &existing.images).await;
    }
    log::info!("order updated id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Order updated successfully",
        "order": order,
    })))
}

#[utoipa::path(
    delete,
    path = "/orders/{id}",
    tag = "orders",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}", wrap = "JwtMiddleware")]
pub async fn delete_order(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let existing = orders::find(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    user.authorize(existing.user_id)?;

    if !orders::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Order"));
    }
    uploads::discard(&state.upload_dir, &existing.images).await;
    log::info!("order deleted id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Order deleted successfully" })))
}
