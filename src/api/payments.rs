// src/api/payments.rs

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::auth::{AuthUser, JwtMiddleware};
use crate::db::{self, payments};
use crate::error::AppError;
use crate::models::StatusChange;
use crate::{transition, uploads, validation, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentStatus {
    /// One of `pending`, `completed`, `failed`.
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/payments",
    tag = "payments",
    request_body(
        content_type = "multipart/form-data",
        description = "`orderType`, `orderId`, `method`, `transactionId`, `amount` and a `screenshot` file"
    ),
    responses(
        (status = 201, description = "Payment submitted for review"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Referenced listing not found")
    ),
    security(("bearer_auth" = []))
)]
#[post("", wrap = "JwtMiddleware")]
pub async fn create_payment(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let form =
        uploads::read_form(payload, &state.upload_dir, uploads::PAYMENT_SCREENSHOT).await?;

    let input = validation::new_payment(&form);
    let input = uploads::discard_on_err(&state.upload_dir, &form.files, input).await?;

    let found = db::listing_exists(&state.pool, input.target)
        .await
        .map_err(AppError::from)
        .and_then(|exists| {
            exists
                .then_some(())
                .ok_or(AppError::NotFound(input.target.kind().label()))
        });
    uploads::discard_on_err(&state.upload_dir, &form.files, found).await?;

    let inserted = payments::insert(&state.pool, &input).await;
    let payment = uploads::discard_on_err(&state.upload_dir, &form.files, inserted).await?;
    log::info!(
        "payment submitted id={} target={}:{} user_id={}",
        payment.id,
        payment.target.kind(),
        payment.target.id(),
        user.id
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Payment submitted successfully",
        "payment": payment,
    })))
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payments",
    responses(
        (status = 200, description = "All payments with the listing owner, newest first"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = []))
)]
#[get("", wrap = "JwtMiddleware")]
pub async fn list_payments(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let payments = payments::list_with_owner(&state.pool).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": payments.len(),
        "payments": payments,
    })))
}

#[utoipa::path(
    get,
    path = "/payments/{orderId}",
    tag = "payments",
    params(("orderId" = Uuid, Path, description = "Listing id the payments refer to")),
    responses(
        (status = 200, description = "Payments for the listing, newest first"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[get("/{orderId}", wrap = "JwtMiddleware")]
pub async fn list_listing_payments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let payments = payments::list_for_listing(&state.pool, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": payments.len(),
        "payments": payments,
    })))
}

#[utoipa::path(
    put,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment id")),
    request_body = UpdatePaymentStatus,
    responses(
        (status = 200, description = "Status applied, or already in that status"),
        (status = 400, description = "Unknown status or payment already settled"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = []))
)]
#[put("/{id}", wrap = "JwtMiddleware")]
pub async fn update_payment_status(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdatePaymentStatus>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let next = transition::parse_status(payload.status.as_deref())?;

    let outcome = transition::apply(&state.pool, path.into_inner(), next).await?;
    uploads::discard(&state.upload_dir, &outcome.released_images).await;
    if let Some(email) = outcome.notification() {
        state.mailer.dispatch(email);
    }

    let message = match outcome.change {
        StatusChange::Unchanged => "Payment status unchanged",
        StatusChange::Changed { .. } => "Payment status updated successfully",
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "payment": outcome.payment,
        "listingDeleted": outcome.listing_deleted,
    })))
}

#[utoipa::path(
    delete,
    path = "/payments/{id}",
    tag = "payments",
    params(("id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Payment not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/{id}", wrap = "JwtMiddleware")]
pub async fn delete_payment(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();

    if !payments::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Payment"));
    }
    log::info!("payment deleted id={} by user_id={}", id, user.id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Payment deleted successfully",
    })))
}
