// src/api/users.rs
//
// Account administration. Both routes are admin-only.

use actix_web::{delete, get, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::api::auth::{AuthUser, JwtMiddleware};
use crate::db::users;
use crate::error::AppError;
use crate::models::UserProfile;
use crate::{uploads, AppState};

#[utoipa::path(
    get,
    path = "/users/all",
    tag = "users",
    responses(
        (status = 200, description = "Every account, newest first", body = [UserProfile]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = []))
)]
#[get("/users/all", wrap = "JwtMiddleware")]
pub async fn list_users(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    Ok(HttpResponse::Ok().json(users::list_profiles(&state.pool).await?))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User and their listings deleted"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
#[delete("/users/{id}", wrap = "JwtMiddleware")]
pub async fn delete_user(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    user.require_admin()?;
    let id = path.into_inner();

    let images = users::delete(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    uploads::discard(&state.upload_dir, &images).await;
    log::info!(
        "user deleted id={} by user_id={} images_removed={}",
        id,
        user.id,
        images.len()
    );

    Ok(HttpResponse::Ok().json(json!({ "message": "User deleted successfully" })))
}
