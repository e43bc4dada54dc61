// src/api/community.rs
//
// Site feedback and contact messages. Submitting needs a token (the email is
// taken from it); reading is public.

use actix_web::{get, post, web, HttpResponse};
use serde_json::json;

use crate::api::auth::{AuthUser, JwtMiddleware};
use crate::db::community;
use crate::error::AppError;
use crate::models::{Contact, Feedback};
use crate::validation::{self, ContactInput, FeedbackInput};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/feedback",
    tag = "community",
    request_body = FeedbackInput,
    responses(
        (status = 201, description = "Feedback stored"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[post("/feedback", wrap = "JwtMiddleware")]
pub async fn create_feedback(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<FeedbackInput>,
) -> Result<HttpResponse, AppError> {
    let input = validation::new_feedback(&payload)?;
    let feedback = community::insert_feedback(
        &state.pool,
        user.id,
        &input.name,
        &user.email,
        &input.feedback,
        input.rating,
    )
    .await?;
    log::info!("feedback stored id={} rating={}", feedback.id, feedback.rating);

    Ok(HttpResponse::Created().json(json!({
        "message": "Feedback submitted successfully",
        "feedback": feedback,
    })))
}

#[utoipa::path(
    get,
    path = "/feedback",
    tag = "community",
    responses((status = 200, description = "Feedback, newest first", body = [Feedback]))
)]
#[get("/feedback")]
pub async fn list_feedback(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(community::list_feedback(&state.pool).await?))
}

#[utoipa::path(
    post,
    path = "/contact",
    tag = "community",
    request_body = ContactInput,
    responses(
        (status = 201, description = "Message stored"),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
#[post("/contact", wrap = "JwtMiddleware")]
pub async fn create_contact(
    state: web::Data<AppState>,
    user: web::ReqData<AuthUser>,
    payload: web::Json<ContactInput>,
) -> Result<HttpResponse, AppError> {
    let (name, message) = validation::new_contact(&payload)?;
    let contact =
        community::insert_contact(&state.pool, user.id, &name, &user.email, &message).await?;
    log::info!("contact message stored id={}", contact.id);

    Ok(HttpResponse::Created().json(json!({
        "message": "Message sent successfully",
        "contact": contact,
    })))
}

#[utoipa::path(
    get,
    path = "/contact",
    tag = "community",
    responses((status = 200, description = "Contact messages, newest first", body = [Contact]))
)]
#[get("/contact")]
pub async fn list_contacts(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(community::list_contacts(&state.pool).await?))
}
