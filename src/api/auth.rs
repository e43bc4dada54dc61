// src/api/auth.rs

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{post, web, Error, HttpMessage, HttpResponse};
use bcrypt::verify;
use chrono::{Duration, Utc};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::task::{Context, Poll};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::users;
use crate::error::{AppError, FieldErrors};
use crate::models::Role;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub email: String,
    pub exp: usize,
}

/// Caller identity placed in request extensions by [`JwtMiddleware`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    /// Owners and admins may change a resource.
    pub fn authorize(&self, owner: Uuid) -> Result<(), AppError> {
        if self.id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            id: claims.sub,
            role: claims.role,
            email: claims.email,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let mut errors = FieldErrors::new();
    if payload.email.trim().is_empty() {
        errors.add("email", "Please enter your email");
    }
    if payload.password.is_empty() {
        errors.add("password", "Please enter your password");
    }
    errors.into_result(())?;

    let Some(user) = users::find_by_email(&state.pool, &payload.email).await? else {
        log::info!("login rejected, unknown email={}", payload.email.trim());
        return Err(AppError::Unauthorized("Invalid email or password"));
    };

    if !verify(&payload.password, &user.password_hash)? {
        log::info!("login rejected, bad password user_id={}", user.id);
        return Err(AppError::Unauthorized("Invalid email or password"));
    }

    let token = issue_token(
        &state.jwt_secret,
        user.id,
        user.role,
        &user.email,
        state.token_ttl_days,
    )?;
    log::info!("login ok user_id={} role={}", user.id, user.role);

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: LoginUser {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        },
    }))
}

pub fn issue_token(
    secret: &str,
    user_id: Uuid,
    role: Role,
    email: &str,
    ttl_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (Utc::now() + Duration::days(ttl_days)).timestamp().max(0) as usize;

    let claims = Claims {
        sub: user_id,
        role,
        email: email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Bearer-token guard. Verifies `Authorization: Bearer <jwt>` with the secret
/// from `AppState` and stores an [`AuthUser`] in the request extensions.
pub struct JwtMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtMiddlewareInner<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareInner { service }))
    }
}

pub struct JwtMiddlewareInner<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareInner<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return reject(AppError::Internal(
                "application state is not configured".to_string(),
            ));
        };

        let token = req
            .headers()
            .get(actix_web::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            return reject(AppError::Unauthorized(
                "Missing or invalid Authorization header",
            ));
        };

        let verified = decode_token(&state.jwt_secret, token);
        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(AuthUser::from(claims));
                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(e) => {
                log::debug!("rejected bearer token: {e}");
                reject(AppError::Unauthorized("Invalid token"))
            }
        }
    }
}

fn reject<B>(err: AppError) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>
where
    B: 'static,
{
    Box::pin(ready(Err(Error::from(err))))
}
