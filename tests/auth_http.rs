use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::json;
use uuid::Uuid;

use pakcarry_api::api;
use pakcarry_api::api::auth::{decode_token, issue_token, AuthUser};
use pakcarry_api::models::Role;

mod support;

macro_rules! offline_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(support::offline_state()))
                .configure(api::configure),
        )
        .await
    };
}

#[::core::prelude::v1::test]
fn issued_tokens_round_trip() {
    let id = Uuid::new_v4();
    let token = issue_token("s3cret", id, Role::Admin, "admin@pakcarry.test", 30).unwrap();

    let claims = decode_token("s3cret", &token).unwrap();
    assert_eq!(claims.sub, id);
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.email, "admin@pakcarry.test");

    let user = AuthUser::from(claims);
    assert!(user.is_admin());
    assert!(user.authorize(Uuid::new_v4()).is_ok());

    assert!(decode_token("other-secret", &token).is_err());
}

#[::core::prelude::v1::test]
fn expired_tokens_are_rejected() {
    let token = issue_token("s3cret", Uuid::new_v4(), Role::User, "u@pakcarry.test", -2).unwrap();
    assert!(decode_token("s3cret", &token).is_err());
}

#[::core::prelude::v1::test]
fn owners_and_admins_may_modify() {
    let owner = Uuid::new_v4();
    let user = AuthUser {
        id: owner,
        role: Role::User,
        email: "owner@pakcarry.test".to_string(),
    };
    assert!(user.authorize(owner).is_ok());
    assert!(user.authorize(Uuid::new_v4()).is_err());
    assert!(user.require_admin().is_err());
}

#[actix_web::test]
async fn index_answers() {
    let app = offline_app!();
    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let app = offline_app!();
    let req = TestRequest::get().uri("/orders/user-orders").to_request();
    let (status, body) = support::call(&app, req).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"], "Missing or invalid Authorization header");
}

#[actix_web::test]
async fn tampered_token_is_unauthorized() {
    let app = offline_app!();
    let mut token = support::bearer(Uuid::new_v4(), Role::User, "u@pakcarry.test");
    token.push('x');

    let req = TestRequest::get()
        .uri("/trip/user-trips")
        .insert_header(("Authorization", token))
        .to_request();
    let (status, body) = support::call(&app, req).await;

    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid token");
}

#[actix_web::test]
async fn token_from_another_secret_is_unauthorized() {
    let app = offline_app!();
    let token = issue_token("not-the-secret", Uuid::new_v4(), Role::Admin, "a@b.c", 1).unwrap();

    let req = TestRequest::get()
        .uri("/payments")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, _) = support::call(&app, req).await;
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn payment_admin_routes_refuse_regular_users() {
    let app = offline_app!();
    let token = support::bearer(Uuid::new_v4(), Role::User, "u@pakcarry.test");

    let list = TestRequest::get()
        .uri("/payments")
        .insert_header(("Authorization", token.clone()))
        .to_request();
    assert_eq!(support::call(&app, list).await.0, 403);

    let update = TestRequest::put()
        .uri(&format!("/payments/{}", Uuid::new_v4()))
        .insert_header(("Authorization", token.clone()))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    assert_eq!(support::call(&app, update).await.0, 403);

    let delete = TestRequest::delete()
        .uri(&format!("/payments/{}", Uuid::new_v4()))
        .insert_header(("Authorization", token))
        .to_request();
    assert_eq!(support::call(&app, delete).await.0, 403);
}

#[actix_web::test]
async fn unknown_payment_status_fails_before_storage() {
    let app = offline_app!();
    let token = support::bearer(Uuid::new_v4(), Role::Admin, "admin@pakcarry.test");

    for body in [json!({ "status": "refunded" }), json!({})] {
        let req = TestRequest::put()
            .uri(&format!("/payments/{}", Uuid::new_v4()))
            .insert_header(("Authorization", token.clone()))
            .set_json(body)
            .to_request();
        let (status, body) = support::call(&app, req).await;

        assert_eq!(status, 400);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["errors"]["status"],
            "Status must be one of: pending, completed, failed"
        );
    }
}

#[actix_web::test]
async fn login_requires_both_fields() {
    let app = offline_app!();
    let req = TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": "  " }))
        .to_request();
    let (status, body) = support::call(&app, req).await;

    assert_eq!(status, 400);
    assert!(body["errors"]["email"].is_string());
    assert!(body["errors"]["password"].is_string());
}

#[actix_web::test]
async fn invalid_trip_is_rejected_with_field_errors() {
    let app = offline_app!();
    let token = support::bearer(Uuid::new_v4(), Role::User, "u@pakcarry.test");

    let req = TestRequest::post()
        .uri("/trip")
        .insert_header(("Authorization", token))
        .set_json(json!({ "from": "Lahore", "space": 55, "agree": true }))
        .to_request();
    let (status, body) = support::call(&app, req).await;

    assert_eq!(status, 400);
    assert_eq!(body["errors"]["space"], "Package weight cannot exceed 40kg");
    assert_eq!(body["errors"]["to"], "Please select your destination city");
    assert!(body["errors"].get("from").is_none());
}

#[actix_web::test]
async fn incomplete_payment_form_is_rejected() {
    let app = offline_app!();
    let token = support::bearer(Uuid::new_v4(), Role::User, "u@pakcarry.test");

    let payload = support::multipart_body(&[("orderType", "order"), ("amount", "500")], &[]);
    let req = TestRequest::post()
        .uri("/payments")
        .insert_header(("Authorization", token))
        .insert_header(support::multipart_content_type())
        .set_payload(payload)
        .to_request();
    let (status, body) = support::call(&app, req).await;

    assert_eq!(status, 400);
    assert_eq!(body["errors"]["orderId"], "Order ID is required");
    assert_eq!(body["errors"]["screenshot"], "Please upload a payment screenshot");
    assert!(body["errors"].get("amount").is_none());
}

#[actix_web::test]
async fn user_administration_is_admin_only() {
    let app = offline_app!();
    let token = support::bearer(Uuid::new_v4(), Role::User, "u@pakcarry.test");

    let list = TestRequest::get()
        .uri("/users/all")
        .insert_header(("Authorization", token.clone()))
        .to_request();
    assert_eq!(support::call(&app, list).await.0, 403);

    let delete = TestRequest::delete()
        .uri(&format!("/users/{}", Uuid::new_v4()))
        .insert_header(("Authorization", token))
        .to_request();
    assert_eq!(support::call(&app, delete).await.0, 403);

    let anonymous = TestRequest::get().uri("/users/all").to_request();
    assert_eq!(support::call(&app, anonymous).await.0, 401);
}
