use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use pakcarry_api::api;
use pakcarry_api::db::orders::{self, NewOrder, OrderChanges};
use pakcarry_api::db::payments::{self, NewPayment};
use pakcarry_api::db::send_orders::{self, NewSendOrder};
use pakcarry_api::db::trips::{self, NewTrip};
use pakcarry_api::models::{
    ListingRef, ListingStatus, Order, PaymentMethod, PaymentStatus, Role, SendOrder, StatusChange,
};
use pakcarry_api::transition;
use pakcarry_api::visibility::{available_listings, ListingScope};

mod support;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_order() -> NewOrder {
    NewOrder {
        sender_name: "Bilal Ahmed".to_string(),
        sender_phone: "+923001234567".to_string(),
        earliest_date: date(2030, 3, 10),
        last_date: date(2030, 3, 20),
        from: "Lahore".to_string(),
        to: "Dubai".to_string(),
        weight: 5.0,
        description: None,
        images: Vec::new(),
    }
}

fn new_send_order() -> NewSendOrder {
    NewSendOrder {
        earliest_date: date(2030, 3, 10),
        last_date: date(2030, 3, 12),
        from: "Karachi".to_string(),
        to: "Islamabad".to_string(),
        weight: 3.0,
        description: Some("Documents".to_string()),
        receiver_name: "Sara Malik".to_string(),
        receiver_phone: "+923331112223".to_string(),
        terms_accepted: true,
        images: Vec::new(),
    }
}

fn new_trip() -> NewTrip {
    NewTrip {
        name: "Hamza".to_string(),
        phone: "+923451234567".to_string(),
        from: "Lahore".to_string(),
        to: "London".to_string(),
        date: date(2030, 4, 1),
        space: 20.0,
        price: 2500.0,
        description: String::new(),
        agree: true,
    }
}

fn pending_payment(target: ListingRef) -> NewPayment {
    NewPayment {
        target,
        method: PaymentMethod::Bank,
        transaction_id: format!("TX-{}", Uuid::new_v4().simple()),
        amount: 1200.0,
        screenshot: "1700000000000-proof.png".to_string(),
    }
}

async fn available_order_ids(pool: &PgPool) -> Vec<Uuid> {
    available_listings::<Order>(pool, ListingScope::All)
        .await
        .expect("available orders")
        .into_iter()
        .map(|o| o.id)
        .collect()
}

async fn set_order_created_at(pool: &PgPool, id: Uuid, minutes_ago: i64) {
    sqlx::query("UPDATE orders SET created_at = $1 WHERE id = $2")
        .bind(Utc::now() - Duration::minutes(minutes_ago))
        .bind(id)
        .execute(pool)
        .await
        .expect("set created_at");
}

fn listed_ids(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("array body")
        .iter()
        .map(|o| o["id"].as_str().expect("id").to_string())
        .collect()
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn completed_payment_hides_and_removes_order() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, owner_email) = support::insert_user(pool, "Owner", Role::User).await;
    let (admin_id, admin_email) = support::insert_user(pool, "Admin", Role::Admin).await;
    let owner = support::bearer(owner_id, Role::User, &owner_email);
    let admin = support::bearer(admin_id, Role::Admin, &admin_email);

    let state = web::Data::new(support::build_state(test_db.pool.clone()));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(api::configure),
    )
    .await;

    let payload = support::multipart_body(
        &[
            ("senderName", "Bilal Ahmed"),
            ("senderPhone", "+923001234567"),
            ("earliestDate", "2030-03-10"),
            ("lastDate", "2030-03-20"),
            ("from", "Lahore"),
            ("to", "Dubai"),
            ("weight", "5"),
        ],
        &[
            ("images", "box photo.png", &b"front"[..]),
            ("images", "box photo.png", &b"back"[..]),
        ],
    );
    let req = TestRequest::post()
        .uri("/orders")
        .insert_header(("Authorization", owner.clone()))
        .insert_header(support::multipart_content_type())
        .set_payload(payload)
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 201, "{body}");
    let order_id = body["order"]["id"].as_str().expect("order id").to_string();
    let images: Vec<String> = body["order"]["images"]
        .as_array()
        .expect("images")
        .iter()
        .map(|i| i.as_str().expect("image name").to_string())
        .collect();
    assert_eq!(images.len(), 2);
    assert_ne!(images[0], images[1], "same client name, distinct stored files");
    for image in &images {
        assert!(image.ends_with("-boxphoto.png"));
        assert!(state.upload_dir.join(image).exists());
    }

    let req = TestRequest::get().uri("/orders").to_request();
    let (_, body) = support::call(&app, req).await;
    assert!(listed_ids(&body).contains(&order_id));

    let payload = support::multipart_body(
        &[
            ("orderType", "order"),
            ("orderId", order_id.as_str()),
            ("method", "jazzcash"),
            ("transactionId", "JC-123456"),
            ("amount", "1500"),
        ],
        &[("screenshot", "proof.png", &b"png-bytes"[..])],
    );
    let req = TestRequest::post()
        .uri("/payments")
        .insert_header(("Authorization", owner.clone()))
        .insert_header(support::multipart_content_type())
        .set_payload(payload)
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 201, "{body}");
    assert_eq!(body["payment"]["status"], "pending");
    assert_eq!(body["payment"]["orderType"], "order");
    let payment_id = body["payment"]["id"].as_str().expect("payment id").to_string();

    let req = TestRequest::get().uri("/orders").to_request();
    let (_, body) = support::call(&app, req).await;
    assert!(listed_ids(&body).contains(&order_id));

    let req = TestRequest::get()
        .uri("/payments")
        .insert_header(("Authorization", admin.clone()))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["count"], 1);
    assert_eq!(body["payments"][0]["user"]["email"], owner_email.as_str());

    let req = TestRequest::put()
        .uri(&format!("/payments/{payment_id}"))
        .insert_header(("Authorization", admin.clone()))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["payment"]["status"], "completed");
    assert_eq!(body["listingDeleted"], true);

    let req = TestRequest::get().uri("/orders").to_request();
    let (_, body) = support::call(&app, req).await;
    assert!(!listed_ids(&body).contains(&order_id));

    let req = TestRequest::get().uri(&format!("/orders/{order_id}")).to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Order not found");
    for image in &images {
        assert!(!state.upload_dir.join(image).exists(), "{image} left behind");
    }

    let req = TestRequest::put()
        .uri(&format!("/payments/{payment_id}"))
        .insert_header(("Authorization", admin.clone()))
        .set_json(json!({ "status": "completed" }))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Payment status unchanged");

    let req = TestRequest::put()
        .uri(&format!("/payments/{payment_id}"))
        .insert_header(("Authorization", admin))
        .set_json(json!({ "status": "failed" }))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 400);
    assert!(body["errors"]["status"].is_string());
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn payment_for_missing_listing_is_not_found() {
    let test_db = support::init_test_db().await;
    let (user_id, email) = support::insert_user(&test_db.pool, "Payer", Role::User).await;
    let token = support::bearer(user_id, Role::User, &email);

    let state = web::Data::new(support::build_state(test_db.pool.clone()));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(api::configure),
    )
    .await;

    let missing = Uuid::new_v4().to_string();
    let payload = support::multipart_body(
        &[
            ("orderType", "sendOrder"),
            ("orderId", missing.as_str()),
            ("method", "bank"),
            ("transactionId", "BANK-0001"),
            ("amount", "900"),
        ],
        &[("screenshot", "proof.png", &b"png-bytes"[..])],
    );
    let req = TestRequest::post()
        .uri("/payments")
        .insert_header(("Authorization", token))
        .insert_header(support::multipart_content_type())
        .set_payload(payload)
        .to_request();
    let (status, body) = support::call(&app, req).await;

    assert_eq!(status, 404);
    assert_eq!(body["message"], "Send order not found");
    assert!(support::stored_files(&state.upload_dir).is_empty());
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn trips_survive_completed_payments() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, owner_email) = support::insert_user(pool, "Traveler", Role::User).await;

    let trip = trips::insert(pool, owner_id, &new_trip()).await.unwrap();
    let payment = payments::insert(pool, &pending_payment(ListingRef::Trip(trip.id)))
        .await
        .unwrap();

    let outcome = transition::apply(pool, payment.id, PaymentStatus::Completed)
        .await
        .unwrap();
    assert!(!outcome.listing_deleted);
    assert_eq!(outcome.recipient.as_ref().map(|u| u.email.as_str()), Some(owner_email.as_str()));
    let email = outcome.notification().expect("verdict email");
    assert_eq!(email.subject, "Payment Verified - PakCarry");

    assert!(trips::find(pool, trip.id).await.unwrap().is_some());
    let listed: Vec<Uuid> = trips::list_all(pool).await.unwrap().into_iter().map(|t| t.id).collect();
    assert!(listed.contains(&trip.id));
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn send_order_completion_deletes_and_notifies() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, owner_email) = support::insert_user(pool, "Sender", Role::User).await;

    let order = send_orders::insert(pool, owner_id, &new_send_order()).await.unwrap();
    let payment = payments::insert(pool, &pending_payment(ListingRef::SendOrder(order.id)))
        .await
        .unwrap();

    let outcome = transition::apply(pool, payment.id, PaymentStatus::Completed)
        .await
        .unwrap();
    assert!(outcome.listing_deleted);
    assert_eq!(
        outcome.recipient.map(|u| u.email),
        Some(owner_email),
        "owner is read before the listing is removed"
    );
    assert!(send_orders::find(pool, order.id).await.unwrap().is_none());
    let open = available_listings::<SendOrder>(pool, ListingScope::All).await.unwrap();
    assert!(open.iter().all(|o| o.id != order.id));
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn non_completed_payments_leave_listings_visible() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, _) = support::insert_user(pool, "Owner", Role::User).await;

    let rejected = orders::insert(pool, owner_id, &new_order()).await.unwrap();
    let waiting = orders::insert(pool, owner_id, &new_order()).await.unwrap();

    let failed = payments::insert(pool, &pending_payment(ListingRef::Order(rejected.id)))
        .await
        .unwrap();
    payments::insert(pool, &pending_payment(ListingRef::Order(waiting.id)))
        .await
        .unwrap();

    let outcome = transition::apply(pool, failed.id, PaymentStatus::Failed).await.unwrap();
    assert!(!outcome.listing_deleted);
    assert_eq!(
        outcome.change,
        StatusChange::Changed {
            from: PaymentStatus::Pending,
            to: PaymentStatus::Failed
        }
    );

    let first = available_order_ids(pool).await;
    assert!(first.contains(&rejected.id));
    assert!(first.contains(&waiting.id));
    assert_eq!(first, available_order_ids(pool).await);
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn completed_payment_only_hides_listings_of_its_own_type() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, _) = support::insert_user(pool, "Owner", Role::User).await;

    let order = orders::insert(pool, owner_id, &new_order()).await.unwrap();
    let mismatched = payments::insert(pool, &pending_payment(ListingRef::SendOrder(order.id)))
        .await
        .unwrap();
    payments::set_status(pool, mismatched.id, PaymentStatus::Completed)
        .await
        .unwrap();

    assert!(available_order_ids(pool).await.contains(&order.id));

    let matching = payments::insert(pool, &pending_payment(ListingRef::Order(order.id)))
        .await
        .unwrap();
    payments::set_status(pool, matching.id, PaymentStatus::Completed)
        .await
        .unwrap();

    assert!(!available_order_ids(pool).await.contains(&order.id));
    let own = available_listings::<Order>(pool, ListingScope::Owner(owner_id)).await.unwrap();
    assert!(own.is_empty());
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn completed_status_hides_listing_without_payment() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, _) = support::insert_user(pool, "Owner", Role::User).await;
    let (other_id, _) = support::insert_user(pool, "Other", Role::User).await;

    let done = orders::insert(pool, owner_id, &new_order()).await.unwrap();
    let open = orders::insert(pool, owner_id, &new_order()).await.unwrap();
    let foreign = orders::insert(pool, other_id, &new_order()).await.unwrap();
    set_order_created_at(pool, done.id, 30).await;
    set_order_created_at(pool, open.id, 20).await;
    set_order_created_at(pool, foreign.id, 10).await;

    let changes = OrderChanges {
        status: Some(ListingStatus::Completed),
        ..OrderChanges::default()
    };
    orders::update(pool, done.id, &changes).await.unwrap();

    let ids = available_order_ids(pool).await;
    assert!(!ids.contains(&done.id));
    assert_eq!(ids, vec![foreign.id, open.id], "newest first");

    let mine: Vec<Uuid> = available_listings::<Order>(pool, ListingScope::Owner(owner_id))
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(mine, vec![open.id]);
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn only_owner_or_admin_may_change_a_trip() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (owner_id, owner_email) = support::insert_user(pool, "Traveler", Role::User).await;
    let (stranger_id, stranger_email) = support::insert_user(pool, "Stranger", Role::User).await;
    let (admin_id, admin_email) = support::insert_user(pool, "Admin", Role::Admin).await;
    let trip = trips::insert(pool, owner_id, &new_trip()).await.unwrap();

    let state = web::Data::new(support::build_state(test_db.pool.clone()));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(api::configure),
    )
    .await;

    let req = TestRequest::patch()
        .uri(&format!("/trip/{}", trip.id))
        .insert_header(("Authorization", support::bearer(stranger_id, Role::User, &stranger_email)))
        .set_json(json!({ "price": 3000 }))
        .to_request();
    let (status, _) = support::call(&app, req).await;
    assert_eq!(status, 403);

    let req = TestRequest::patch()
        .uri(&format!("/trip/{}", trip.id))
        .insert_header(("Authorization", support::bearer(owner_id, Role::User, &owner_email)))
        .set_json(json!({ "price": 3000 }))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["trip"]["price"], 3000.0);
    assert_eq!(body["trip"]["name"], "Hamza");

    let req = TestRequest::delete()
        .uri(&format!("/trip/{}", trip.id))
        .insert_header(("Authorization", support::bearer(admin_id, Role::Admin, &admin_email)))
        .to_request();
    let (status, _) = support::call(&app, req).await;
    assert_eq!(status, 200);

    let req = TestRequest::get().uri(&format!("/trip/{}", trip.id)).to_request();
    let (status, _) = support::call(&app, req).await;
    assert_eq!(status, 404);
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn login_issues_a_usable_token() {
    let test_db = support::init_test_db().await;
    let (_, email) = support::insert_user(&test_db.pool, "Member", Role::User).await;

    let state = web::Data::new(support::build_state(test_db.pool.clone()));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(api::configure),
    )
    .await;

    let req = TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": email.to_uppercase(), "password": "wrong-password" }))
        .to_request();
    let (status, _) = support::call(&app, req).await;
    assert_eq!(status, 401);

    let req = TestRequest::post()
        .uri("/users/login")
        .set_json(json!({ "email": email, "password": support::PASSWORD }))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["user"]["role"], "user");
    let token = body["token"].as_str().expect("token").to_string();

    let req = TestRequest::get()
        .uri("/orders/user-orders")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!([]));
}

#[actix_web::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn admin_lists_and_deletes_users() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;
    let (admin_id, admin_email) = support::insert_user(pool, "Admin", Role::Admin).await;
    let (member_id, member_email) = support::insert_user(pool, "Member", Role::User).await;
    let admin = support::bearer(admin_id, Role::Admin, &admin_email);

    let state = web::Data::new(support::build_state(test_db.pool.clone()));
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(api::configure),
    )
    .await;

    std::fs::write(state.upload_dir.join("1700000000000-parcel.png"), b"png").unwrap();
    let order = orders::insert(
        pool,
        member_id,
        &NewOrder {
            images: vec!["1700000000000-parcel.png".to_string()],
            ..new_order()
        },
    )
    .await
    .unwrap();

    let req = TestRequest::get()
        .uri("/users/all")
        .insert_header(("Authorization", admin.clone()))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200);
    let users = body.as_array().expect("array body");
    assert_eq!(users.len(), 2);
    assert!(users.iter().any(|u| u["email"] == member_email.as_str()));
    assert!(users.iter().all(|u| u.get("passwordHash").is_none()
        && u.get("password_hash").is_none()));

    let req = TestRequest::delete()
        .uri(&format!("/users/{member_id}"))
        .insert_header(("Authorization", admin.clone()))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 200, "{body}");
    assert_eq!(body["message"], "User deleted successfully");

    assert!(orders::find(pool, order.id).await.unwrap().is_none());
    assert!(support::stored_files(&state.upload_dir).is_empty());

    let req = TestRequest::delete()
        .uri(&format!("/users/{member_id}"))
        .insert_header(("Authorization", admin))
        .to_request();
    let (status, body) = support::call(&app, req).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User not found");
}
