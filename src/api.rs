// src/api.rs

pub mod auth;
pub mod community;
pub mod orders;
pub mod payments;
pub mod send_orders;
pub mod trips;
pub mod users;

use actix_web::{get, web, HttpResponse, Responder};

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("PakCarry API ready!")
}

/// Registers every route. Literal segments such as `/user-orders` go in
/// before the `/{id}` matchers of the same scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(auth::login)
        .service(users::list_users)
        .service(users::delete_user)
        .service(
            web::scope("/orders")
                .service(orders::list_user_orders)
                .service(orders::create_order)
                .service(orders::list_orders)
                .service(orders::get_order)
                .service(orders::update_order)
                .service(orders::delete_order),
        )
        .service(
            web::scope("/send-order")
                .service(send_orders::list_user_send_orders)
                .service(send_orders::create_send_order)
                .service(send_orders::list_send_orders)
                .service(send_orders::get_send_order)
                .service(send_orders::update_send_order)
                .service(send_orders::delete_send_order),
        )
        .service(
            web::scope("/trip")
                .service(trips::list_user_trips)
                .service(trips::search_trips)
                .service(trips::create_trip)
                .service(trips::list_trips)
                .service(trips::get_trip)
                .service(trips::update_trip)
                .service(trips::delete_trip),
        )
        .service(
            web::scope("/payments")
                .service(payments::create_payment)
                .service(payments::list_payments)
                .service(payments::list_listing_payments)
                .service(payments::update_payment_status)
                .service(payments::delete_payment),
        )
        .service(community::create_feedback)
        .service(community::list_feedback)
        .service(community::create_contact)
        .service(community::list_contacts);
}
