use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::auth::login,
        crate::api::users::list_users,
        crate::api::users::delete_user,
        crate::api::orders::create_order,
        crate::api::orders::list_orders,
        crate::api::orders::list_user_orders,
        crate::api::orders::get_order,
        crate::api::orders::update_order,
        crate::api::orders::delete_order,
        crate::api::send_orders::create_send_order,
        crate::api::send_orders::list_send_orders,
        crate::api::send_orders::list_user_send_orders,
        crate::api::send_orders::get_send_order,
        crate::api::send_orders::update_send_order,
        crate::api::send_orders::delete_send_order,
        crate::api::trips::create_trip,
        crate::api::trips::list_trips,
        crate::api::trips::list_user_trips,
        crate::api::trips::search_trips,
        crate::api::trips::get_trip,
        crate::api::trips::update_trip,
        crate::api::trips::delete_trip,
        crate::api::payments::create_payment,
        crate::api::payments::list_payments,
        crate::api::payments::list_listing_payments,
        crate::api::payments::update_payment_status,
        crate::api::payments::delete_payment,
        crate::api::community::create_feedback,
        crate::api::community::list_feedback,
        crate::api::community::create_contact,
        crate::api::community::list_contacts
    ),
    components(
        schemas(
            crate::api::auth::LoginRequest,
            crate::api::auth::LoginResponse,
            crate::api::auth::LoginUser,
            crate::api::payments::UpdatePaymentStatus,
            crate::validation::TripInput,
            crate::validation::TripSearchQuery,
            crate::validation::FeedbackInput,
            crate::validation::ContactInput,
            crate::models::Order,
            crate::models::SendOrder,
            crate::models::Trip,
            crate::models::Feedback,
            crate::models::Contact,
            crate::models::UserProfile,
            crate::models::ListingStatus,
            crate::models::ListingKind,
            crate::models::PaymentStatus,
            crate::models::PaymentMethod,
            crate::models::Role
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login"),
        (name = "users", description = "Account administration"),
        (name = "orders", description = "Parcels waiting for a traveler"),
        (name = "send-orders", description = "Parcels with a named receiver"),
        (name = "trips", description = "Travelers offering luggage space"),
        (name = "payments", description = "Manually verified payments"),
        (name = "community", description = "Feedback and contact messages")
    )
)]
pub struct ApiDoc;

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
