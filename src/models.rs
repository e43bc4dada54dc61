// src/models.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Declares a string-backed enum with `as_str`, `FromStr` and `Display`.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant::new($kind, other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ListingStatus {
    Pending,
    InProgress,
    Completed,
}

text_enum!(ListingStatus, "listing status", {
    Pending => "pending",
    InProgress => "in-progress",
    Completed => "completed",
});

/// Type tag of everything a payment can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ListingKind {
    Order,
    SendOrder,
    Trip,
}

text_enum!(ListingKind, "order type", {
    Order => "order",
    SendOrder => "sendOrder",
    Trip => "trip",
});

impl ListingKind {
    /// Backing table of the listing store for this kind.
    pub fn table(self) -> &'static str {
        match self {
            ListingKind::Order => "orders",
            ListingKind::SendOrder => "send_orders",
            ListingKind::Trip => "trips",
        }
    }

    /// Orders and send-orders disappear once paid; trips never do.
    pub fn is_payment_gated(self) -> bool {
        matches!(self, ListingKind::Order | ListingKind::SendOrder)
    }

    pub fn label(self) -> &'static str {
        match self {
            ListingKind::Order => "Order",
            ListingKind::SendOrder => "Send order",
            ListingKind::Trip => "Trip",
        }
    }

    pub fn at(self, id: Uuid) -> ListingRef {
        match self {
            ListingKind::Order => ListingRef::Order(id),
            ListingKind::SendOrder => ListingRef::SendOrder(id),
            ListingKind::Trip => ListingRef::Trip(id),
        }
    }
}

/// What a payment pays for. Serialized as `{"orderType": ..., "orderId": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "orderType", content = "orderId")]
pub enum ListingRef {
    #[serde(rename = "order")]
    Order(Uuid),
    #[serde(rename = "sendOrder")]
    SendOrder(Uuid),
    #[serde(rename = "trip")]
    Trip(Uuid),
}

impl ListingRef {
    pub fn kind(&self) -> ListingKind {
        match self {
            ListingRef::Order(_) => ListingKind::Order,
            ListingRef::SendOrder(_) => ListingKind::SendOrder,
            ListingRef::Trip(_) => ListingKind::Trip,
        }
    }

    pub fn id(&self) -> Uuid {
        match *self {
            ListingRef::Order(id) | ListingRef::SendOrder(id) | ListingRef::Trip(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

text_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Unchanged,
    Changed {
        from: PaymentStatus,
        to: PaymentStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("payment is already {from} and cannot become {to}")]
pub struct InvalidTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
}

impl PaymentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    /// `pending -> {completed, failed}`; re-applying the current status is a no-op.
    pub fn transition_to(self, next: PaymentStatus) -> Result<StatusChange, InvalidTransition> {
        if self == next {
            return Ok(StatusChange::Unchanged);
        }
        if self.is_terminal() {
            return Err(InvalidTransition {
                from: self,
                to: next,
            });
        }
        Ok(StatusChange::Changed {
            from: self,
            to: next,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Easypaisa,
    Bank,
    Jazzcash,
    Paypal,
    Google,
}

text_enum!(PaymentMethod, "payment method", {
    Easypaisa => "easypaisa",
    Bank => "bank",
    Jazzcash => "jazzcash",
    Paypal => "paypal",
    Google => "google",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

text_enum!(Role, "role", {
    User => "user",
    Admin => "admin",
});

fn decode_text<T>(row: &PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    let raw: String = row.try_get(column)?;
    raw.parse().map_err(|e: UnknownVariant| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub sender_name: String,
    pub sender_phone: String,
    pub earliest_date: NaiveDate,
    pub last_date: NaiveDate,
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(r: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Order {
            id: r.try_get("id")?,
            user_id: r.try_get("user_id")?,
            sender_name: r.try_get("sender_name")?,
            sender_phone: r.try_get("sender_phone")?,
            earliest_date: r.try_get("earliest_date")?,
            last_date: r.try_get("last_date")?,
            from: r.try_get("from_city")?,
            to: r.try_get("to_city")?,
            weight: r.try_get("weight")?,
            description: r.try_get("description")?,
            images: r.try_get("images")?,
            status: decode_text(r, "status")?,
            created_at: r.try_get("created_at")?,
            updated_at: r.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub earliest_date: NaiveDate,
    pub last_date: NaiveDate,
    pub from: String,
    pub to: String,
    pub weight: f64,
    pub description: Option<String>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub terms_accepted: bool,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for SendOrder {
    fn from_row(r: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(SendOrder {
            id: r.try_get("id")?,
            user_id: r.try_get("user_id")?,
            earliest_date: r.try_get("earliest_date")?,
            last_date: r.try_get("last_date")?,
            from: r.try_get("from_city")?,
            to: r.try_get("to_city")?,
            weight: r.try_get("weight")?,
            description: r.try_get("description")?,
            receiver_name: r.try_get("receiver_name")?,
            receiver_phone: r.try_get("receiver_phone")?,
            terms_accepted: r.try_get("terms_accepted")?,
            images: r.try_get("images")?,
            status: decode_text(r, "status")?,
            created_at: r.try_get("created_at")?,
            updated_at: r.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub from: String,
    pub to: String,
    pub date: NaiveDate,
    pub space: f64,
    pub price: f64,
    pub description: String,
    pub agree: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Trip {
    fn from_row(r: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Trip {
            id: r.try_get("id")?,
            user_id: r.try_get("user_id")?,
            name: r.try_get("name")?,
            phone: r.try_get("phone")?,
            from: r.try_get("from_city")?,
            to: r.try_get("to_city")?,
            date: r.try_get("travel_date")?,
            space: r.try_get("space")?,
            price: r.try_get("price")?,
            description: r.try_get("description")?,
            agree: r.try_get("agree")?,
            created_at: r.try_get("created_at")?,
            updated_at: r.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    #[serde(flatten)]
    pub target: ListingRef,
    pub method: PaymentMethod,
    pub transaction_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    pub screenshot: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Payment {
    fn from_row(r: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: ListingKind = decode_text(r, "order_type")?;
        let order_id: Uuid = r.try_get("order_id")?;

        Ok(Payment {
            id: r.try_get("id")?,
            target: kind.at(order_id),
            method: decode_text(r, "method")?,
            transaction_id: r.try_get("transaction_id")?,
            amount: r.try_get("amount")?,
            status: decode_text(r, "status")?,
            screenshot: r.try_get("screenshot")?,
            created_at: r.try_get("created_at")?,
            updated_at: r.try_get("updated_at")?,
        })
    }
}

/// Public part of the user owning a paid-for listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentWithOwner {
    #[serde(flatten)]
    pub payment: Payment,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(r: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            email: r.try_get("email")?,
            password_hash: r.try_get("password_hash")?,
            role: decode_text(r, "role")?,
        })
    }
}

/// User account as shown to admins; never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for UserProfile {
    fn from_row(r: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserProfile {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            email: r.try_get("email")?,
            role: decode_text(r, "role")?,
            created_at: r.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub feedback: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
