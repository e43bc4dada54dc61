// src/visibility.rs
//
// Open listings: orders and send-orders that are neither marked completed nor
// covered by a completed payment of their own type.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{ListingKind, ListingStatus, Order, PaymentStatus, SendOrder};

/// Listing types that drop out of public reads once a payment completes.
/// Trips deliberately do not implement this.
pub trait PaymentGated: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const KIND: ListingKind;
}

impl PaymentGated for Order {
    const KIND: ListingKind = ListingKind::Order;
}

impl PaymentGated for SendOrder {
    const KIND: ListingKind = ListingKind::SendOrder;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    All,
    Owner(Uuid),
}

/// Single round trip: the paid-for exclusion is a `NOT EXISTS` anti-join on
/// `payments` instead of a second scan and a client-side set difference.
pub fn available_query<L: PaymentGated>(scope: ListingScope) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT l.* FROM {} l WHERE l.status <> ",
        L::KIND.table()
    ));
    qb.push_bind(ListingStatus::Completed.as_str());

    if let ListingScope::Owner(user_id) = scope {
        qb.push(" AND l.user_id = ").push_bind(user_id);
    }

    qb.push(" AND NOT EXISTS (SELECT 1 FROM payments p WHERE p.order_type = ")
        .push_bind(L::KIND.as_str())
        .push(" AND p.status = ")
        .push_bind(PaymentStatus::Completed.as_str())
        .push(" AND p.order_id = l.id)")
        .push(" ORDER BY l.created_at DESC");

    qb
}

pub async fn available_listings<L: PaymentGated>(
    pool: &PgPool,
    scope: ListingScope,
) -> Result<Vec<L>, sqlx::Error> {
    let mut qb = available_query::<L>(scope);
    let listings = qb.build_query_as::<L>().fetch_all(pool).await?;

    log::debug!(
        "available {} listings scope={:?} count={}",
        L::KIND,
        scope,
        listings.len()
    );
    Ok(listings)
}
