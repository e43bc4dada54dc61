// src/transition.rs
//
// Manual payment verification. A payment is reviewed once:
// `pending -> completed | failed`, and the verdict has side effects on the
// listing it pays for.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, payments};
use crate::error::AppError;
use crate::models::{ListingRef, Payment, PaymentStatus, StatusChange, UserSummary};
use crate::notifier::{self, Email};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SideEffects {
    pub delete_listing: bool,
    pub notify_owner: bool,
}

/// Completing removes orders and send-orders for good; trips stay.
pub fn side_effects(target: ListingRef, next: PaymentStatus) -> SideEffects {
    SideEffects {
        delete_listing: next == PaymentStatus::Completed && target.kind().is_payment_gated(),
        notify_owner: next.is_terminal(),
    }
}

pub fn parse_status(raw: Option<&str>) -> Result<PaymentStatus, AppError> {
    raw.map(str::trim)
        .and_then(|s| s.parse::<PaymentStatus>().ok())
        .ok_or_else(|| {
            AppError::invalid(
                "status",
                "Status must be one of: pending, completed, failed",
            )
        })
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub payment: Payment,
    pub change: StatusChange,
    pub listing_deleted: bool,
    pub recipient: Option<UserSummary>,
    /// Stored images of the deleted listing; removed from disk by the caller.
    pub released_images: Vec<String>,
}

impl Transition {
    /// Verdict email for the listing owner, when there is one to send.
    pub fn notification(&self) -> Option<Email> {
        if self.change == StatusChange::Unchanged {
            return None;
        }
        let recipient = self.recipient.as_ref()?;
        notifier::payment_outcome(recipient, &self.payment)
    }
}

/// Status write, owner lookup and listing deletion commit together. The owner
/// is read before the listing row goes away.
pub async fn apply(
    pool: &PgPool,
    payment_id: Uuid,
    next: PaymentStatus,
) -> Result<Transition, AppError> {
    let mut tx = pool.begin().await?;

    let Some(current) = payments::find_for_update(&mut *tx, payment_id).await? else {
        return Err(AppError::NotFound("Payment"));
    };

    let change = current
        .status
        .transition_to(next)
        .map_err(|e| AppError::invalid("status", e.to_string()))?;

    if change == StatusChange::Unchanged {
        tx.rollback().await?;
        return Ok(Transition {
            payment: current,
            change,
            listing_deleted: false,
            recipient: None,
            released_images: Vec::new(),
        });
    }

    let effects = side_effects(current.target, next);
    let payment = payments::set_status(&mut *tx, payment_id, next).await?;

    let recipient = if effects.notify_owner {
        db::listing_owner(&mut *tx, payment.target).await?
    } else {
        None
    };

    let released = if effects.delete_listing {
        let images = db::delete_paid_listing(&mut *tx, payment.target).await?;
        if images.is_none() {
            log::warn!(
                "completed payment {} references a missing {} {}",
                payment.id,
                payment.target.kind(),
                payment.target.id()
            );
        }
        images
    } else {
        None
    };
    let listing_deleted = released.is_some();

    tx.commit().await?;

    log::info!(
        "payment {} {} -> {} target={}:{} listing_deleted={}",
        payment.id,
        current.status,
        next,
        payment.target.kind(),
        payment.target.id(),
        listing_deleted
    );

    Ok(Transition {
        payment,
        change,
        listing_deleted,
        recipient,
        released_images: released.unwrap_or_default(),
    })
}
