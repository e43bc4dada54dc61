// src/notifier.rs
//
// Transactional email. Sends are detached from the request: callers never wait
// for delivery and never see its errors.

use chrono::Utc;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SmtpConfig;
use crate::models::{Order, Payment, PaymentStatus, SendOrder, Trip, UserSummary};

const BRAND: &str = "PakCarry";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build error: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("recipient lookup failed: {0}")]
    Lookup(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Clone)]
pub enum Mailer {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        from: Mailbox,
    },
    /// No SMTP configured: messages are logged and dropped.
    Disabled,
}

impl Mailer {
    pub fn from_config(smtp: Option<&SmtpConfig>) -> Result<Self, NotifyError> {
        let Some(smtp) = smtp else {
            log::warn!("SMTP not configured, outgoing email is disabled");
            return Ok(Mailer::Disabled);
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .build();
        let from = smtp.from.parse::<Mailbox>()?;

        Ok(Mailer::Smtp { transport, from })
    }

    pub async fn send(&self, email: Email) -> Result<(), NotifyError> {
        match self {
            Mailer::Smtp { transport, from } => {
                let message = Message::builder()
                    .from(from.clone())
                    .to(email.to.parse::<Mailbox>()?)
                    .subject(email.subject.as_str())
                    .header(ContentType::TEXT_HTML)
                    .body(email.html)?;
                transport.send(message).await?;
                log::info!("email sent to={} subject={:?}", email.to, email.subject);
            }
            Mailer::Disabled => {
                log::info!(
                    "email skipped (mailer disabled) to={} subject={:?}",
                    email.to,
                    email.subject
                );
            }
        }
        Ok(())
    }

    /// Sends in the background; failures are logged only.
    pub fn dispatch(&self, email: Email) {
        let mailer = self.clone();
        actix_web::rt::spawn(async move {
            let to = email.to.clone();
            if let Err(e) = mailer.send(email).await {
                log::error!("email delivery failed to={to}: {e}");
            }
        });
    }

    /// Looks the user up and sends in the background; a missing user is not an error.
    pub fn dispatch_to_user<F>(&self, pool: PgPool, user_id: Uuid, build: F)
    where
        F: FnOnce(&UserSummary) -> Email + 'static,
    {
        let mailer = self.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = deliver_to_user(&mailer, &pool, user_id, build).await {
                log::error!("email delivery failed user_id={user_id}: {e}");
            }
        });
    }
}

async fn deliver_to_user<F>(
    mailer: &Mailer,
    pool: &PgPool,
    user_id: Uuid,
    build: F,
) -> Result<(), NotifyError>
where
    F: FnOnce(&UserSummary) -> Email,
{
    let row = sqlx::query_as::<_, (Uuid, String, String)>(
        "SELECT id, name, email FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    let Some((id, name, email)) = row else {
        log::warn!("email skipped, user not found user_id={user_id}");
        return Ok(());
    };

    let user = UserSummary { id, name, email };
    mailer.send(build(&user)).await
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn detail_rows(rows: &[(&str, String)]) -> String {
    rows.iter()
        .map(|(label, value)| {
            format!(
                "<p><strong>{}:</strong> {}</p>",
                label,
                escape_html(value)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn layout(
    title: &str,
    user: &UserSummary,
    intro: &[&str],
    details_title: &str,
    details: &str,
    notice: Option<&str>,
) -> String {
    let intro = intro
        .iter()
        .map(|p| format!(r#"<p style="font-size: 16px; color: #333;">{p}</p>"#))
        .collect::<Vec<_>>()
        .join("\n");
    let notice = notice
        .map(|n| {
            format!(
                r#"<div style="background-color: #fff3cd; border: 1px solid #ffeeba; padding: 15px; border-radius: 8px; margin: 20px 0;">
  <p style="color: #856404; font-size: 14px; margin: 0; text-align: center;">{n}</p>
</div>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px; background-color: #f9f9f9;">
<div style="max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px;">
<h2 style="color: #0ac6ae; text-align: center; margin-bottom: 20px;">{title}</h2>
<p style="font-size: 16px; color: #333;">Hello {name},</p>
{intro}
<div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
<h3 style="color: #0ac6ae; margin-bottom: 15px;">{details_title}</h3>
{details}
</div>
{notice}
<p style="font-size: 14px; color: #666; text-align: center;">Thank you for choosing {BRAND}.</p>
<div style="text-align: center; margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee;">
<p style="font-size: 12px; color: #0ac6ae;">{BRAND} Team</p>
</div>
</div>
</div>"#,
        name = escape_html(&user.name),
    )
}

const OFF_PLATFORM_WARNING: &str = "<strong>Important Alert:</strong> Please make payments <u>only through the official PakCarry website</u>. Payments made outside our platform will <strong>not be refunded</strong>.";

pub fn order_confirmation(user: &UserSummary, order: &Order) -> Email {
    let mut rows = vec![
        ("Name", order.sender_name.clone()),
        ("Contact", order.sender_phone.clone()),
        ("From", order.from.clone()),
        ("To", order.to.clone()),
        ("Weight", format!("{} kg", order.weight)),
        ("Earliest Date", order.earliest_date.to_string()),
        ("Last Date", order.last_date.to_string()),
    ];
    if let Some(description) = &order.description {
        rows.push(("Description", description.clone()));
    }

    Email {
        to: user.email.clone(),
        subject: format!("Order Confirmation - {BRAND}"),
        html: layout(
            "Order Confirmation",
            user,
            &[
                "Your order has been created successfully!",
                "Travelers going to your destination city will contact you, or you can also reach out to them directly.",
            ],
            "Order Details:",
            &detail_rows(&rows),
            Some(OFF_PLATFORM_WARNING),
        ),
    }
}

pub fn send_order_confirmation(user: &UserSummary, order: &SendOrder) -> Email {
    let mut rows = vec![
        ("Receiver", order.receiver_name.clone()),
        ("Contact", order.receiver_phone.clone()),
        ("From", order.from.clone()),
        ("To", order.to.clone()),
        ("Weight", format!("{} kg", order.weight)),
        ("Earliest Date", order.earliest_date.to_string()),
        ("Last Date", order.last_date.to_string()),
    ];
    if let Some(description) = &order.description {
        rows.push(("Description", description.clone()));
    }

    Email {
        to: user.email.clone(),
        subject: format!("Send Order Confirmation - {BRAND}"),
        html: layout(
            "Send Order Confirmation",
            user,
            &[
                "Your send order has been created successfully!",
                "Travelers going to your destination city will contact you, or you can also reach out to them directly.",
            ],
            "Order Details:",
            &detail_rows(&rows),
            Some(OFF_PLATFORM_WARNING),
        ),
    }
}

pub fn trip_confirmation(user: &UserSummary, trip: &Trip) -> Email {
    let mut rows = vec![
        ("Traveler", trip.name.clone()),
        ("Contact", trip.phone.clone()),
        ("From", trip.from.clone()),
        ("To", trip.to.clone()),
        ("Travel Date", trip.date.to_string()),
        ("Available Space", format!("{} kg", trip.space)),
        ("Price", format!("Rs. {}", trip.price)),
    ];
    if !trip.description.is_empty() {
        rows.push(("Description", trip.description.clone()));
    }

    Email {
        to: user.email.clone(),
        subject: format!("Trip Confirmation - {BRAND}"),
        html: layout(
            "Trip Confirmation",
            user,
            &[
                "Your trip has been created successfully and is visible to all senders!",
                "Senders will contact you shortly, or you can directly reach out to senders for your destination.",
            ],
            "Trip Details:",
            &detail_rows(&rows),
            None,
        ),
    }
}

/// Verdict email for a payment that reached a terminal status; `None` otherwise.
pub fn payment_outcome(user: &UserSummary, payment: &Payment) -> Option<Email> {
    let (subject, message, verdict, notice) = match payment.status {
        PaymentStatus::Completed => (
            "Payment Verified",
            "Your payment has been successfully verified by our team.",
            "Verified",
            None,
        ),
        PaymentStatus::Failed => (
            "Payment Rejected",
            "Your payment has been rejected by our team. Please contact support for assistance.",
            "Rejected",
            Some("<strong>Important:</strong> If you believe this is an error, please contact our support team immediately."),
        ),
        PaymentStatus::Pending => return None,
    };

    let rows = [
        ("Transaction ID", payment.transaction_id.clone()),
        ("Payment Method", payment.method.to_string()),
        ("Amount", format!("Rs. {}", payment.amount)),
        ("Status", verdict.to_string()),
        ("Date", Utc::now().format("%Y-%m-%d").to_string()),
    ];

    Some(Email {
        to: user.email.clone(),
        subject: format!("{subject} - {BRAND}"),
        html: layout(
            subject,
            user,
            &[message],
            "Payment Details:",
            &detail_rows(&rows),
            notice,
        ),
    })
}
