// src/validation.rs
//
// Field-keyed input checks for every create/update endpoint. Nothing in here
// touches the database; existence checks happen in the handlers.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::orders::{NewOrder, OrderChanges};
use crate::db::payments::NewPayment;
use crate::db::send_orders::{NewSendOrder, SendOrderChanges};
use crate::db::trips::{NewTrip, TripChanges, TripSearch};
use crate::error::{AppError, FieldErrors};
use crate::models::{ListingKind, ListingStatus, PaymentMethod};
use crate::uploads::Form;

pub const MAX_WEIGHT_KG: f64 = 40.0;
pub const MIN_TRIP_PRICE: f64 = 100.0;
pub const MIN_TRANSACTION_ID_LEN: usize = 5;

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

/// Sender phone on orders: optional `+`, 10 to 15 digits.
pub fn is_contact_phone(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"^\+?\d{10,15}$").is_match(value)
}

/// Pakistani mobile number, e.g. `+923001234567`.
pub fn is_pk_phone(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"^\+92\d{10}$").is_match(value)
}

pub fn is_letters_only(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    pattern(&RE, r"^[A-Za-z\s]+$").is_match(value)
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp of which only the date is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "true" | "on" | "1" | "yes")
}

fn required_text(form: &Form, errors: &mut FieldErrors, field: &str, message: &str) -> Option<String> {
    match form.text(field) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, message);
            None
        }
    }
}

fn required_date(form: &Form, errors: &mut FieldErrors, field: &str, message: &str) -> Option<NaiveDate> {
    let raw = required_text(form, errors, field, message)?;
    let parsed = parse_date(&raw);
    if parsed.is_none() {
        errors.add(field, "Please enter a valid date (YYYY-MM-DD)");
    }
    parsed
}

fn required_positive(form: &Form, errors: &mut FieldErrors, field: &str, message: &str) -> Option<f64> {
    let raw = required_text(form, errors, field, message)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Some(v),
        _ => {
            errors.add(field, format!("{field} must be a positive number"));
            None
        }
    }
}

fn check_date_range(errors: &mut FieldErrors, earliest: Option<NaiveDate>, last: Option<NaiveDate>) {
    if let (Some(earliest), Some(last)) = (earliest, last) {
        if last < earliest {
            errors.add("lastDate", "Last date must be equal to or after earliest date");
        }
    }
}

fn optional_status(form: &Form, errors: &mut FieldErrors) -> Option<ListingStatus> {
    let raw = form.text("status")?;
    match raw.parse() {
        Ok(status) => Some(status),
        Err(_) => {
            errors.add("status", "Status must be one of: pending, in-progress, completed");
            None
        }
    }
}

fn status_only<T: Default>(form: &Form, set: impl FnOnce(&mut T, ListingStatus)) -> Option<Result<T, AppError>> {
    if !form.only("status") {
        return None;
    }
    let mut errors = FieldErrors::new();
    let mut changes = T::default();
    match optional_status(form, &mut errors) {
        Some(status) => set(&mut changes, status),
        None => errors.add("status", "Status must be one of: pending, in-progress, completed"),
    }
    Some(errors.into_result(changes))
}

struct OrderFields {
    sender_name: Option<String>,
    sender_phone: Option<String>,
    earliest_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    from: Option<String>,
    to: Option<String>,
    weight: Option<f64>,
}

fn order_fields(form: &Form, errors: &mut FieldErrors) -> OrderFields {
    let sender_name = required_text(form, errors, "senderName", "Please enter Full Name");
    let sender_phone = required_text(form, errors, "senderPhone", "Please enter contact number");
    if let Some(phone) = &sender_phone {
        if !is_contact_phone(phone) {
            errors.add("senderPhone", "Please enter a valid phone number");
        }
    }
    let earliest_date = required_date(form, errors, "earliestDate", "Please select the earliest delivery date");
    let last_date = required_date(form, errors, "lastDate", "Please select the last delivery date");
    check_date_range(errors, earliest_date, last_date);
    let from = required_text(form, errors, "from", "Please enter the origin city");
    let to = required_text(form, errors, "to", "Please enter the destination city");
    let weight = required_positive(form, errors, "weight", "Please enter the package weight i.e 40kg maximum");

    OrderFields {
        sender_name,
        sender_phone,
        earliest_date,
        last_date,
        from,
        to,
        weight,
    }
}

pub fn new_order(form: &Form) -> Result<NewOrder, AppError> {
    let mut errors = FieldErrors::new();
    let f = order_fields(form, &mut errors);

    match f {
        OrderFields {
            sender_name: Some(sender_name),
            sender_phone: Some(sender_phone),
            earliest_date: Some(earliest_date),
            last_date: Some(last_date),
            from: Some(from),
            to: Some(to),
            weight: Some(weight),
        } if errors.is_empty() => Ok(NewOrder {
            sender_name,
            sender_phone,
            earliest_date,
            last_date,
            from,
            to,
            weight,
            description: form.text("description").map(str::to_string),
            images: form.files.clone(),
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

/// Either a status-only update or a full edit carrying every required field.
pub fn order_changes(form: &Form) -> Result<OrderChanges, AppError> {
    if let Some(result) = status_only(form, |c: &mut OrderChanges, s| c.status = Some(s)) {
        return result;
    }

    let mut errors = FieldErrors::new();
    let f = order_fields(form, &mut errors);
    let status = optional_status(form, &mut errors);

    errors.into_result(OrderChanges {
        sender_name: f.sender_name,
        sender_phone: f.sender_phone,
        earliest_date: f.earliest_date,
        last_date: f.last_date,
        from: f.from,
        to: f.to,
        weight: f.weight,
        description: form.text("description").map(str::to_string),
        images: (!form.files.is_empty()).then(|| form.files.clone()),
        status,
    })
}

struct SendOrderFields {
    earliest_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    from: Option<String>,
    to: Option<String>,
    weight: Option<f64>,
    receiver_name: Option<String>,
    receiver_phone: Option<String>,
}

fn send_order_fields(form: &Form, errors: &mut FieldErrors, today: NaiveDate) -> SendOrderFields {
    let earliest_date = required_date(form, errors, "earliestDate", "Please select the earliest delivery date");
    if let Some(date) = earliest_date {
        if date < today {
            errors.add("earliestDate", "Date cannot be in the past");
        }
    }
    let last_date = required_date(form, errors, "lastDate", "Please select the last delivery date");
    check_date_range(errors, earliest_date, last_date);
    let from = required_text(form, errors, "from", "Please enter the origin city");
    let to = required_text(form, errors, "to", "Please enter the destination city");
    let weight = required_positive(form, errors, "weight", "Please enter the package weight");
    if let Some(weight) = weight {
        if weight > MAX_WEIGHT_KG {
            errors.add("weight", "Package weight cannot exceed 40kg");
        }
    }
    let receiver_name = required_text(form, errors, "receiverName", "Please Enter Receiver Name");
    if let Some(name) = &receiver_name {
        if !is_letters_only(name) {
            errors.add("receiverName", "Receiver name must only contain letters");
        }
    }
    let receiver_phone = required_text(form, errors, "receiverPhone", "Please enter receiver phone No");
    if let Some(phone) = &receiver_phone {
        if !is_pk_phone(phone) {
            errors.add(
                "receiverPhone",
                "Please Enter Valid Phone Number, Must Start with +92 (e.g., +923001234567)",
            );
        }
    }

    SendOrderFields {
        earliest_date,
        last_date,
        from,
        to,
        weight,
        receiver_name,
        receiver_phone,
    }
}

pub fn new_send_order(form: &Form, today: NaiveDate) -> Result<NewSendOrder, AppError> {
    let mut errors = FieldErrors::new();
    let f = send_order_fields(form, &mut errors, today);
    let terms_accepted = form.text("termsAccepted").map(parse_flag).unwrap_or(false);
    if !terms_accepted {
        errors.add("termsAccepted", "Please agree to the Terms & Conditions");
    }

    match f {
        SendOrderFields {
            earliest_date: Some(earliest_date),
            last_date: Some(last_date),
            from: Some(from),
            to: Some(to),
            weight: Some(weight),
            receiver_name: Some(receiver_name),
            receiver_phone: Some(receiver_phone),
        } if errors.is_empty() => Ok(NewSendOrder {
            earliest_date,
            last_date,
            from,
            to,
            weight,
            description: form.text("description").map(str::to_string),
            receiver_name,
            receiver_phone,
            terms_accepted,
            images: form.files.clone(),
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn send_order_changes(form: &Form, today: NaiveDate) -> Result<SendOrderChanges, AppError> {
    if let Some(result) = status_only(form, |c: &mut SendOrderChanges, s| c.status = Some(s)) {
        return result;
    }

    let mut errors = FieldErrors::new();
    let f = send_order_fields(form, &mut errors, today);
    let status = optional_status(form, &mut errors);

    errors.into_result(SendOrderChanges {
        earliest_date: f.earliest_date,
        last_date: f.last_date,
        from: f.from,
        to: f.to,
        weight: f.weight,
        description: form.text("description").map(str::to_string),
        receiver_name: f.receiver_name,
        receiver_phone: f.receiver_phone,
        images: (!form.files.is_empty()).then(|| form.files.clone()),
        status,
    })
}

/// JSON body for trip create and update; on update absent fields are kept.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub space: Option<f64>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub agree: Option<bool>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_trip_phone(errors: &mut FieldErrors, phone: &Option<String>) {
    if let Some(phone) = phone {
        if !is_pk_phone(phone) {
            errors.add("phone", "Phone number must start with +92 and contain 10 digits");
        }
    }
}

fn check_trip_date(errors: &mut FieldErrors, raw: &Option<String>, today: NaiveDate) -> Option<NaiveDate> {
    let raw = non_blank(raw)?;
    match parse_date(&raw) {
        Some(date) if date < today => {
            errors.add("date", "Date cannot be in the past");
            None
        }
        Some(date) => Some(date),
        None => {
            errors.add("date", "Please enter a valid date (YYYY-MM-DD)");
            None
        }
    }
}

fn check_trip_space(errors: &mut FieldErrors, space: Option<f64>) {
    if let Some(space) = space {
        if !(space > 0.0) {
            errors.add("space", "Please specify available space (in KG)");
        } else if space > MAX_WEIGHT_KG {
            errors.add("space", "Package weight cannot exceed 40kg");
        }
    }
}

fn check_trip_price(errors: &mut FieldErrors, price: Option<f64>) {
    if let Some(price) = price {
        if price < 0.0 {
            errors.add("price", "Price cannot be negative");
        } else if price < MIN_TRIP_PRICE {
            errors.add("price", "Price should be at least 100");
        }
    }
}

pub fn new_trip(input: &TripInput, today: NaiveDate) -> Result<NewTrip, AppError> {
    let mut errors = FieldErrors::new();

    let from = non_blank(&input.from);
    if from.is_none() {
        errors.add("from", "Please select your departure city");
    }
    let to = non_blank(&input.to);
    if to.is_none() {
        errors.add("to", "Please select your destination city");
    }
    if non_blank(&input.date).is_none() {
        errors.add("date", "Please provide your travel date");
    }
    let date = check_trip_date(&mut errors, &input.date, today);
    if input.space.is_none() {
        errors.add("space", "Please specify available space (in KG)");
    }
    check_trip_space(&mut errors, input.space);
    if input.price.is_none() {
        errors.add("price", "Please enter the price for your trip");
    }
    check_trip_price(&mut errors, input.price);
    if input.agree != Some(true) {
        errors.add("agree", "You must agree to terms");
    }
    let name = non_blank(&input.name);
    if name.is_none() {
        errors.add("name", "Please provide your full name");
    }
    let phone = non_blank(&input.phone);
    if phone.is_none() {
        errors.add("phone", "Please provide your phone number");
    }
    check_trip_phone(&mut errors, &phone);

    match (name, phone, from, to, date, input.space, input.price) {
        (Some(name), Some(phone), Some(from), Some(to), Some(date), Some(space), Some(price))
            if errors.is_empty() =>
        {
            Ok(NewTrip {
                name,
                phone,
                from,
                to,
                date,
                space,
                price,
                description: non_blank(&input.description).unwrap_or_default(),
                agree: true,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

/// Only the supplied fields are checked and changed.
pub fn trip_changes(input: &TripInput, today: NaiveDate) -> Result<TripChanges, AppError> {
    let mut errors = FieldErrors::new();

    let phone = non_blank(&input.phone);
    check_trip_phone(&mut errors, &phone);
    let date = check_trip_date(&mut errors, &input.date, today);
    check_trip_space(&mut errors, input.space);
    check_trip_price(&mut errors, input.price);
    if input.agree == Some(false) {
        errors.add("agree", "You must agree to terms");
    }

    errors.into_result(TripChanges {
        name: non_blank(&input.name),
        phone,
        from: non_blank(&input.from),
        to: non_blank(&input.to),
        date,
        space: input.space,
        price: input.price,
        description: input.description.clone(),
    })
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripSearchQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub fn trip_search(query: &TripSearchQuery) -> Result<TripSearch, AppError> {
    let mut errors = FieldErrors::new();
    let mut date = |field: &str, raw: &Option<String>| {
        let raw = non_blank(raw)?;
        let parsed = parse_date(&raw);
        if parsed.is_none() {
            errors.add(field, "Please enter a valid date (YYYY-MM-DD)");
        }
        parsed
    };
    let start_date = date("startDate", &query.start_date);
    let end_date = date("endDate", &query.end_date);

    errors.into_result(TripSearch {
        name: non_blank(&query.name),
        phone: non_blank(&query.phone),
        from: non_blank(&query.from),
        to: non_blank(&query.to),
        start_date,
        end_date,
    })
}

pub fn new_payment(form: &Form) -> Result<NewPayment, AppError> {
    let mut errors = FieldErrors::new();

    let kind = match form.text("orderType") {
        None => {
            errors.add("orderType", "Order type is required");
            None
        }
        Some(raw) => match raw.parse::<ListingKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.add("orderType", "Order type must be one of: order, sendOrder, trip");
                None
            }
        },
    };

    let order_id = match form.text("orderId") {
        None => {
            errors.add("orderId", "Order ID is required");
            None
        }
        Some(raw) => match Uuid::parse_str(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("orderId", "Order ID is not valid");
                None
            }
        },
    };

    let method = match form.text("method") {
        None => {
            errors.add("method", "Payment method is required");
            None
        }
        Some(raw) => match raw.parse::<PaymentMethod>() {
            Ok(method) => Some(method),
            Err(_) => {
                errors.add(
                    "method",
                    "Payment method must be one of: easypaisa, bank, jazzcash, paypal, google",
                );
                None
            }
        },
    };

    let transaction_id = match form.text("transactionId") {
        None => {
            errors.add("transactionId", "Transaction ID is required");
            None
        }
        Some(raw) if raw.chars().count() < MIN_TRANSACTION_ID_LEN => {
            errors.add(
                "transactionId",
                "Transaction ID must be at least 5 characters long",
            );
            None
        }
        Some(raw) => Some(raw.to_string()),
    };

    let amount = match form.text("amount") {
        None => {
            errors.add("amount", "Amount is required");
            None
        }
        Some(raw) => match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v > 0.0 => Some(v),
            _ => {
                errors.add("amount", "Amount must be a positive number");
                None
            }
        },
    };

    let screenshot = form.files.first().cloned();
    if screenshot.is_none() {
        errors.add("screenshot", "Please upload a payment screenshot");
    }

    match (kind, order_id, method, transaction_id, amount, screenshot) {
        (Some(kind), Some(order_id), Some(method), Some(transaction_id), Some(amount), Some(screenshot))
            if errors.is_empty() =>
        {
            Ok(NewPayment {
                target: kind.at(order_id),
                method,
                transaction_id,
                amount,
                screenshot,
            })
        }
        _ => Err(AppError::Validation(errors)),
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FeedbackInput {
    pub name: Option<String>,
    pub feedback: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub name: String,
    pub feedback: String,
    pub rating: i32,
}

pub fn new_feedback(input: &FeedbackInput) -> Result<NewFeedback, AppError> {
    let mut errors = FieldErrors::new();
    let name = non_blank(&input.name);
    if name.is_none() {
        errors.add("name", "Please enter your name");
    }
    let feedback = non_blank(&input.feedback);
    if feedback.is_none() {
        errors.add("feedback", "Please write a feedback");
    }
    let rating = input.rating.unwrap_or(5);
    if !(1..=5).contains(&rating) {
        errors.add("rating", "Rating must be between 1 and 5");
    }

    match (name, feedback) {
        (Some(name), Some(feedback)) if errors.is_empty() => Ok(NewFeedback {
            name,
            feedback,
            rating,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ContactInput {
    pub name: Option<String>,
    pub message: Option<String>,
}

pub fn new_contact(input: &ContactInput) -> Result<(String, String), AppError> {
    let mut errors = FieldErrors::new();
    let name = non_blank(&input.name);
    if name.is_none() {
        errors.add("name", "Please Enter Your Name");
    }
    let message = non_blank(&input.message);
    if message.is_none() {
        errors.add("message", "Write Your Message");
    }

    match (name, message) {
        (Some(name), Some(message)) => Ok((name, message)),
        _ => Err(AppError::Validation(errors)),
    }
}
