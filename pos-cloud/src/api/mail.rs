//! Bill and offer emails with a PDF attachment

use axum::{Json, extract::State};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::tenant::{lenient_string, parse_restaurant_id};

use crate::email::{OutgoingEmail, templates};
use crate::state::AppState;
use crate::util::non_empty;

use super::ApiResult;

/// Decode a base64 PDF, with or without a `data:` URL prefix.
fn decode_pdf(raw: Option<&str>) -> AppResult<Vec<u8>> {
    let raw = non_empty(raw).ok_or_else(|| AppError::required("pdf"))?;
    let payload = match raw.split_once("base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => raw,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::validation("pdf must be base64-encoded").with_detail("field", "pdf"))?;
    if bytes.is_empty() {
        return Err(AppError::required("pdf"));
    }
    Ok(bytes)
}

fn email_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    trimmed.contains('@').then(|| trimmed.to_owned())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailSent {
    pub message: &'static str,
    pub recipients: usize,
}

async fn deliver(state: &AppState, email: OutgoingEmail, what: &'static str) -> ApiResult<MailSent> {
    let recipients = email.recipient_count();
    state.mailer.send(email).await.map_err(|e| {
        tracing::warn!(error = %e, kind = what, "Email not delivered");
        AppError::new(ErrorCode::EmailDeliveryFailed)
    })?;
    Ok(Json(MailSent {
        message: "Email sent successfully",
        recipients,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillMailRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pdf: Option<String>,
    #[serde(default, alias = "billno")]
    pub bill_no: Option<i64>,
}

/// POST /api/send-bill
pub async fn send_bill(
    State(state): State<AppState>,
    Json(req): Json<BillMailRequest>,
) -> ApiResult<MailSent> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let to = req
        .email
        .as_deref()
        .and_then(email_address)
        .ok_or_else(|| AppError::required("email"))?;
    let pdf = decode_pdf(req.pdf.as_deref())?;

    tracing::info!(restaurant_id, bill_no = req.bill_no, "Sending bill email");
    deliver(&state, templates::bill(&to, req.bill_no, pdf), "bill").await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferMailRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub offer_title: Option<String>,
    #[serde(default)]
    pub pdf: Option<String>,
}

/// POST /api/send-offer-email
pub async fn send_offer(
    State(state): State<AppState>,
    Json(req): Json<OfferMailRequest>,
) -> ApiResult<MailSent> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let mut recipients: Vec<String> = req.emails.iter().filter_map(|e| email_address(e)).collect();
    recipients.sort();
    recipients.dedup();
    if recipients.is_empty() {
        return Err(AppError::validation("At least one recipient email is required")
            .with_detail("field", "emails"));
    }
    let title =
        non_empty(req.offer_title.as_deref()).ok_or_else(|| AppError::required("offerTitle"))?;
    let pdf = decode_pdf(req.pdf.as_deref())?;

    tracing::info!(restaurant_id, recipients = recipients.len(), "Sending offer email");
    deliver(&state, templates::offer(recipients, title, pdf), "offer").await
}
