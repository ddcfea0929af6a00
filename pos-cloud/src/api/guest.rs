//! Guest-facing features: polls, feedback and valet parking

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Feedback, FeedbackCreate, FeedbackEntry, Poll, PollCreate, PollOption, VALET_WITH_US,
    ValetInput, ValetTicket,
};
use shared::tenant::{TenantQuery, lenient_string, parse_restaurant_id};

use crate::db::guest::{self as store, PollRow};
use crate::email::templates;
use crate::error::internal;
use crate::state::AppState;
use crate::util::non_empty;

use super::{ApiResult, CreatedResult, PathId, created};

const MIN_POLL_OPTIONS: usize = 2;
const VALET_DELIVERED: &str = "Delivered";

// ── Polls ──

fn assemble_polls(rows: Vec<PollRow>, options: Vec<PollOption>) -> Vec<Poll> {
    let mut by_poll: HashMap<i64, Vec<PollOption>> = HashMap::new();
    for option in options {
        by_poll.entry(option.poll_id).or_default().push(option);
    }
    rows.into_iter()
        .map(|row| {
            let options = by_poll.remove(&row.id).unwrap_or_default();
            let total_votes = options.iter().map(|o| i64::from(o.votes)).sum();
            Poll {
                id: row.id,
                restaurant_id: row.restaurant_id,
                question: row.question,
                created_at: row.created_at,
                options,
                total_votes,
            }
        })
        .collect()
}

fn poll_options(raw: &[String]) -> AppResult<Vec<String>> {
    let options: Vec<String> = raw
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(str::to_owned)
        .collect();
    if options.len() < MIN_POLL_OPTIONS {
        return Err(AppError::validation("A poll needs at least two options")
            .with_detail("minOptions", MIN_POLL_OPTIONS as u64));
    }
    Ok(options)
}

/// GET /api/polls
pub async fn list_polls(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<Poll>> {
    let restaurant_id = query.restaurant_id()?;
    let rows = store::list_polls(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let options = store::options_for_polls(&state.pool, &ids)
        .await
        .map_err(internal)?;
    Ok(Json(assemble_polls(rows, options)))
}

/// POST /api/polls
pub async fn create_poll(
    State(state): State<AppState>,
    Json(req): Json<PollCreate>,
) -> CreatedResult<Poll> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let question = non_empty(req.question.as_deref()).ok_or_else(|| AppError::required("question"))?;
    let options = poll_options(&req.options)?;

    let (row, options) = store::create_poll(&state.pool, restaurant_id, question, &options)
        .await
        .map_err(internal)?;
    let poll = assemble_polls(vec![row], options)
        .pop()
        .ok_or_else(|| AppError::new(ErrorCode::InternalError))?;
    Ok(created(poll))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
}

/// PUT /api/poll-options/{id}/vote
pub async fn vote(
    State(state): State<AppState>,
    PathId(option_id): PathId,
    Query(query): Query<TenantQuery>,
    body: Option<Json<TenantBody>>,
) -> ApiResult<PollOption> {
    let raw = body
        .and_then(|Json(b)| b.restaurant_id)
        .or(query.restaurant_id);
    let restaurant_id = parse_restaurant_id(raw.as_deref())?;

    store::vote(&state.pool, restaurant_id, option_id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::PollOptionNotFound).with_detail("id", option_id))
}

/// DELETE /api/polls/{id}
pub async fn delete_poll(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete_poll(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::PollNotFound).with_detail("id", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Feedback ──

/// Display date (`27 Jul 2025`) and time (`1:38 PM`) in the restaurant's offset
fn feedback_entry(feedback: Feedback, offset: FixedOffset) -> FeedbackEntry {
    let local = feedback.created_at.with_timezone(&offset);
    FeedbackEntry {
        date: local.format("%d %b %Y").to_string(),
        time: local.format("%-I:%M %p").to_string(),
        feedback,
    }
}

/// GET /api/feedback
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<FeedbackEntry>> {
    let restaurant_id = query.restaurant_id()?;
    let rows = store::list_feedback(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(
        rows.into_iter()
            .map(|f| feedback_entry(f, state.local_offset))
            .collect(),
    ))
}

/// POST /api/feedback
pub async fn create_feedback(
    State(state): State<AppState>,
    Json(req): Json<FeedbackCreate>,
) -> CreatedResult<Feedback> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let feedback_type =
        non_empty(req.feedback_type.as_deref()).ok_or_else(|| AppError::required("type"))?;
    let message = non_empty(req.message.as_deref()).ok_or_else(|| AppError::required("message"))?;
    if let Some(rating) = req.rating
        && !(1..=5).contains(&rating)
    {
        return Err(AppError::validation("rating must be between 1 and 5").with_detail("rating", rating));
    }

    let feedback = store::create_feedback(
        &state.pool,
        restaurant_id,
        non_empty(req.customer_name.as_deref()),
        non_empty(req.email.as_deref()),
        feedback_type,
        message,
        req.rating,
    )
    .await
    .map_err(internal)?;
    Ok(created(feedback))
}

// ── Valet ──

fn check_valet_status(raw: Option<&str>) -> AppResult<()> {
    match non_empty(raw) {
        None => Ok(()),
        Some(s) if s == VALET_WITH_US || s == VALET_DELIVERED => Ok(()),
        Some(s) => Err(AppError::validation("status must be With Us or Delivered")
            .with_detail("status", s)),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValetCreated {
    #[serde(flatten)]
    pub ticket: ValetTicket,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// POST /api/valet
///
/// The ticket is stored first; a failed token email only adds a warning.
pub async fn create_valet(
    State(state): State<AppState>,
    Json(input): Json<ValetInput>,
) -> CreatedResult<ValetCreated> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let token_number =
        non_empty(input.token_number.as_deref()).ok_or_else(|| AppError::required("tokenNumber"))?;
    let owner_name =
        non_empty(input.owner_name.as_deref()).ok_or_else(|| AppError::required("ownerName"))?;
    let car_number =
        non_empty(input.car_number.as_deref()).ok_or_else(|| AppError::required("carNumber"))?;
    check_valet_status(input.status.as_deref())?;

    let ticket = store::create_valet(
        &state.pool,
        restaurant_id,
        token_number,
        owner_name,
        car_number,
        &input,
    )
    .await
    .map_err(internal)?;

    let (email_sent, warning) = match ticket.email.as_deref().and_then(|e| non_empty(Some(e))) {
        None => (false, None),
        Some(email) => match state.mailer.send(templates::valet_token(email, &ticket)).await {
            Ok(()) => (true, None),
            Err(e) => {
                tracing::warn!(restaurant_id, ticket_id = ticket.id, error = %e, "Valet token email not delivered");
                (
                    false,
                    Some("Ticket saved, but the token email could not be sent".to_owned()),
                )
            }
        },
    };

    Ok(created(ValetCreated {
        ticket,
        email_sent,
        warning,
    }))
}

/// GET /api/valet
pub async fn list_valet(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<ValetTicket>> {
    let restaurant_id = query.restaurant_id()?;
    let tickets = store::list_valet(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(tickets))
}

/// PUT /api/valet/{id}
pub async fn update_valet(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<ValetInput>,
) -> ApiResult<ValetTicket> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    check_valet_status(input.status.as_deref())?;
    store::update_valet(&state.pool, restaurant_id, id, &input)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::ValetTicketNotFound).with_detail("id", id))
}

/// DELETE /api/valet/{id}
pub async fn delete_valet(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete_valet(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::ValetTicketNotFound).with_detail("id", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn polls_carry_options_and_totals() {
        let now = Utc::now();
        let rows = vec![
            PollRow {
                id: 1,
                restaurant_id: 1,
                question: "Best dessert?".into(),
                created_at: now,
            },
            PollRow {
                id: 2,
                restaurant_id: 1,
                question: "Live music?".into(),
                created_at: now,
            },
        ];
        let option = |id, poll_id, votes| PollOption {
            id,
            poll_id,
            option_text: format!("Option {id}"),
            votes,
        };
        let polls = assemble_polls(rows, vec![option(1, 1, 3), option(2, 1, 4), option(3, 2, 0)]);

        assert_eq!(polls[0].options.len(), 2);
        assert_eq!(polls[0].total_votes, 7);
        assert_eq!(polls[1].total_votes, 0);
    }

    #[test]
    fn poll_needs_two_real_options() {
        assert_eq!(
            poll_options(&["Yes".into(), " No ".into(), "".into()]).unwrap(),
            vec!["Yes".to_owned(), "No".to_owned()]
        );
        assert!(poll_options(&["Yes".into(), "  ".into()]).is_err());
    }

    #[test]
    fn feedback_display_times() {
        let feedback = Feedback {
            id: 1,
            restaurant_id: 1,
            customer_name: None,
            email: None,
            feedback_type: "Compliment".into(),
            message: "Lovely biryani".into(),
            rating: Some(5),
            created_at: Utc.with_ymd_and_hms(2025, 7, 27, 8, 8, 0).unwrap(),
        };
        let entry = feedback_entry(feedback, shared::util::offset_from_minutes(330));
        assert_eq!(entry.date, "27 Jul 2025");
        assert_eq!(entry.time, "1:38 PM");
    }

    #[test]
    fn valet_statuses() {
        assert!(check_valet_status(None).is_ok());
        assert!(check_valet_status(Some("With Us")).is_ok());
        assert!(check_valet_status(Some("Delivered")).is_ok());
        assert!(check_valet_status(Some("Parked")).is_err());
    }
}
