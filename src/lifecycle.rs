//! Tutoring request lifecycle.
//!
//! ```text
//! pending --accept--> accepted --complete--> completed
//!    |                    |
//!    +------cancel--------+------cancel----> cancelled
//! ```
//!
//! Every operation reads the current row, asks [`transition`] for the next
//! state and writes the patch back. There is no compare-and-swap between the
//! read and the write, so two concurrent accepts resolve last-writer-wins.

use std::fmt;

use chrono::{NaiveDateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    NewTutoringRequest, Profile, RequestPatch, Role, Subject, TutoringRequest, TutoringStatus,
};
use crate::store::{RequestFilter, RequestOrder, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Accept,
    Complete,
    Cancel,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Event::Accept => "accept",
            Event::Complete => "complete",
            Event::Cancel => "cancel",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {event} a {from} tutoring request")]
pub struct TransitionRejected {
    pub from: TutoringStatus,
    pub event: Event,
}

pub fn transition(
    current: TutoringStatus,
    event: Event,
) -> Result<TutoringStatus, TransitionRejected> {
    use TutoringStatus::*;

    match (current, event) {
        (Pending, Event::Accept) => Ok(Accepted),
        (Accepted, Event::Complete) => Ok(Completed),
        (Pending | Accepted, Event::Cancel) => Ok(Cancelled),
        (from, event) => Err(TransitionRejected { from, event }),
    }
}

/// Parses the `YYYY-MM-DDTHH:MM` value a date-time picker submits. Seconds
/// are accepted but optional.
pub fn parse_schedule(raw: &str) -> AppResult<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation("select a date and time for the session"));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| {
            AppError::validation(format!(
                "invalid session date {raw:?}, expected YYYY-MM-DDTHH:MM"
            ))
        })
}

pub async fn create(
    store: &dyn Store,
    student: &Profile,
    subject: Subject,
    description: &str,
) -> AppResult<TutoringRequest> {
    if student.role != Role::Student {
        return Err(AppError::validation("only students can request tutoring"));
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::validation("describe what you need help with"));
    }

    let request = store
        .insert_request(&NewTutoringRequest {
            student_id: student.id,
            subject,
            description: description.to_string(),
        })
        .await?;

    info!(request_id = %request.id, student_id = %student.id, %subject, "tutoring request created");
    Ok(request)
}

pub async fn get(store: &dyn Store, request_id: Uuid) -> AppResult<TutoringRequest> {
    store
        .fetch_request(request_id)
        .await?
        .ok_or_else(|| AppError::not_found("tutoring request", request_id))
}

pub async fn accept(
    store: &dyn Store,
    request_id: Uuid,
    tutor: &Profile,
    scheduled_date: Option<NaiveDateTime>,
) -> AppResult<TutoringRequest> {
    if tutor.role != Role::Tutor {
        return Err(AppError::validation("only tutors can accept tutoring requests"));
    }
    let Some(scheduled_date) = scheduled_date else {
        return Err(AppError::validation("select a date and time for the session"));
    };

    let patch = RequestPatch {
        status: TutoringStatus::Accepted,
        tutor_id: Some(tutor.id),
        scheduled_date: Some(scheduled_date),
        updated_at: Utc::now(),
    };
    let request = apply(store, request_id, Event::Accept, patch).await?;

    info!(%request_id, tutor_id = %tutor.id, %scheduled_date, "tutoring request accepted");
    Ok(request)
}

pub async fn complete(store: &dyn Store, request_id: Uuid) -> AppResult<TutoringRequest> {
    let patch = RequestPatch {
        status: TutoringStatus::Completed,
        tutor_id: None,
        scheduled_date: None,
        updated_at: Utc::now(),
    };
    let request = apply(store, request_id, Event::Complete, patch).await?;

    info!(%request_id, "tutoring request completed");
    Ok(request)
}

/// Cancelling keeps any assigned tutor on the row.
pub async fn cancel(store: &dyn Store, request_id: Uuid) -> AppResult<TutoringRequest> {
    let patch = RequestPatch {
        status: TutoringStatus::Cancelled,
        tutor_id: None,
        scheduled_date: None,
        updated_at: Utc::now(),
    };
    let request = apply(store, request_id, Event::Cancel, patch).await?;

    info!(%request_id, "tutoring request cancelled");
    Ok(request)
}

pub async fn list(
    store: &dyn Store,
    filter: &RequestFilter,
    order: RequestOrder,
    limit: Option<i64>,
) -> AppResult<Vec<TutoringRequest>> {
    Ok(store.list_requests(filter, order, limit).await?)
}

async fn apply(
    store: &dyn Store,
    request_id: Uuid,
    event: Event,
    patch: RequestPatch,
) -> AppResult<TutoringRequest> {
    let current = get(store, request_id).await?;
    let next = transition(current.status, event)?;
    debug_assert_eq!(next, patch.status);
    if next.is_terminal() {
        debug!(%request_id, from = %current.status, to = %next, "tutoring request closed");
    }

    store
        .update_request(request_id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("tutoring request", request_id))
}
