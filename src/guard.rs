use std::fmt;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Profile, Role, Subject};
use crate::session::SessionProvider;
use crate::store::Store;

/// Where a page sends a caller it cannot serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Login,
    CompleteProfile,
    Home(Role),
    /// Content list of one subject, for a missing content item.
    SubjectContent(Subject),
    StudentEvaluations,
    StudentTutoring,
    TutorRequests,
    Forum(Role),
}

impl Redirect {
    pub fn path(self) -> String {
        match self {
            Redirect::Login => "/auth/login".to_string(),
            Redirect::CompleteProfile => "/auth/complete-profile".to_string(),
            Redirect::Home(role) => format!("/dashboard/{role}"),
            Redirect::SubjectContent(subject) => format!("/dashboard/student/subjects/{subject}"),
            Redirect::StudentEvaluations => "/dashboard/student/evaluations".to_string(),
            Redirect::StudentTutoring => "/dashboard/student/tutoring".to_string(),
            Redirect::TutorRequests => "/dashboard/tutor/requests".to_string(),
            Redirect::Forum(role) => format!("/dashboard/{role}/forum"),
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Redirect::Login => "no active session; run `sign-in` first",
            Redirect::CompleteProfile => "profile missing; run `complete-profile` first",
            Redirect::Home(Role::Student) => "this page is for tutors; use the `student` commands",
            Redirect::Home(Role::Tutor) => "this page is for students; use the `tutor` commands",
            Redirect::SubjectContent(_) => "content not found; see `student content <subject>`",
            Redirect::StudentEvaluations => "evaluation not found; see `student evaluations`",
            Redirect::StudentTutoring => "tutoring request not found; see `student tutoring`",
            Redirect::TutorRequests => "tutoring request not found; see `tutor requests`",
            Redirect::Forum(_) => "forum post not found; see `forum list`",
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {} ({})", self.path(), self.hint())
    }
}

/// Outcome of loading the entity a page is about. A missing row routes the
/// caller elsewhere instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Redirect(Redirect),
}

impl<T> Lookup<T> {
    pub fn from_option(value: Option<T>, fallback: Redirect) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::Redirect(fallback),
        }
    }
}

/// Routes a `NotFound` failure of an operation to `fallback`; every other
/// error still propagates.
pub fn redirect_missing<T>(result: AppResult<T>, fallback: Redirect) -> AppResult<Lookup<T>> {
    match result {
        Ok(value) => Ok(Lookup::Found(value)),
        Err(AppError::NotFound { entity, id }) => {
            debug!(entity, %id, path = %fallback.path(), "missing entity");
            Ok(Lookup::Redirect(fallback))
        }
        Err(err) => Err(err),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    Granted(Profile),
    Redirect(Redirect),
}

/// The access check every authenticated page runs before loading data.
pub async fn require_role(
    session: &dyn SessionProvider,
    store: &dyn Store,
    expected: Role,
) -> AppResult<Gate> {
    let Some(user) = session.current_user().await? else {
        return Ok(Gate::Redirect(Redirect::Login));
    };

    let Some(profile) = store.fetch_profile(user.id).await? else {
        debug!(user_id = %user.id, "session without profile");
        return Ok(Gate::Redirect(Redirect::CompleteProfile));
    };

    if profile.role != expected {
        debug!(user_id = %user.id, role = %profile.role, %expected, "role mismatch");
        return Ok(Gate::Redirect(Redirect::Home(profile.role)));
    }

    Ok(Gate::Granted(profile))
}
