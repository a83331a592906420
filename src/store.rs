//! The narrow relational surface every operation is handed.
//!
//! Filters are equality or in-list only, matching what the hosted backend
//! exposes. Implementations: `db::PgStore` in production and
//! `memory::MemoryStore` under test.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    EducationLevel, EducationalContent, Evaluation, EvaluationResult, ForumComment, ForumPost,
    NewContent, NewEvaluation, NewEvaluationResult, NewForumComment, NewForumPost, NewProfile,
    NewTutoringRequest, Profile, RequestPatch, Subject, TutoringRequest, TutoringStatus,
};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub subject: Option<Subject>,
    pub education_level: Option<EducationLevel>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationFilter {
    pub education_level: Option<EducationLevel>,
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub student_id: Option<Uuid>,
    pub tutor_id: Option<Uuid>,
    /// Empty means any status.
    pub statuses: Vec<TutoringStatus>,
}

impl RequestFilter {
    pub fn for_student(student_id: Uuid) -> Self {
        Self {
            student_id: Some(student_id),
            ..Self::default()
        }
    }

    pub fn for_tutor(tutor_id: Uuid) -> Self {
        Self {
            tutor_id: Some(tutor_id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: TutoringStatus) -> Self {
        self.statuses.push(status);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestOrder {
    #[default]
    NewestCreated,
    RecentlyUpdated,
    /// Soonest first; unscheduled requests sort last.
    SoonestScheduled,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn fetch_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;
    async fn fetch_profiles(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>>;
    async fn insert_profile(&self, profile: &NewProfile) -> StoreResult<Profile>;

    async fn insert_content(
        &self,
        created_by: Uuid,
        content: &NewContent,
    ) -> StoreResult<EducationalContent>;
    async fn fetch_content(&self, id: Uuid) -> StoreResult<Option<EducationalContent>>;
    async fn list_content(
        &self,
        filter: &ContentFilter,
        limit: Option<i64>,
    ) -> StoreResult<Vec<EducationalContent>>;
    async fn count_content(&self, filter: &ContentFilter) -> StoreResult<i64>;

    async fn insert_evaluation(
        &self,
        created_by: Uuid,
        evaluation: &NewEvaluation,
    ) -> StoreResult<Evaluation>;
    async fn fetch_evaluation(&self, id: Uuid) -> StoreResult<Option<Evaluation>>;
    async fn fetch_evaluations(&self, ids: &[Uuid]) -> StoreResult<Vec<Evaluation>>;
    async fn list_evaluations(&self, filter: &EvaluationFilter) -> StoreResult<Vec<Evaluation>>;
    async fn count_evaluations(&self, filter: &EvaluationFilter) -> StoreResult<i64>;

    async fn insert_result(&self, result: &NewEvaluationResult) -> StoreResult<EvaluationResult>;
    async fn find_result(
        &self,
        evaluation_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<Option<EvaluationResult>>;
    async fn list_results(
        &self,
        student_id: Uuid,
        limit: Option<i64>,
    ) -> StoreResult<Vec<EvaluationResult>>;
    async fn count_results(&self, student_id: Uuid) -> StoreResult<i64>;

    async fn insert_request(&self, request: &NewTutoringRequest) -> StoreResult<TutoringRequest>;
    async fn fetch_request(&self, id: Uuid) -> StoreResult<Option<TutoringRequest>>;
    async fn update_request(
        &self,
        id: Uuid,
        patch: &RequestPatch,
    ) -> StoreResult<Option<TutoringRequest>>;
    async fn list_requests(
        &self,
        filter: &RequestFilter,
        order: RequestOrder,
        limit: Option<i64>,
    ) -> StoreResult<Vec<TutoringRequest>>;
    async fn count_requests(&self, filter: &RequestFilter) -> StoreResult<i64>;

    async fn insert_post(&self, post: &NewForumPost) -> StoreResult<ForumPost>;
    async fn fetch_post(&self, id: Uuid) -> StoreResult<Option<ForumPost>>;
    async fn list_posts(&self, limit: Option<i64>) -> StoreResult<Vec<ForumPost>>;
    async fn insert_comment(&self, comment: &NewForumComment) -> StoreResult<ForumComment>;
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<ForumComment>>;
}

/// Resolves display names for a set of profile ids, the store's only join.
pub async fn names_by_id(
    store: &dyn Store,
    ids: impl IntoIterator<Item = Uuid>,
) -> StoreResult<std::collections::HashMap<Uuid, String>> {
    let mut ids: Vec<Uuid> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Ok(std::collections::HashMap::new());
    }

    let profiles = store.fetch_profiles(&ids).await?;
    Ok(profiles
        .into_iter()
        .map(|profile| (profile.id, profile.full_name))
        .collect())
}
