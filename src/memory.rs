use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    EducationalContent, Evaluation, EvaluationResult, ForumComment, ForumPost, NewContent,
    NewEvaluation, NewEvaluationResult, NewForumComment, NewForumPost, NewProfile,
    NewTutoringRequest, Profile, RequestPatch, TutoringRequest,
};
use crate::store::{
    ContentFilter, EvaluationFilter, RequestFilter, RequestOrder, Store, StoreResult,
};

/// In-process `Store` used by the unit tests. Rows live in insertion order;
/// filters and orderings mirror the SQL issued by `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    pub profiles: Mutex<Vec<Profile>>,
    pub content: Mutex<Vec<EducationalContent>>,
    pub evaluations: Mutex<Vec<Evaluation>>,
    pub results: Mutex<Vec<EvaluationResult>>,
    pub requests: Mutex<Vec<TutoringRequest>>,
    pub posts: Mutex<Vec<ForumPost>>,
    pub comments: Mutex<Vec<ForumComment>>,
}

fn take<T>(rows: Vec<T>, limit: Option<i64>) -> Vec<T> {
    match limit {
        Some(limit) => rows.into_iter().take(limit.max(0) as usize).collect(),
        None => rows,
    }
}

fn content_matches(filter: &ContentFilter, row: &EducationalContent) -> bool {
    filter.subject.map_or(true, |s| row.subject == s)
        && filter.education_level.map_or(true, |l| row.education_level == l)
        && filter.created_by.map_or(true, |id| row.created_by == Some(id))
}

fn evaluation_matches(filter: &EvaluationFilter, row: &Evaluation) -> bool {
    filter.education_level.map_or(true, |l| row.education_level == l)
        && filter.created_by.map_or(true, |id| row.created_by == Some(id))
}

fn request_matches(filter: &RequestFilter, row: &TutoringRequest) -> bool {
    filter.student_id.map_or(true, |id| row.student_id == id)
        && filter.tutor_id.map_or(true, |id| row.tutor_id == Some(id))
        && (filter.statuses.is_empty() || filter.statuses.contains(&row.status))
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let profiles = self.profiles.lock().await;
        Ok(profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn fetch_profiles(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let profiles = self.profiles.lock().await;
        Ok(profiles
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_profile(&self, profile: &NewProfile) -> StoreResult<Profile> {
        let mut profiles = self.profiles.lock().await;
        if profiles.iter().any(|p| p.id == profile.id) {
            return Err(StoreError::Constraint(format!(
                "profile {} already exists",
                profile.id
            )));
        }
        let now = Utc::now();
        let row = Profile {
            id: profile.id,
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            age: profile.age,
            role: profile.role,
            education_level: profile.education_level,
            created_at: now,
            updated_at: now,
        };
        profiles.push(row.clone());
        Ok(row)
    }

    async fn insert_content(
        &self,
        created_by: Uuid,
        content: &NewContent,
    ) -> StoreResult<EducationalContent> {
        let now = Utc::now();
        let row = EducationalContent {
            id: Uuid::new_v4(),
            subject: content.subject,
            title: content.title.clone(),
            description: content.description.clone(),
            content: content.content.clone(),
            education_level: content.education_level,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        self.content.lock().await.push(row.clone());
        Ok(row)
    }

    async fn fetch_content(&self, id: Uuid) -> StoreResult<Option<EducationalContent>> {
        let content = self.content.lock().await;
        Ok(content.iter().find(|c| c.id == id).cloned())
    }

    async fn list_content(
        &self,
        filter: &ContentFilter,
        limit: Option<i64>,
    ) -> StoreResult<Vec<EducationalContent>> {
        let content = self.content.lock().await;
        let mut rows: Vec<_> = content
            .iter()
            .filter(|c| content_matches(filter, c))
            .cloned()
            .collect();
        rows.sort_by_key(|c| Reverse(c.created_at));
        Ok(take(rows, limit))
    }

    async fn count_content(&self, filter: &ContentFilter) -> StoreResult<i64> {
        let content = self.content.lock().await;
        Ok(content.iter().filter(|c| content_matches(filter, c)).count() as i64)
    }

    async fn insert_evaluation(
        &self,
        created_by: Uuid,
        evaluation: &NewEvaluation,
    ) -> StoreResult<Evaluation> {
        let row = Evaluation {
            id: Uuid::new_v4(),
            subject: evaluation.subject,
            title: evaluation.title.clone(),
            description: evaluation.description.clone(),
            education_level: evaluation.education_level,
            questions: evaluation.questions.clone(),
            created_by: Some(created_by),
            created_at: Utc::now(),
        };
        self.evaluations.lock().await.push(row.clone());
        Ok(row)
    }

    async fn fetch_evaluation(&self, id: Uuid) -> StoreResult<Option<Evaluation>> {
        let evaluations = self.evaluations.lock().await;
        Ok(evaluations.iter().find(|e| e.id == id).cloned())
    }

    async fn fetch_evaluations(&self, ids: &[Uuid]) -> StoreResult<Vec<Evaluation>> {
        let evaluations = self.evaluations.lock().await;
        Ok(evaluations
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn list_evaluations(&self, filter: &EvaluationFilter) -> StoreResult<Vec<Evaluation>> {
        let evaluations = self.evaluations.lock().await;
        let mut rows: Vec<_> = evaluations
            .iter()
            .filter(|e| evaluation_matches(filter, e))
            .cloned()
            .collect();
        rows.sort_by_key(|e| Reverse(e.created_at));
        Ok(rows)
    }

    async fn count_evaluations(&self, filter: &EvaluationFilter) -> StoreResult<i64> {
        let evaluations = self.evaluations.lock().await;
        Ok(evaluations
            .iter()
            .filter(|e| evaluation_matches(filter, e))
            .count() as i64)
    }

    async fn insert_result(&self, result: &NewEvaluationResult) -> StoreResult<EvaluationResult> {
        let row = EvaluationResult {
            id: Uuid::new_v4(),
            evaluation_id: result.evaluation_id,
            student_id: result.student_id,
            answers: result.answers.clone(),
            score: result.score,
            completed_at: Utc::now(),
        };
        self.results.lock().await.push(row.clone());
        Ok(row)
    }

    async fn find_result(
        &self,
        evaluation_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<Option<EvaluationResult>> {
        let results = self.results.lock().await;
        Ok(results
            .iter()
            .find(|r| r.evaluation_id == evaluation_id && r.student_id == student_id)
            .cloned())
    }

    async fn list_results(
        &self,
        student_id: Uuid,
        limit: Option<i64>,
    ) -> StoreResult<Vec<EvaluationResult>> {
        let results = self.results.lock().await;
        let mut rows: Vec<_> = results
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by_key(|r| Reverse(r.completed_at));
        Ok(take(rows, limit))
    }

    async fn count_results(&self, student_id: Uuid) -> StoreResult<i64> {
        let results = self.results.lock().await;
        Ok(results.iter().filter(|r| r.student_id == student_id).count() as i64)
    }

    async fn insert_request(&self, request: &NewTutoringRequest) -> StoreResult<TutoringRequest> {
        let now = Utc::now();
        let row = TutoringRequest {
            id: Uuid::new_v4(),
            student_id: request.student_id,
            tutor_id: None,
            subject: request.subject,
            description: request.description.clone(),
            status: crate::models::TutoringStatus::Pending,
            scheduled_date: None,
            created_at: now,
            updated_at: now,
        };
        self.requests.lock().await.push(row.clone());
        Ok(row)
    }

    async fn fetch_request(&self, id: Uuid) -> StoreResult<Option<TutoringRequest>> {
        let requests = self.requests.lock().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn update_request(
        &self,
        id: Uuid,
        patch: &RequestPatch,
    ) -> StoreResult<Option<TutoringRequest>> {
        let mut requests = self.requests.lock().await;
        let Some(row) = requests.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        row.status = patch.status;
        if let Some(tutor_id) = patch.tutor_id {
            row.tutor_id = Some(tutor_id);
        }
        if let Some(scheduled_date) = patch.scheduled_date {
            row.scheduled_date = Some(scheduled_date);
        }
        row.updated_at = patch.updated_at;
        Ok(Some(row.clone()))
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        order: RequestOrder,
        limit: Option<i64>,
    ) -> StoreResult<Vec<TutoringRequest>> {
        let requests = self.requests.lock().await;
        let mut rows: Vec<_> = requests
            .iter()
            .filter(|r| request_matches(filter, r))
            .cloned()
            .collect();
        match order {
            RequestOrder::NewestCreated => rows.sort_by_key(|r| Reverse(r.created_at)),
            RequestOrder::RecentlyUpdated => rows.sort_by_key(|r| Reverse(r.updated_at)),
            RequestOrder::SoonestScheduled => {
                rows.sort_by_key(|r| (r.scheduled_date.is_none(), r.scheduled_date))
            }
        }
        Ok(take(rows, limit))
    }

    async fn count_requests(&self, filter: &RequestFilter) -> StoreResult<i64> {
        let requests = self.requests.lock().await;
        Ok(requests
            .iter()
            .filter(|r| request_matches(filter, r))
            .count() as i64)
    }

    async fn insert_post(&self, post: &NewForumPost) -> StoreResult<ForumPost> {
        let now = Utc::now();
        let row = ForumPost {
            id: Uuid::new_v4(),
            author_id: post.author_id,
            subject: post.subject,
            title: post.title.clone(),
            content: post.content.clone(),
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().await.push(row.clone());
        Ok(row)
    }

    async fn fetch_post(&self, id: Uuid) -> StoreResult<Option<ForumPost>> {
        let posts = self.posts.lock().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self, limit: Option<i64>) -> StoreResult<Vec<ForumPost>> {
        let posts = self.posts.lock().await;
        let mut rows = posts.clone();
        rows.sort_by_key(|p| Reverse(p.created_at));
        Ok(take(rows, limit))
    }

    async fn insert_comment(&self, comment: &NewForumComment) -> StoreResult<ForumComment> {
        let row = ForumComment {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content.clone(),
            created_at: Utc::now(),
        };
        self.comments.lock().await.push(row.clone());
        Ok(row)
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<ForumComment>> {
        let comments = self.comments.lock().await;
        let mut rows: Vec<_> = comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.created_at);
        Ok(rows)
    }
}

/// Profile fixtures shared by the module tests.
pub async fn seed_profile(store: &MemoryStore, name: &str, role: crate::models::Role) -> Profile {
    let id = Uuid::new_v4();
    store
        .insert_profile(&NewProfile {
            id,
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            full_name: name.to_string(),
            age: None,
            role,
            education_level: None,
        })
        .await
        .expect("insert profile")
}
