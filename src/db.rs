use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    EducationalContent, Evaluation, EvaluationResult, ForumComment, ForumPost, NewContent,
    NewEvaluation, NewEvaluationResult, NewForumComment, NewForumPost, NewProfile,
    NewTutoringRequest, Profile, Question, RequestPatch, TutoringRequest, TutoringStatus,
};
use crate::store::{
    ContentFilter, EvaluationFilter, RequestFilter, RequestOrder, Store, StoreResult,
};

const PROFILE_COLUMNS: &str =
    "id, email, full_name, age, role, education_level, created_at, updated_at";
const CONTENT_COLUMNS: &str =
    "id, subject, title, description, content, education_level, created_by, created_at, updated_at";
const EVALUATION_COLUMNS: &str =
    "id, subject, title, description, education_level, questions, created_by, created_at";
const RESULT_COLUMNS: &str = "id, evaluation_id, student_id, answers, score, completed_at";
const REQUEST_COLUMNS: &str = "id, student_id, tutor_id, subject, description, status, \
     scheduled_date, created_at, updated_at";
const POST_COLUMNS: &str = "id, author_id, subject, title, content, created_at, updated_at";
const COMMENT_COLUMNS: &str = "id, post_id, author_id, content, created_at";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Loads a small demo cohort: one tutor, two students, content, a quiz and
/// a pending request. Safe to run repeatedly.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let tutor_id = Uuid::parse_str("8a6c2f4e-1b3d-4c5e-9f70-1a2b3c4d5e6f")?;
    let profiles = vec![
        (tutor_id, "lucia.mendez@tutoria.gt", "Lucía Méndez", Some(27), "tutor", None),
        (
            Uuid::parse_str("2f1e0d9c-8b7a-4654-a3b2-c1d0e9f8a7b6")?,
            "diego.ramirez@tutoria.gt",
            "Diego Ramírez",
            Some(11),
            "student",
            Some("primaria"),
        ),
        (
            Uuid::parse_str("5c4b3a29-1807-4f6e-bd5c-4b3a29180706")?,
            "sofia.herrera@tutoria.gt",
            "Sofía Herrera",
            Some(15),
            "student",
            Some("basicos"),
        ),
    ];

    for (id, email, name, age, role, level) in &profiles {
        sqlx::query(
            r#"
            INSERT INTO tutoring_hub.profiles (id, email, full_name, age, role, education_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(age)
        .bind(role)
        .bind(level)
        .execute(pool)
        .await?;
    }

    let content = vec![
        (
            "0b9a8c7d-6e5f-4a3b-8c2d-1e0f9a8b7c6d",
            "matematicas",
            "primaria",
            "Fracciones básicas",
            "Una fracción representa partes de un todo: 1/2, 1/4, 3/4.",
        ),
        (
            "1c0b9d8e-7f6a-4b5c-9d3e-2f1a0b9c8d7e",
            "ciencias",
            "basicos",
            "La célula",
            "La célula es la unidad básica de la vida.",
        ),
    ];

    for (id, subject, level, title, body) in content {
        sqlx::query(
            r#"
            INSERT INTO tutoring_hub.educational_content
            (id, subject, title, content, education_level, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::parse_str(id)?)
        .bind(subject)
        .bind(title)
        .bind(body)
        .bind(level)
        .bind(tutor_id)
        .execute(pool)
        .await?;
    }

    let questions = vec![
        Question {
            prompt: "¿Cuánto es 1/2 + 1/4?".to_string(),
            options: vec!["3/4".into(), "2/6".into(), "1/8".into(), "2/4".into()],
            correct: 0,
        },
        Question {
            prompt: "¿Qué fracción es mayor?".to_string(),
            options: vec!["1/3".into(), "1/2".into(), "1/5".into(), "1/8".into()],
            correct: 1,
        },
    ];
    sqlx::query(
        r#"
        INSERT INTO tutoring_hub.evaluations
        (id, subject, title, education_level, questions, created_by)
        VALUES ($1, 'matematicas', 'Repaso de fracciones', 'primaria', $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(Uuid::parse_str("3e2d1c0b-9a8f-4e7d-8c6b-5a4f3e2d1c0b")?)
    .bind(Json(questions))
    .bind(tutor_id)
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO tutoring_hub.tutoring_requests (id, student_id, subject, description)
        VALUES ($1, $2, 'matematicas', 'No entiendo cómo sumar fracciones')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(Uuid::parse_str("4f3e2d1c-0b9a-4f8e-9d7c-6b5a4f3e2d1c")?)
    .bind(profiles[1].0)
    .execute(pool)
    .await
    .context("failed to seed tutoring request")?;

    Ok(())
}

/// `Store` backed by the Postgres schema in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        info!("postgres store ready");
        Self { pool }
    }
}

fn parse<T: FromStr<Err = StoreError>>(value: String) -> StoreResult<T> {
    value.parse()
}

fn parse_opt<T: FromStr<Err = StoreError>>(value: Option<String>) -> StoreResult<Option<T>> {
    value.map(|v| v.parse()).transpose()
}

/// Reports unique/foreign-key/check violations as constraint errors.
fn write_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.constraint().is_some() => {
            StoreError::Constraint(db.message().to_string())
        }
        _ => StoreError::Database(err),
    }
}

fn profile_from_row(row: &PgRow) -> StoreResult<Profile> {
    Ok(Profile {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        full_name: row.try_get("full_name")?,
        age: row.try_get("age")?,
        role: parse(row.try_get("role")?)?,
        education_level: parse_opt(row.try_get("education_level")?)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn content_from_row(row: &PgRow) -> StoreResult<EducationalContent> {
    Ok(EducationalContent {
        id: row.try_get("id")?,
        subject: parse(row.try_get("subject")?)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        content: row.try_get("content")?,
        education_level: parse(row.try_get("education_level")?)?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn evaluation_from_row(row: &PgRow) -> StoreResult<Evaluation> {
    let questions: Json<Vec<Question>> = row.try_get("questions")?;
    Ok(Evaluation {
        id: row.try_get("id")?,
        subject: parse(row.try_get("subject")?)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        education_level: parse(row.try_get("education_level")?)?,
        questions: questions.0,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

fn result_from_row(row: &PgRow) -> StoreResult<EvaluationResult> {
    Ok(EvaluationResult {
        id: row.try_get("id")?,
        evaluation_id: row.try_get("evaluation_id")?,
        student_id: row.try_get("student_id")?,
        answers: row.try_get("answers")?,
        score: row.try_get("score")?,
        completed_at: row.try_get("completed_at")?,
    })
}

fn request_from_row(row: &PgRow) -> StoreResult<TutoringRequest> {
    Ok(TutoringRequest {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        tutor_id: row.try_get("tutor_id")?,
        subject: parse(row.try_get("subject")?)?,
        description: row.try_get("description")?,
        status: parse(row.try_get("status")?)?,
        scheduled_date: row.try_get("scheduled_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn post_from_row(row: &PgRow) -> StoreResult<ForumPost> {
    Ok(ForumPost {
        id: row.try_get("id")?,
        author_id: row.try_get("author_id")?,
        subject: parse_opt(row.try_get("subject")?)?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> StoreResult<ForumComment> {
    Ok(ForumComment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

fn push_content_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContentFilter) {
    builder.push(" WHERE TRUE");
    if let Some(subject) = filter.subject {
        builder.push(" AND subject = ").push_bind(subject.as_str());
    }
    if let Some(level) = filter.education_level {
        builder.push(" AND education_level = ").push_bind(level.as_str());
    }
    if let Some(created_by) = filter.created_by {
        builder.push(" AND created_by = ").push_bind(created_by);
    }
}

fn push_evaluation_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &EvaluationFilter) {
    builder.push(" WHERE TRUE");
    if let Some(level) = filter.education_level {
        builder.push(" AND education_level = ").push_bind(level.as_str());
    }
    if let Some(created_by) = filter.created_by {
        builder.push(" AND created_by = ").push_bind(created_by);
    }
}

fn push_request_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RequestFilter) {
    builder.push(" WHERE TRUE");
    if let Some(student_id) = filter.student_id {
        builder.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(tutor_id) = filter.tutor_id {
        builder.push(" AND tutor_id = ").push_bind(tutor_id);
    }
    if !filter.statuses.is_empty() {
        let statuses: Vec<String> = filter
            .statuses
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();
        builder.push(" AND status = ANY(").push_bind(statuses).push(")");
    }
}

fn push_limit(builder: &mut QueryBuilder<'_, Postgres>, limit: Option<i64>) {
    if let Some(limit) = limit {
        builder.push(" LIMIT ").push_bind(limit);
    }
}

#[async_trait]
impl Store for PgStore {
    async fn fetch_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM tutoring_hub.profiles WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| profile_from_row(&row))
            .transpose()
    }

    async fn fetch_profiles(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM tutoring_hub.profiles WHERE id = ANY($1)");
        let rows = sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await?;
        rows.iter().map(profile_from_row).collect()
    }

    async fn insert_profile(&self, profile: &NewProfile) -> StoreResult<Profile> {
        let sql = format!(
            "INSERT INTO tutoring_hub.profiles (id, email, full_name, age, role, education_level) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {PROFILE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(profile.id)
            .bind(&profile.email)
            .bind(&profile.full_name)
            .bind(profile.age)
            .bind(profile.role.as_str())
            .bind(profile.education_level.map(|level| level.as_str()))
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        profile_from_row(&row)
    }

    async fn insert_content(
        &self,
        created_by: Uuid,
        content: &NewContent,
    ) -> StoreResult<EducationalContent> {
        let sql = format!(
            "INSERT INTO tutoring_hub.educational_content \
             (id, subject, title, description, content, education_level, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {CONTENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(content.subject.as_str())
            .bind(&content.title)
            .bind(&content.description)
            .bind(&content.content)
            .bind(content.education_level.as_str())
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        content_from_row(&row)
    }

    async fn fetch_content(&self, id: Uuid) -> StoreResult<Option<EducationalContent>> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM tutoring_hub.educational_content WHERE id = $1"
        );
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| content_from_row(&row))
            .transpose()
    }

    async fn list_content(
        &self,
        filter: &ContentFilter,
        limit: Option<i64>,
    ) -> StoreResult<Vec<EducationalContent>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM tutoring_hub.educational_content"
        ));
        push_content_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");
        push_limit(&mut builder, limit);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(content_from_row).collect()
    }

    async fn count_content(&self, filter: &ContentFilter) -> StoreResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tutoring_hub.educational_content");
        push_content_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn insert_evaluation(
        &self,
        created_by: Uuid,
        evaluation: &NewEvaluation,
    ) -> StoreResult<Evaluation> {
        let sql = format!(
            "INSERT INTO tutoring_hub.evaluations \
             (id, subject, title, description, education_level, questions, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EVALUATION_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(evaluation.subject.as_str())
            .bind(&evaluation.title)
            .bind(&evaluation.description)
            .bind(evaluation.education_level.as_str())
            .bind(Json(evaluation.questions.clone()))
            .bind(created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        evaluation_from_row(&row)
    }

    async fn fetch_evaluation(&self, id: Uuid) -> StoreResult<Option<Evaluation>> {
        let sql =
            format!("SELECT {EVALUATION_COLUMNS} FROM tutoring_hub.evaluations WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| evaluation_from_row(&row))
            .transpose()
    }

    async fn fetch_evaluations(&self, ids: &[Uuid]) -> StoreResult<Vec<Evaluation>> {
        let sql =
            format!("SELECT {EVALUATION_COLUMNS} FROM tutoring_hub.evaluations WHERE id = ANY($1)");
        let rows = sqlx::query(&sql).bind(ids).fetch_all(&self.pool).await?;
        rows.iter().map(evaluation_from_row).collect()
    }

    async fn list_evaluations(&self, filter: &EvaluationFilter) -> StoreResult<Vec<Evaluation>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EVALUATION_COLUMNS} FROM tutoring_hub.evaluations"
        ));
        push_evaluation_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(evaluation_from_row).collect()
    }

    async fn count_evaluations(&self, filter: &EvaluationFilter) -> StoreResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tutoring_hub.evaluations");
        push_evaluation_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn insert_result(&self, result: &NewEvaluationResult) -> StoreResult<EvaluationResult> {
        let sql = format!(
            "INSERT INTO tutoring_hub.evaluation_results \
             (id, evaluation_id, student_id, answers, score) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {RESULT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(result.evaluation_id)
            .bind(result.student_id)
            .bind(&result.answers)
            .bind(result.score)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        result_from_row(&row)
    }

    async fn find_result(
        &self,
        evaluation_id: Uuid,
        student_id: Uuid,
    ) -> StoreResult<Option<EvaluationResult>> {
        let sql = format!(
            "SELECT {RESULT_COLUMNS} FROM tutoring_hub.evaluation_results \
             WHERE evaluation_id = $1 AND student_id = $2 \
             ORDER BY completed_at LIMIT 1"
        );
        sqlx::query(&sql)
            .bind(evaluation_id)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| result_from_row(&row))
            .transpose()
    }

    async fn list_results(
        &self,
        student_id: Uuid,
        limit: Option<i64>,
    ) -> StoreResult<Vec<EvaluationResult>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {RESULT_COLUMNS} FROM tutoring_hub.evaluation_results WHERE student_id = "
        ));
        builder.push_bind(student_id);
        builder.push(" ORDER BY completed_at DESC");
        push_limit(&mut builder, limit);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(result_from_row).collect()
    }

    async fn count_results(&self, student_id: Uuid) -> StoreResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tutoring_hub.evaluation_results WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_request(&self, request: &NewTutoringRequest) -> StoreResult<TutoringRequest> {
        let sql = format!(
            "INSERT INTO tutoring_hub.tutoring_requests \
             (id, student_id, subject, description, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {REQUEST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(request.student_id)
            .bind(request.subject.as_str())
            .bind(&request.description)
            .bind(TutoringStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        request_from_row(&row)
    }

    async fn fetch_request(&self, id: Uuid) -> StoreResult<Option<TutoringRequest>> {
        let sql =
            format!("SELECT {REQUEST_COLUMNS} FROM tutoring_hub.tutoring_requests WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| request_from_row(&row))
            .transpose()
    }

    async fn update_request(
        &self,
        id: Uuid,
        patch: &RequestPatch,
    ) -> StoreResult<Option<TutoringRequest>> {
        let sql = format!(
            "UPDATE tutoring_hub.tutoring_requests \
             SET status = $2, \
                 tutor_id = COALESCE($3, tutor_id), \
                 scheduled_date = COALESCE($4, scheduled_date), \
                 updated_at = $5 \
             WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
        );
        sqlx::query(&sql)
            .bind(id)
            .bind(patch.status.as_str())
            .bind(patch.tutor_id)
            .bind(patch.scheduled_date)
            .bind(patch.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(write_error)?
            .map(|row| request_from_row(&row))
            .transpose()
    }

    async fn list_requests(
        &self,
        filter: &RequestFilter,
        order: RequestOrder,
        limit: Option<i64>,
    ) -> StoreResult<Vec<TutoringRequest>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REQUEST_COLUMNS} FROM tutoring_hub.tutoring_requests"
        ));
        push_request_filter(&mut builder, filter);
        builder.push(match order {
            RequestOrder::NewestCreated => " ORDER BY created_at DESC",
            RequestOrder::RecentlyUpdated => " ORDER BY updated_at DESC",
            RequestOrder::SoonestScheduled => " ORDER BY scheduled_date ASC NULLS LAST",
        });
        push_limit(&mut builder, limit);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(request_from_row).collect()
    }

    async fn count_requests(&self, filter: &RequestFilter) -> StoreResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tutoring_hub.tutoring_requests");
        push_request_filter(&mut builder, filter);
        Ok(builder.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn insert_post(&self, post: &NewForumPost) -> StoreResult<ForumPost> {
        let sql = format!(
            "INSERT INTO tutoring_hub.forum_posts (id, author_id, subject, title, content) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(post.author_id)
            .bind(post.subject.map(|subject| subject.as_str()))
            .bind(&post.title)
            .bind(&post.content)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        post_from_row(&row)
    }

    async fn fetch_post(&self, id: Uuid) -> StoreResult<Option<ForumPost>> {
        let sql = format!("SELECT {POST_COLUMNS} FROM tutoring_hub.forum_posts WHERE id = $1");
        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| post_from_row(&row))
            .transpose()
    }

    async fn list_posts(&self, limit: Option<i64>) -> StoreResult<Vec<ForumPost>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS} FROM tutoring_hub.forum_posts ORDER BY created_at DESC"
        ));
        push_limit(&mut builder, limit);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn insert_comment(&self, comment: &NewForumComment) -> StoreResult<ForumComment> {
        let sql = format!(
            "INSERT INTO tutoring_hub.forum_comments (id, post_id, author_id, content) \
             VALUES ($1, $2, $3, $4) RETURNING {COMMENT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(comment.post_id)
            .bind(comment.author_id)
            .bind(&comment.content)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        comment_from_row(&row)
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<ForumComment>> {
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} FROM tutoring_hub.forum_comments \
             WHERE post_id = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&sql).bind(post_id).fetch_all(&self.pool).await?;
        rows.iter().map(comment_from_row).collect()
    }
}
