//! Read-only aggregates behind each dashboard page.

use uuid::Uuid;

use crate::content;
use crate::error::AppResult;
use crate::evaluations;
use crate::guard::{Lookup, Redirect};
use crate::lifecycle;
use crate::models::{
    EducationLevel, EducationalContent, Evaluation, EvaluationResult, Profile, TutoringRequest,
    TutoringStatus,
};
use crate::scoring;
use crate::store::{
    names_by_id, ContentFilter, EvaluationFilter, RequestFilter, RequestOrder, Store,
};

#[derive(Debug, Clone)]
pub struct RequestListing {
    pub request: TutoringRequest,
    /// The other party: the student for tutors, the tutor for students.
    pub counterpart: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResultListing {
    pub result: EvaluationResult,
    pub evaluation_title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentDashboard {
    pub profile: Profile,
    pub level: EducationLevel,
    pub recent_content: Vec<EducationalContent>,
    pub recent_results: Vec<ResultListing>,
    pub active_requests: Vec<TutoringRequest>,
    pub average_score: i32,
}

#[derive(Debug, Clone)]
pub struct TutorDashboard {
    pub profile: Profile,
    pub pending_requests: Vec<RequestListing>,
    pub accepted_requests: Vec<TutoringRequest>,
    pub content_count: i64,
    pub completed_count: i64,
}

/// Requests split the way both tutoring pages show them.
#[derive(Debug, Clone, Default)]
pub struct RequestBoard {
    pub pending: Vec<RequestListing>,
    pub accepted: Vec<RequestListing>,
    pub completed: Vec<RequestListing>,
}

#[derive(Debug, Clone)]
pub struct EvaluationListing {
    pub evaluation: Evaluation,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct EvaluationReview {
    pub evaluation: Evaluation,
    pub result: Option<EvaluationResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStats {
    Student {
        evaluations_taken: i64,
        tutoring_completed: i64,
    },
    Tutor {
        content_published: i64,
        evaluations_published: i64,
        tutoring_completed: i64,
    },
}

enum Counterpart {
    Student,
    Tutor,
}

async fn with_names(
    store: &dyn Store,
    requests: Vec<TutoringRequest>,
    counterpart: Counterpart,
) -> AppResult<Vec<RequestListing>> {
    let party = |request: &TutoringRequest| match counterpart {
        Counterpart::Student => Some(request.student_id),
        Counterpart::Tutor => request.tutor_id,
    };
    let names = names_by_id(store, requests.iter().filter_map(party)).await?;

    Ok(requests
        .into_iter()
        .map(|request| RequestListing {
            counterpart: party(&request).and_then(|id| names.get(&id).cloned()),
            request,
        })
        .collect())
}

pub async fn student_dashboard(
    store: &dyn Store,
    profile: &Profile,
) -> AppResult<StudentDashboard> {
    let level = EducationLevel::or_default(profile.education_level);
    let content_filter = ContentFilter {
        education_level: Some(level),
        ..ContentFilter::default()
    };
    let recent_content = store.list_content(&content_filter, Some(3)).await?;

    let results = store.list_results(profile.id, Some(3)).await?;
    let evaluation_ids: Vec<Uuid> = results.iter().map(|r| r.evaluation_id).collect();
    let titles = store.fetch_evaluations(&evaluation_ids).await?;
    let average_score = scoring::average(&results);
    let recent_results = results
        .into_iter()
        .map(|result| ResultListing {
            evaluation_title: titles
                .iter()
                .find(|e| e.id == result.evaluation_id)
                .map(|e| e.title.clone()),
            result,
        })
        .collect();

    let active_filter = RequestFilter::for_student(profile.id)
        .with_status(TutoringStatus::Pending)
        .with_status(TutoringStatus::Accepted);
    let active_requests = store
        .list_requests(&active_filter, RequestOrder::NewestCreated, Some(3))
        .await?;

    Ok(StudentDashboard {
        profile: profile.clone(),
        level,
        recent_content,
        recent_results,
        active_requests,
        average_score,
    })
}

pub async fn tutor_dashboard(store: &dyn Store, profile: &Profile) -> AppResult<TutorDashboard> {
    let pending = store
        .list_requests(
            &RequestFilter::default().with_status(TutoringStatus::Pending),
            RequestOrder::NewestCreated,
            Some(5),
        )
        .await?;
    let pending_requests = with_names(store, pending, Counterpart::Student).await?;

    let accepted_requests = store
        .list_requests(
            &RequestFilter::for_tutor(profile.id).with_status(TutoringStatus::Accepted),
            RequestOrder::SoonestScheduled,
            None,
        )
        .await?;

    let content_count = store
        .count_content(&ContentFilter {
            created_by: Some(profile.id),
            ..ContentFilter::default()
        })
        .await?;
    let completed_count = store
        .count_requests(
            &RequestFilter::for_tutor(profile.id).with_status(TutoringStatus::Completed),
        )
        .await?;

    Ok(TutorDashboard {
        profile: profile.clone(),
        pending_requests,
        accepted_requests,
        content_count,
        completed_count,
    })
}

pub async fn student_requests(store: &dyn Store, student_id: Uuid) -> AppResult<RequestBoard> {
    let mine = |status| RequestFilter::for_student(student_id).with_status(status);

    let pending = &mine(TutoringStatus::Pending);
    let pending = lifecycle::list(store, pending, RequestOrder::NewestCreated, None).await?;
    let accepted = &mine(TutoringStatus::Accepted);
    let accepted = lifecycle::list(store, accepted, RequestOrder::SoonestScheduled, None).await?;
    let completed = &mine(TutoringStatus::Completed);
    let completed = lifecycle::list(store, completed, RequestOrder::RecentlyUpdated, None).await?;

    Ok(RequestBoard {
        pending: with_names(store, pending, Counterpart::Tutor).await?,
        accepted: with_names(store, accepted, Counterpart::Tutor).await?,
        completed: with_names(store, completed, Counterpart::Tutor).await?,
    })
}

/// Every open request plus the ones this tutor has taken.
pub async fn tutor_requests(store: &dyn Store, tutor_id: Uuid) -> AppResult<RequestBoard> {
    let open = RequestFilter::default().with_status(TutoringStatus::Pending);
    let taken = |status| RequestFilter::for_tutor(tutor_id).with_status(status);

    let pending = lifecycle::list(store, &open, RequestOrder::NewestCreated, None).await?;
    let accepted = &taken(TutoringStatus::Accepted);
    let accepted = lifecycle::list(store, accepted, RequestOrder::SoonestScheduled, None).await?;
    let completed = &taken(TutoringStatus::Completed);
    let completed = lifecycle::list(store, completed, RequestOrder::RecentlyUpdated, None).await?;

    Ok(RequestBoard {
        pending: with_names(store, pending, Counterpart::Student).await?,
        accepted: with_names(store, accepted, Counterpart::Student).await?,
        completed: with_names(store, completed, Counterpart::Student).await?,
    })
}

/// A request that no longer exists sends the tutor back to the request board.
pub async fn request_detail(
    store: &dyn Store,
    request_id: Uuid,
) -> AppResult<Lookup<RequestListing>> {
    let Some(request) = store.fetch_request(request_id).await? else {
        return Ok(Lookup::Redirect(Redirect::TutorRequests));
    };
    let listing = with_names(store, vec![request], Counterpart::Student).await?;
    Ok(Lookup::from_option(listing.into_iter().next(), Redirect::TutorRequests))
}

/// The evaluation page: questions, plus the student's earlier attempt when
/// there is one.
pub async fn evaluation_review(
    store: &dyn Store,
    profile: &Profile,
    evaluation_id: Uuid,
) -> AppResult<Lookup<EvaluationReview>> {
    let evaluation = match evaluations::get(store, evaluation_id).await? {
        Lookup::Found(evaluation) => evaluation,
        Lookup::Redirect(redirect) => return Ok(Lookup::Redirect(redirect)),
    };
    let result = store.find_result(evaluation_id, profile.id).await?;
    Ok(Lookup::Found(EvaluationReview { evaluation, result }))
}

pub async fn student_evaluations(
    store: &dyn Store,
    profile: &Profile,
) -> AppResult<Vec<EvaluationListing>> {
    let level = EducationLevel::or_default(profile.education_level);
    let available = evaluations::list_for_level(store, level).await?;
    let done = evaluations::completed_ids(store, profile.id).await?;

    Ok(available
        .into_iter()
        .map(|evaluation| EvaluationListing {
            completed: done.contains(&evaluation.id),
            evaluation,
        })
        .collect())
}

pub async fn subject_overview(
    store: &dyn Store,
    profile: &Profile,
) -> AppResult<Vec<(crate::models::Subject, i64)>> {
    content::subject_counts(store, EducationLevel::or_default(profile.education_level)).await
}

pub async fn profile_stats(store: &dyn Store, profile: &Profile) -> AppResult<ProfileStats> {
    match profile.role {
        crate::models::Role::Student => Ok(ProfileStats::Student {
            evaluations_taken: store.count_results(profile.id).await?,
            tutoring_completed: store
                .count_requests(
                    &RequestFilter::for_student(profile.id).with_status(TutoringStatus::Completed),
                )
                .await?,
        }),
        crate::models::Role::Tutor => Ok(ProfileStats::Tutor {
            content_published: store
                .count_content(&ContentFilter {
                    created_by: Some(profile.id),
                    ..ContentFilter::default()
                })
                .await?,
            evaluations_published: store
                .count_evaluations(&EvaluationFilter {
                    created_by: Some(profile.id),
                    ..EvaluationFilter::default()
                })
                .await?,
            tutoring_completed: store
                .count_requests(
                    &RequestFilter::for_tutor(profile.id).with_status(TutoringStatus::Completed),
                )
                .await?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{seed_profile, MemoryStore};
    use crate::models::{NewContent, NewEvaluation, Question, Role, Subject};

    async fn publish_evaluation(store: &MemoryStore, tutor: &Profile, correct: i32) -> Uuid {
        evaluations::create_evaluation(
            store,
            tutor,
            &NewEvaluation {
                subject: Subject::Matematicas,
                education_level: EducationLevel::Primaria,
                title: format!("Quiz {correct}"),
                description: None,
                questions: vec![Question {
                    prompt: "?".into(),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct,
                }],
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn student_dashboard_aggregates() {
        let store = MemoryStore::default();
        let tutor = seed_profile(&store, "Tomas Ruiz", Role::Tutor).await;
        let student = seed_profile(&store, "Ana Lopez", Role::Student).await;

        for level in [EducationLevel::Primaria, EducationLevel::Diversificado] {
            content::create_content(
                &store,
                &tutor,
                &NewContent {
                    subject: Subject::Lenguaje,
                    education_level: level,
                    title: "Lectura".into(),
                    description: None,
                    content: "texto".into(),
                },
            )
            .await
            .unwrap();
        }

        let right = publish_evaluation(&store, &tutor, 0).await;
        let wrong = publish_evaluation(&store, &tutor, 1).await;
        scoring::submit(&store, &student, right, vec![0]).await.unwrap();
        scoring::submit(&store, &student, wrong, vec![0]).await.unwrap();

        let open = lifecycle::create(&store, &student, Subject::Matematicas, "fractions")
            .await
            .unwrap();
        let done = lifecycle::create(&store, &student, Subject::Matematicas, "decimals")
            .await
            .unwrap();
        lifecycle::cancel(&store, done.id).await.unwrap();

        let dashboard = student_dashboard(&store, &student).await.unwrap();
        assert_eq!(dashboard.level, EducationLevel::Primaria);
        assert_eq!(dashboard.recent_content.len(), 1);
        assert_eq!(dashboard.recent_results.len(), 2);
        assert!(dashboard
            .recent_results
            .iter()
            .all(|r| r.evaluation_title.is_some()));
        assert_eq!(dashboard.average_score, 50);
        assert_eq!(dashboard.active_requests.len(), 1);
        assert_eq!(dashboard.active_requests[0].id, open.id);

        let listed = student_evaluations(&store, &student).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|l| l.completed));
    }

    #[tokio::test]
    async fn tutor_views_expand_student_names() {
        let store = MemoryStore::default();
        let tutor = seed_profile(&store, "Tomas Ruiz", Role::Tutor).await;
        let student = seed_profile(&store, "Ana Lopez", Role::Student).await;

        let first = lifecycle::create(&store, &student, Subject::Ciencias, "átomos")
            .await
            .unwrap();
        let second = lifecycle::create(&store, &student, Subject::Ciencias, "moléculas")
            .await
            .unwrap();
        lifecycle::accept(
            &store,
            first.id,
            &tutor,
            Some(lifecycle::parse_schedule("2025-01-10T10:00").unwrap()),
        )
        .await
        .unwrap();
        lifecycle::accept(
            &store,
            second.id,
            &tutor,
            Some(lifecycle::parse_schedule("2025-01-09T08:00").unwrap()),
        )
        .await
        .unwrap();
        lifecycle::complete(&store, first.id).await.unwrap();
        lifecycle::create(&store, &student, Subject::Ingles, "reading")
            .await
            .unwrap();

        let dashboard = tutor_dashboard(&store, &tutor).await.unwrap();
        assert_eq!(dashboard.pending_requests.len(), 1);
        assert_eq!(
            dashboard.pending_requests[0].counterpart.as_deref(),
            Some("Ana Lopez")
        );
        assert_eq!(dashboard.accepted_requests.len(), 1);
        assert_eq!(dashboard.completed_count, 1);
        assert_eq!(dashboard.content_count, 0);

        let board = tutor_requests(&store, tutor.id).await.unwrap();
        assert_eq!(board.pending.len(), 1);
        assert_eq!(board.accepted.len(), 1);
        assert_eq!(board.completed.len(), 1);

        let student_board = student_requests(&store, student.id).await.unwrap();
        assert_eq!(student_board.accepted[0].counterpart.as_deref(), Some("Tomas Ruiz"));
        assert!(student_board.pending[0].counterpart.is_none());

        match request_detail(&store, second.id).await.unwrap() {
            Lookup::Found(detail) => assert_eq!(detail.counterpart.as_deref(), Some("Ana Lopez")),
            Lookup::Redirect(redirect) => panic!("unexpected {redirect}"),
        }
    }

    #[tokio::test]
    async fn missing_request_goes_back_to_the_board() {
        let store = MemoryStore::default();
        let lookup = request_detail(&store, Uuid::new_v4()).await.unwrap();
        assert!(matches!(lookup, Lookup::Redirect(Redirect::TutorRequests)));
    }

    #[tokio::test]
    async fn evaluation_review_carries_the_stored_attempt() {
        let store = MemoryStore::default();
        let tutor = seed_profile(&store, "Tomas Ruiz", Role::Tutor).await;
        let student = seed_profile(&store, "Ana Lopez", Role::Student).await;
        let evaluation = publish_evaluation(&store, &tutor, 1).await;

        let Lookup::Found(before) = evaluation_review(&store, &student, evaluation).await.unwrap()
        else {
            panic!("evaluation should exist");
        };
        assert!(before.result.is_none());

        scoring::submit(&store, &student, evaluation, vec![3]).await.unwrap();
        let Lookup::Found(after) = evaluation_review(&store, &student, evaluation).await.unwrap()
        else {
            panic!("evaluation should exist");
        };
        let result = after.result.unwrap();
        assert_eq!(result.answers, vec![3]);
        assert_eq!(result.score, 0);

        let missing = evaluation_review(&store, &student, Uuid::new_v4()).await.unwrap();
        assert!(matches!(missing, Lookup::Redirect(Redirect::StudentEvaluations)));
    }

    #[tokio::test]
    async fn profile_counts_by_role() {
        let store = MemoryStore::default();
        let tutor = seed_profile(&store, "Tomas Ruiz", Role::Tutor).await;
        let student = seed_profile(&store, "Ana Lopez", Role::Student).await;
        let evaluation = publish_evaluation(&store, &tutor, 2).await;
        scoring::submit(&store, &student, evaluation, vec![2]).await.unwrap();

        assert_eq!(
            profile_stats(&store, &student).await.unwrap(),
            ProfileStats::Student {
                evaluations_taken: 1,
                tutoring_completed: 0
            }
        );
        assert_eq!(
            profile_stats(&store, &tutor).await.unwrap(),
            ProfileStats::Tutor {
                content_published: 0,
                evaluations_published: 1,
                tutoring_completed: 0
            }
        );
    }
}
