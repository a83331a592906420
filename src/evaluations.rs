use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::guard::{Lookup, Redirect};
use crate::models::{EducationLevel, Evaluation, NewEvaluation, Profile, Question, Role};
use crate::store::{EvaluationFilter, Store};

pub const OPTIONS_PER_QUESTION: usize = 4;

fn validate_questions(questions: &[Question]) -> AppResult<()> {
    if questions.is_empty() {
        return Err(AppError::validation("an evaluation needs at least one question"));
    }

    for (index, question) in questions.iter().enumerate() {
        let number = index + 1;
        if question.prompt.trim().is_empty() {
            return Err(AppError::validation(format!("question {number} has no prompt")));
        }
        if question.options.len() != OPTIONS_PER_QUESTION {
            return Err(AppError::validation(format!(
                "question {number} must have exactly {OPTIONS_PER_QUESTION} options"
            )));
        }
        if question.options.iter().any(|option| option.trim().is_empty()) {
            return Err(AppError::validation(format!(
                "question {number} has an empty option"
            )));
        }
        if !(0..OPTIONS_PER_QUESTION as i32).contains(&question.correct) {
            return Err(AppError::validation(format!(
                "question {number} marks option {} as correct",
                question.correct
            )));
        }
    }

    Ok(())
}

/// Publishes a quiz. Published evaluations have no edit path.
pub async fn create_evaluation(
    store: &dyn Store,
    tutor: &Profile,
    draft: &NewEvaluation,
) -> AppResult<Evaluation> {
    if tutor.role != Role::Tutor {
        return Err(AppError::validation("only tutors can publish evaluations"));
    }
    if draft.title.trim().is_empty() {
        return Err(AppError::validation("evaluation title is required"));
    }
    validate_questions(&draft.questions)?;

    let evaluation = store.insert_evaluation(tutor.id, draft).await?;
    info!(
        evaluation_id = %evaluation.id,
        tutor_id = %tutor.id,
        questions = evaluation.questions.len(),
        "evaluation published"
    );
    Ok(evaluation)
}

/// Reads a JSON array of `{"question", "options", "correct"}` objects.
pub fn load_questions(path: &Path) -> anyhow::Result<Vec<Question>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("invalid questions in {}", path.display()))
}

/// A missing evaluation sends the student back to the evaluation list.
pub async fn get(store: &dyn Store, id: Uuid) -> AppResult<Lookup<Evaluation>> {
    let evaluation = store.fetch_evaluation(id).await?;
    Ok(Lookup::from_option(evaluation, Redirect::StudentEvaluations))
}

pub async fn list_for_level(
    store: &dyn Store,
    level: EducationLevel,
) -> AppResult<Vec<Evaluation>> {
    let filter = EvaluationFilter {
        education_level: Some(level),
        ..EvaluationFilter::default()
    };
    Ok(store.list_evaluations(&filter).await?)
}

pub async fn list_authored(store: &dyn Store, tutor_id: Uuid) -> AppResult<Vec<Evaluation>> {
    let filter = EvaluationFilter {
        created_by: Some(tutor_id),
        ..EvaluationFilter::default()
    };
    Ok(store.list_evaluations(&filter).await?)
}

/// Evaluations the student already has a result for.
pub async fn completed_ids(store: &dyn Store, student_id: Uuid) -> AppResult<HashSet<Uuid>> {
    Ok(store
        .list_results(student_id, None)
        .await?
        .into_iter()
        .map(|result| result.evaluation_id)
        .collect())
}
