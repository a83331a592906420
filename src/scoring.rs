use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{EvaluationResult, NewEvaluationResult, Profile, Question, Role};
use crate::store::Store;

/// Answer slot the student never filled in.
pub const UNANSWERED: i32 = -1;

/// Percentage of answers matching the recorded correct option, rounded to the
/// nearest integer.
pub fn score(questions: &[Question], answers: &[i32]) -> AppResult<i32> {
    if questions.is_empty() {
        return Err(AppError::validation("evaluation has no questions"));
    }
    if answers.len() != questions.len() {
        return Err(AppError::validation(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }
    if answers.iter().any(|&answer| answer == UNANSWERED) {
        return Err(AppError::validation("answer every question before submitting"));
    }
    let mut correct = 0usize;
    for (position, (question, &answer)) in questions.iter().zip(answers).enumerate() {
        if answer < 0 || answer as usize >= question.options.len() {
            return Err(AppError::validation(format!(
                "answer {answer} for question {} is not one of its options",
                position + 1
            )));
        }
        if question.correct == answer {
            correct += 1;
        }
    }

    Ok((100.0 * correct as f64 / questions.len() as f64).round() as i32)
}

/// Scores and records a student's answers. The existing-result check and the
/// insert are separate calls, so concurrent submissions can still both land.
pub async fn submit(
    store: &dyn Store,
    student: &Profile,
    evaluation_id: Uuid,
    answers: Vec<i32>,
) -> AppResult<EvaluationResult> {
    if student.role != Role::Student {
        return Err(AppError::validation("only students can submit evaluations"));
    }

    let evaluation = store
        .fetch_evaluation(evaluation_id)
        .await?
        .ok_or_else(|| AppError::not_found("evaluation", evaluation_id))?;

    let score = score(&evaluation.questions, &answers)?;

    if let Some(existing) = store.find_result(evaluation_id, student.id).await? {
        warn!(%evaluation_id, student_id = %student.id, "evaluation already submitted");
        return Err(AppError::validation(format!(
            "evaluation already submitted with score {}%",
            existing.score
        )));
    }

    let result = store
        .insert_result(&NewEvaluationResult {
            evaluation_id,
            student_id: student.id,
            answers,
            score,
        })
        .await?;

    info!(%evaluation_id, student_id = %student.id, score, "evaluation submitted");
    Ok(result)
}

/// Encouragement shown with a submitted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Excellent,
    Good,
    KeepPracticing,
}

impl Feedback {
    pub fn for_score(score: i32) -> Self {
        if score >= 80 {
            Feedback::Excellent
        } else if score >= 60 {
            Feedback::Good
        } else {
            Feedback::KeepPracticing
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Feedback::Excellent => "¡Excelente trabajo!",
            Feedback::Good => "Buen trabajo",
            Feedback::KeepPracticing => "Sigue practicando",
        }
    }
}

/// Mean of the given scores rounded to the nearest integer, 0 when empty.
pub fn average(results: &[EvaluationResult]) -> i32 {
    if results.is_empty() {
        return 0;
    }
    let total: i64 = results.iter().map(|result| i64::from(result.score)).sum();
    (total as f64 / results.len() as f64).round() as i32
}
