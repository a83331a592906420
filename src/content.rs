use std::path::Path;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::guard::{Lookup, Redirect};
use crate::models::{EducationLevel, EducationalContent, NewContent, Profile, Role, Subject};
use crate::store::{ContentFilter, Store};

pub async fn create_content(
    store: &dyn Store,
    tutor: &Profile,
    draft: &NewContent,
) -> AppResult<EducationalContent> {
    if tutor.role != Role::Tutor {
        return Err(AppError::validation("only tutors can publish content"));
    }
    if draft.title.trim().is_empty() {
        return Err(AppError::validation("content title is required"));
    }
    if draft.content.trim().is_empty() {
        return Err(AppError::validation("content body is required"));
    }

    let draft = NewContent {
        title: draft.title.trim().to_string(),
        description: draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        ..draft.clone()
    };
    let content = store.insert_content(tutor.id, &draft).await?;

    info!(
        content_id = %content.id,
        tutor_id = %tutor.id,
        subject = %content.subject,
        "content published"
    );
    Ok(content)
}

/// Opens one item from a subject's list; a missing item sends the reader
/// back to that list.
pub async fn get(
    store: &dyn Store,
    subject: Subject,
    id: Uuid,
) -> AppResult<Lookup<EducationalContent>> {
    let content = store.fetch_content(id).await?;
    Ok(Lookup::from_option(content, Redirect::SubjectContent(subject)))
}

pub async fn list_for_level(
    store: &dyn Store,
    subject: Subject,
    level: EducationLevel,
) -> AppResult<Vec<EducationalContent>> {
    let filter = ContentFilter {
        subject: Some(subject),
        education_level: Some(level),
        ..ContentFilter::default()
    };
    Ok(store.list_content(&filter, None).await?)
}

pub async fn list_authored(
    store: &dyn Store,
    tutor_id: Uuid,
) -> AppResult<Vec<EducationalContent>> {
    let filter = ContentFilter {
        created_by: Some(tutor_id),
        ..ContentFilter::default()
    };
    Ok(store.list_content(&filter, None).await?)
}

/// Number of items per subject available at one level, in catalogue order.
pub async fn subject_counts(
    store: &dyn Store,
    level: EducationLevel,
) -> AppResult<Vec<(Subject, i64)>> {
    let mut counts = Vec::with_capacity(Subject::ALL.len());
    for subject in Subject::ALL {
        let filter = ContentFilter {
            subject: Some(subject),
            education_level: Some(level),
            ..ContentFilter::default()
        };
        counts.push((subject, store.count_content(&filter).await?));
    }
    Ok(counts)
}

/// Publishes every row of a CSV file with the columns
/// `subject,education_level,title,description,content`. Rows are validated
/// one at a time; the first bad row stops the import.
pub async fn import_csv(
    store: &dyn Store,
    tutor: &Profile,
    csv_path: &Path,
) -> anyhow::Result<usize> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (line, result) in reader.deserialize::<NewContent>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(line = line + 2, error = %err, "unreadable content row");
                return Err(err.into());
            }
        };
        create_content(store, tutor, &row).await?;
        inserted += 1;
    }

    Ok(inserted)
}
