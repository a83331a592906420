use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;

/// Implements the text mapping shared by every closed vocabulary stored as a
/// lowercase string column.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = StoreError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(StoreError::Decode(format!(
                        "unknown {} value {other:?}",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Tutor,
}

text_enum!(Role {
    Student => "student",
    Tutor => "tutor",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Primaria,
    Basicos,
    Diversificado,
}

text_enum!(EducationLevel {
    Primaria => "primaria",
    Basicos => "basicos",
    Diversificado => "diversificado",
});

impl EducationLevel {
    /// Level used to filter catalogues when a profile never recorded one.
    pub fn or_default(level: Option<EducationLevel>) -> EducationLevel {
        level.unwrap_or(EducationLevel::Primaria)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            EducationLevel::Primaria => "Primaria",
            EducationLevel::Basicos => "Básicos",
            EducationLevel::Diversificado => "Diversificado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Matematicas,
    Lenguaje,
    Ciencias,
    Sociales,
    Ingles,
}

text_enum!(Subject {
    Matematicas => "matematicas",
    Lenguaje => "lenguaje",
    Ciencias => "ciencias",
    Sociales => "sociales",
    Ingles => "ingles",
});

impl Subject {
    /// Catalogue order.
    pub const ALL: [Subject; 5] = [
        Subject::Matematicas,
        Subject::Lenguaje,
        Subject::Ciencias,
        Subject::Sociales,
        Subject::Ingles,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Matematicas => "Matemáticas",
            Subject::Lenguaje => "Lenguaje",
            Subject::Ciencias => "Ciencias",
            Subject::Sociales => "Ciencias Sociales",
            Subject::Ingles => "Inglés",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Subject::Matematicas => "Aritmética, álgebra y geometría",
            Subject::Lenguaje => "Gramática y comprensión lectora",
            Subject::Ciencias => "Biología, química y física",
            Subject::Sociales => "Historia y geografía",
            Subject::Ingles => "Vocabulario y gramática",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TutoringStatus {
    Pending,
    Accepted,
    Completed,
    Cancelled,
}

text_enum!(TutoringStatus {
    Pending => "pending",
    Accepted => "accepted",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl TutoringStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TutoringStatus::Completed | TutoringStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub age: Option<i32>,
    pub role: Role,
    pub education_level: Option<EducationLevel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub age: Option<i32>,
    pub role: Role,
    pub education_level: Option<EducationLevel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EducationalContent {
    pub id: Uuid,
    pub subject: Subject,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub education_level: EducationLevel,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContent {
    pub subject: Subject,
    pub education_level: EducationLevel,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub id: Uuid,
    pub subject: Subject,
    pub title: String,
    pub description: Option<String>,
    pub education_level: EducationLevel,
    pub questions: Vec<Question>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub subject: Subject,
    pub education_level: EducationLevel,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<i32>,
    pub score: i32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvaluationResult {
    pub evaluation_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<i32>,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TutoringRequest {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Option<Uuid>,
    pub subject: Subject,
    pub description: String,
    pub status: TutoringStatus,
    pub scheduled_date: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTutoringRequest {
    pub student_id: Uuid,
    pub subject: Subject,
    pub description: String,
}

/// Field updates applied by a lifecycle transition. `None` leaves a column
/// untouched; nothing here can clear a column.
#[derive(Debug, Clone)]
pub struct RequestPatch {
    pub status: TutoringStatus,
    pub tutor_id: Option<Uuid>,
    pub scheduled_date: Option<NaiveDateTime>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForumPost {
    pub id: Uuid,
    pub author_id: Uuid,
    pub subject: Option<Subject>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewForumPost {
    pub author_id: Uuid,
    pub subject: Option<Subject>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForumComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewForumComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_values_round_trip_through_from_str() {
        for status in [
            TutoringStatus::Pending,
            TutoringStatus::Accepted,
            TutoringStatus::Completed,
            TutoringStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TutoringStatus>().unwrap(), status);
        }
        for subject in Subject::ALL {
            assert_eq!(subject.as_str().parse::<Subject>().unwrap(), subject);
        }
        assert_eq!("ingles".parse::<Subject>().unwrap(), Subject::Ingles);
    }

    #[test]
    fn unknown_text_is_a_decode_error() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn missing_level_defaults_to_primaria() {
        assert_eq!(EducationLevel::or_default(None), EducationLevel::Primaria);
        assert_eq!(
            EducationLevel::or_default(Some(EducationLevel::Basicos)),
            EducationLevel::Basicos
        );
    }

    #[test]
    fn questions_use_the_stored_json_shape() {
        let raw = r#"{"question":"2+2?","options":["1","2","3","4"],"correct":3}"#;
        let question: Question = serde_json::from_str(raw).unwrap();
        assert_eq!(question.prompt, "2+2?");
        assert_eq!(question.correct, 3);
    }
}
