//! Error types for `gradebook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("please enter a subject name")]
  EmptySubjectName,

  #[error("subject already exists: {0:?}")]
  DuplicateSubject(String),

  #[error("subject not found: {0}")]
  SubjectNotFound(String),

  #[error("assessment not found: {0}")]
  AssessmentNotFound(String),

  #[error("upcoming item not found: {0}")]
  UpcomingNotFound(String),

  #[error("please enter a name")]
  EmptyName,

  #[error("please enter a valid score and total")]
  InvalidScore,

  #[error("weighting must be a non-negative number")]
  InvalidWeight,

  #[error("please choose a due date")]
  MissingDueDate,

  #[error("please choose a colour")]
  EmptyColor,

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
