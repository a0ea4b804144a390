use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("vocabulary must contain at least one item")]
    Empty,
    #[error("duplicate vocabulary id {0}")]
    DuplicateId(i64),
    #[error("vocabulary item {0} has a blank answer")]
    BlankAnswer(i64),
    #[error("malformed vocabulary file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("malformed vocabulary file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
}

/// Reason a controller operation was ignored. Never fatal: the session is left
/// exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum PreconditionViolation {
    #[error("session is not accepting input")]
    NotActive,
    #[error("answer is empty")]
    EmptyInput,
    #[error("current item has not been answered yet")]
    NotAnswered,
    #[error("current item is already answered")]
    AlreadyAnswered,
    #[error("quiz is finished")]
    Finished,
    #[error("illustration result is stale")]
    StaleIllustration,
}
