use chrono::NaiveDate;
use thiserror::Error;

use crate::core::event::EventId;
use crate::storage::StorageError;

/// Input the form should keep open for correction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("event title must not be empty")]
    EmptyTitle,

    #[error("no date selected")]
    NoDateSelected,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("event {id} not found on {date}")]
    NotFound { date: NaiveDate, id: EventId },

    #[error("failed to serialize events: {0}")]
    Serialize(serde_json::Error),

    #[error("failed to persist events: {0}")]
    Storage(#[from] StorageError),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
