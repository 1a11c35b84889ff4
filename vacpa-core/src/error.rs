/// Error types for line set operations
use thiserror::Error;

use crate::registry::LineSetId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No line set with id {id}")]
    NotFound { id: LineSetId },
}

pub type EngineResult<T> = Result<T, EngineError>;
