use thiserror::Error;

use crate::storage::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) | ServiceError::Model(_) => 1001,
            ServiceError::Store(e) => e.code(),
        }
    }

    /// True for caller mistakes (bad shape), as opposed to store outcomes.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ServiceError::Validation(_) | ServiceError::Model(_))
    }
}
