//! Service-level errors.

use ob_onboarding_flow::FlowError;
use ob_onboarding_types::ValidationFailure;
use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no onboarding found for client {0}")]
    ClientNotFound(Uuid),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// `{fieldErrors: {...}}` body for rejected writes.
    pub fn validation_failure(&self) -> Option<ValidationFailure> {
        match self {
            ServiceError::Flow(flow) => flow.field_errors().map(|errors| ValidationFailure {
                field_errors: errors.clone(),
            }),
            ServiceError::ClientNotFound(_) | ServiceError::Store(_) => None,
        }
    }

    /// Caller mistake rather than a system failure.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Store(_))
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
