//! Engine errors.
//!
//! Every variant is a per-request, caller-visible outcome. Field-level
//! problems carry a `{path: message}` map ready for the wire.

use ob_onboarding_types::{FieldErrors, FormType, QuestionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    /// One or more fields failed validation.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// The posted question is not in the step's visible set.
    #[error("question '{question_id}' is not active")]
    InactiveQuestion {
        question_id: QuestionId,
        errors: FieldErrors,
    },

    #[error("form {0} is not selected for this client")]
    FormNotSelected(FormType),

    #[error("form {form} has no step {step}")]
    UnknownStep { form: FormType, step: u8 },
}

impl FlowError {
    /// Path-keyed messages for validation failures.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FlowError::Validation(errors) | FlowError::InactiveQuestion { errors, .. } => {
                Some(errors)
            }
            FlowError::FormNotSelected(_) | FlowError::UnknownStep { .. } => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.field_errors().is_some()
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
