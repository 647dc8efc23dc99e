//! Shared Onboarding Types
//!
//! This crate is the single source of truth for every type crossing the
//! boundary between the step-flow engine and its callers (request handlers,
//! persistence, the CLI).
//!
//! ## Boundaries
//!
//! ```text
//! ┌──────────────────┐  FormRecord   ┌──────────────────┐
//! │  Persistence     │ ◄───────────► │  Step-flow       │
//! │  (out of scope)  │               │  engine          │
//! └──────────────────┘               └──────────────────┘
//!                                            ▲
//!                     WriteRequest /         │
//!                     StepResponse (JSON)    ▼
//!                                    ┌──────────────────┐
//!                                    │  HTTP layer      │
//!                                    └──────────────────┘
//! ```
//!
//! ## Rules
//!
//! 1. Wire shapes are camelCase JSON.
//! 2. Question ids and error keys are dotted paths (`step4.holder.contact.phones.mobile`).
//! 3. Derived numbers serialize as JSON numbers, never strings.

pub mod form;
pub mod path;
pub mod record;
pub mod route;
pub mod wire;

pub use form::{FormType, OnboardingStatus, ParseFormTypeError, StepKey};
pub use path::{FieldErrors, FieldPath, PathSegment, QuestionId};
pub use record::{ClientOnboarding, FormRecord, StepRecord};
pub use route::{OnboardingRoute, RouteConfig};
pub use wire::{
    BaiodfStepTwoConcentrations, BaivStepOneAccreditation, ClientCursor, DerivedView,
    StatementOfFinancialConditionStepOneTotals, StepResponse, StepView, ValidationFailure,
    WriteRequest,
};
