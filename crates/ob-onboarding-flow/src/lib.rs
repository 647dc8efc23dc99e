//! Onboarding Step-Flow Engine
//!
//! Drives the advisor through the regulatory onboarding forms one question
//! at a time. Every step is a nested JSON fields document; the engine
//! decides which questions are visible, validates single-answer writes,
//! patches the document, moves the cursor, recomputes derived figures and
//! decides when a form is complete and where to go next.
//!
//! ## Call chain
//!
//! ```text
//! WriteRequest ─► FlowEngine::write_step
//!                   ├─ registry     (form, step) ─► StepFlow
//!                   ├─ document     defaults + prefill
//!                   ├─ StepQuestion is_active / validate
//!                   ├─ schema       conform answer shape
//!                   ├─ patch        replace sub-tree
//!                   ├─ cursor       advance / clamp
//!                   ├─ calculators  derived views
//!                   ├─ gate         status transition
//!                   └─ router       next route
//! ```
//!
//! The engine does no I/O. Persistence, clocks and configuration belong to
//! the caller, which passes them in through [`EngineOptions`] and the
//! [`ClientOnboarding`](ob_onboarding_types::ClientOnboarding) it loaded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use ob_onboarding_flow::{EngineOptions, FlowEngine};
//! use ob_onboarding_types::{ClientOnboarding, FormType, WriteRequest};
//! use serde_json::json;
//! use uuid::Uuid;
//!
//! let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
//! let engine = FlowEngine::new(EngineOptions::new(today));
//! let client = ClientOnboarding::new(Uuid::new_v4(), [FormType::Sfc]);
//!
//! let request = WriteRequest::new("step1.accountRegistration.rrName", json!("Pat Advisor"));
//! let outcome = engine.write_step(&client, FormType::Sfc, 1, &request).unwrap();
//! assert_eq!(
//!     outcome.response.step.current_question_id.unwrap().as_str(),
//!     "step1.accountRegistration.rrNo"
//! );
//! ```

// Core document handling
pub mod document;
pub mod options;
pub mod patch;
pub mod schema;

// Rules
pub mod checks;
pub mod step;

// Forms
pub mod forms;

// Engine
pub mod calculators;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod gate;
pub mod prefill;
pub mod registry;
pub mod router;

pub use cursor::Cursor;
pub use engine::{FlowEngine, StepOutcome};
pub use error::{FlowError, Result};
pub use gate::GateOutcome;
pub use prefill::PrefillSources;
pub use registry::{form_steps, step_flow, StepFlow};
pub use step::{EngineOptions, StepContext, StepDefinition, StepQuestion};
