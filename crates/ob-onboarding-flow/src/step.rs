//! Step Definitions
//!
//! Every (form, step) pair is a unit type implementing [`StepDefinition`],
//! with a closed question enum implementing [`StepQuestion`]. Visibility and
//! validation are matched exhaustively per question, so adding a question
//! without handling it fails to compile.

use std::fmt;

use chrono::NaiveDate;
use ob_onboarding_types::{
    DerivedView, FieldErrors, FieldPath, FormRecord, QuestionId, RouteConfig, StepKey,
};
use serde_json::Value;

use crate::document::Doc;
use crate::schema::StepSchema;

// ============================================================================
// ENGINE OPTIONS
// ============================================================================

/// Inputs the engine would otherwise read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Reference date for "not in the future" and plausible-year rules.
    pub today: NaiveDate,
    /// Earliest year accepted for "since year" style answers.
    pub min_plausible_year: i32,
    pub routes: RouteConfig,
}

impl EngineOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            min_plausible_year: 1900,
            routes: RouteConfig::default(),
        }
    }

    pub fn with_routes(mut self, routes: RouteConfig) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_min_plausible_year(mut self, year: i32) -> Self {
        self.min_plausible_year = year;
        self
    }
}

// ============================================================================
// STEP CONTEXT
// ============================================================================

/// Everything a visibility or validation rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub key: StepKey,
    /// This step's document; the candidate document while validating a write.
    pub fields: &'a Value,
    /// The form record for rules that reach into other steps. The engine
    /// passes every step prepared (defaults filled, prefill applied).
    pub form: &'a FormRecord,
    pub options: &'a EngineOptions,
}

impl<'a> StepContext<'a> {
    pub fn new(
        key: StepKey,
        fields: &'a Value,
        form: &'a FormRecord,
        options: &'a EngineOptions,
    ) -> Self {
        Self {
            key,
            fields,
            form,
            options,
        }
    }

    pub fn doc(&self) -> Doc<'a> {
        Doc::new(self.fields)
    }

    /// Document of another step of the same form. The current step reads
    /// from `fields` so candidate answers are visible to cross-step rules.
    pub fn step_doc(&self, step: u8) -> Doc<'a> {
        if step == self.key.step {
            self.doc()
        } else {
            Doc::new(self.form.step_fields(step))
        }
    }

    pub fn with_fields(&self, fields: &'a Value) -> StepContext<'a> {
        StepContext { fields, ..*self }
    }

    pub fn today(&self) -> NaiveDate {
        self.options.today
    }
}

// ============================================================================
// TRAITS
// ============================================================================

/// A question of one step.
pub trait StepQuestion: Copy + Eq + fmt::Debug + 'static {
    /// Every question of the step, in canonical traversal order.
    fn all() -> Vec<Self>;

    /// Path of the question's sub-tree within the step document.
    fn path(&self) -> FieldPath;

    /// Human label; may depend on earlier answers.
    fn label(&self, ctx: &StepContext<'_>) -> String;

    /// Visibility predicate over already-entered answers.
    fn is_active(&self, ctx: &StepContext<'_>) -> bool;

    /// Validate the question's sub-tree in `ctx.fields`. Error paths are
    /// relative to the step document.
    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors);

    fn id(&self, step: u8) -> QuestionId {
        QuestionId::for_path(step, &self.path())
    }
}

/// One step of one form.
pub trait StepDefinition {
    type Question: StepQuestion;

    const KEY: StepKey;
    const LABEL: &'static str;

    /// Default document and array item templates.
    fn schema() -> StepSchema;

    /// Questions this step asks, in canonical order.
    fn questions() -> Vec<Self::Question> {
        Self::Question::all()
    }

    /// Read-only calculator output for this step, if any.
    fn derived(_ctx: &StepContext<'_>) -> Option<DerivedView> {
        None
    }

    /// Cross-form values copied into still-empty fields.
    fn prefill(_fields: &Value, _sources: &crate::prefill::PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
        Vec::new()
    }
}
