//! Step Registry
//!
//! Maps every `(form, step)` to its [`StepDefinition`] through an
//! object-safe [`StepFlow`] facade, so the engine can work with any step
//! without knowing its question type. The lookup is an exhaustive match on
//! [`FormType`]; a new form does not compile until its steps are listed.

use std::marker::PhantomData;

use ob_onboarding_types::{DerivedView, FieldErrors, FieldPath, FormType, QuestionId, StepKey};
use serde_json::Value;

use crate::forms::investor_profile::{account, features, holder, objectives, trusted_contact};
use crate::forms::{baiodf, baiv, sfc, signatures};
use crate::prefill::PrefillSources;
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

/// Type-erased operations over one step.
pub trait StepFlow: Sync {
    fn key(&self) -> StepKey;
    fn label(&self) -> &'static str;
    fn schema(&self) -> StepSchema;

    /// Every question id in canonical order, visible or not.
    fn catalog(&self) -> Vec<QuestionId>;

    /// Visibility Resolver: active question ids in canonical order.
    fn visible(&self, ctx: &StepContext<'_>) -> Vec<QuestionId>;

    /// Validate one question. `None` when the id is unknown or not active.
    /// Error paths are relative to the step document.
    fn validate_question(&self, ctx: &StepContext<'_>, id: &QuestionId) -> Option<FieldErrors>;

    /// Errors of every visible question. Empty means the step is complete.
    fn step_errors(&self, ctx: &StepContext<'_>) -> FieldErrors;

    fn question_label(&self, ctx: &StepContext<'_>, id: &QuestionId) -> Option<String>;

    fn derived(&self, ctx: &StepContext<'_>) -> Option<DerivedView>;

    fn prefill(&self, fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)>;
}

struct Flow<S>(PhantomData<fn() -> S>);

impl<S: StepDefinition> Flow<S> {
    const fn new() -> Self {
        Flow(PhantomData)
    }

    fn find(id: &QuestionId) -> Option<S::Question> {
        S::questions()
            .into_iter()
            .find(|q| q.id(S::KEY.step) == *id)
    }

    fn active(ctx: &StepContext<'_>) -> Vec<S::Question> {
        S::questions()
            .into_iter()
            .filter(|q| q.is_active(ctx))
            .collect()
    }
}

impl<S: StepDefinition> StepFlow for Flow<S> {
    fn key(&self) -> StepKey {
        S::KEY
    }

    fn label(&self) -> &'static str {
        S::LABEL
    }

    fn schema(&self) -> StepSchema {
        S::schema()
    }

    fn catalog(&self) -> Vec<QuestionId> {
        S::questions()
            .iter()
            .map(|q| q.id(S::KEY.step))
            .collect()
    }

    fn visible(&self, ctx: &StepContext<'_>) -> Vec<QuestionId> {
        Self::active(ctx)
            .into_iter()
            .map(|q| q.id(S::KEY.step))
            .collect()
    }

    fn validate_question(&self, ctx: &StepContext<'_>, id: &QuestionId) -> Option<FieldErrors> {
        let question = Self::find(id).filter(|q| q.is_active(ctx))?;
        let mut errors = FieldErrors::new();
        question.validate(ctx, &mut errors);
        Some(errors)
    }

    fn step_errors(&self, ctx: &StepContext<'_>) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for question in Self::active(ctx) {
            question.validate(ctx, &mut errors);
        }
        errors
    }

    fn question_label(&self, ctx: &StepContext<'_>, id: &QuestionId) -> Option<String> {
        Self::find(id).map(|q| q.label(ctx))
    }

    fn derived(&self, ctx: &StepContext<'_>) -> Option<DerivedView> {
        S::derived(ctx)
    }

    fn prefill(&self, fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
        S::prefill(fields, sources)
    }
}

static IP_ACCOUNT: Flow<account::AccountStep> = Flow::new();
static IP_OBJECTIVES: Flow<objectives::ObjectivesStep> = Flow::new();
static IP_PRIMARY_HOLDER: Flow<holder::PrimaryHolderStep> = Flow::new();
static IP_SECONDARY_HOLDER: Flow<holder::SecondaryHolderStep> = Flow::new();
static IP_TRUSTED_CONTACT: Flow<trusted_contact::TrustedContactStep> = Flow::new();
static IP_FEATURES: Flow<features::FeaturesStep> = Flow::new();
static IP_SIGNATURES: Flow<signatures::InvestorProfileSignatures> = Flow::new();
static SFC_CONDITION: Flow<sfc::FinancialConditionStep> = Flow::new();
static SFC_SIGNATURES: Flow<signatures::SfcSignatures> = Flow::new();
static BAIODF_ORDER: Flow<baiodf::OrderBasicsStep> = Flow::new();
static BAIODF_CONCENTRATIONS: Flow<baiodf::ConcentrationsStep> = Flow::new();
static BAIODF_SIGNATURES: Flow<signatures::BaiodfSignatures> = Flow::new();
static BAIV_VERIFICATION: Flow<baiv::VerificationStep> = Flow::new();
static BAIV_SIGNATURES: Flow<signatures::BaivSignatures> = Flow::new();

/// Definition of one step, `None` when the form has no such step.
pub fn step_flow(key: StepKey) -> Option<&'static dyn StepFlow> {
    let flow: &'static dyn StepFlow = match (key.form, key.step) {
        (FormType::InvestorProfile, 1) => &IP_ACCOUNT,
        (FormType::InvestorProfile, 2) => &IP_OBJECTIVES,
        (FormType::InvestorProfile, 3) => &IP_PRIMARY_HOLDER,
        (FormType::InvestorProfile, 4) => &IP_SECONDARY_HOLDER,
        (FormType::InvestorProfile, 5) => &IP_TRUSTED_CONTACT,
        (FormType::InvestorProfile, 6) => &IP_FEATURES,
        (FormType::InvestorProfile, 7) => &IP_SIGNATURES,
        (FormType::Sfc, 1) => &SFC_CONDITION,
        (FormType::Sfc, 2) => &SFC_SIGNATURES,
        (FormType::Baiodf, 1) => &BAIODF_ORDER,
        (FormType::Baiodf, 2) => &BAIODF_CONCENTRATIONS,
        (FormType::Baiodf, 3) => &BAIODF_SIGNATURES,
        (FormType::Baiv506c, 1) => &BAIV_VERIFICATION,
        (FormType::Baiv506c, 2) => &BAIV_SIGNATURES,
        (FormType::InvestorProfile | FormType::Sfc | FormType::Baiodf | FormType::Baiv506c, _) => {
            return None
        }
    };
    Some(flow)
}

/// All steps of a form in order.
pub fn form_steps(form: FormType) -> impl Iterator<Item = &'static dyn StepFlow> {
    form.steps()
        .filter_map(move |step| step_flow(StepKey::new(form, step)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declared_step_is_registered() {
        for form in FormType::ALL {
            for step in form.steps() {
                let flow = step_flow(StepKey::new(form, step)).unwrap();
                assert_eq!(flow.key(), StepKey::new(form, step));
            }
            assert!(step_flow(StepKey::new(form, form.step_count() + 1)).is_none());
            assert!(step_flow(StepKey::new(form, 0)).is_none());
        }
    }

    #[test]
    fn test_catalog_ids_are_unique_and_addressable() {
        for form in FormType::ALL {
            for flow in form_steps(form) {
                let catalog = flow.catalog();
                let mut sorted: Vec<_> = catalog.iter().map(|id| id.as_str()).collect();
                sorted.sort();
                sorted.dedup();
                assert_eq!(sorted.len(), catalog.len(), "{}", flow.key());

                let defaults = flow.schema().defaults().clone();
                for id in &catalog {
                    assert_eq!(id.step(), Some(flow.key().step));
                    assert!(
                        flow.schema().template_at(&id.relative_path()).is_some(),
                        "{id} missing from defaults of {}",
                        flow.key()
                    );
                }
                assert!(defaults.is_object());
            }
        }
    }
}
