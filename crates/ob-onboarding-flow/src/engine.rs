//! Flow Engine
//!
//! Orchestrates one read or one write against a single step:
//!
//! ```text
//! write:  stored ─► defaults ─► prefill ─► active? ─► conform ─► patch
//!                                                                 │
//!         response ◄─ route ◄─ gate ◄─ derived ◄─ cursor ◄─ validate
//! ```
//!
//! The engine is a pure function of the client's onboarding state and the
//! request. It never persists anything: a successful write returns the
//! updated [`FormRecord`] for the caller to store, and a rejected write
//! leaves the caller's state untouched.

use ob_onboarding_types::{
    ClientOnboarding, FieldErrors, FieldPath, FormRecord, FormType, OnboardingRoute, QuestionId,
    StepKey, StepRecord, StepResponse, StepView, WriteRequest,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cursor::{self, Cursor};
use crate::document::{fill_defaults, fingerprint};
use crate::error::{FlowError, Result};
use crate::gate;
use crate::patch;
use crate::prefill::PrefillSources;
use crate::registry::{form_steps, step_flow, StepFlow};
use crate::router;
use crate::step::{EngineOptions, StepContext};

/// Result of an accepted write.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub response: StepResponse,
    /// The form record to persist.
    pub record: FormRecord,
}

#[derive(Debug, Clone)]
pub struct FlowEngine {
    options: EngineOptions,
}

impl FlowEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ------------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------------

    /// Current view of a step: defaults filled, prefill applied, cursor
    /// clamped to the visible set. Nothing is persisted.
    pub fn read_step(
        &self,
        client: &ClientOnboarding,
        form: FormType,
        step: u8,
    ) -> Result<StepResponse> {
        let (flow, record) = lookup(client, form, step)?;
        let sources = PrefillSources::from_client(client);
        let prepared = prepared_record(&record, &sources);
        let fields = prepared.step_fields(step).clone();

        let ctx = StepContext::new(flow.key(), &fields, &prepared, &self.options);
        let visible = flow.visible(&ctx);
        let stored = record.step(step).and_then(|s| s.current_question_id.as_ref());
        let cursor = cursor::clamp(&visible, &flow.catalog(), stored);

        let step = self.view(client, flow, &prepared, fields, cursor);
        Ok(StepResponse {
            status: record.status,
            step,
        })
    }

    // ------------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------------

    /// Apply one answer.
    ///
    /// Rejected with [`FlowError::InactiveQuestion`] when the question is not
    /// visible for the current document, and with [`FlowError::Validation`]
    /// when the answer does not fit the field shape or fails its rules.
    /// Error paths are prefixed with the step key (`step2.orderBasics...`).
    pub fn write_step(
        &self,
        client: &ClientOnboarding,
        form: FormType,
        step: u8,
        request: &WriteRequest,
    ) -> Result<StepOutcome> {
        let (flow, record) = lookup(client, form, step)?;
        let key = flow.key();
        let step_root = FieldPath::root().key(&key.key());
        let question_id = &request.question_id;

        let sources = PrefillSources::from_client(client);
        let prepared = prepared_record(&record, &sources);
        let fields = prepared.step_fields(step).clone();
        let ctx = StepContext::new(key, &fields, &prepared, &self.options);

        if !flow.visible(&ctx).contains(question_id) {
            tracing::debug!(%question_id, step = %key, "rejected write to inactive question");
            return Err(inactive(question_id));
        }
        if let Some(client_cursor) = &request.client_cursor {
            if client_cursor.current_question_id != *question_id {
                tracing::warn!(
                    %question_id,
                    client_cursor = %client_cursor.current_question_id,
                    "client cursor disagrees with posted question"
                );
            }
        }

        let path = question_id.relative_path();
        let answer = flow
            .schema()
            .conform(&fields, &path, request.answer.clone())
            .map_err(|errors| FlowError::Validation(errors.under(&step_root)))?;
        let candidate = patch::apply(&fields, &path, answer);
        let ctx = ctx.with_fields(&candidate);

        let errors = flow
            .validate_question(&ctx, question_id)
            .unwrap_or_default();
        if !errors.is_empty() {
            return Err(FlowError::Validation(errors.under(&step_root)));
        }

        let visible = flow.visible(&ctx);
        let cursor = cursor::advance(&visible, &flow.catalog(), question_id, true);
        let outcome = gate::evaluate(
            key,
            record.status,
            &flow.step_errors(&ctx),
            gate::requires_joint_owner_signature(&ctx),
        );

        let mut updated = record.clone();
        updated.status = outcome.status;
        updated.steps.insert(
            step,
            StepRecord {
                fields: candidate.clone(),
                current_question_id: cursor.as_ref().map(|c| c.question_id.clone()),
            },
        );
        if outcome.is_complete && !record.status.is_completed() {
            tracing::info!(client_id = %client.client_id, %form, "form completed");
        }

        let mut after = client.clone();
        after.put(updated.clone());
        let shown = prepared_record(&updated, &PrefillSources::from_client(&after));
        let view = self.view(&after, flow, &shown, candidate, cursor);
        Ok(StepOutcome {
            response: StepResponse {
                status: updated.status,
                step: view,
            },
            record: updated,
        })
    }

    // ------------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------------

    /// First step of `form` with a failing visible question.
    pub fn resume_step(&self, client: &ClientOnboarding, form: FormType) -> Result<u8> {
        if !client.is_selected(form) {
            return Err(FlowError::FormNotSelected(form));
        }
        let sources = PrefillSources::from_client(client);
        let record = client
            .form(form)
            .cloned()
            .unwrap_or_else(|| FormRecord::new(form));
        Ok(self.resume_step_for(&record, &sources))
    }

    pub fn resume_route(&self, client: &ClientOnboarding, form: FormType) -> Result<OnboardingRoute> {
        let step = self.resume_step(client, form)?;
        Ok(OnboardingRoute::Step { form, step })
    }

    /// Where the advisor goes next across all selected forms.
    pub fn next_route(&self, client: &ClientOnboarding) -> OnboardingRoute {
        let sources = PrefillSources::from_client(client);
        router::next_route(client, |record| self.resume_step_for(record, &sources))
    }

    pub fn render(&self, route: &OnboardingRoute, client_id: Uuid) -> String {
        self.options.routes.render(route, client_id)
    }

    fn resume_step_for(&self, record: &FormRecord, sources: &PrefillSources<'_>) -> u8 {
        let prepared = prepared_record(record, sources);
        router::resume_step_from(record.form, record.status, |step| {
            let Some(flow) = step_flow(StepKey::new(record.form, step)) else {
                return true;
            };
            let ctx = StepContext::new(
                flow.key(),
                prepared.step_fields(step),
                &prepared,
                &self.options,
            );
            flow.step_errors(&ctx).is_empty()
        })
    }

    // ------------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------------

    fn view(
        &self,
        client: &ClientOnboarding,
        flow: &dyn StepFlow,
        record: &FormRecord,
        fields: Value,
        cursor: Option<Cursor>,
    ) -> StepView {
        let key = flow.key();
        let ctx = StepContext::new(key, &fields, record, &self.options);
        let visible_question_ids = flow.visible(&ctx);
        let derived = flow.derived(&ctx);
        let requires_joint_owner_signature =
            key.is_gating().then(|| gate::requires_joint_owner_signature(&ctx));
        let requires_step4 =
            (key.form == FormType::InvestorProfile).then(|| gate::requires_step4(&ctx));
        let next_route_after_completion = (key.is_gating() && record.status.is_completed())
            .then(|| self.render(&self.next_route(client), client.client_id));
        let revision = fingerprint(&fields);

        StepView {
            key: key.key(),
            label: flow.label().to_string(),
            current_question_id: cursor.as_ref().map(|c| c.question_id.clone()),
            current_question_index: cursor.map(|c| c.index),
            visible_question_ids,
            fields,
            derived,
            requires_joint_owner_signature,
            requires_step4,
            next_route_after_completion,
            revision,
        }
    }
}

fn lookup(
    client: &ClientOnboarding,
    form: FormType,
    step: u8,
) -> Result<(&'static dyn StepFlow, FormRecord)> {
    if !client.is_selected(form) {
        return Err(FlowError::FormNotSelected(form));
    }
    let flow = step_flow(StepKey::new(form, step)).ok_or(FlowError::UnknownStep { form, step })?;
    let record = client
        .form(form)
        .cloned()
        .unwrap_or_else(|| FormRecord::new(form));
    Ok((flow, record))
}

/// Stored fields refilled from defaults, then prefilled.
fn prepared_fields(flow: &dyn StepFlow, record: &FormRecord, sources: &PrefillSources<'_>) -> Value {
    let stored = record.step_fields(flow.key().step);
    let filled = fill_defaults(flow.schema().defaults(), stored);
    let writes = flow.prefill(&filled, sources);
    if writes.is_empty() {
        filled
    } else {
        patch::apply_all(&filled, writes)
    }
}

/// The record as rules see it: every step prepared, so cross-step rules
/// (joint owner, step 4) read the same documents the advisor is shown.
/// Never persisted.
fn prepared_record(record: &FormRecord, sources: &PrefillSources<'_>) -> FormRecord {
    let mut prepared = record.clone();
    for flow in form_steps(record.form) {
        let step = flow.key().step;
        let current_question_id = record.step(step).and_then(|s| s.current_question_id.clone());
        prepared.steps.insert(
            step,
            StepRecord {
                fields: prepared_fields(flow, record, sources),
                current_question_id,
            },
        );
    }
    prepared
}

fn inactive(question_id: &QuestionId) -> FlowError {
    FlowError::InactiveQuestion {
        question_id: question_id.clone(),
        errors: FieldErrors::single(
            question_id.full_path(),
            format!("Question '{}' is not active for this step", question_id),
        ),
    }
}
