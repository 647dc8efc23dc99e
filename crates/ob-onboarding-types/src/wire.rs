//! Request/response shapes consumed from and produced for the HTTP layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::form::OnboardingStatus;
use crate::path::{FieldErrors, QuestionId};

// ============================================================================
// REQUESTS
// ============================================================================

/// Write a single answer to a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRequest {
    pub question_id: QuestionId,
    /// Value for the sub-tree addressed by `question_id`.
    pub answer: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_cursor: Option<ClientCursor>,
}

impl WriteRequest {
    pub fn new(question_id: impl Into<QuestionId>, answer: serde_json::Value) -> Self {
        Self {
            question_id: question_id.into(),
            answer,
            client_cursor: None,
        }
    }
}

/// Cursor the client believed was current when it posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCursor {
    pub current_question_id: QuestionId,
}

// ============================================================================
// RESPONSES
// ============================================================================

/// Read/write response: overall form status plus the step view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub status: OnboardingStatus,
    pub step: StepView,
}

/// One step as presented to the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    /// `step1` .. `step7`
    pub key: String,
    pub label: String,
    /// `None` only when the step has no active questions (skipped step).
    pub current_question_id: Option<QuestionId>,
    pub current_question_index: Option<usize>,
    pub visible_question_ids: Vec<QuestionId>,
    pub fields: serde_json::Value,
    #[serde(flatten)]
    pub derived: Option<DerivedView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_joint_owner_signature: Option<bool>,
    #[serde(rename = "requiresStep4", skip_serializing_if = "Option::is_none")]
    pub requires_step4: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_route_after_completion: Option<String>,
    /// SHA-256 of the canonical fields document.
    pub revision: String,
}

/// Body returned when a write is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    pub field_errors: FieldErrors,
}

// ============================================================================
// DERIVED VIEWS
// ============================================================================

/// Read-only calculator output attached to a step view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DerivedView {
    Concentrations(BaiodfStepTwoConcentrations),
    Totals(StatementOfFinancialConditionStepOneTotals),
    Accreditation(BaivStepOneAccreditation),
}

/// Concentration of existing alternative positions against net worth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaiodfStepTwoConcentrations {
    #[serde(with = "rust_decimal::serde::float")]
    pub existing_illiquid_alt_concentration_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub existing_semi_liquid_alt_concentration_percent: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub existing_tax_advantage_alt_concentration_percent: Decimal,
    /// Sum of the three existing-position percentages only; the proposed
    /// purchase is included in `projected_concentration_percent`.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_concentration_percent: Decimal,
    /// Step-1 proposed principal against net worth.
    #[serde(with = "rust_decimal::serde::float")]
    pub proposed_purchase_concentration_percent: Decimal,
    /// `total_concentration_percent` plus the proposed purchase.
    #[serde(with = "rust_decimal::serde::float")]
    pub projected_concentration_percent: Decimal,
}

/// Category totals and net-worth summary of the SFC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementOfFinancialConditionStepOneTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_liquid_non_qualified_assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_liabilities: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_illiquid_non_qualified_assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_liquid_qualified_assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_illiquid_qualified_assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_liquid_assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_illiquid_assets: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_assets: Decimal,
    /// Total assets less total liabilities; may be negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net_worth: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_net_worth_excluding_primary_residence: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub liquid_net_worth: Decimal,
}

/// Outcome of the accredited-investor tests for the recorded evidence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaivStepOneAccreditation {
    pub meets_income_test: bool,
    pub meets_net_worth_test: bool,
    pub meets_entity_assets_test: bool,
    /// Test for the selected accreditation basis passes.
    pub is_accredited: bool,
}
