//! Cross-form prefill.
//!
//! Values flow from completed forms into still-empty fields of later forms:
//!
//! ```text
//! INVESTOR_PROFILE step 1 ──► accountRegistration.*        (SFC, BAIODF, BAIV step 1)
//! SFC totalNetWorth ────────► totalNetWorth                (BAIODF step 2)
//! SFC net worth excl. home ─► netWorthVerification.total…  (BAIV step 1)
//! ```
//!
//! A prefill write is only produced when the target is blank, null or zero,
//! so applying prefill twice is the same as applying it once and a user
//! edit is never overwritten.

use ob_onboarding_types::{
    ClientOnboarding, FieldPath, FormType, StatementOfFinancialConditionStepOneTotals,
};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::calculators;
use crate::document::{decimal_to_json, Doc};

/// Completed source documents available to prefill.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefillSources<'a> {
    investor_profile_step1: Option<&'a Value>,
    sfc_step1: Option<&'a Value>,
}

impl<'a> PrefillSources<'a> {
    /// Sources from a client's forms; only COMPLETED forms contribute.
    pub fn from_client(client: &'a ClientOnboarding) -> Self {
        let completed_step1 = move |form: FormType| {
            client
                .form(form)
                .filter(|record| record.status.is_completed())
                .map(|record| record.step_fields(1))
        };
        Self {
            investor_profile_step1: completed_step1(FormType::InvestorProfile),
            sfc_step1: completed_step1(FormType::Sfc),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_investor_profile(mut self, step1: &'a Value) -> Self {
        self.investor_profile_step1 = Some(step1);
        self
    }

    pub fn with_sfc(mut self, step1: &'a Value) -> Self {
        self.sfc_step1 = Some(step1);
        self
    }

    pub fn investor_profile_step1(&self) -> Option<Doc<'a>> {
        self.investor_profile_step1.map(Doc::new)
    }

    pub fn sfc_totals(&self) -> Option<StatementOfFinancialConditionStepOneTotals> {
        self.sfc_step1
            .map(|step1| calculators::sfc_totals(Doc::new(step1)))
    }
}

/// Write `value` at `dotted` when the target is null/zero and `value > 0`.
pub fn amount_if_unset(fields: &Value, dotted: &str, value: Decimal) -> Option<(FieldPath, Value)> {
    if value <= Decimal::ZERO {
        return None;
    }
    let unset = Doc::new(fields)
        .decimal(dotted)
        .map_or(true, |current| current.is_zero());
    unset.then(|| (FieldPath::parse(dotted), decimal_to_json(value)))
}

pub(crate) fn trace_writes(target: &str, writes: &[(FieldPath, Value)]) {
    tracing::debug!(
        block = target,
        paths = ?writes.iter().map(|(p, _)| p.to_string()).collect::<Vec<_>>(),
        "prefill applied"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use ob_onboarding_types::StepRecord;
    use serde_json::json;
    use uuid::Uuid;

    fn sfc_step1() -> Value {
        json!({
            "liquidNonQualifiedAssets": {"cashMoneyMarketsCds": 250000},
            "illiquidNonQualifiedAssets": {"primaryResidence": 500000},
            "liabilities": {"mortgagePrimaryResidence": 100000}
        })
    }

    #[test]
    fn test_only_completed_forms_are_sources() {
        let mut onboarding = ClientOnboarding::new(Uuid::nil(), [FormType::Sfc, FormType::Baiodf]);
        let mut sfc = onboarding.form(FormType::Sfc).cloned().unwrap();
        sfc.steps.insert(
            1,
            StepRecord {
                fields: sfc_step1(),
                current_question_id: None,
            },
        );
        onboarding.put(sfc.clone());
        assert!(PrefillSources::from_client(&onboarding).sfc_totals().is_none());

        sfc.status = ob_onboarding_types::OnboardingStatus::Completed;
        onboarding.put(sfc);
        let totals = PrefillSources::from_client(&onboarding).sfc_totals().unwrap();
        assert_eq!(totals.total_net_worth, Decimal::from(650000));
    }

    #[test]
    fn test_prefill_is_idempotent_and_never_overwrites() {
        let target = json!({"totalNetWorth": 0});
        let first = amount_if_unset(&target, "totalNetWorth", Decimal::from(650000)).unwrap();
        let filled = patch::apply_all(&target, [first]);
        assert_eq!(filled["totalNetWorth"], 650000);
        assert!(amount_if_unset(&filled, "totalNetWorth", Decimal::from(650000)).is_none());

        let edited = json!({"totalNetWorth": 90000});
        assert!(amount_if_unset(&edited, "totalNetWorth", Decimal::from(650000)).is_none());
        assert!(amount_if_unset(&json!({"totalNetWorth": null}), "totalNetWorth", Decimal::ZERO)
            .is_none());
    }
}
