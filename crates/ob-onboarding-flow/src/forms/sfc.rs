//! Statement of Financial Condition (2 steps, completion gated at step 2).

use ob_onboarding_types::{DerivedView, FieldErrors, FieldPath, FormType, StepKey};
use serde_json::{json, Map, Value};

use crate::calculators::{self, AmountGroup};
use crate::checks;
use crate::forms::registration::{self, RegistrationField, BLOCK};
use crate::prefill::PrefillSources;
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialConditionQuestion {
    Registration(RegistrationField),
    Amounts(AmountGroup),
    Notes,
}

impl StepQuestion for FinancialConditionQuestion {
    fn all() -> Vec<Self> {
        RegistrationField::ALL
            .into_iter()
            .map(FinancialConditionQuestion::Registration)
            .chain(AmountGroup::ALL.into_iter().map(FinancialConditionQuestion::Amounts))
            .chain([FinancialConditionQuestion::Notes])
            .collect()
    }

    fn path(&self) -> FieldPath {
        match self {
            FinancialConditionQuestion::Registration(field) => field.path(BLOCK),
            FinancialConditionQuestion::Amounts(group) => FieldPath::parse(group.key()),
            FinancialConditionQuestion::Notes => FieldPath::parse("notes"),
        }
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            FinancialConditionQuestion::Registration(field) => field.label(),
            FinancialConditionQuestion::Amounts(group) => match group {
                AmountGroup::LiquidNonQualifiedAssets => "Liquid non-qualified assets",
                AmountGroup::Liabilities => "Liabilities",
                AmountGroup::IlliquidNonQualifiedAssets => "Illiquid non-qualified assets",
                AmountGroup::LiquidQualifiedAssets => "Liquid qualified assets",
                AmountGroup::Income => "Income",
                AmountGroup::IlliquidQualifiedAssets => "Illiquid qualified assets",
            },
            FinancialConditionQuestion::Notes => "Notes",
        }
        .to_string()
    }

    fn is_active(&self, _ctx: &StepContext<'_>) -> bool {
        true
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        match self {
            FinancialConditionQuestion::Registration(field) => field.validate(doc, BLOCK, errors),
            FinancialConditionQuestion::Amounts(group) => {
                checks::amount_group(doc, group.key(), group.lines(), errors)
            }
            FinancialConditionQuestion::Notes => {}
        }
    }
}

pub struct FinancialConditionStep;

impl StepDefinition for FinancialConditionStep {
    type Question = FinancialConditionQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::Sfc,
        step: 1,
    };
    const LABEL: &'static str = "Financial Condition";

    fn schema() -> StepSchema {
        let mut defaults = Map::new();
        defaults.insert(BLOCK.to_string(), registration::block_defaults());
        for group in AmountGroup::ALL {
            let lines: Map<String, Value> = group
                .lines()
                .iter()
                .map(|line| (line.to_string(), json!(0)))
                .collect();
            defaults.insert(group.key().to_string(), Value::Object(lines));
        }
        defaults.insert("notes".to_string(), json!(""));
        StepSchema::new(Value::Object(defaults))
    }

    fn derived(ctx: &StepContext<'_>) -> Option<DerivedView> {
        Some(DerivedView::Totals(calculators::sfc_totals(ctx.doc())))
    }

    fn prefill(fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
        registration::prefill(fields, sources)
    }
}
