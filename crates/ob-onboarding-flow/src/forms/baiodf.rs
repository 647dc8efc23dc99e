//! Brokerage Alternative Investment Order Disclosure Form (3 steps,
//! completion gated at step 3).

use ob_onboarding_types::{DerivedView, FieldErrors, FieldPath, FormType, StepKey};
use serde_json::{json, Value};

use crate::calculators;
use crate::checks::{self, DateRule};
use crate::document::DateValue;
use crate::forms::registration::{self, RegistrationField, BLOCK};
use crate::options::{option_map, OptionKey, YesNo};
use crate::prefill::{self, PrefillSources};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

option_map! {
    pub enum Custodian {
        FirstClearing => "firstClearing",
        Pershing => "pershing",
        Schwab => "schwab",
        Fidelity => "fidelity",
        DirectToSponsor => "directToSponsor",
        Other => "other",
    }
}

const PROPOSED_PRINCIPAL: &str = "orderBasics.proposedPrincipalAmount";

// ============================================================================
// STEP 1: ORDER BASICS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderBasicsQuestion {
    Registration(RegistrationField),
    Custodian,
    CustodianOther,
    NameOfProduct,
    SponsorIssuer,
    ProposedPrincipalAmount,
    SolicitedTrade,
    QualifiedAccount,
    TaxAdvantagePurchase,
    DateOfPpm,
    DatePpmSent,
}

impl OrderBasicsQuestion {
    fn dotted(&self) -> String {
        let leaf = match self {
            OrderBasicsQuestion::Registration(field) => return field.dotted(BLOCK),
            OrderBasicsQuestion::Custodian => "custodian",
            OrderBasicsQuestion::CustodianOther => "custodianOther",
            OrderBasicsQuestion::NameOfProduct => "nameOfProduct",
            OrderBasicsQuestion::SponsorIssuer => "sponsorIssuer",
            OrderBasicsQuestion::ProposedPrincipalAmount => "proposedPrincipalAmount",
            OrderBasicsQuestion::SolicitedTrade => "solicitedTrade",
            OrderBasicsQuestion::QualifiedAccount => "qualifiedAccount",
            OrderBasicsQuestion::TaxAdvantagePurchase => "taxAdvantagePurchase",
            OrderBasicsQuestion::DateOfPpm => "dateOfPpm",
            OrderBasicsQuestion::DatePpmSent => "datePpmSent",
        };
        format!("orderBasics.{leaf}")
    }
}

impl StepQuestion for OrderBasicsQuestion {
    fn all() -> Vec<Self> {
        RegistrationField::ALL
            .into_iter()
            .map(OrderBasicsQuestion::Registration)
            .chain([
                OrderBasicsQuestion::Custodian,
                OrderBasicsQuestion::CustodianOther,
                OrderBasicsQuestion::NameOfProduct,
                OrderBasicsQuestion::SponsorIssuer,
                OrderBasicsQuestion::ProposedPrincipalAmount,
                OrderBasicsQuestion::SolicitedTrade,
                OrderBasicsQuestion::QualifiedAccount,
                OrderBasicsQuestion::TaxAdvantagePurchase,
                OrderBasicsQuestion::DateOfPpm,
                OrderBasicsQuestion::DatePpmSent,
            ])
            .collect()
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(&self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            OrderBasicsQuestion::Registration(field) => field.label(),
            OrderBasicsQuestion::Custodian => "Custodian",
            OrderBasicsQuestion::CustodianOther => "Other custodian",
            OrderBasicsQuestion::NameOfProduct => "Name of product",
            OrderBasicsQuestion::SponsorIssuer => "Sponsor/issuer",
            OrderBasicsQuestion::ProposedPrincipalAmount => "Proposed principal amount",
            OrderBasicsQuestion::SolicitedTrade => "Solicited trade",
            OrderBasicsQuestion::QualifiedAccount => "Qualified account",
            OrderBasicsQuestion::TaxAdvantagePurchase => "Tax-advantage purchase",
            OrderBasicsQuestion::DateOfPpm => "Date of PPM",
            OrderBasicsQuestion::DatePpmSent => "Date PPM sent",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        match self {
            OrderBasicsQuestion::CustodianOther => {
                ctx.doc()
                    .choice::<Custodian>(&OrderBasicsQuestion::Custodian.dotted())
                    == Some(Custodian::Other)
            }
            _ => true,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        let dotted = self.dotted();
        let label = self.label(ctx);
        match self {
            OrderBasicsQuestion::Registration(field) => field.validate(doc, BLOCK, errors),
            OrderBasicsQuestion::Custodian => {
                checks::exactly_one::<Custodian>(doc, &dotted, "custodian", errors);
            }
            OrderBasicsQuestion::CustodianOther => {
                checks::required_text_with(doc, &dotted, "Specify the custodian", errors);
            }
            OrderBasicsQuestion::NameOfProduct | OrderBasicsQuestion::SponsorIssuer => {
                checks::required_text(doc, &dotted, &label, errors);
            }
            OrderBasicsQuestion::ProposedPrincipalAmount => {
                checks::amount(doc, &dotted, &label, true, errors);
            }
            OrderBasicsQuestion::SolicitedTrade
            | OrderBasicsQuestion::QualifiedAccount
            | OrderBasicsQuestion::TaxAdvantagePurchase => {
                let what = format!("{} answer", label.to_lowercase());
                checks::exactly_one::<YesNo>(doc, &dotted, &what, errors);
            }
            OrderBasicsQuestion::DateOfPpm => {
                checks::date(doc, &dotted, &label, DateRule::required(), ctx.today(), errors);
            }
            OrderBasicsQuestion::DatePpmSent => {
                let ppm_date = match doc.date(&OrderBasicsQuestion::DateOfPpm.dotted()) {
                    DateValue::Valid(d) => Some(d),
                    _ => None,
                };
                checks::date(
                    doc,
                    &dotted,
                    &label,
                    DateRule::required().not_before(ppm_date),
                    ctx.today(),
                    errors,
                );
            }
        }
    }
}

pub struct OrderBasicsStep;

impl StepDefinition for OrderBasicsStep {
    type Question = OrderBasicsQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::Baiodf,
        step: 1,
    };
    const LABEL: &'static str = "Order Basics";

    fn schema() -> StepSchema {
        StepSchema::new(json!({
            "accountRegistration": registration::block_defaults(),
            "orderBasics": {
                "custodian": Custodian::empty_map(),
                "custodianOther": "",
                "nameOfProduct": "",
                "sponsorIssuer": "",
                "proposedPrincipalAmount": 0,
                "solicitedTrade": YesNo::empty_map(),
                "qualifiedAccount": YesNo::empty_map(),
                "taxAdvantagePurchase": YesNo::empty_map(),
                "dateOfPpm": null,
                "datePpmSent": null,
            }
        }))
    }

    fn prefill(fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
        registration::prefill(fields, sources)
    }
}

// ============================================================================
// STEP 2: CONCENTRATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcentrationsQuestion {
    TotalNetWorth,
    ExistingIlliquidAltPositions,
    ExistingSemiLiquidAltPositions,
    ExistingTaxAdvantageAltPositions,
    HasOtherInvestments,
    OtherEntries,
}

impl ConcentrationsQuestion {
    fn dotted(&self) -> &'static str {
        match self {
            ConcentrationsQuestion::TotalNetWorth => "totalNetWorth",
            ConcentrationsQuestion::ExistingIlliquidAltPositions => "existingIlliquidAltPositions",
            ConcentrationsQuestion::ExistingSemiLiquidAltPositions => {
                "existingSemiLiquidAltPositions"
            }
            ConcentrationsQuestion::ExistingTaxAdvantageAltPositions => {
                "existingTaxAdvantageAltPositions"
            }
            ConcentrationsQuestion::HasOtherInvestments => "hasOtherInvestments",
            ConcentrationsQuestion::OtherEntries => "otherEntries",
        }
    }
}

impl StepQuestion for ConcentrationsQuestion {
    fn all() -> Vec<Self> {
        vec![
            ConcentrationsQuestion::TotalNetWorth,
            ConcentrationsQuestion::ExistingIlliquidAltPositions,
            ConcentrationsQuestion::ExistingSemiLiquidAltPositions,
            ConcentrationsQuestion::ExistingTaxAdvantageAltPositions,
            ConcentrationsQuestion::HasOtherInvestments,
            ConcentrationsQuestion::OtherEntries,
        ]
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            ConcentrationsQuestion::TotalNetWorth => "Total net worth",
            ConcentrationsQuestion::ExistingIlliquidAltPositions => {
                "Existing illiquid alternative positions"
            }
            ConcentrationsQuestion::ExistingSemiLiquidAltPositions => {
                "Existing semi-liquid alternative positions"
            }
            ConcentrationsQuestion::ExistingTaxAdvantageAltPositions => {
                "Existing tax-advantage alternative positions"
            }
            ConcentrationsQuestion::HasOtherInvestments => "Other investments",
            ConcentrationsQuestion::OtherEntries => "Other investment entries",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        match self {
            ConcentrationsQuestion::OtherEntries => {
                ctx.doc()
                    .choice::<YesNo>(ConcentrationsQuestion::HasOtherInvestments.dotted())
                    == Some(YesNo::Yes)
            }
            _ => true,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        let dotted = self.dotted();
        match self {
            ConcentrationsQuestion::TotalNetWorth
            | ConcentrationsQuestion::ExistingIlliquidAltPositions
            | ConcentrationsQuestion::ExistingSemiLiquidAltPositions
            | ConcentrationsQuestion::ExistingTaxAdvantageAltPositions => {
                checks::amount(doc, dotted, &self.label(ctx), true, errors);
            }
            ConcentrationsQuestion::HasOtherInvestments => {
                checks::exactly_one::<YesNo>(doc, dotted, "other investments answer", errors);
            }
            ConcentrationsQuestion::OtherEntries => {
                let entries = doc.items(dotted);
                if entries.is_empty() {
                    errors.insert(self.path(), "Add at least one other investment");
                }
                for i in 0..entries.len() {
                    checks::required_text(
                        doc,
                        &format!("{dotted}.{i}.description"),
                        "Description",
                        errors,
                    );
                    checks::amount(doc, &format!("{dotted}.{i}.amount"), "Amount", true, errors);
                }
            }
        }
    }
}

pub struct ConcentrationsStep;

impl StepDefinition for ConcentrationsStep {
    type Question = ConcentrationsQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::Baiodf,
        step: 2,
    };
    const LABEL: &'static str = "Concentrations";

    fn schema() -> StepSchema {
        StepSchema::new(json!({
            "totalNetWorth": 0,
            "existingIlliquidAltPositions": 0,
            "existingSemiLiquidAltPositions": 0,
            "existingTaxAdvantageAltPositions": 0,
            "hasOtherInvestments": YesNo::empty_map(),
            "otherEntries": [],
        }))
        .with_items("otherEntries", json!({"description": "", "amount": 0}))
    }

    fn derived(ctx: &StepContext<'_>) -> Option<DerivedView> {
        let principal = ctx.step_doc(1).amount(PROPOSED_PRINCIPAL);
        Some(DerivedView::Concentrations(
            calculators::baiodf_concentrations(ctx.doc(), principal),
        ))
    }

    fn prefill(fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
        let Some(totals) = sources.sfc_totals() else {
            return Vec::new();
        };
        let mut writes = Vec::new();
        let target = ConcentrationsQuestion::TotalNetWorth.dotted();
        if let Some(write) = prefill::amount_if_unset(fields, target, totals.total_net_worth) {
            writes.push(write);
            prefill::trace_writes("totalNetWorth", &writes);
        }
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use crate::step::EngineOptions;
    use chrono::NaiveDate;
    use ob_onboarding_types::FormRecord;

    fn options() -> EngineOptions {
        EngineOptions::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
    }

    fn order_errors(fields: &Value, question: OrderBasicsQuestion) -> FieldErrors {
        let form = FormRecord::new(FormType::Baiodf);
        let options = options();
        let ctx = StepContext::new(OrderBasicsStep::KEY, fields, &form, &options);
        let mut errors = FieldErrors::new();
        question.validate(&ctx, &mut errors);
        errors
    }

    #[test]
    fn test_two_custodians_fail_exactly_one() {
        let fields = patch::apply(
            OrderBasicsStep::schema().defaults(),
            &FieldPath::parse("orderBasics.custodian"),
            json!({"firstClearing": false, "pershing": true, "schwab": true,
                   "fidelity": false, "directToSponsor": false, "other": false}),
        );
        let errors = order_errors(&fields, OrderBasicsQuestion::Custodian);
        assert!(errors
            .message("orderBasics.custodian")
            .unwrap()
            .contains("exactly one"));
    }

    #[test]
    fn test_other_custodian_must_be_specified() {
        let fields = patch::apply(
            OrderBasicsStep::schema().defaults(),
            &FieldPath::parse("orderBasics.custodian"),
            Custodian::Other.selected_map(),
        );
        let form = FormRecord::new(FormType::Baiodf);
        let options = options();
        let ctx = StepContext::new(OrderBasicsStep::KEY, &fields, &form, &options);
        assert!(OrderBasicsQuestion::CustodianOther.is_active(&ctx));

        let errors = order_errors(&fields, OrderBasicsQuestion::CustodianOther);
        assert!(errors
            .message("orderBasics.custodianOther")
            .unwrap()
            .contains("Specify"));
    }

    #[test]
    fn test_ppm_sent_not_before_ppm_date() {
        let fields = patch::apply_all(
            OrderBasicsStep::schema().defaults(),
            [
                (FieldPath::parse("orderBasics.dateOfPpm"), json!("2026-03-10")),
                (FieldPath::parse("orderBasics.datePpmSent"), json!("2026-03-01")),
            ],
        );
        let errors = order_errors(&fields, OrderBasicsQuestion::DatePpmSent);
        assert_eq!(
            errors.message("orderBasics.datePpmSent"),
            Some("Date PPM sent cannot be before 2026-03-10")
        );
    }

    #[test]
    fn test_other_entries_follow_has_other_investments() {
        let form = FormRecord::new(FormType::Baiodf);
        let options = options();
        let fields = patch::apply(
            ConcentrationsStep::schema().defaults(),
            &FieldPath::parse("hasOtherInvestments"),
            YesNo::No.selected_map(),
        );
        let ctx = StepContext::new(ConcentrationsStep::KEY, &fields, &form, &options);
        assert!(!ConcentrationsQuestion::OtherEntries.is_active(&ctx));

        let fields = patch::apply(
            &fields,
            &FieldPath::parse("hasOtherInvestments"),
            YesNo::Yes.selected_map(),
        );
        let ctx = StepContext::new(ConcentrationsStep::KEY, &fields, &form, &options);
        assert!(ConcentrationsQuestion::OtherEntries.is_active(&ctx));
        let mut errors = FieldErrors::new();
        ConcentrationsQuestion::OtherEntries.validate(&ctx, &mut errors);
        assert!(errors.message("otherEntries").is_some());
    }
}
