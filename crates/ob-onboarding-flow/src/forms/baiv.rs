//! Brokerage Accredited Investor Verification, Rule 506(c) (2 steps,
//! completion gated at step 2).
//!
//! The investor type filters which accreditation bases apply; the chosen
//! basis surfaces exactly one verification block.

use ob_onboarding_types::{DerivedView, FieldErrors, FieldPath, FormType, StepKey};
use serde_json::{json, Value};

use crate::calculators;
use crate::checks;
use crate::forms::registration::{self, RegistrationField, BLOCK};
use crate::options::{option_map, OptionKey, YesNo};
use crate::prefill::{self, PrefillSources};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

option_map! {
    pub enum InvestorType {
        NaturalPerson => "naturalPerson",
        Entity => "entity",
    }
}

option_map! {
    pub enum AccreditationBasis {
        Income => "income",
        NetWorth => "netWorth",
        LicensedProfessional => "licensedProfessional",
        EntityAssets => "entityAssets",
        AllOwnersAccredited => "allOwnersAccredited",
    }
}

impl AccreditationBasis {
    pub fn applies_to(&self, investor: InvestorType) -> bool {
        match self {
            AccreditationBasis::Income
            | AccreditationBasis::NetWorth
            | AccreditationBasis::LicensedProfessional => investor == InvestorType::NaturalPerson,
            AccreditationBasis::EntityAssets | AccreditationBasis::AllOwnersAccredited => {
                investor == InvestorType::Entity
            }
        }
    }
}

option_map! {
    pub enum LicenseType {
        Series7 => "series7",
        Series65 => "series65",
        Series82 => "series82",
    }
}

option_map! {
    pub enum VerificationDocument {
        TaxReturns => "taxReturns",
        BrokerageStatements => "brokerageStatements",
        CpaLetter => "cpaLetter",
        AttorneyLetter => "attorneyLetter",
        FinraBrokerCheck => "finraBrokerCheck",
    }
}

pub const INCOME: &str = "incomeVerification";
pub const NET_WORTH: &str = "netWorthVerification";
const PROFESSIONAL: &str = "professionalVerification";
const ENTITY: &str = "entityVerification";
const INVESTOR_TYPE: &str = "investorType";
const BASIS: &str = "accreditationBasis";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationQuestion {
    Registration(RegistrationField),
    InvestorType,
    AccreditationBasis,
    IncomeVerification,
    NetWorthVerification,
    ProfessionalVerification,
    EntityVerification,
    VerificationDocuments,
}

impl VerificationQuestion {
    fn dotted(&self) -> String {
        match self {
            VerificationQuestion::Registration(field) => field.dotted(BLOCK),
            VerificationQuestion::InvestorType => INVESTOR_TYPE.to_string(),
            VerificationQuestion::AccreditationBasis => BASIS.to_string(),
            VerificationQuestion::IncomeVerification => INCOME.to_string(),
            VerificationQuestion::NetWorthVerification => NET_WORTH.to_string(),
            VerificationQuestion::ProfessionalVerification => PROFESSIONAL.to_string(),
            VerificationQuestion::EntityVerification => ENTITY.to_string(),
            VerificationQuestion::VerificationDocuments => "verificationDocuments".to_string(),
        }
    }
}

impl StepQuestion for VerificationQuestion {
    fn all() -> Vec<Self> {
        RegistrationField::ALL
            .into_iter()
            .map(VerificationQuestion::Registration)
            .chain([
                VerificationQuestion::InvestorType,
                VerificationQuestion::AccreditationBasis,
                VerificationQuestion::IncomeVerification,
                VerificationQuestion::NetWorthVerification,
                VerificationQuestion::ProfessionalVerification,
                VerificationQuestion::EntityVerification,
                VerificationQuestion::VerificationDocuments,
            ])
            .collect()
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(&self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            VerificationQuestion::Registration(field) => field.label(),
            VerificationQuestion::InvestorType => "Investor type",
            VerificationQuestion::AccreditationBasis => "Accreditation basis",
            VerificationQuestion::IncomeVerification => "Income verification",
            VerificationQuestion::NetWorthVerification => "Net worth verification",
            VerificationQuestion::ProfessionalVerification => "Professional verification",
            VerificationQuestion::EntityVerification => "Entity verification",
            VerificationQuestion::VerificationDocuments => "Verification documents",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        let basis = ctx.doc().choice::<AccreditationBasis>(BASIS);
        match self {
            VerificationQuestion::IncomeVerification => basis == Some(AccreditationBasis::Income),
            VerificationQuestion::NetWorthVerification => {
                basis == Some(AccreditationBasis::NetWorth)
            }
            VerificationQuestion::ProfessionalVerification => {
                basis == Some(AccreditationBasis::LicensedProfessional)
            }
            VerificationQuestion::EntityVerification => {
                basis == Some(AccreditationBasis::EntityAssets)
            }
            _ => true,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        match self {
            VerificationQuestion::Registration(field) => field.validate(doc, BLOCK, errors),
            VerificationQuestion::InvestorType => {
                checks::exactly_one::<InvestorType>(doc, INVESTOR_TYPE, "investor type", errors);
            }
            VerificationQuestion::AccreditationBasis => {
                let basis = checks::exactly_one::<AccreditationBasis>(
                    doc,
                    BASIS,
                    "accreditation basis",
                    errors,
                );
                let investor = doc.choice::<InvestorType>(INVESTOR_TYPE);
                if let (Some(basis), Some(investor)) = (basis, investor) {
                    if !basis.applies_to(investor) {
                        let who = match investor {
                            InvestorType::NaturalPerson => "a natural person",
                            InvestorType::Entity => "an entity",
                        };
                        errors.insert(
                            self.path(),
                            format!("This accreditation basis does not apply to {who}"),
                        );
                    }
                }
            }
            VerificationQuestion::IncomeVerification => {
                for (leaf, label) in [
                    ("priorYearIncome", "Prior year income"),
                    ("twoYearsPriorIncome", "Income two years prior"),
                    ("expectedCurrentYearIncome", "Expected current year income"),
                ] {
                    checks::amount(doc, &format!("{INCOME}.{leaf}"), label, true, errors);
                }
                checks::exactly_one::<YesNo>(
                    doc,
                    &format!("{INCOME}.jointIncome"),
                    "joint income answer",
                    errors,
                );
            }
            VerificationQuestion::NetWorthVerification => {
                checks::amount(
                    doc,
                    &format!("{NET_WORTH}.totalNetWorth"),
                    "Total net worth",
                    true,
                    errors,
                );
                let excludes = format!("{NET_WORTH}.excludesPrimaryResidence");
                if doc.choice::<YesNo>(&excludes) != Some(YesNo::Yes) {
                    errors.insert(
                        FieldPath::parse(&excludes),
                        "Net worth must exclude the primary residence",
                    );
                }
            }
            VerificationQuestion::ProfessionalVerification => {
                checks::exactly_one::<LicenseType>(
                    doc,
                    &format!("{PROFESSIONAL}.licenseType"),
                    "license type",
                    errors,
                );
                checks::format(
                    doc,
                    &format!("{PROFESSIONAL}.crdNumber"),
                    "CRD number",
                    checks::TextFormat::CrdNumber,
                    true,
                    errors,
                );
            }
            VerificationQuestion::EntityVerification => {
                checks::amount(
                    doc,
                    &format!("{ENTITY}.totalAssets"),
                    "Total assets",
                    true,
                    errors,
                );
            }
            VerificationQuestion::VerificationDocuments => {
                checks::at_least_one::<VerificationDocument>(
                    doc,
                    "verificationDocuments",
                    "verification document",
                    errors,
                );
            }
        }
    }
}

pub struct VerificationStep;

impl StepDefinition for VerificationStep {
    type Question = VerificationQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::Baiv506c,
        step: 1,
    };
    const LABEL: &'static str = "Accredited Investor Verification";

    fn schema() -> StepSchema {
        StepSchema::new(json!({
            "accountRegistration": registration::block_defaults(),
            "investorType": InvestorType::empty_map(),
            "accreditationBasis": AccreditationBasis::empty_map(),
            "incomeVerification": {
                "priorYearIncome": null,
                "twoYearsPriorIncome": null,
                "expectedCurrentYearIncome": null,
                "jointIncome": YesNo::empty_map(),
            },
            "netWorthVerification": {
                "totalNetWorth": null,
                "excludesPrimaryResidence": YesNo::empty_map(),
            },
            "professionalVerification": {
                "licenseType": LicenseType::empty_map(),
                "crdNumber": "",
            },
            "entityVerification": {"totalAssets": null},
            "verificationDocuments": VerificationDocument::empty_map(),
        }))
    }

    fn derived(ctx: &StepContext<'_>) -> Option<DerivedView> {
        Some(DerivedView::Accreditation(calculators::baiv_accreditation(
            ctx.doc(),
        )))
    }

    fn prefill(fields: &Value, sources: &PrefillSources<'_>) -> Vec<(FieldPath, Value)> {
        let mut writes = registration::prefill(fields, sources);
        if let Some(totals) = sources.sfc_totals() {
            let target = format!("{NET_WORTH}.totalNetWorth");
            if let Some(write) = prefill::amount_if_unset(
                fields,
                &target,
                totals.total_net_worth_excluding_primary_residence,
            ) {
                prefill::trace_writes(NET_WORTH, std::slice::from_ref(&write));
                writes.push(write);
            }
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

    fn errors_for(fields: &Value, question: VerificationQuestion) -> FieldErrors {
        let form = FormRecord::new(FormType::Baiv506c);
        let options = EngineOptions::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        let ctx = StepContext::new(VerificationStep::KEY, fields, &form, &options);
        let mut errors = FieldErrors::new();
        question.validate(&ctx, &mut errors);
        errors
    }

    #[test]
    fn test_basis_must_match_investor_type() {
        let fields = patch::apply_all(
            VerificationStep::schema().defaults(),
            [
                (
                    FieldPath::parse(INVESTOR_TYPE),
                    InvestorType::Entity.selected_map(),
                ),
                (
                    FieldPath::parse(BASIS),
                    AccreditationBasis::Income.selected_map(),
                ),
            ],
        );
        let errors = errors_for(&fields, VerificationQuestion::AccreditationBasis);
        assert_eq!(
            errors.message(BASIS),
            Some("This accreditation basis does not apply to an entity")
        );
    }

    #[test]
    fn test_basis_surfaces_one_verification_block() {
        let fields = patch::apply(
            VerificationStep::schema().defaults(),
            &FieldPath::parse(BASIS),
            AccreditationBasis::NetWorth.selected_map(),
        );
        let form = FormRecord::new(FormType::Baiv506c);
        let options = EngineOptions::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        let ctx = StepContext::new(VerificationStep::KEY, &fields, &form, &options);
        let blocks: Vec<_> = [
            VerificationQuestion::IncomeVerification,
            VerificationQuestion::NetWorthVerification,
            VerificationQuestion::ProfessionalVerification,
            VerificationQuestion::EntityVerification,
        ]
        .into_iter()
        .filter(|q| q.is_active(&ctx))
        .collect();
        assert_eq!(blocks, vec![VerificationQuestion::NetWorthVerification]);

        let errors = errors_for(&fields, VerificationQuestion::NetWorthVerification);
        assert_eq!(
            errors.message("netWorthVerification.totalNetWorth"),
            Some("Total net worth is required")
        );
        assert!(errors
            .message("netWorthVerification.excludesPrimaryResidence")
            .is_some());
    }

    #[test]
    fn test_crd_number_digits_only() {
        let fields = patch::apply(
            VerificationStep::schema().defaults(),
            &FieldPath::parse(PROFESSIONAL),
            json!({"licenseType": {"series7": true}, "crdNumber": "12A45"}),
        );
        let errors = errors_for(&fields, VerificationQuestion::ProfessionalVerification);
        assert_eq!(
            errors.message("professionalVerification.crdNumber"),
            Some("CRD number must be digits only")
        );
    }
}
