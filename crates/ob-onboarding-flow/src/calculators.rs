//! Derived Calculators
//!
//! Read-only numeric views recomputed from a fields document on every read
//! and write. Nothing here is persisted; the document stays the single
//! source of truth. Results are raw decimals; formatting is a presentation
//! concern.
//!
//! Arithmetic saturates at `Decimal::MAX`/`Decimal::MIN`: any non-negative
//! number is a valid amount, so sums near the 96-bit limit must not panic.

use ob_onboarding_types::{
    BaiodfStepTwoConcentrations, BaivStepOneAccreditation,
    StatementOfFinancialConditionStepOneTotals,
};
use rust_decimal::Decimal;

use crate::document::Doc;
use crate::forms::baiv::{AccreditationBasis, INCOME, NET_WORTH};
use crate::options::YesNo;

// ============================================================================
// SFC TOTALS
// ============================================================================

/// Fixed SFC amount groups and their line keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmountGroup {
    LiquidNonQualifiedAssets,
    Liabilities,
    IlliquidNonQualifiedAssets,
    LiquidQualifiedAssets,
    Income,
    IlliquidQualifiedAssets,
}

impl AmountGroup {
    pub const ALL: [AmountGroup; 6] = [
        AmountGroup::LiquidNonQualifiedAssets,
        AmountGroup::Liabilities,
        AmountGroup::IlliquidNonQualifiedAssets,
        AmountGroup::LiquidQualifiedAssets,
        AmountGroup::Income,
        AmountGroup::IlliquidQualifiedAssets,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AmountGroup::LiquidNonQualifiedAssets => "liquidNonQualifiedAssets",
            AmountGroup::Liabilities => "liabilities",
            AmountGroup::IlliquidNonQualifiedAssets => "illiquidNonQualifiedAssets",
            AmountGroup::LiquidQualifiedAssets => "liquidQualifiedAssets",
            AmountGroup::Income => "income",
            AmountGroup::IlliquidQualifiedAssets => "illiquidQualifiedAssets",
        }
    }

    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            AmountGroup::LiquidNonQualifiedAssets => &[
                "cashMoneyMarketsCds",
                "brokerageNonManaged",
                "managedAccounts",
                "mutualFundsDirect",
                "annuitiesLessSurrenderCharges",
                "cashValueLifeInsurance",
                "otherLiquid",
            ],
            AmountGroup::Liabilities => &[
                "mortgagePrimaryResidence",
                "mortgagesSecondaryInvestment",
                "homeEquityLoans",
                "creditCards",
                "otherLiabilities",
            ],
            AmountGroup::IlliquidNonQualifiedAssets => &[
                "primaryResidence",
                "investmentRealEstate",
                "privateBusiness",
                "illiquidAlternativeInvestments",
                "otherIlliquid",
            ],
            AmountGroup::LiquidQualifiedAssets => &[
                "cashMoneyMarketsCds",
                "retirementPlans",
                "brokerageNonManaged",
                "managedAccounts",
                "mutualFundsDirect",
                "annuitiesLessSurrenderCharges",
            ],
            AmountGroup::Income => &[
                "salary",
                "socialSecurity",
                "pension",
                "annuityIncome",
                "rentalIncome",
                "investmentIncome",
                "otherIncome",
            ],
            AmountGroup::IlliquidQualifiedAssets => {
                &["illiquidAlternativeInvestments", "otherIlliquidQualified"]
            }
        }
    }

    /// Sum of the group's lines; missing or negative lines count as zero.
    pub fn total(&self, doc: Doc<'_>) -> Decimal {
        self.lines()
            .iter()
            .map(|line| doc.amount(&format!("{}.{line}", self.key())))
            .filter(|v| v.is_sign_positive())
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

/// SFC step-1 totals and net-worth summary.
pub fn sfc_totals(step1: Doc<'_>) -> StatementOfFinancialConditionStepOneTotals {
    let lnq = AmountGroup::LiquidNonQualifiedAssets.total(step1);
    let liabilities = AmountGroup::Liabilities.total(step1);
    let inq = AmountGroup::IlliquidNonQualifiedAssets.total(step1);
    let lq = AmountGroup::LiquidQualifiedAssets.total(step1);
    let income = AmountGroup::Income.total(step1);
    let iq = AmountGroup::IlliquidQualifiedAssets.total(step1);

    let liquid = lnq.saturating_add(lq);
    let illiquid = inq.saturating_add(iq);
    let assets = liquid.saturating_add(illiquid);
    let net_worth = assets.saturating_sub(liabilities);
    let primary_residence = step1
        .amount("illiquidNonQualifiedAssets.primaryResidence")
        .max(Decimal::ZERO);

    StatementOfFinancialConditionStepOneTotals {
        total_liquid_non_qualified_assets: lnq,
        total_liabilities: liabilities,
        total_illiquid_non_qualified_assets: inq,
        total_liquid_qualified_assets: lq,
        total_income: income,
        total_illiquid_qualified_assets: iq,
        total_liquid_assets: liquid,
        total_illiquid_assets: illiquid,
        total_assets: assets,
        total_net_worth: net_worth,
        total_net_worth_excluding_primary_residence: net_worth.saturating_sub(primary_residence),
        liquid_net_worth: liquid.saturating_sub(liabilities),
    }
}

// ============================================================================
// BAIODF CONCENTRATIONS
// ============================================================================

/// `100 * part / whole` when `whole > 0`, else zero.
///
/// Falls back to `(part / whole) * 100` when `part * 100` overflows, and
/// saturates when the percentage itself does not fit.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| {
            part.checked_div(whole)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .unwrap_or(if part.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// BAIODF step-2 concentrations. `proposed_principal` is the step-1
/// `orderBasics.proposedPrincipalAmount`.
pub fn baiodf_concentrations(
    step2: Doc<'_>,
    proposed_principal: Decimal,
) -> BaiodfStepTwoConcentrations {
    let net_worth = step2.amount("totalNetWorth");
    let illiquid = percent_of(step2.amount("existingIlliquidAltPositions"), net_worth);
    let semi_liquid = percent_of(step2.amount("existingSemiLiquidAltPositions"), net_worth);
    let tax_advantage = percent_of(step2.amount("existingTaxAdvantageAltPositions"), net_worth);
    let total = illiquid
        .saturating_add(semi_liquid)
        .saturating_add(tax_advantage);
    let proposed = percent_of(proposed_principal, net_worth);

    BaiodfStepTwoConcentrations {
        existing_illiquid_alt_concentration_percent: illiquid,
        existing_semi_liquid_alt_concentration_percent: semi_liquid,
        existing_tax_advantage_alt_concentration_percent: tax_advantage,
        total_concentration_percent: total,
        proposed_purchase_concentration_percent: proposed,
        projected_concentration_percent: total.saturating_add(proposed),
    }
}

// ============================================================================
// BAIV ACCREDITATION
// ============================================================================

const INCOME_THRESHOLD: i64 = 200_000;
const JOINT_INCOME_THRESHOLD: i64 = 300_000;
const NET_WORTH_THRESHOLD: i64 = 1_000_000;
const ENTITY_ASSETS_THRESHOLD: i64 = 5_000_000;

/// Accredited-investor tests over the BAIV step-1 evidence.
pub fn baiv_accreditation(step1: Doc<'_>) -> BaivStepOneAccreditation {
    let income = step1.at(INCOME);
    let threshold = if income.choice::<YesNo>("jointIncome") == Some(YesNo::Yes) {
        Decimal::from(JOINT_INCOME_THRESHOLD)
    } else {
        Decimal::from(INCOME_THRESHOLD)
    };
    let meets_income_test = [
        "priorYearIncome",
        "twoYearsPriorIncome",
        "expectedCurrentYearIncome",
    ]
    .iter()
    .all(|leaf| income.decimal(leaf).is_some_and(|v| v > threshold));

    let meets_net_worth_test = step1
        .at(NET_WORTH)
        .decimal("totalNetWorth")
        .is_some_and(|v| v > Decimal::from(NET_WORTH_THRESHOLD));

    let meets_entity_assets_test = step1
        .decimal("entityVerification.totalAssets")
        .is_some_and(|v| v > Decimal::from(ENTITY_ASSETS_THRESHOLD));

    let is_accredited = match step1.choice::<AccreditationBasis>("accreditationBasis") {
        Some(AccreditationBasis::Income) => meets_income_test,
        Some(AccreditationBasis::NetWorth) => meets_net_worth_test,
        Some(AccreditationBasis::EntityAssets) => meets_entity_assets_test,
        Some(AccreditationBasis::LicensedProfessional | AccreditationBasis::AllOwnersAccredited) => {
            true
        }
        None => false,
    };

    BaivStepOneAccreditation {
        meets_income_test,
        meets_net_worth_test,
        meets_entity_assets_test,
        is_accredited,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_concentration_percentages() {
        let step2 = json!({
            "totalNetWorth": 100000,
            "existingIlliquidAltPositions": 10000,
            "existingSemiLiquidAltPositions": 5000,
            "existingTaxAdvantageAltPositions": 2000
        });
        let c = baiodf_concentrations(Doc::new(&step2), Decimal::from(8000));
        assert_eq!(c.existing_illiquid_alt_concentration_percent, Decimal::from(10));
        assert_eq!(c.existing_semi_liquid_alt_concentration_percent, Decimal::from(5));
        assert_eq!(c.existing_tax_advantage_alt_concentration_percent, Decimal::from(2));
        assert_eq!(c.total_concentration_percent, Decimal::from(17));
        assert_eq!(c.proposed_purchase_concentration_percent, Decimal::from(8));
        assert_eq!(c.projected_concentration_percent, Decimal::from(25));
    }

    #[test]
    fn test_zero_net_worth_gives_zero_percent() {
        let step2 = json!({"totalNetWorth": 0, "existingIlliquidAltPositions": 10000});
        let c = baiodf_concentrations(Doc::new(&step2), Decimal::ZERO);
        assert_eq!(c.existing_illiquid_alt_concentration_percent, Decimal::ZERO);
        assert_eq!(c.total_concentration_percent, Decimal::ZERO);
    }

    #[test]
    fn test_sfc_totals_and_negative_net_worth() {
        let step1 = json!({
            "liquidNonQualifiedAssets": {"cashMoneyMarketsCds": 50000, "otherLiquid": 2500.5},
            "liabilities": {"mortgagePrimaryResidence": 400000, "creditCards": 5000},
            "illiquidNonQualifiedAssets": {"primaryResidence": 300000},
            "liquidQualifiedAssets": {"retirementPlans": 20000},
            "income": {"salary": 120000},
            "illiquidQualifiedAssets": {}
        });
        let t = sfc_totals(Doc::new(&step1));
        assert_eq!(t.total_liquid_non_qualified_assets, Decimal::new(525005, 1));
        assert_eq!(t.total_liabilities, Decimal::from(405000));
        assert_eq!(t.total_liquid_assets, Decimal::new(725005, 1));
        assert_eq!(t.total_assets, Decimal::new(3725005, 1));
        assert_eq!(t.total_net_worth, Decimal::new(-324995, 1));
        assert_eq!(
            t.total_net_worth_excluding_primary_residence,
            Decimal::new(-3324995, 1)
        );
        assert_eq!(t.liquid_net_worth, Decimal::new(-3324995, 1));
        assert_eq!(t.total_income, Decimal::from(120000));
    }

    #[test]
    fn test_near_limit_amounts_saturate() {
        let step1 = json!({
            "liquidNonQualifiedAssets": {"cashMoneyMarketsCds": 5e28, "brokerageNonManaged": 5e28},
            "liquidQualifiedAssets": {"retirementPlans": 5e28},
            "illiquidNonQualifiedAssets": {"primaryResidence": 5e28},
            "liabilities": {"creditCards": 1000}
        });
        let t = sfc_totals(Doc::new(&step1));
        assert_eq!(t.total_liquid_non_qualified_assets, Decimal::MAX);
        assert_eq!(t.total_liquid_assets, Decimal::MAX);
        assert_eq!(t.total_assets, Decimal::MAX);
        assert!(t.total_net_worth > Decimal::ZERO);
        assert!(t.total_net_worth_excluding_primary_residence > Decimal::ZERO);
    }

    #[test]
    fn test_percent_of_huge_values() {
        let huge = Decimal::MAX;
        assert_eq!(percent_of(huge, huge), Decimal::ONE_HUNDRED);
        assert_eq!(percent_of(huge, Decimal::ONE), Decimal::MAX);
        assert_eq!(percent_of(Decimal::from(5), Decimal::from(10)), Decimal::from(50));

        let step2 = json!({
            "totalNetWorth": 1,
            "existingIlliquidAltPositions": 5e28,
            "existingSemiLiquidAltPositions": 5e28
        });
        let c = baiodf_concentrations(Doc::new(&step2), huge);
        assert_eq!(c.total_concentration_percent, Decimal::MAX);
        assert_eq!(c.projected_concentration_percent, Decimal::MAX);
    }

    #[test]
    fn test_accreditation_income_thresholds() {
        let step1 = json!({
            "accreditationBasis": {"income": true},
            "incomeVerification": {
                "priorYearIncome": 250000,
                "twoYearsPriorIncome": 250000,
                "expectedCurrentYearIncome": 250000,
                "jointIncome": {"yes": false, "no": true}
            }
        });
        assert!(baiv_accreditation(Doc::new(&step1)).is_accredited);

        let joint = json!({
            "accreditationBasis": {"income": true},
            "incomeVerification": {
                "priorYearIncome": 250000,
                "twoYearsPriorIncome": 250000,
                "expectedCurrentYearIncome": 250000,
                "jointIncome": {"yes": true, "no": false}
            }
        });
        let result = baiv_accreditation(Doc::new(&joint));
        assert!(!result.meets_income_test);
        assert!(!result.is_accredited);
    }

    #[test]
    fn test_accreditation_by_basis() {
        let step1 = json!({
            "accreditationBasis": {"licensedProfessional": true},
            "netWorthVerification": {"totalNetWorth": 2000000}
        });
        let result = baiv_accreditation(Doc::new(&step1));
        assert!(result.is_accredited);
        assert!(result.meets_net_worth_test);
        assert!(!result.meets_entity_assets_test);
    }
}
