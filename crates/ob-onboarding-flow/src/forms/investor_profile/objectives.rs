//! Investor Profile step 2: investment objectives and experience.

use ob_onboarding_types::{FieldErrors, FieldPath, FormType, StepKey};
use serde_json::{json, Map, Value};

use crate::checks;
use crate::options::{option_map, OptionKey};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

option_map! {
    pub enum InvestmentObjective {
        CapitalPreservation => "capitalPreservation",
        Income => "income",
        GrowthAndIncome => "growthAndIncome",
        Growth => "growth",
        Speculation => "speculation",
    }
}

option_map! {
    pub enum RiskTolerance {
        Conservative => "conservative",
        Moderate => "moderate",
        ModeratelyAggressive => "moderatelyAggressive",
        Aggressive => "aggressive",
    }
}

impl RiskTolerance {
    pub fn allows_advanced_options(&self) -> bool {
        matches!(self, RiskTolerance::ModeratelyAggressive | RiskTolerance::Aggressive)
    }
}

option_map! {
    pub enum TimeHorizon {
        UnderThreeYears => "underThreeYears",
        ThreeToFiveYears => "threeToFiveYears",
        SixToTenYears => "sixToTenYears",
        OverTenYears => "overTenYears",
    }
}

option_map! {
    pub enum LiquidityNeeds {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

option_map! {
    pub enum SourceOfFunds {
        IncomeFromEarnings => "incomeFromEarnings",
        AccumulatedSavings => "accumulatedSavings",
        Inheritance => "inheritance",
        SaleOfBusiness => "saleOfBusiness",
        LegalSettlement => "legalSettlement",
        SpouseParent => "spouseParent",
        Other => "other",
    }
}

option_map! {
    pub enum KnowledgeLevel {
        None => "none",
        Limited => "limited",
        Good => "good",
        Extensive => "extensive",
    }
}

/// Product kinds with a knowledge level and "since" year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvestmentKind {
    Stocks,
    Bonds,
    MutualFunds,
    Options,
    Futures,
    Annuities,
    AlternativeInvestments,
    Margin,
}

impl InvestmentKind {
    pub const ALL: [InvestmentKind; 8] = [
        InvestmentKind::Stocks,
        InvestmentKind::Bonds,
        InvestmentKind::MutualFunds,
        InvestmentKind::Options,
        InvestmentKind::Futures,
        InvestmentKind::Annuities,
        InvestmentKind::AlternativeInvestments,
        InvestmentKind::Margin,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            InvestmentKind::Stocks => "stocks",
            InvestmentKind::Bonds => "bonds",
            InvestmentKind::MutualFunds => "mutualFunds",
            InvestmentKind::Options => "options",
            InvestmentKind::Futures => "futures",
            InvestmentKind::Annuities => "annuities",
            InvestmentKind::AlternativeInvestments => "alternativeInvestments",
            InvestmentKind::Margin => "margin",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            InvestmentKind::Stocks => "Stocks",
            InvestmentKind::Bonds => "Bonds",
            InvestmentKind::MutualFunds => "Mutual funds",
            InvestmentKind::Options => "Options",
            InvestmentKind::Futures => "Futures",
            InvestmentKind::Annuities => "Annuities",
            InvestmentKind::AlternativeInvestments => "Alternative investments",
            InvestmentKind::Margin => "Margin",
        }
    }

    fn level_path(&self) -> String {
        format!("investmentKnowledge.{}.level", self.key())
    }

    fn since_path(&self) -> String {
        format!("investmentKnowledge.{}.sinceYear", self.key())
    }
}

pub const RISK_TOLERANCE: &str = "riskTolerance";
const SOURCE_OF_FUNDS: &str = "sourceOfFunds";
const OTHER_DETAILS: &str = "sourceOfFunds.otherDetails";

// ============================================================================
// QUESTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectivesQuestion {
    InvestmentObjectives,
    RiskTolerance,
    TimeHorizon,
    LiquidityNeeds,
    SourceOfFunds,
    KnowledgeLevel(InvestmentKind),
    KnowledgeSince(InvestmentKind),
}

impl StepQuestion for ObjectivesQuestion {
    fn all() -> Vec<Self> {
        let mut all = vec![
            ObjectivesQuestion::InvestmentObjectives,
            ObjectivesQuestion::RiskTolerance,
            ObjectivesQuestion::TimeHorizon,
            ObjectivesQuestion::LiquidityNeeds,
            ObjectivesQuestion::SourceOfFunds,
        ];
        for kind in InvestmentKind::ALL {
            all.push(ObjectivesQuestion::KnowledgeLevel(kind));
            all.push(ObjectivesQuestion::KnowledgeSince(kind));
        }
        all
    }

    fn path(&self) -> FieldPath {
        match self {
            ObjectivesQuestion::InvestmentObjectives => FieldPath::parse("investmentObjectives"),
            ObjectivesQuestion::RiskTolerance => FieldPath::parse(RISK_TOLERANCE),
            ObjectivesQuestion::TimeHorizon => FieldPath::parse("timeHorizon"),
            ObjectivesQuestion::LiquidityNeeds => FieldPath::parse("liquidityNeeds"),
            ObjectivesQuestion::SourceOfFunds => FieldPath::parse(SOURCE_OF_FUNDS),
            ObjectivesQuestion::KnowledgeLevel(kind) => FieldPath::parse(&kind.level_path()),
            ObjectivesQuestion::KnowledgeSince(kind) => FieldPath::parse(&kind.since_path()),
        }
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            ObjectivesQuestion::InvestmentObjectives => "Investment objectives".to_string(),
            ObjectivesQuestion::RiskTolerance => "Risk tolerance".to_string(),
            ObjectivesQuestion::TimeHorizon => "Time horizon".to_string(),
            ObjectivesQuestion::LiquidityNeeds => "Liquidity needs".to_string(),
            ObjectivesQuestion::SourceOfFunds => "Source of funds".to_string(),
            ObjectivesQuestion::KnowledgeLevel(kind) => format!("{} knowledge", kind.label()),
            ObjectivesQuestion::KnowledgeSince(kind) => {
                format!("{} experience since", kind.label())
            }
        }
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        match self {
            ObjectivesQuestion::KnowledgeSince(kind) => matches!(
                ctx.doc().choice::<KnowledgeLevel>(&kind.level_path()),
                Some(level) if level != KnowledgeLevel::None
            ),
            _ => true,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        match self {
            ObjectivesQuestion::InvestmentObjectives => {
                checks::at_least_one::<InvestmentObjective>(
                    doc,
                    "investmentObjectives",
                    "investment objective",
                    errors,
                );
            }
            ObjectivesQuestion::RiskTolerance => {
                checks::exactly_one::<RiskTolerance>(doc, RISK_TOLERANCE, "risk tolerance", errors);
            }
            ObjectivesQuestion::TimeHorizon => {
                checks::exactly_one::<TimeHorizon>(doc, "timeHorizon", "time horizon", errors);
            }
            ObjectivesQuestion::LiquidityNeeds => {
                checks::exactly_one::<LiquidityNeeds>(
                    doc,
                    "liquidityNeeds",
                    "liquidity need",
                    errors,
                );
            }
            ObjectivesQuestion::SourceOfFunds => {
                let sources = checks::at_least_one::<SourceOfFunds>(
                    doc,
                    SOURCE_OF_FUNDS,
                    "source of funds",
                    errors,
                );
                if sources.contains(SourceOfFunds::Other) {
                    checks::required_text_with(
                        doc,
                        OTHER_DETAILS,
                        "Please add details for the other source of funds",
                        errors,
                    );
                }
            }
            ObjectivesQuestion::KnowledgeLevel(kind) => {
                checks::exactly_one::<KnowledgeLevel>(
                    doc,
                    &kind.level_path(),
                    "knowledge level",
                    errors,
                );
            }
            ObjectivesQuestion::KnowledgeSince(kind) => {
                checks::plausible_year(
                    doc,
                    &kind.since_path(),
                    &self.label(ctx),
                    ctx.options.min_plausible_year,
                    ctx.today(),
                    errors,
                );
            }
        }
    }
}

// ============================================================================
// STEP
// ============================================================================

pub struct ObjectivesStep;

impl StepDefinition for ObjectivesStep {
    type Question = ObjectivesQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::InvestorProfile,
        step: 2,
    };
    const LABEL: &'static str = "Investment Objectives";

    fn schema() -> StepSchema {
        let mut source_of_funds = match SourceOfFunds::empty_map() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        source_of_funds.insert("otherDetails".to_string(), json!(""));

        let knowledge: Map<String, Value> = InvestmentKind::ALL
            .iter()
            .map(|kind| {
                (
                    kind.key().to_string(),
                    json!({"level": KnowledgeLevel::empty_map(), "sinceYear": null}),
                )
            })
            .collect();

        StepSchema::new(json!({
            "investmentObjectives": InvestmentObjective::empty_map(),
            "riskTolerance": RiskTolerance::empty_map(),
            "timeHorizon": TimeHorizon::empty_map(),
            "liquidityNeeds": LiquidityNeeds::empty_map(),
            "sourceOfFunds": source_of_funds,
            "investmentKnowledge": knowledge,
        }))
    }
}
