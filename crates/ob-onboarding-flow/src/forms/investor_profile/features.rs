//! Investor Profile step 6: account features.

use ob_onboarding_types::{FieldErrors, FieldPath, FormType, StepKey};
use serde_json::json;

use super::objectives::{RiskTolerance, RISK_TOLERANCE};
use crate::checks;
use crate::options::{option_map, OptionKey, YesNo};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

option_map! {
    pub enum OptionsLevel {
        Level1 => "level1",
        Level2 => "level2",
        Level3 => "level3",
        Level4 => "level4",
    }
}

impl OptionsLevel {
    fn is_advanced(&self) -> bool {
        matches!(self, OptionsLevel::Level3 | OptionsLevel::Level4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeaturesQuestion {
    Margin,
    Options,
    OptionsLevel,
    DividendReinvestment,
    DuplicateStatements,
    DuplicateRecipient,
}

impl FeaturesQuestion {
    fn dotted(&self) -> &'static str {
        match self {
            FeaturesQuestion::Margin => "features.margin",
            FeaturesQuestion::Options => "features.options",
            FeaturesQuestion::OptionsLevel => "features.optionsLevel",
            FeaturesQuestion::DividendReinvestment => "features.dividendReinvestment",
            FeaturesQuestion::DuplicateStatements => "features.duplicateStatements",
            FeaturesQuestion::DuplicateRecipient => "features.duplicateRecipient",
        }
    }
}

impl StepQuestion for FeaturesQuestion {
    fn all() -> Vec<Self> {
        vec![
            FeaturesQuestion::Margin,
            FeaturesQuestion::Options,
            FeaturesQuestion::OptionsLevel,
            FeaturesQuestion::DividendReinvestment,
            FeaturesQuestion::DuplicateStatements,
            FeaturesQuestion::DuplicateRecipient,
        ]
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            FeaturesQuestion::Margin => "Margin",
            FeaturesQuestion::Options => "Options trading",
            FeaturesQuestion::OptionsLevel => "Options level",
            FeaturesQuestion::DividendReinvestment => "Dividend reinvestment",
            FeaturesQuestion::DuplicateStatements => "Duplicate statements",
            FeaturesQuestion::DuplicateRecipient => "Duplicate statement recipient",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        let doc = ctx.doc();
        match self {
            FeaturesQuestion::OptionsLevel => {
                doc.choice::<YesNo>(FeaturesQuestion::Options.dotted()) == Some(YesNo::Yes)
            }
            FeaturesQuestion::DuplicateRecipient => {
                doc.choice::<YesNo>(FeaturesQuestion::DuplicateStatements.dotted())
                    == Some(YesNo::Yes)
            }
            _ => true,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        let dotted = self.dotted();
        match self {
            FeaturesQuestion::Margin
            | FeaturesQuestion::Options
            | FeaturesQuestion::DividendReinvestment
            | FeaturesQuestion::DuplicateStatements => {
                let what = format!("{} answer", self.label(ctx).to_lowercase());
                checks::exactly_one::<YesNo>(doc, dotted, &what, errors);
            }
            FeaturesQuestion::OptionsLevel => {
                let level = checks::exactly_one::<OptionsLevel>(doc, dotted, "options level", errors);
                let risk = ctx.step_doc(2).choice::<RiskTolerance>(RISK_TOLERANCE);
                if level.is_some_and(|l| l.is_advanced())
                    && !risk.is_some_and(|r| r.allows_advanced_options())
                {
                    errors.insert(
                        self.path(),
                        "Options level 3 or 4 requires a moderately aggressive or aggressive risk tolerance",
                    );
                }
            }
            FeaturesQuestion::DuplicateRecipient => {
                checks::required_text(doc, &format!("{dotted}.name"), "Recipient name", errors);
                checks::address(doc, &format!("{dotted}.address"), errors);
            }
        }
    }
}

pub struct FeaturesStep;

impl StepDefinition for FeaturesStep {
    type Question = FeaturesQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::InvestorProfile,
        step: 6,
    };
    const LABEL: &'static str = "Account Features";

    fn schema() -> StepSchema {
        StepSchema::new(json!({
            "features": {
                "margin": YesNo::empty_map(),
                "options": YesNo::empty_map(),
                "optionsLevel": OptionsLevel::empty_map(),
                "dividendReinvestment": YesNo::empty_map(),
                "duplicateStatements": YesNo::empty_map(),
                "duplicateRecipient": {
                    "name": "",
                    "address": {
                        "line1": "", "line2": "", "city": "", "state": "", "postalCode": "", "country": "",
                    },
                },
            }
        }))
    }
}
