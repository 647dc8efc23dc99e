//! Investor Profile step 5: trusted contact person.

use ob_onboarding_types::{FieldErrors, FieldPath, FormType, StepKey};
use serde_json::json;

use crate::checks::{self, TextFormat};
use crate::options::{OptionKey, YesNo};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

const DECLINE: &str = "trustedContact.decline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustedContactQuestion {
    Decline,
    Name,
    Relationship,
    Email,
    PhoneHome,
    PhoneBusiness,
    PhoneMobile,
}

impl TrustedContactQuestion {
    fn dotted(&self) -> &'static str {
        match self {
            TrustedContactQuestion::Decline => DECLINE,
            TrustedContactQuestion::Name => "trustedContact.name",
            TrustedContactQuestion::Relationship => "trustedContact.relationship",
            TrustedContactQuestion::Email => "trustedContact.contact.email",
            TrustedContactQuestion::PhoneHome => "trustedContact.contact.phones.home",
            TrustedContactQuestion::PhoneBusiness => "trustedContact.contact.phones.business",
            TrustedContactQuestion::PhoneMobile => "trustedContact.contact.phones.mobile",
        }
    }
}

impl StepQuestion for TrustedContactQuestion {
    fn all() -> Vec<Self> {
        vec![
            TrustedContactQuestion::Decline,
            TrustedContactQuestion::Name,
            TrustedContactQuestion::Relationship,
            TrustedContactQuestion::Email,
            TrustedContactQuestion::PhoneHome,
            TrustedContactQuestion::PhoneBusiness,
            TrustedContactQuestion::PhoneMobile,
        ]
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            TrustedContactQuestion::Decline => "Decline to provide a trusted contact",
            TrustedContactQuestion::Name => "Trusted contact name",
            TrustedContactQuestion::Relationship => "Relationship",
            TrustedContactQuestion::Email => "Trusted contact email",
            TrustedContactQuestion::PhoneHome => "Home phone",
            TrustedContactQuestion::PhoneBusiness => "Business phone",
            TrustedContactQuestion::PhoneMobile => "Mobile phone",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        match self {
            TrustedContactQuestion::Decline => true,
            _ => ctx.doc().choice::<YesNo>(DECLINE) == Some(YesNo::No),
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        let dotted = self.dotted();
        let label = self.label(ctx);
        match self {
            TrustedContactQuestion::Decline => {
                checks::exactly_one::<YesNo>(doc, dotted, "answer", errors);
            }
            TrustedContactQuestion::Name | TrustedContactQuestion::Relationship => {
                checks::required_text(doc, dotted, &label, errors);
            }
            TrustedContactQuestion::Email => {
                checks::format(doc, dotted, &label, TextFormat::Email, false, errors)
            }
            TrustedContactQuestion::PhoneHome | TrustedContactQuestion::PhoneBusiness => {
                checks::format(doc, dotted, &label, TextFormat::Phone, false, errors)
            }
            TrustedContactQuestion::PhoneMobile => {
                checks::phones(doc, "trustedContact.contact.phones", true, errors)
            }
        }
    }
}

pub struct TrustedContactStep;

impl StepDefinition for TrustedContactStep {
    type Question = TrustedContactQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::InvestorProfile,
        step: 5,
    };
    const LABEL: &'static str = "Trusted Contact";

    fn schema() -> StepSchema {
        StepSchema::new(json!({
            "trustedContact": {
                "decline": YesNo::empty_map(),
                "name": "",
                "relationship": "",
                "contact": {
                    "email": "",
                    "phones": {"home": "", "business": "", "mobile": ""},
                },
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch;
    use crate::step::EngineOptions;
    use chrono::NaiveDate;
    use ob_onboarding_types::FormRecord;

    #[test]
    fn test_declining_hides_contact_details() {
        let form = FormRecord::new(FormType::InvestorProfile);
        let options = EngineOptions::new(NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        let declined = patch::apply(
            TrustedContactStep::schema().defaults(),
            &FieldPath::parse(DECLINE),
            YesNo::Yes.selected_map(),
        );
        let ctx = StepContext::new(TrustedContactStep::KEY, &declined, &form, &options);
        let visible: Vec<_> = TrustedContactQuestion::all()
            .into_iter()
            .filter(|q| q.is_active(&ctx))
            .collect();
        assert_eq!(visible, vec![TrustedContactQuestion::Decline]);

        let provided = patch::apply(
            &declined,
            &FieldPath::parse(DECLINE),
            YesNo::No.selected_map(),
        );
        let ctx = StepContext::new(TrustedContactStep::KEY, &provided, &form, &options);
        assert!(TrustedContactQuestion::Relationship.is_active(&ctx));

        let mut errors = FieldErrors::new();
        TrustedContactQuestion::Relationship.validate(&ctx, &mut errors);
        assert_eq!(
            errors.message("trustedContact.relationship"),
            Some("Relationship is required")
        );
    }
}
