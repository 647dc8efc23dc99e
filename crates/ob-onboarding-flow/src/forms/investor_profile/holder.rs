//! Investor Profile steps 3 and 4: primary and secondary account holder.
//!
//! Both steps share one document shape under `holder`. The holder kind
//! (`person` / `entity`) switches the tax id, relabels the date and
//! citizenship questions, and hides person-only questions for entities.
//! Step 4 as a whole is visible only when the step-1 account type needs a
//! secondary holder.

use ob_onboarding_types::{FieldErrors, FieldPath, FormType, StepKey};
use serde_json::json;

use crate::checks::{self, DateRule, TextFormat};
use crate::document::Doc;
use crate::gate;
use crate::options::{option_map, OptionKey, YesNo};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

option_map! {
    pub enum HolderKind {
        Person => "person",
        Entity => "entity",
    }
}

option_map! {
    pub enum Citizenship {
        UsCitizen => "usCitizen",
        UsResident => "usResident",
        NonResidentAlien => "nonResidentAlien",
    }
}

option_map! {
    pub enum MaritalStatus {
        Single => "single",
        Married => "married",
        Divorced => "divorced",
        Widowed => "widowed",
        DomesticPartner => "domesticPartner",
    }
}

option_map! {
    pub enum Gender {
        Male => "male",
        Female => "female",
        NonBinary => "nonBinary",
        PreferNotToSay => "preferNotToSay",
    }
}

option_map! {
    pub enum EmploymentStatus {
        Employed => "employed",
        SelfEmployed => "selfEmployed",
        Retired => "retired",
        Unemployed => "unemployed",
        Student => "student",
    }
}

option_map! {
    pub enum IncomeRange {
        Under50k => "under50k",
        From50kTo100k => "from50kTo100k",
        From100kTo250k => "from100kTo250k",
        From250kTo500k => "from250kTo500k",
        Over500k => "over500k",
    }
}

option_map! {
    pub enum NetWorthRange {
        Under100k => "under100k",
        From100kTo500k => "from100kTo500k",
        From500kTo1m => "from500kTo1m",
        From1mTo5m => "from1mTo5m",
        Over5m => "over5m",
    }
}

option_map! {
    pub enum TaxBracket {
        Bracket0To15 => "bracket0To15",
        Bracket16To25 => "bracket16To25",
        Bracket26To30 => "bracket26To30",
        Bracket31To35 => "bracket31To35",
        Over35 => "over35",
    }
}

pub const KIND: &str = "holder.kind";

/// Holder kind recorded in a holder step document.
pub fn holder_kind(doc: Doc<'_>) -> Option<HolderKind> {
    doc.choice::<HolderKind>(KIND)
}

// ============================================================================
// QUESTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolderQuestion {
    Kind,
    Name,
    Ssn,
    Ein,
    Email,
    PhoneHome,
    PhoneBusiness,
    PhoneMobile,
    LegalAddress,
    DateOfBirth,
    Citizenship,
    MaritalStatus,
    Gender,
    Employment,
    FinancialInformation,
    Disclosures,
}

impl HolderQuestion {
    fn dotted(&self) -> &'static str {
        match self {
            HolderQuestion::Kind => KIND,
            HolderQuestion::Name => "holder.name",
            HolderQuestion::Ssn => "holder.taxId.ssn",
            HolderQuestion::Ein => "holder.taxId.ein",
            HolderQuestion::Email => "holder.contact.email",
            HolderQuestion::PhoneHome => "holder.contact.phones.home",
            HolderQuestion::PhoneBusiness => "holder.contact.phones.business",
            HolderQuestion::PhoneMobile => "holder.contact.phones.mobile",
            HolderQuestion::LegalAddress => "holder.legalAddress",
            HolderQuestion::DateOfBirth => "holder.dateOfBirth",
            HolderQuestion::Citizenship => "holder.citizenship",
            HolderQuestion::MaritalStatus => "holder.maritalStatus",
            HolderQuestion::Gender => "holder.gender",
            HolderQuestion::Employment => "holder.employment",
            HolderQuestion::FinancialInformation => "holder.financialInformation",
            HolderQuestion::Disclosures => "holder.disclosures",
        }
    }
}

impl StepQuestion for HolderQuestion {
    fn all() -> Vec<Self> {
        vec![
            HolderQuestion::Kind,
            HolderQuestion::Name,
            HolderQuestion::Ssn,
            HolderQuestion::Ein,
            HolderQuestion::Email,
            HolderQuestion::PhoneHome,
            HolderQuestion::PhoneBusiness,
            HolderQuestion::PhoneMobile,
            HolderQuestion::LegalAddress,
            HolderQuestion::DateOfBirth,
            HolderQuestion::Citizenship,
            HolderQuestion::MaritalStatus,
            HolderQuestion::Gender,
            HolderQuestion::Employment,
            HolderQuestion::FinancialInformation,
            HolderQuestion::Disclosures,
        ]
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(self.dotted())
    }

    fn label(&self, ctx: &StepContext<'_>) -> String {
        let entity = holder_kind(ctx.doc()) == Some(HolderKind::Entity);
        match self {
            HolderQuestion::Kind => "Holder type",
            HolderQuestion::Name if entity => "Entity name",
            HolderQuestion::Name => "Full name",
            HolderQuestion::Ssn => "Social Security Number",
            HolderQuestion::Ein => "Employer Identification Number",
            HolderQuestion::Email => "Email",
            HolderQuestion::PhoneHome => "Home phone",
            HolderQuestion::PhoneBusiness => "Business phone",
            HolderQuestion::PhoneMobile => "Mobile phone",
            HolderQuestion::LegalAddress => "Legal address",
            HolderQuestion::DateOfBirth if entity => "Date of Formation",
            HolderQuestion::DateOfBirth => "Date of Birth",
            HolderQuestion::Citizenship if entity => "Country of Organization",
            HolderQuestion::Citizenship => "Citizenship",
            HolderQuestion::MaritalStatus => "Marital status",
            HolderQuestion::Gender => "Gender",
            HolderQuestion::Employment => "Employment",
            HolderQuestion::FinancialInformation => "Financial information",
            HolderQuestion::Disclosures => "Disclosures",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        if ctx.key.step == SecondaryHolderStep::KEY.step && !gate::requires_step4(ctx) {
            return false;
        }
        let kind = holder_kind(ctx.doc());
        match self {
            HolderQuestion::Ssn
            | HolderQuestion::MaritalStatus
            | HolderQuestion::Gender
            | HolderQuestion::Employment => kind == Some(HolderKind::Person),
            HolderQuestion::Ein => kind == Some(HolderKind::Entity),
            _ => true,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        let dotted = self.dotted();
        let label = self.label(ctx);
        match self {
            HolderQuestion::Kind => {
                checks::exactly_one::<HolderKind>(doc, dotted, "holder type", errors);
            }
            HolderQuestion::Name => {
                checks::required_text(doc, dotted, &label, errors);
            }
            HolderQuestion::Ssn => checks::format(doc, dotted, &label, TextFormat::Ssn, true, errors),
            HolderQuestion::Ein => checks::format(doc, dotted, &label, TextFormat::Ein, true, errors),
            HolderQuestion::Email => {
                checks::format(doc, dotted, &label, TextFormat::Email, true, errors)
            }
            HolderQuestion::PhoneHome | HolderQuestion::PhoneBusiness => {
                checks::format(doc, dotted, &label, TextFormat::Phone, false, errors)
            }
            HolderQuestion::PhoneMobile => {
                checks::phones(doc, "holder.contact.phones", true, errors)
            }
            HolderQuestion::LegalAddress => checks::address(doc, dotted, errors),
            HolderQuestion::DateOfBirth => {
                checks::date(
                    doc,
                    dotted,
                    &label,
                    DateRule::required().not_future(),
                    ctx.today(),
                    errors,
                );
            }
            HolderQuestion::Citizenship => {
                let what = label.to_lowercase();
                checks::exactly_one::<Citizenship>(doc, dotted, &what, errors);
            }
            HolderQuestion::MaritalStatus => {
                checks::exactly_one::<MaritalStatus>(doc, dotted, "marital status", errors);
            }
            HolderQuestion::Gender => {
                checks::exactly_one::<Gender>(doc, dotted, "gender", errors);
            }
            HolderQuestion::Employment => validate_employment(doc, errors),
            HolderQuestion::FinancialInformation => {
                let base = dotted;
                checks::exactly_one::<IncomeRange>(
                    doc,
                    &format!("{base}.annualIncome"),
                    "annual income range",
                    errors,
                );
                checks::exactly_one::<NetWorthRange>(
                    doc,
                    &format!("{base}.netWorthExcludingResidence"),
                    "net worth range",
                    errors,
                );
                checks::exactly_one::<NetWorthRange>(
                    doc,
                    &format!("{base}.liquidNetWorth"),
                    "liquid net worth range",
                    errors,
                );
                checks::exactly_one::<TaxBracket>(
                    doc,
                    &format!("{base}.taxBracket"),
                    "tax bracket",
                    errors,
                );
            }
            HolderQuestion::Disclosures => validate_disclosures(doc, errors),
        }
    }
}

fn validate_employment(doc: Doc<'_>, errors: &mut FieldErrors) {
    let status = checks::exactly_one::<EmploymentStatus>(
        doc,
        "holder.employment.status",
        "employment status",
        errors,
    );
    if matches!(
        status,
        Some(EmploymentStatus::Employed | EmploymentStatus::SelfEmployed)
    ) {
        checks::required_text(doc, "holder.employment.employer", "Employer", errors);
        checks::required_text(doc, "holder.employment.occupation", "Occupation", errors);
    }
}

fn validate_disclosures(doc: Doc<'_>, errors: &mut FieldErrors) {
    let affiliated = checks::exactly_one::<YesNo>(
        doc,
        "holder.disclosures.brokerDealerAffiliation",
        "broker-dealer affiliation answer",
        errors,
    );
    if affiliated == Some(YesNo::Yes) {
        checks::required_text_with(
            doc,
            "holder.disclosures.firmName",
            "Specify the affiliated firm name",
            errors,
        );
    }
    let control = checks::exactly_one::<YesNo>(
        doc,
        "holder.disclosures.publicCompanyControl",
        "public company control answer",
        errors,
    );
    if control == Some(YesNo::Yes) {
        checks::required_text_with(
            doc,
            "holder.disclosures.companySymbols",
            "Specify the company symbols",
            errors,
        );
    }
}

// ============================================================================
// STEPS
// ============================================================================

fn holder_schema() -> StepSchema {
    StepSchema::new(json!({
        "holder": {
            "kind": HolderKind::empty_map(),
            "name": "",
            "taxId": {"ssn": "", "ein": ""},
            "contact": {
                "email": "",
                "phones": {"home": "", "business": "", "mobile": ""},
            },
            "legalAddress": {
                "line1": "", "line2": "", "city": "", "state": "", "postalCode": "", "country": "",
            },
            "dateOfBirth": null,
            "citizenship": Citizenship::empty_map(),
            "maritalStatus": MaritalStatus::empty_map(),
            "gender": Gender::empty_map(),
            "employment": {
                "status": EmploymentStatus::empty_map(),
                "employer": "",
                "occupation": "",
            },
            "financialInformation": {
                "annualIncome": IncomeRange::empty_map(),
                "netWorthExcludingResidence": NetWorthRange::empty_map(),
                "liquidNetWorth": NetWorthRange::empty_map(),
                "taxBracket": TaxBracket::empty_map(),
            },
            "disclosures": {
                "brokerDealerAffiliation": YesNo::empty_map(),
                "firmName": "",
                "publicCompanyControl": YesNo::empty_map(),
                "companySymbols": "",
            },
        }
    }))
}

pub struct PrimaryHolderStep;

impl StepDefinition for PrimaryHolderStep {
    type Question = HolderQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::InvestorProfile,
        step: 3,
    };
    const LABEL: &'static str = "Primary Account Holder";

    fn schema() -> StepSchema {
        holder_schema()
    }
}

pub struct SecondaryHolderStep;

impl StepDefinition for SecondaryHolderStep {
    type Question = HolderQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::InvestorProfile,
        step: 4,
    };
    const LABEL: &'static str = "Secondary Account Holder";

    fn schema() -> StepSchema {
        holder_schema()
    }
}
