//! Investor Profile step 1: account registration and type of account.
//!
//! ```text
//! typeOfAccount.primaryType
//!   ├─ corporation ─────────────► corporationDesignation
//!   ├─ limitedLiabilityCompany ─► llcDesignation
//!   ├─ trust ───────────────────► trust.establishmentDate, trust.trustType
//!   ├─ jointTenant ─────────────► jointTenancy.jointType, jointTenancy.numberOfTenants
//!   ├─ transferOnDeathJoint ────► jointTenancy.jointType
//!   ├─ custodial ───────────────► custodial.custodialType, custodial.gifts[]
//!   └─ other ───────────────────► otherDescription
//! ```

use ob_onboarding_types::{FieldErrors, FieldPath, FormType, StepKey};
use serde_json::{json, Value};

use crate::checks::{self, DateRule};
use crate::forms::registration::RegistrationField;
use crate::options::{option_map, OptionKey, YesNo};
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

option_map! {
    /// Registration type of the account.
    pub enum PrimaryType {
        Individual => "individual",
        JointTenant => "jointTenant",
        TransferOnDeathIndividual => "transferOnDeathIndividual",
        TransferOnDeathJoint => "transferOnDeathJoint",
        Corporation => "corporation",
        LimitedLiabilityCompany => "limitedLiabilityCompany",
        Partnership => "partnership",
        Trust => "trust",
        Custodial => "custodial",
        Estate => "estate",
        SoleProprietorship => "soleProprietorship",
        NonprofitOrganization => "nonprofitOrganization",
        Other => "other",
    }
}

impl PrimaryType {
    /// Joint registrations (two or more natural owners).
    pub fn is_joint(&self) -> bool {
        matches!(self, PrimaryType::JointTenant | PrimaryType::TransferOnDeathJoint)
    }

    /// Registrations that need a secondary account holder (step 4).
    pub fn requires_secondary_holder(&self) -> bool {
        matches!(
            self,
            PrimaryType::JointTenant
                | PrimaryType::TransferOnDeathJoint
                | PrimaryType::Corporation
                | PrimaryType::LimitedLiabilityCompany
                | PrimaryType::Partnership
                | PrimaryType::Trust
                | PrimaryType::Estate
                | PrimaryType::NonprofitOrganization
        )
    }
}

option_map! {
    pub enum CorporationDesignation {
        CCorp => "cCorp",
        SCorp => "sCorp",
    }
}

option_map! {
    pub enum LlcDesignation {
        CCorp => "cCorp",
        SCorp => "sCorp",
        Partnership => "partnership",
    }
}

option_map! {
    pub enum TrustType {
        Revocable => "revocable",
        Irrevocable => "irrevocable",
        Charitable => "charitable",
        Testamentary => "testamentary",
    }
}

option_map! {
    pub enum JointType {
        WithRightsOfSurvivorship => "withRightsOfSurvivorship",
        TenantsInCommon => "tenantsInCommon",
        TenantsByEntirety => "tenantsByEntirety",
        CommunityProperty => "communityProperty",
    }
}

option_map! {
    pub enum CustodialType {
        Utma => "utma",
        Ugma => "ugma",
    }
}

pub const PRIMARY_TYPE: &str = "typeOfAccount.primaryType";

/// Primary type chosen in an Investor Profile step-1 document.
pub fn primary_type(step1: crate::document::Doc<'_>) -> Option<PrimaryType> {
    step1.choice::<PrimaryType>(PRIMARY_TYPE)
}

// ============================================================================
// QUESTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountQuestion {
    Registration(RegistrationField),
    RetirementAccount,
    PrimaryType,
    CorporationDesignation,
    LlcDesignation,
    TrustEstablishmentDate,
    TrustType,
    JointType,
    NumberOfTenants,
    CustodialType,
    Gifts,
    OtherDescription,
}

impl AccountQuestion {
    fn dotted(&self) -> String {
        match self {
            AccountQuestion::Registration(field) => field.dotted(""),
            AccountQuestion::RetirementAccount => "retirementAccount".to_string(),
            AccountQuestion::PrimaryType => PRIMARY_TYPE.to_string(),
            AccountQuestion::CorporationDesignation => {
                "typeOfAccount.corporationDesignation".to_string()
            }
            AccountQuestion::LlcDesignation => "typeOfAccount.llcDesignation".to_string(),
            AccountQuestion::TrustEstablishmentDate => {
                "typeOfAccount.trust.establishmentDate".to_string()
            }
            AccountQuestion::TrustType => "typeOfAccount.trust.trustType".to_string(),
            AccountQuestion::JointType => "typeOfAccount.jointTenancy.jointType".to_string(),
            AccountQuestion::NumberOfTenants => {
                "typeOfAccount.jointTenancy.numberOfTenants".to_string()
            }
            AccountQuestion::CustodialType => "typeOfAccount.custodial.custodialType".to_string(),
            AccountQuestion::Gifts => "typeOfAccount.custodial.gifts".to_string(),
            AccountQuestion::OtherDescription => "typeOfAccount.otherDescription".to_string(),
        }
    }
}

impl StepQuestion for AccountQuestion {
    fn all() -> Vec<Self> {
        let mut all: Vec<Self> = RegistrationField::TEXT
            .into_iter()
            .map(AccountQuestion::Registration)
            .collect();
        all.extend([
            AccountQuestion::RetirementAccount,
            AccountQuestion::PrimaryType,
            AccountQuestion::CorporationDesignation,
            AccountQuestion::LlcDesignation,
            AccountQuestion::TrustEstablishmentDate,
            AccountQuestion::TrustType,
            AccountQuestion::JointType,
            AccountQuestion::NumberOfTenants,
            AccountQuestion::CustodialType,
            AccountQuestion::Gifts,
            AccountQuestion::OtherDescription,
        ]);
        all
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(&self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            AccountQuestion::Registration(field) => field.label(),
            AccountQuestion::RetirementAccount => "Retirement account",
            AccountQuestion::PrimaryType => "Type of account",
            AccountQuestion::CorporationDesignation => "Corporation designation",
            AccountQuestion::LlcDesignation => "LLC designation",
            AccountQuestion::TrustEstablishmentDate => "Trust establishment date",
            AccountQuestion::TrustType => "Trust type",
            AccountQuestion::JointType => "Joint tenancy type",
            AccountQuestion::NumberOfTenants => "Number of tenants",
            AccountQuestion::CustodialType => "Custodial type",
            AccountQuestion::Gifts => "Custodial gifts",
            AccountQuestion::OtherDescription => "Other account type",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        let primary = primary_type(ctx.doc());
        match self {
            AccountQuestion::Registration(_)
            | AccountQuestion::RetirementAccount
            | AccountQuestion::PrimaryType => true,
            AccountQuestion::CorporationDesignation => primary == Some(PrimaryType::Corporation),
            AccountQuestion::LlcDesignation => {
                primary == Some(PrimaryType::LimitedLiabilityCompany)
            }
            AccountQuestion::TrustEstablishmentDate | AccountQuestion::TrustType => {
                primary == Some(PrimaryType::Trust)
            }
            AccountQuestion::JointType => primary.is_some_and(|p| p.is_joint()),
            AccountQuestion::NumberOfTenants => primary == Some(PrimaryType::JointTenant),
            AccountQuestion::CustodialType | AccountQuestion::Gifts => {
                primary == Some(PrimaryType::Custodial)
            }
            AccountQuestion::OtherDescription => primary == Some(PrimaryType::Other),
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        let doc = ctx.doc();
        let dotted = self.dotted();
        let label = self.label(ctx);
        match self {
            AccountQuestion::Registration(field) => field.validate(doc, "", errors),
            AccountQuestion::RetirementAccount => {
                checks::exactly_one::<YesNo>(doc, &dotted, "retirement account answer", errors);
            }
            AccountQuestion::PrimaryType => {
                checks::exactly_one::<PrimaryType>(doc, &dotted, "account type", errors);
            }
            AccountQuestion::CorporationDesignation => {
                checks::exactly_one::<CorporationDesignation>(doc, &dotted, "designation", errors);
            }
            AccountQuestion::LlcDesignation => {
                checks::exactly_one::<LlcDesignation>(doc, &dotted, "designation", errors);
            }
            AccountQuestion::TrustEstablishmentDate => {
                checks::date(
                    doc,
                    &dotted,
                    &label,
                    DateRule::required().not_future(),
                    ctx.today(),
                    errors,
                );
            }
            AccountQuestion::TrustType => {
                checks::exactly_one::<TrustType>(doc, &dotted, "trust type", errors);
            }
            AccountQuestion::JointType => {
                checks::exactly_one::<JointType>(doc, &dotted, "joint tenancy type", errors);
            }
            AccountQuestion::NumberOfTenants => match doc.integer(&dotted) {
                Some(n) if n >= 2 => {}
                _ => errors.insert(
                    self.path(),
                    format!("{label} must be a whole number of at least 2"),
                ),
            },
            AccountQuestion::CustodialType => {
                checks::exactly_one::<CustodialType>(doc, &dotted, "custodial type", errors);
            }
            AccountQuestion::Gifts => validate_gifts(ctx, &dotted, errors),
            AccountQuestion::OtherDescription => {
                checks::required_text(doc, &dotted, "Description of the account type", errors);
            }
        }
    }
}

fn validate_gifts(ctx: &StepContext<'_>, dotted: &str, errors: &mut FieldErrors) {
    let doc = ctx.doc();
    let gifts = doc.items(dotted);
    if gifts.is_empty() {
        errors.insert(FieldPath::parse(dotted), "Add at least one custodial gift");
        return;
    }
    for i in 0..gifts.len() {
        checks::required_text(doc, &format!("{dotted}.{i}.state"), "State", errors);
        checks::date(
            doc,
            &format!("{dotted}.{i}.dateGiftGiven"),
            "Date gift given",
            DateRule::required().not_future(),
            ctx.today(),
            errors,
        );
    }
}

// ============================================================================
// STEP
// ============================================================================

pub struct AccountStep;

impl StepDefinition for AccountStep {
    type Question = AccountQuestion;

    const KEY: StepKey = StepKey {
        form: FormType::InvestorProfile,
        step: 1,
    };
    const LABEL: &'static str = "Account Registration";

    fn schema() -> StepSchema {
        let mut defaults = crate::forms::registration::text_defaults();
        defaults.insert("retirementAccount".to_string(), YesNo::empty_map());
        defaults.insert(
            "typeOfAccount".to_string(),
            json!({
                "primaryType": PrimaryType::empty_map(),
                "corporationDesignation": CorporationDesignation::empty_map(),
                "llcDesignation": LlcDesignation::empty_map(),
                "trust": {
                    "establishmentDate": null,
                    "trustType": TrustType::empty_map(),
                },
                "jointTenancy": {
                    "jointType": JointType::empty_map(),
                    "numberOfTenants": null,
                },
                "custodial": {
                    "custodialType": CustodialType::empty_map(),
                    "gifts": [],
                },
                "otherDescription": "",
            }),
        );
        StepSchema::new(Value::Object(defaults)).with_items(
            "typeOfAccount.custodial.gifts",
            json!({"state": "", "dateGiftGiven": null}),
        )
    }
}
