//! Signature steps.
//!
//! Every form ends in a signature step, which is also its completion gate.
//! The joint-owner block is surfaced and required only when
//! [`gate::requires_joint_owner_signature`] holds for the client's earlier
//! answers; the supervisor block exists on the Investor Profile only and is
//! optional (all-or-nothing).

use ob_onboarding_types::{FieldErrors, FieldPath, FormType, StepKey};
use serde_json::{json, Value};

use crate::checks;
use crate::gate;
use crate::schema::StepSchema;
use crate::step::{StepContext, StepDefinition, StepQuestion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureQuestion {
    AccountOwner,
    JointAccountOwner,
    FinancialProfessional,
    SupervisorPrincipal,
}

impl SignatureQuestion {
    fn key(&self) -> &'static str {
        match self {
            SignatureQuestion::AccountOwner => "accountOwner",
            SignatureQuestion::JointAccountOwner => "jointAccountOwner",
            SignatureQuestion::FinancialProfessional => "financialProfessional",
            SignatureQuestion::SupervisorPrincipal => "supervisorPrincipal",
        }
    }

    fn dotted(&self) -> String {
        format!("signatures.{}", self.key())
    }

    fn required(&self) -> bool {
        !matches!(self, SignatureQuestion::SupervisorPrincipal)
    }
}

impl StepQuestion for SignatureQuestion {
    fn all() -> Vec<Self> {
        vec![
            SignatureQuestion::AccountOwner,
            SignatureQuestion::JointAccountOwner,
            SignatureQuestion::FinancialProfessional,
            SignatureQuestion::SupervisorPrincipal,
        ]
    }

    fn path(&self) -> FieldPath {
        FieldPath::parse(&self.dotted())
    }

    fn label(&self, _ctx: &StepContext<'_>) -> String {
        match self {
            SignatureQuestion::AccountOwner => "Account owner",
            SignatureQuestion::JointAccountOwner => "Joint account owner",
            SignatureQuestion::FinancialProfessional => "Financial professional",
            SignatureQuestion::SupervisorPrincipal => "Supervisor/principal",
        }
        .to_string()
    }

    fn is_active(&self, ctx: &StepContext<'_>) -> bool {
        match self {
            SignatureQuestion::AccountOwner | SignatureQuestion::FinancialProfessional => true,
            SignatureQuestion::JointAccountOwner => gate::requires_joint_owner_signature(ctx),
            SignatureQuestion::SupervisorPrincipal => ctx.key.form == FormType::InvestorProfile,
        }
    }

    fn validate(&self, ctx: &StepContext<'_>, errors: &mut FieldErrors) {
        checks::signature(
            ctx.doc(),
            &self.dotted(),
            &self.label(ctx),
            self.required(),
            ctx.today(),
            errors,
        );
    }
}

fn blank() -> Value {
    json!({"typedSignature": "", "printedName": "", "date": null})
}

fn questions(with_supervisor: bool) -> Vec<SignatureQuestion> {
    SignatureQuestion::all()
        .into_iter()
        .filter(|q| with_supervisor || *q != SignatureQuestion::SupervisorPrincipal)
        .collect()
}

fn schema(with_supervisor: bool) -> StepSchema {
    let signatures: serde_json::Map<String, Value> = questions(with_supervisor)
        .into_iter()
        .map(|q| (q.key().to_string(), blank()))
        .collect();
    StepSchema::new(json!({ "signatures": signatures }))
}

macro_rules! signature_step {
    ($(#[$meta:meta])* $name:ident, $form:expr, $step:literal, $supervisor:literal) => {
        $(#[$meta])*
        pub struct $name;

        impl StepDefinition for $name {
            type Question = SignatureQuestion;

            const KEY: StepKey = StepKey { form: $form, step: $step };
            const LABEL: &'static str = "Signatures";

            fn schema() -> StepSchema {
                schema($supervisor)
            }

            fn questions() -> Vec<SignatureQuestion> {
                questions($supervisor)
            }
        }
    };
}

signature_step!(
    /// Investor Profile step 7.
    InvestorProfileSignatures,
    FormType::InvestorProfile,
    7,
    true
);
signature_step!(
    /// SFC step 2.
    SfcSignatures,
    FormType::Sfc,
    2,
    false
);
signature_step!(
    /// BAIODF step 3.
    BaiodfSignatures,
    FormType::Baiodf,
    3,
    false
);
signature_step!(
    /// BAIV 506(c) step 2.
    BaivSignatures,
    FormType::Baiv506c,
    2,
    false
);
