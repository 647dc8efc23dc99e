//! Completion Gate
//!
//! Each form has exactly one gating step (its signature step). A write to
//! any step moves the form to IN_PROGRESS; only a write to the gating step
//! whose visible questions all validate moves it to COMPLETED. Status never
//! moves backwards.
//!
//! The gate also answers the two account-shape questions other modules
//! branch on: whether the Investor Profile needs a secondary holder
//! (step 4) and whether a joint-owner signature is required.

use ob_onboarding_types::{FieldErrors, FormType, OnboardingStatus, StepKey};

use crate::document::Doc;
use crate::forms::investor_profile::account::{primary_type, PrimaryType};
use crate::forms::investor_profile::holder::{holder_kind, HolderKind};
use crate::forms::registration;
use crate::step::StepContext;

/// Outcome of running the gate after a successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateOutcome {
    pub status: OnboardingStatus,
    pub requires_joint_owner_signature: bool,
    pub is_complete: bool,
}

/// Evaluate the form status after a successful write to `key`.
///
/// `step_errors` are the errors of every visible question of the written
/// step, checked against the document being persisted.
pub fn evaluate(
    key: StepKey,
    prior: OnboardingStatus,
    step_errors: &FieldErrors,
    requires_joint_owner_signature: bool,
) -> GateOutcome {
    let is_complete = key.is_gating() && step_errors.is_empty();
    let reached = if is_complete {
        OnboardingStatus::Completed
    } else {
        OnboardingStatus::InProgress
    };
    GateOutcome {
        status: prior.advance_to(reached),
        requires_joint_owner_signature,
        is_complete,
    }
}

/// Investor Profile step 4 applies to the recorded account type.
pub fn requires_step4(ctx: &StepContext<'_>) -> bool {
    ctx.key.form == FormType::InvestorProfile
        && primary_type(ctx.step_doc(1)).is_some_and(|p| p.requires_secondary_holder())
}

/// A joint-owner signature block is surfaced and required.
pub fn requires_joint_owner_signature(ctx: &StepContext<'_>) -> bool {
    joint_owner_signature_for(ctx.key.form, ctx.step_doc(1), ctx.step_doc(4))
}

/// Joint-owner rule over raw step documents.
///
/// Investor Profile: joint registrations, or a trust whose secondary holder
/// is a natural person (co-trustee). Other forms: `jointAccount = yes`.
pub fn joint_owner_signature_for(form: FormType, step1: Doc<'_>, step4: Doc<'_>) -> bool {
    match form {
        FormType::InvestorProfile => match primary_type(step1) {
            Some(p) if p.is_joint() => true,
            Some(PrimaryType::Trust) => holder_kind(step4) == Some(HolderKind::Person),
            _ => false,
        },
        FormType::Sfc | FormType::Baiodf | FormType::Baiv506c => {
            registration::is_joint_account(step1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionKey;
    use serde_json::json;

    #[test]
    fn test_only_gating_step_completes() {
        let clean = FieldErrors::new();
        let step6 = StepKey::new(FormType::InvestorProfile, 6);
        let step7 = StepKey::new(FormType::InvestorProfile, 7);

        let outcome = evaluate(step6, OnboardingStatus::NotStarted, &clean, false);
        assert_eq!(outcome.status, OnboardingStatus::InProgress);
        assert!(!outcome.is_complete);

        let outcome = evaluate(step7, OnboardingStatus::InProgress, &clean, false);
        assert_eq!(outcome.status, OnboardingStatus::Completed);
        assert!(outcome.is_complete);
    }

    #[test]
    fn test_gating_step_with_errors_stays_in_progress() {
        let errors = FieldErrors::single(
            ob_onboarding_types::FieldPath::parse("signatures.accountOwner"),
            "Account owner signature is required",
        );
        let outcome = evaluate(
            StepKey::new(FormType::Sfc, 2),
            OnboardingStatus::InProgress,
            &errors,
            false,
        );
        assert_eq!(outcome.status, OnboardingStatus::InProgress);
    }

    #[test]
    fn test_completed_never_regresses() {
        let outcome = evaluate(
            StepKey::new(FormType::InvestorProfile, 2),
            OnboardingStatus::Completed,
            &FieldErrors::new(),
            false,
        );
        assert_eq!(outcome.status, OnboardingStatus::Completed);
        assert!(!outcome.is_complete);
    }

    #[test]
    fn test_joint_signature_rules() {
        let joint = json!({"typeOfAccount": {"primaryType": PrimaryType::JointTenant.selected_map()}});
        let trust = json!({"typeOfAccount": {"primaryType": PrimaryType::Trust.selected_map()}});
        let person = json!({"holder": {"kind": HolderKind::Person.selected_map()}});
        let entity = json!({"holder": {"kind": HolderKind::Entity.selected_map()}});
        let empty = json!({});
        let ip = FormType::InvestorProfile;

        assert!(joint_owner_signature_for(ip, Doc::new(&joint), Doc::new(&empty)));
        assert!(joint_owner_signature_for(ip, Doc::new(&trust), Doc::new(&person)));
        assert!(!joint_owner_signature_for(ip, Doc::new(&trust), Doc::new(&entity)));

        let sfc = json!({"accountRegistration": {"jointAccount": {"yes": true, "no": false}}});
        assert!(joint_owner_signature_for(FormType::Sfc, Doc::new(&sfc), Doc::new(&empty)));
        assert!(!joint_owner_signature_for(FormType::Baiodf, Doc::new(&empty), Doc::new(&empty)));
    }
}
