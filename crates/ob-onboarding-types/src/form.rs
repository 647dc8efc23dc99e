//! Form types, step keys and onboarding status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// FORM TYPE
// ============================================================================

/// Regulatory onboarding form a client can be asked to complete.
///
/// Declaration order is the fixed routing priority: Investor Profile, then
/// SFC, then BAIODF, then BAIV 506(c).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FormType {
    #[serde(rename = "INVESTOR_PROFILE")]
    InvestorProfile,
    /// Statement of Financial Condition
    #[serde(rename = "SFC")]
    Sfc,
    /// Brokerage Alternative Investment Order Disclosure Form
    #[serde(rename = "BAIODF")]
    Baiodf,
    /// Brokerage Accredited Investor Verification, Rule 506(c)
    #[serde(rename = "BAIV_506C")]
    Baiv506c,
}

impl FormType {
    /// All forms in routing priority order.
    pub const ALL: [FormType; 4] = [
        FormType::InvestorProfile,
        FormType::Sfc,
        FormType::Baiodf,
        FormType::Baiv506c,
    ];

    /// Wire identifier (`INVESTOR_PROFILE`, `SFC`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::InvestorProfile => "INVESTOR_PROFILE",
            FormType::Sfc => "SFC",
            FormType::Baiodf => "BAIODF",
            FormType::Baiv506c => "BAIV_506C",
        }
    }

    /// URL segment used by onboarding routes.
    pub fn slug(&self) -> &'static str {
        match self {
            FormType::InvestorProfile => "investor-profile",
            FormType::Sfc => "statement-of-financial-condition",
            FormType::Baiodf => "baiodf",
            FormType::Baiv506c => "baiv-506c",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormType::InvestorProfile => "Investor Profile",
            FormType::Sfc => "Statement of Financial Condition",
            FormType::Baiodf => "Brokerage Alternative Investment Order Disclosure",
            FormType::Baiv506c => "Brokerage Accredited Investor Verification (506(c))",
        }
    }

    /// Number of wizard steps; steps are numbered from 1.
    pub fn step_count(&self) -> u8 {
        match self {
            FormType::InvestorProfile => 7,
            FormType::Sfc => 2,
            FormType::Baiodf => 3,
            FormType::Baiv506c => 2,
        }
    }

    /// The single step whose successful validation completes the form.
    pub fn gating_step(&self) -> u8 {
        self.step_count()
    }

    pub fn has_step(&self, step: u8) -> bool {
        (1..=self.step_count()).contains(&step)
    }

    /// Step numbers in wizard order.
    pub fn steps(&self) -> impl Iterator<Item = u8> {
        1..=self.step_count()
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown form type '{0}'")]
pub struct ParseFormTypeError(pub String);

impl FromStr for FormType {
    type Err = ParseFormTypeError;

    /// Accepts the wire identifier or the route slug.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormType::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s) || f.slug() == s)
            .ok_or_else(|| ParseFormTypeError(s.to_string()))
    }
}

// ============================================================================
// STEP KEY
// ============================================================================

/// Addresses one step of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StepKey {
    pub form: FormType,
    pub step: u8,
}

impl StepKey {
    pub fn new(form: FormType, step: u8) -> Self {
        Self { form, step }
    }

    /// Step-scoped key used as the question id prefix (`step3`).
    pub fn key(&self) -> String {
        format!("step{}", self.step)
    }

    pub fn is_gating(&self) -> bool {
        self.form.gating_step() == self.step
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/step{}", self.form, self.step)
    }
}

// ============================================================================
// ONBOARDING STATUS
// ============================================================================

/// Lifecycle of a form instance.
///
/// ```text
/// NOT_STARTED ──► IN_PROGRESS ──► COMPLETED
/// ```
///
/// Ordering follows the lifecycle so that `max` never regresses a status.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl OnboardingStatus {
    /// Move forward to `next` unless already further along.
    pub fn advance_to(self, next: OnboardingStatus) -> OnboardingStatus {
        self.max(next)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, OnboardingStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order_follows_declaration() {
        let mut forms = vec![FormType::Baiv506c, FormType::Sfc, FormType::InvestorProfile];
        forms.sort();
        assert_eq!(
            forms,
            vec![FormType::InvestorProfile, FormType::Sfc, FormType::Baiv506c]
        );
    }

    #[test]
    fn test_gating_steps() {
        assert_eq!(FormType::InvestorProfile.gating_step(), 7);
        assert_eq!(FormType::Sfc.gating_step(), 2);
        assert_eq!(FormType::Baiodf.gating_step(), 3);
        assert_eq!(FormType::Baiv506c.gating_step(), 2);
    }

    #[test]
    fn test_form_type_wire_names() {
        let json = serde_json::to_string(&FormType::Baiv506c).unwrap();
        assert_eq!(json, "\"BAIV_506C\"");
        assert_eq!("baiodf".parse::<FormType>().unwrap(), FormType::Baiodf);
        assert_eq!("SFC".parse::<FormType>().unwrap(), FormType::Sfc);
        assert!("W9".parse::<FormType>().is_err());
    }

    #[test]
    fn test_status_never_regresses() {
        let status = OnboardingStatus::Completed;
        assert_eq!(
            status.advance_to(OnboardingStatus::InProgress),
            OnboardingStatus::Completed
        );
        assert_eq!(
            OnboardingStatus::NotStarted.advance_to(OnboardingStatus::InProgress),
            OnboardingStatus::InProgress
        );
        assert_eq!(
            serde_json::to_string(&OnboardingStatus::InProgress).unwrap(),
            "\"IN_PROGRESS\""
        );
    }
}
