//! Cross-Form Router
//!
//! Forms are worked through in a fixed priority order:
//!
//! ```text
//! INVESTOR_PROFILE ──► SFC ──► BAIODF ──► BAIV_506C ──► workspace
//! ```
//!
//! Only selected forms take part. The next route is the resume step of the
//! first selected form that is not COMPLETED, or the workspace when every
//! selected form is done.

use ob_onboarding_types::{ClientOnboarding, FormRecord, FormType, OnboardingRoute, OnboardingStatus};

/// First selected form, in priority order, that still needs work.
pub fn next_pending_form(client: &ClientOnboarding) -> Option<FormType> {
    FormType::ALL
        .into_iter()
        .filter(|form| client.is_selected(*form))
        .find(|form| !client.status(*form).is_completed())
}

/// Route to the next pending form, resolving its step with `resume_step`.
pub fn next_route(
    client: &ClientOnboarding,
    resume_step: impl Fn(&FormRecord) -> u8,
) -> OnboardingRoute {
    let Some(form) = next_pending_form(client) else {
        tracing::info!(client_id = %client.client_id, "all selected forms completed");
        return OnboardingRoute::Workspace;
    };
    let fresh;
    let record = match client.form(form) {
        Some(record) => record,
        None => {
            fresh = FormRecord::new(form);
            &fresh
        }
    };
    let step = resume_step(record);
    tracing::debug!(client_id = %client.client_id, %form, step, "next pending form");
    OnboardingRoute::Step { form, step }
}

/// Pick the resume step from per-step completeness.
///
/// `step_is_complete(n)` answers whether step `n` has no failing visible
/// question. A form that has never been written resumes at step 1; one
/// whose steps all pass resumes at its gating step.
pub fn resume_step_from(
    form: FormType,
    status: OnboardingStatus,
    mut step_is_complete: impl FnMut(u8) -> bool,
) -> u8 {
    if status == OnboardingStatus::NotStarted {
        return 1;
    }
    form.steps()
        .find(|step| !step_is_complete(*step))
        .unwrap_or_else(|| form.gating_step())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn client(selected: &[FormType]) -> ClientOnboarding {
        ClientOnboarding::new(Uuid::nil(), selected.iter().copied())
    }

    fn complete(client: &mut ClientOnboarding, form: FormType) {
        let mut record = FormRecord::new(form);
        record.status = OnboardingStatus::Completed;
        client.put(record);
    }

    #[test]
    fn test_priority_order_skips_unselected_and_completed() {
        let mut c = client(&[FormType::Baiv506c, FormType::Sfc, FormType::InvestorProfile]);
        assert_eq!(next_pending_form(&c), Some(FormType::InvestorProfile));

        complete(&mut c, FormType::InvestorProfile);
        assert_eq!(next_pending_form(&c), Some(FormType::Sfc));

        complete(&mut c, FormType::Sfc);
        // BAIODF was never selected
        assert_eq!(next_pending_form(&c), Some(FormType::Baiv506c));

        complete(&mut c, FormType::Baiv506c);
        assert_eq!(next_pending_form(&c), None);
        assert_eq!(next_route(&c, |_| 1), OnboardingRoute::Workspace);
    }

    #[test]
    fn test_next_route_uses_resume_step() {
        let mut c = client(&[FormType::Sfc, FormType::Baiodf]);
        complete(&mut c, FormType::Sfc);
        let route = next_route(&c, |record| {
            assert_eq!(record.form, FormType::Baiodf);
            2
        });
        assert_eq!(
            route,
            OnboardingRoute::Step {
                form: FormType::Baiodf,
                step: 2
            }
        );
    }

    #[test]
    fn test_resume_step_selection() {
        let ip = FormType::InvestorProfile;
        assert_eq!(resume_step_from(ip, OnboardingStatus::NotStarted, |_| true), 1);
        assert_eq!(resume_step_from(ip, OnboardingStatus::InProgress, |s| s < 3), 3);
        assert_eq!(resume_step_from(ip, OnboardingStatus::InProgress, |_| true), 7);
        assert_eq!(
            resume_step_from(FormType::Sfc, OnboardingStatus::Completed, |_| true),
            2
        );
    }
}
