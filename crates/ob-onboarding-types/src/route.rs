//! Onboarding routes the advisor is sent to.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::FormType;

/// Where the advisor should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OnboardingRoute {
    /// A specific wizard step of a form.
    Step { form: FormType, step: u8 },
    /// Nothing pending: the client workspace/dashboard.
    Workspace,
}

/// How routes are rendered to paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct RouteConfig {
    /// Prefix for all client routes, e.g. `/clients`.
    pub base_path: String,
    /// Final segment of the workspace route.
    pub workspace_segment: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            base_path: "/clients".to_string(),
            workspace_segment: "workspace".to_string(),
        }
    }
}

impl RouteConfig {
    /// `/clients/{id}/onboarding/{form-slug}/step-{n}` or `/clients/{id}/workspace`.
    pub fn render(&self, route: &OnboardingRoute, client_id: Uuid) -> String {
        let base = self.base_path.trim_end_matches('/');
        match route {
            OnboardingRoute::Step { form, step } => {
                format!("{}/{}/onboarding/{}/step-{}", base, client_id, form.slug(), step)
            }
            OnboardingRoute::Workspace => {
                format!("{}/{}/{}", base, client_id, self.workspace_segment)
            }
        }
    }
}
