//! Onboarding Service
//!
//! Request facade used by the HTTP layer and the CLI: load the client's
//! onboarding from the store, run one engine operation, persist the
//! returned form record.
//!
//! ```text
//! request ─► store.load ─► FlowEngine ─► store.save_form ─► StepResponse
//! ```

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ob_onboarding_flow::FlowEngine;
use ob_onboarding_types::{
    ClientOnboarding, FormType, OnboardingStatus, StepResponse, WriteRequest,
};
use serde::Serialize;
use uuid::Uuid;

use crate::config::OnboardingConfig;
use crate::error::{Result, ServiceError};
use crate::store::OnboardingStore;

/// Status of one selected form, as shown on the client workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub form: FormType,
    pub label: String,
    pub status: OnboardingStatus,
    pub resume_route: String,
}

pub struct OnboardingService {
    store: Arc<dyn OnboardingStore>,
    config: OnboardingConfig,
}

impl OnboardingService {
    pub fn new(store: Arc<dyn OnboardingStore>, config: OnboardingConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &OnboardingConfig {
        &self.config
    }

    fn engine(&self) -> FlowEngine {
        FlowEngine::new(self.config.engine_options(today()))
    }

    async fn client(&self, client_id: Uuid) -> Result<ClientOnboarding> {
        self.store
            .load(client_id)
            .await?
            .ok_or(ServiceError::ClientNotFound(client_id))
    }

    /// Start onboarding for a new client with the selected forms.
    #[tracing::instrument(skip(self))]
    pub async fn create_client(&self, forms: Vec<FormType>) -> Result<ClientOnboarding> {
        let onboarding = ClientOnboarding::new(Uuid::new_v4(), forms);
        self.store.create(onboarding.clone()).await?;
        tracing::info!(client_id = %onboarding.client_id, "onboarding created");
        Ok(onboarding)
    }

    #[tracing::instrument(skip(self))]
    pub async fn select_form(&self, client_id: Uuid, form: FormType) -> Result<()> {
        self.client(client_id).await?;
        self.store.select_form(client_id, form).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn read_step(&self, client_id: Uuid, form: FormType, step: u8) -> Result<StepResponse> {
        let client = self.client(client_id).await?;
        Ok(self.engine().read_step(&client, form, step)?)
    }

    /// Apply one answer and persist the updated form record.
    #[tracing::instrument(skip(self, request), fields(question_id = %request.question_id))]
    pub async fn write_step(
        &self,
        client_id: Uuid,
        form: FormType,
        step: u8,
        request: WriteRequest,
    ) -> Result<StepResponse> {
        let client = self.client(client_id).await?;
        let outcome = self
            .engine()
            .write_step(&client, form, step, &request)
            .inspect_err(|e| {
                if e.is_validation() {
                    tracing::debug!(error = %e, "write rejected");
                }
            })?;
        self.store.save_form(client_id, outcome.record).await?;
        Ok(outcome.response)
    }

    /// Path of the step where work on `form` should resume.
    #[tracing::instrument(skip(self))]
    pub async fn resume_route(&self, client_id: Uuid, form: FormType) -> Result<String> {
        let client = self.client(client_id).await?;
        let engine = self.engine();
        let route = engine.resume_route(&client, form)?;
        Ok(engine.render(&route, client_id))
    }

    /// Path of the next pending form, or the workspace.
    #[tracing::instrument(skip(self))]
    pub async fn next_route(&self, client_id: Uuid) -> Result<String> {
        let client = self.client(client_id).await?;
        let engine = self.engine();
        Ok(engine.render(&engine.next_route(&client), client_id))
    }

    /// Every selected form in priority order with its status and resume path.
    #[tracing::instrument(skip(self))]
    pub async fn summary(&self, client_id: Uuid) -> Result<Vec<FormSummary>> {
        let client = self.client(client_id).await?;
        let engine = self.engine();
        client
            .selected_forms
            .iter()
            .map(|&form| -> Result<FormSummary> {
                let route = engine.resume_route(&client, form)?;
                Ok(FormSummary {
                    form,
                    label: form.label().to_string(),
                    status: client.status(form),
                    resume_route: engine.render(&route, client_id),
                })
            })
            .collect()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
