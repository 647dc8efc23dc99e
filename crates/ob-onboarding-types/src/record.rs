//! Persisted onboarding records.
//!
//! These are the shapes the persistence layer loads and stores. The engine
//! never mutates them in place; it returns an updated `FormRecord` for the
//! caller to persist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::{FormType, OnboardingStatus};
use crate::path::QuestionId;

/// Fields document and cursor for one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRecord {
    /// Nested JSON fields document. `Null` until the step is first touched.
    #[serde(default)]
    pub fields: serde_json::Value,
    /// Last persisted cursor position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question_id: Option<QuestionId>,
}

/// One form instance for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub form: FormType,
    #[serde(default)]
    pub status: OnboardingStatus,
    /// Step number to step record. Missing steps have never been touched.
    #[serde(default)]
    pub steps: BTreeMap<u8, StepRecord>,
}

impl FormRecord {
    /// Empty record created when a client selects a form.
    pub fn new(form: FormType) -> Self {
        Self {
            form,
            status: OnboardingStatus::NotStarted,
            steps: BTreeMap::new(),
        }
    }

    pub fn step(&self, step: u8) -> Option<&StepRecord> {
        self.steps.get(&step)
    }

    /// Fields of a step, `Null` when never touched.
    pub fn step_fields(&self, step: u8) -> &serde_json::Value {
        static NULL: serde_json::Value = serde_json::Value::Null;
        self.steps.get(&step).map(|s| &s.fields).unwrap_or(&NULL)
    }
}

/// Every form selected for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOnboarding {
    pub client_id: Uuid,
    /// Forms the advisor selected for this client.
    pub selected_forms: Vec<FormType>,
    #[serde(default)]
    pub forms: BTreeMap<FormType, FormRecord>,
}

impl ClientOnboarding {
    pub fn new(client_id: Uuid, selected: impl IntoIterator<Item = FormType>) -> Self {
        let mut onboarding = Self {
            client_id,
            selected_forms: Vec::new(),
            forms: BTreeMap::new(),
        };
        for form in selected {
            onboarding.select(form);
        }
        onboarding
    }

    /// Select a form, creating its empty record. Selecting twice is a no-op.
    pub fn select(&mut self, form: FormType) {
        if !self.selected_forms.contains(&form) {
            self.selected_forms.push(form);
            self.selected_forms.sort();
        }
        self.forms
            .entry(form)
            .or_insert_with(|| FormRecord::new(form));
    }

    pub fn is_selected(&self, form: FormType) -> bool {
        self.selected_forms.contains(&form)
    }

    pub fn form(&self, form: FormType) -> Option<&FormRecord> {
        self.forms.get(&form)
    }

    pub fn status(&self, form: FormType) -> OnboardingStatus {
        self.forms
            .get(&form)
            .map(|r| r.status)
            .unwrap_or_default()
    }

    /// Replace a form record, as persisted after a write.
    pub fn put(&mut self, record: FormRecord) {
        self.forms.insert(record.form, record);
    }
}
