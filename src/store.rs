//! Onboarding Persistence Abstraction
//!
//! Abstract interface for loading and saving client onboarding state.
//! The engine returns whole form records, so a store only ever replaces a
//! form record; concurrent writers follow last-write-wins.

use std::collections::HashMap;

use async_trait::async_trait;
use ob_onboarding_types::{ClientOnboarding, FormRecord, FormType};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("client {0} not found")]
    NotFound(Uuid),

    #[error("client {0} already exists")]
    AlreadyExists(Uuid),

    #[error("form {form} is not selected for client {client_id}")]
    FormNotSelected { client_id: Uuid, form: FormType },

    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait OnboardingStore: Send + Sync {
    /// Persist a new client onboarding.
    async fn create(&self, onboarding: ClientOnboarding) -> Result<(), StoreError>;

    async fn load(&self, client_id: Uuid) -> Result<Option<ClientOnboarding>, StoreError>;

    /// Replace one form record of an existing client.
    async fn save_form(&self, client_id: Uuid, record: FormRecord) -> Result<(), StoreError>;

    /// Add a form to the client's selection. Selecting twice is a no-op.
    async fn select_form(&self, client_id: Uuid, form: FormType) -> Result<(), StoreError>;
}

/// Process-local store (tests, CLI sessions).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    clients: RwLock<HashMap<Uuid, ClientOnboarding>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from previously exported state.
    pub fn with_clients(clients: impl IntoIterator<Item = ClientOnboarding>) -> Self {
        Self {
            clients: RwLock::new(clients.into_iter().map(|c| (c.client_id, c)).collect()),
        }
    }

    /// Snapshot of every client, ordered by id.
    pub async fn export(&self) -> Vec<ClientOnboarding> {
        let mut clients: Vec<_> = self.clients.read().await.values().cloned().collect();
        clients.sort_by_key(|c| c.client_id);
        clients
    }
}

#[async_trait]
impl OnboardingStore for InMemoryStore {
    async fn create(&self, onboarding: ClientOnboarding) -> Result<(), StoreError> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&onboarding.client_id) {
            return Err(StoreError::AlreadyExists(onboarding.client_id));
        }
        clients.insert(onboarding.client_id, onboarding);
        Ok(())
    }

    async fn load(&self, client_id: Uuid) -> Result<Option<ClientOnboarding>, StoreError> {
        Ok(self.clients.read().await.get(&client_id).cloned())
    }

    async fn save_form(&self, client_id: Uuid, record: FormRecord) -> Result<(), StoreError> {
        let mut clients = self.clients.write().await;
        let client = clients
            .get_mut(&client_id)
            .ok_or(StoreError::NotFound(client_id))?;
        if !client.is_selected(record.form) {
            return Err(StoreError::FormNotSelected {
                client_id,
                form: record.form,
            });
        }
        client.put(record);
        Ok(())
    }

    async fn select_form(&self, client_id: Uuid, form: FormType) -> Result<(), StoreError> {
        let mut clients = self.clients.write().await;
        let client = clients
            .get_mut(&client_id)
            .ok_or(StoreError::NotFound(client_id))?;
        client.select(form);
        Ok(())
    }
}
