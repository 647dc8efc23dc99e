//! OB Onboarding - advisor onboarding wizard service
//!
//! Wraps the step-flow engine (`ob-onboarding-flow`) with the pieces a
//! running service needs: configuration, tracing, a persistence seam and a
//! request facade.
//!
//! ## Architecture
//!
//! ```text
//! HTTP / CLI ─► OnboardingService ─► FlowEngine (pure)
//!                     │
//!                     └─► OnboardingStore (async trait)
//!                            └─ InMemoryStore
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ob_onboarding::{InMemoryStore, OnboardingConfig, OnboardingService};
//! use ob_onboarding_types::FormType;
//!
//! # async fn run() -> ob_onboarding::Result<()> {
//! let config = OnboardingConfig::default();
//! ob_onboarding::init_tracing(&config);
//! let service = OnboardingService::new(Arc::new(InMemoryStore::new()), config);
//! let client = service.create_client(vec![FormType::InvestorProfile]).await?;
//! let step = service.read_step(client.client_id, FormType::InvestorProfile, 1).await?;
//! println!("{}", step.step.label);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod store;

pub use config::{ConfigError, OnboardingConfig};
pub use error::{Result, ServiceError};
pub use service::{FormSummary, OnboardingService};
pub use store::{InMemoryStore, OnboardingStore, StoreError};

pub use ob_onboarding_flow as flow;
pub use ob_onboarding_types as types;

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` overrides
/// `config.log_filter`. Calling twice is harmless.
pub fn init_tracing(config: &OnboardingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
