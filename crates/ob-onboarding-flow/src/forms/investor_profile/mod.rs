//! Investor Profile (7 steps, completion gated at step 7).
//!
//! | Step | Definition |
//! |------|------------|
//! | 1 | [`account::AccountStep`] |
//! | 2 | [`objectives::ObjectivesStep`] |
//! | 3 | [`holder::PrimaryHolderStep`] |
//! | 4 | [`holder::SecondaryHolderStep`] (only for multi-party account types) |
//! | 5 | [`trusted_contact::TrustedContactStep`] |
//! | 6 | [`features::FeaturesStep`] |
//! | 7 | [`crate::forms::signatures::InvestorProfileSignatures`] |

pub mod account;
pub mod features;
pub mod holder;
pub mod objectives;
pub mod trusted_contact;
