//! Form catalog: one module per form, plus the blocks several forms share.

pub mod baiodf;
pub mod baiv;
pub mod investor_profile;
pub mod sfc;

// Shared blocks
pub mod registration;
pub mod signatures;
