//! Application layer - Bootstrap and plugin lifecycle logic
//!
//! This layer contains:
//! - Launch: The tweaker chain that runs before the host starts
//! - Services: Plugin lifecycle and the host client
//! - Errors: Domain-specific errors

pub mod errors;
pub mod launch;
pub mod services;
