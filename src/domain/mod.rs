//! Domain layer containing business entities and logic.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`reconciliation`] - Pure planning logic for guest-account consolidation
//!
//! The domain layer has no dependency on infrastructure or the HTTP surface;
//! repository traits define the contracts the infrastructure layer fulfills.

pub mod entities;
pub mod reconciliation;
pub mod repositories;
