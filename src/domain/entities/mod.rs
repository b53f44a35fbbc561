//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without infrastructure concerns.
//! Separate `New*` structs carry creation input, keeping persisted rows apart
//! from insert payloads.

pub mod click;
pub mod identity;
pub mod link;

pub use click::{Click, ClickDimensions, DeviceClass, DimensionIds, NewClick};
pub use identity::{Identity, IdentityKind, NewIdentity, StoredCredentials};
pub use link::{Link, NewLink};
