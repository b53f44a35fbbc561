//! Data access trait definitions implemented by the infrastructure layer.

pub mod click_repository;
pub mod identity_repository;
pub mod link_repository;

pub use click_repository::{ClickRepository, LinkAnalytics};
pub use identity_repository::IdentityRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use identity_repository::MockIdentityRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
