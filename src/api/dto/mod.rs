//! Data transfer objects for request validation and response shaping.

pub mod analytics;
pub mod auth;
pub mod health;
pub mod links;
pub mod shorten;
