//! Application layer: services orchestrating domain logic over repositories.

pub mod services;
