//! PostgreSQL-backed repository implementations.

pub mod pg_click_repository;
pub mod pg_identity_repository;
pub mod pg_link_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_identity_repository::PgIdentityRepository;
pub use pg_link_repository::PgLinkRepository;
