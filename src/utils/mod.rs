//! Small shared utilities with no domain state.

pub mod client_ip;
pub mod slug;
pub mod url_normalizer;
