//! Collection module — named TOTP secrets and their persistence.
//!
//! This module provides:
//! - The `Secret` entry type (`secret`)
//! - The JSON collection file format (`format`)
//! - The in-memory `Collection`, its file/stream adapters and the
//!   `SecretStore` capability trait (`store`)

pub mod format;
pub mod secret;
pub mod store;

// Re-export the most commonly used items.
pub use secret::Secret;
pub use store::{Collection, SecretStore};
