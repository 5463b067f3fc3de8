//! One-time passcodes.
//!
//! This module provides:
//! - TOTP code generation from a base32 secret (`code`)
//! - `otpauth://` URIs and terminal QR rendering (`uri`)

pub mod code;
pub mod uri;

pub use code::{generate_code, validate_secret, DIGITS, STEP_SECONDS};
pub use uri::{otpauth_uri, render_qr};
