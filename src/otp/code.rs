//! TOTP code generation.
//!
//! The HMAC step, time-step bucketing and truncation are done by
//! `totp-rs`.  This module only turns a stored secret string into key
//! bytes and surfaces decoding failures as `TotpError::Generator`.

use chrono::{DateTime, Utc};
use totp_rs::{Algorithm, TOTP};

use crate::errors::{Result, TotpError};

/// Number of digits in a generated passcode.
pub const DIGITS: usize = 6;

/// Length of one TOTP time step in seconds.
pub const STEP_SECONDS: u64 = 30;

/// Generate the passcode for `secret` at the instant `at`.
///
/// Identical secrets within the same 30-second step always yield the
/// same code.
pub fn generate_code(secret: &str, at: DateTime<Utc>) -> Result<String> {
    let key = decode_secret(secret)?;

    let timestamp = u64::try_from(at.timestamp()).map_err(|_| {
        TotpError::Generator(format!("time {} is before the Unix epoch", at.to_rfc3339()))
    })?;

    // Skew is irrelevant for generation; it only widens `check` windows.
    let totp = TOTP::new_unchecked(Algorithm::SHA1, DIGITS, 1, STEP_SECONDS, key);
    Ok(totp.generate(timestamp))
}

/// Check that `secret` is usable by generating a throwaway code for now.
pub fn validate_secret(secret: &str) -> Result<()> {
    generate_code(secret, Utc::now()).map(|_| ())
}

/// Decode a base32 secret (case-insensitive, padding optional).
fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let invalid = || TotpError::Generator(format!("'{secret}' is not a valid base32 string"));

    let cleaned = secret.trim().to_ascii_uppercase();
    if !well_formed(&cleaned) {
        return Err(invalid());
    }

    let padded = pad_base32(&cleaned);
    base32::decode(base32::Alphabet::Rfc4648 { padding: true }, &padded).ok_or_else(invalid)
}

/// Shape checks the decoder does not make on its own: some data, a
/// final quantum of 2, 4, 5 or 7 characters, and padding only at the
/// end and no longer than what completes the last block.
fn well_formed(s: &str) -> bool {
    let data = match s.find('=') {
        Some(i) if s[i..].bytes().all(|b| b == b'=') => &s[..i],
        Some(_) => return false,
        None => s,
    };

    if data.is_empty() || matches!(data.len() % 8, 1 | 3 | 6) {
        return false;
    }

    let padding = s.len() - data.len();
    padding <= (8 - data.len() % 8) % 8
}

/// Pad a base32 string to a multiple of 8 with '='.
fn pad_base32(s: &str) -> String {
    match s.len() % 8 {
        0 => s.to_string(),
        rem => format!("{s}{}", "=".repeat(8 - rem)),
    }
}
