//! `otpauth://` URIs and their terminal QR rendering.
//!
//! The URI follows the Google Authenticator key URI format:
//! `otpauth://totp/<label>?secret=<SECRET>&issuer=<issuer>`.  The secret
//! name is used as both label and issuer.

use qrcode::render::unicode::Dense1x2;
use qrcode::{EcLevel, QrCode};

use crate::errors::{Result, TotpError};

/// Build the `otpauth://` URI for a named secret.
pub fn otpauth_uri(name: &str, secret: &str) -> String {
    let label = url_encode(name);
    let secret = secret.trim().to_ascii_uppercase();
    format!("otpauth://totp/{label}?secret={secret}&issuer={label}")
}

/// Render `text` as a QR code made of half-block characters.
///
/// Colors are inverted (light modules drawn solid) so the code scans
/// on dark terminal backgrounds.
pub fn render_qr(text: &str) -> Result<String> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
        .map_err(|e| TotpError::Qr(e.to_string()))?;

    Ok(code
        .render::<Dense1x2>()
        .dark_color(Dense1x2::Light)
        .light_color(Dense1x2::Dark)
        .build())
}

fn url_encode(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                output.push(byte as char);
            }
            _ => output.push_str(&format!("%{byte:02X}")),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_uses_name_as_label_and_issuer() {
        assert_eq!(
            otpauth_uri("github", "jbswy3dpehpk3pxp"),
            "otpauth://totp/github?secret=JBSWY3DPEHPK3PXP&issuer=github"
        );
    }

    #[test]
    fn uri_escapes_label() {
        let uri = otpauth_uri("alice@example.com", "SEED");
        assert!(uri.starts_with("otpauth://totp/alice%40example.com?"));
        assert!(uri.ends_with("&issuer=alice%40example.com"));
    }

    #[test]
    fn qr_render_is_square_block_text() {
        let qr = render_qr(&otpauth_uri("name", "SEED")).unwrap();
        let lines: Vec<&str> = qr.lines().collect();
        assert!(lines.len() > 10);
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|l| l.chars().count() == width));
        // Quiet zone is light, drawn as full blocks.
        assert!(lines[0].chars().all(|c| c == '\u{2588}'));
    }
}
