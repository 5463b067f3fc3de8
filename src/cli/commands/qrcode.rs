//! `totp --qrcode NAME` — show a scannable QR code for a secret.

use crate::cli::{load_collection, Cli};
use crate::config::Settings;
use crate::errors::{Result, TotpError};
use crate::otp;

/// Print the QR code for the `otpauth://` URI of a secret.
///
/// The secret comes from `--secret` when given, otherwise from the
/// collection entry named by `NAME`.  A name is always needed since it
/// labels the entry in authenticator apps.
pub fn execute(cli: &Cli, settings: &Settings) -> Result<()> {
    let args = &cli.generate;
    let name = match args.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(TotpError::Usage(
                "Name required for QR code generation".into(),
            ))
        }
    };

    let value = match &args.secret {
        Some(secret) => secret.clone(),
        None => load_collection(settings, cli.stdio)?.get(name)?.value,
    };
    otp::validate_secret(&value)?;

    print!("{}", render(name, &value)?);
    Ok(())
}

/// The terminal QR code for `name`/`secret`, ending in a newline.
pub fn render(name: &str, secret: &str) -> Result<String> {
    let mut art = otp::render_qr(&otp::otpauth_uri(name, secret))?;
    art.push('\n');
    Ok(art)
}
