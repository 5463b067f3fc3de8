//! Command implementations, one module per subcommand.

pub mod completions;
pub mod delete;
pub mod generate;
pub mod list;
pub mod qrcode;
pub mod rename;
pub mod reset;
pub mod update;
pub mod version;

use dialoguer::Confirm;

use crate::errors::{Result, TotpError};

/// Ask a yes/no question on the terminal, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| TotpError::CommandFailed(format!("confirm prompt: {e}")))
}
