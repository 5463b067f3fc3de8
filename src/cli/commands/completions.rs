//! `totp completion` — generate shell completion scripts.
//!
//! Usage:
//!   totp completion bash > ~/.bash_completion.d/totp
//!   totp completion zsh
//!   totp completion fish
//!   totp completion powershell

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{Result, TotpError};

/// Bash: offer stored secret names for the first word, on top of the
/// generated subcommand and flag completions.
const BASH_SECRET_NAMES: &str = r#"
_totp_secret_names() {
    _totp "$@"
    if [[ ${COMP_CWORD} -eq 1 && ${COMP_WORDS[1]} != -* ]]; then
        COMPREPLY+=( $(compgen -W "$(totp config list --names 2>/dev/null)" -- "${COMP_WORDS[1]}") )
    fi
}
complete -F _totp_secret_names -o bashdefault -o default totp
"#;

/// Fish: same idea, only before a subcommand has been typed.
const FISH_SECRET_NAMES: &str = r#"
complete -c totp -n "__fish_use_subcommand" -f -a "(totp config list --names 2>/dev/null)" -d "stored secret"
"#;

/// Execute the `completion` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    io::stdout().write_all(&script(shell))?;
    Ok(())
}

/// The completion script for `shell`, including stored secret names
/// where the shell supports a dynamic hook.
fn script(shell: Shell) -> Vec<u8> {
    let mut buf = Vec::new();
    generate(shell, &mut Cli::command(), "totp", &mut buf);

    let hook = match shell {
        Shell::Bash => Some(BASH_SECRET_NAMES),
        Shell::Fish => Some(FISH_SECRET_NAMES),
        _ => None,
    };
    if let Some(hook) = hook {
        buf.extend_from_slice(hook.as_bytes());
    }
    buf
}

/// Parse a shell name string into a `Shell` enum.
fn parse_shell(name: &str) -> Result<Shell> {
    match name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" | "ps" => Ok(Shell::PowerShell),
        "elvish" => Ok(Shell::Elvish),
        other => Err(TotpError::Usage(format!(
            "unknown shell '{other}' (supported: bash, zsh, fish, powershell, elvish)"
        ))),
    }
}
