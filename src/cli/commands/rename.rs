//! `totp config rename` — move a secret to a new name.

use crate::cli::output;
use crate::cli::{check_name, load_collection, Cli};
use crate::collection::SecretStore;
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `config rename` command.
pub fn execute(cli: &Cli, settings: &Settings, old: &str, new: &str) -> Result<()> {
    check_name(settings, new)?;

    let mut collection = load_collection(settings, cli.stdio)?;
    if collection.contains(new) && old != new {
        output::warning(&format!("Secret {new} already exists and will be replaced"));
    }

    let message = apply(&mut collection, old, new)?;
    collection.save()?;

    output::result(cli.stdio, &message);
    Ok(())
}

/// Rename `old` to `new` and describe what happened.
pub fn apply<S: SecretStore>(store: &mut S, old: &str, new: &str) -> Result<String> {
    store.rename(old, new)?;
    Ok(format!("Renamed secret {old} to {new}"))
}
