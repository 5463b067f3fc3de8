//! `totp config update` — add a secret or replace its value.

use crate::cli::output;
use crate::cli::{check_name, load_collection, Cli};
use crate::collection::SecretStore;
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `config update` command.
pub fn execute(cli: &Cli, settings: &Settings, name: &str, value: &str) -> Result<()> {
    check_name(settings, name)?;

    let mut collection = load_collection(settings, cli.stdio)?;
    let message = apply(&mut collection, name, value)?;
    collection.save()?;

    tracing::info!(name, "secret stored");
    output::result(cli.stdio, &message);
    Ok(())
}

/// Store `value` under `name` and describe what happened.
pub fn apply<S: SecretStore>(store: &mut S, name: &str, value: &str) -> Result<String> {
    let secret = store.update(name, value)?;
    let verb = if secret.is_new() { "Added" } else { "Updated" };
    Ok(format!("{verb} secret {name}"))
}
