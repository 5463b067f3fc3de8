//! `totp config delete` — remove a secret from the collection.

use crate::cli::commands::confirm;
use crate::cli::output;
use crate::cli::{load_collection, Cli};
use crate::collection::SecretStore;
use crate::config::Settings;
use crate::errors::{Result, TotpError};

/// Execute the `config delete` command.
pub fn execute(cli: &Cli, settings: &Settings, name: &str, yes: bool) -> Result<()> {
    // Stdin carries the collection, so there is nothing to read an answer from.
    if cli.stdio && !yes {
        return Err(TotpError::Usage(
            "--yes is required when deleting with --stdio".into(),
        ));
    }

    let mut collection = load_collection(settings, cli.stdio)?;
    collection.get(name)?;

    // Unless --yes is set, ask for confirmation before deleting.
    if !yes && !confirm(&format!("Delete secret {name}?"))? {
        output::info("Skipping delete");
        return Ok(());
    }

    let message = apply(&mut collection, name)?;
    collection.save()?;

    tracing::info!(name, "secret deleted");
    output::result(cli.stdio, &message);
    Ok(())
}

/// Delete `name` and describe what happened.
pub fn apply<S: SecretStore>(store: &mut S, name: &str) -> Result<String> {
    store.delete(name)?;
    Ok(format!("Deleted secret {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::fake::FakeStore;

    #[test]
    fn deletes_and_reports() {
        let mut store = FakeStore::default();
        store.update("a", "SEED").unwrap();
        assert_eq!(apply(&mut store, "a").unwrap(), "Deleted secret a");
        assert!(store.secrets.is_empty());
    }

    #[test]
    fn missing_name_leaves_store_alone() {
        let mut store = FakeStore::default();
        store.update("a", "SEED").unwrap();
        assert!(matches!(apply(&mut store, "b"), Err(TotpError::NotFound(_))));
        assert_eq!(store.secrets.len(), 1);
    }
}
