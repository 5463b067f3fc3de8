//! `totp config list` — display stored secrets.

use crate::cli::output;
use crate::cli::{load_collection, Cli};
use crate::collection::{Secret, SecretStore};
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `config list` command.
pub fn execute(cli: &Cli, settings: &Settings, names: bool, all: bool) -> Result<()> {
    let collection = load_collection(settings, cli.stdio)?;
    let secrets = sorted(&collection);

    if names {
        for s in &secrets {
            println!("{}", s.name);
        }
    } else {
        output::print_secrets_table(&secrets, all);
    }

    Ok(())
}

/// Every secret in the store, ordered by name.
pub fn sorted<S: SecretStore>(store: &S) -> Vec<Secret> {
    let mut secrets = store.list();
    secrets.sort_by(|a, b| a.name.cmp(&b.name));
    secrets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::fake::FakeStore;

    #[test]
    fn sorted_orders_by_name() {
        let mut store = FakeStore::default();
        for name in ["b", "c", "a"] {
            store.update(name, "SEED").unwrap();
        }
        let names: Vec<_> = sorted(&store).into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }
}
