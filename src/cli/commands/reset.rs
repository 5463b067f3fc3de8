//! `totp config reset` — remove the collection file.

use std::io;

use crate::cli::commands::confirm;
use crate::cli::output;
use crate::cli::Cli;
use crate::collection::Collection;
use crate::config::Settings;
use crate::errors::Result;

/// Execute the `config reset` command.
///
/// With `--stdio` nothing is removed; an empty collection is written to
/// stdout instead.
pub fn execute(cli: &Cli, settings: &Settings, yes: bool) -> Result<()> {
    if cli.stdio {
        let mut empty = Collection::new();
        empty.set_writer(Box::new(io::stdout()));
        return empty.save();
    }

    let path = settings.collection_file();
    if !path.exists() {
        output::info(&format!(
            "Collection file {} does not exist",
            path.display()
        ));
        return Ok(());
    }

    if !yes && !confirm(&format!("Remove collection file {}?", path.display()))? {
        output::info("Skipping reset");
        return Ok(());
    }

    std::fs::remove_file(&path)?;

    tracing::info!(path = %path.display(), "collection file removed");
    output::success(&format!("Collection file {} removed", path.display()));
    Ok(())
}
