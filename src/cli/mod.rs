//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, Read};
use std::path::PathBuf;

use chrono::{DateTime, TimeDelta, Utc};
use clap::{ArgAction, Parser};

use crate::collection::Collection;
use crate::config::Settings;
use crate::errors::{Result, TotpError};

/// totp CLI: time-based one-time passcode generator.
#[derive(Parser)]
#[command(
    name = "totp",
    about = "TOTP generator with a named secret collection",
    version,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Secret collection file (default: $TOTP_CONFIG or ~/.totp-config.json)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Load the collection from stdin; write changes to stdout
    #[arg(long, global = true)]
    pub stdio: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Arguments for the default action: print a code.
#[derive(clap::Args, Debug, Default)]
pub struct GenerateArgs {
    /// Name of a stored secret
    pub name: Option<String>,

    /// Use this shared secret instead of a stored one
    #[arg(short, long)]
    pub secret: Option<String>,

    /// Generate for this time instead of now (RFC 3339)
    #[arg(long)]
    pub time: Option<String>,

    /// Move the time forward by a duration (e.g. 30s, 1m, 1h30m)
    #[arg(long)]
    pub forward: Option<String>,

    /// Move the time backward by a duration
    #[arg(long)]
    pub backward: Option<String>,

    /// Keep printing a new code every 30 seconds
    #[arg(long)]
    pub follow: bool,

    /// Stop following after this duration
    #[arg(long, requires = "follow")]
    pub runtime: Option<String>,

    /// Print a QR code for the secret instead of a code
    #[arg(long)]
    pub qrcode: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Manage the secret collection
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Config subcommands for collection management.
#[derive(clap::Subcommand)]
pub enum ConfigAction {
    /// List secrets
    #[command(visible_aliases = ["ls", "l"])]
    List {
        /// List only secret names
        #[arg(short, long, conflicts_with = "all")]
        names: bool,
        /// Include secret values
        #[arg(short, long)]
        all: bool,
    },

    /// Add or update a secret
    #[command(visible_alias = "add")]
    Update {
        /// Secret name
        name: String,
        /// Base32 shared secret
        value: String,
    },

    /// Rename a secret
    #[command(visible_aliases = ["ren", "mv"])]
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Delete a secret
    #[command(visible_aliases = ["remove", "erase", "rm", "del"])]
    Delete {
        /// Secret name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove the collection file
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load the collection the command should work on.
///
/// With `stdio` the whole of stdin is read (blank input is an empty
/// collection) and saves go to stdout.  Otherwise the resolved
/// collection file is opened; a missing file is an empty collection.
pub fn load_collection(settings: &Settings, stdio: bool) -> Result<Collection> {
    if stdio {
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        let mut collection = collection_from_input(&data)?;
        collection.set_writer(Box::new(io::stdout()));
        return Ok(collection);
    }

    let path = settings.collection_file();
    tracing::debug!(path = %path.display(), "loading collection");

    match Collection::open(&path) {
        (collection, None) => Ok(collection),
        (collection, Some(TotpError::Io(e))) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "collection file not found, starting empty");
            Ok(collection)
        }
        (_, Some(e)) => Err(e),
    }
}

/// Decode piped collection bytes, treating blank input as empty.
fn collection_from_input(data: &[u8]) -> Result<Collection> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Collection::new());
    }
    match Collection::from_slice(data) {
        (collection, None) => Ok(collection),
        (_, Some(e)) => Err(e),
    }
}

/// Reject names that would be parsed as a subcommand.
pub fn check_name(settings: &Settings, name: &str) -> Result<()> {
    if settings.is_reserved(name) {
        return Err(TotpError::ReservedName(name.to_string()));
    }
    Ok(())
}

/// Parse an RFC 3339 timestamp such as `2019-06-23T20:00:01-05:00`.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| TotpError::InvalidTime(input.to_string()))
}

/// Parse a duration like `30s`, `1m`, `1h30m`, `1.5h` or `-250ms`.
///
/// Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.  A bare `0` is allowed.
pub fn parse_duration(input: &str) -> Result<TimeDelta> {
    let invalid = || TotpError::InvalidDuration(input.to_string());

    let trimmed = input.trim();
    let (negative, mut rest) = match trimmed.strip_prefix('-') {
        Some(s) => (true, s),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: f64 = 0.0;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(invalid)?;
        let (num_str, after) = rest.split_at(num_len);
        let num: f64 = num_str.parse().map_err(|_| invalid())?;

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, next) = after.split_at(unit_len);

        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            _ => return Err(invalid()),
        };

        total_nanos += num * scale;
        rest = next;
    }

    if total_nanos > i64::MAX as f64 {
        return Err(invalid());
    }

    let delta = TimeDelta::nanoseconds(total_nanos.round() as i64);
    Ok(if negative { -delta } else { delta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_name_is_a_generate_request() {
        let cli = Cli::try_parse_from(["totp", "github"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.generate.name.as_deref(), Some("github"));
    }

    #[test]
    fn config_aliases_parse() {
        for alias in ["add", "update"] {
            let cli = Cli::try_parse_from(["totp", "config", alias, "n", "SEED"]).unwrap();
            assert!(matches!(
                cli.command,
                Some(Commands::Config {
                    action: ConfigAction::Update { .. }
                })
            ));
        }
        for alias in ["remove", "erase", "rm", "del"] {
            let cli = Cli::try_parse_from(["totp", "config", alias, "n", "-y"]).unwrap();
            assert!(matches!(
                cli.command,
                Some(Commands::Config {
                    action: ConfigAction::Delete { yes: true, .. }
                })
            ));
        }
    }

    #[test]
    fn stdio_and_file_are_global() {
        let cli =
            Cli::try_parse_from(["totp", "config", "ls", "--stdio", "-f", "x.json"]).unwrap();
        assert!(cli.stdio);
        assert_eq!(cli.file, Some(PathBuf::from("x.json")));
    }

    #[test]
    fn runtime_requires_follow() {
        assert!(Cli::try_parse_from(["totp", "n", "--runtime", "1m"]).is_err());
    }

    #[test]
    fn parse_duration_single_units() {
        assert_eq!(parse_duration("30s").unwrap(), TimeDelta::seconds(30));
        assert_eq!(parse_duration("1m").unwrap(), TimeDelta::minutes(1));
        assert_eq!(parse_duration("24h").unwrap(), TimeDelta::hours(24));
        assert_eq!(parse_duration("500ms").unwrap(), TimeDelta::milliseconds(500));
        assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
    }

    #[test]
    fn parse_duration_compound_and_fractional() {
        assert_eq!(parse_duration("1h30m").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("1.5h").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("-2m").unwrap(), TimeDelta::minutes(-2));
    }

    #[test]
    fn parse_duration_rejects_garbage() {
        for bad in ["", "30", "5x", "h", "1h30", "--1s", "1..5s"] {
            assert!(
                matches!(parse_duration(bad), Err(TotpError::InvalidDuration(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn parse_time_accepts_offsets() {
        let t = parse_time("2019-06-23T20:00:01-05:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2019-06-24T01:00:01+00:00");
        assert!(matches!(parse_time("yesterday"), Err(TotpError::InvalidTime(_))));
    }

    #[test]
    fn blank_piped_input_is_an_empty_collection() {
        assert!(collection_from_input(b"").unwrap().is_empty());
        assert!(collection_from_input(b" \n").unwrap().is_empty());
        assert!(matches!(
            collection_from_input(b"{oops"),
            Err(TotpError::Decode(_))
        ));
    }

    #[test]
    fn reserved_names_are_rejected() {
        let settings = Settings::default();
        assert!(matches!(
            check_name(&settings, "version"),
            Err(TotpError::ReservedName(_))
        ));
        assert!(check_name(&settings, "github").is_ok());
    }
}
