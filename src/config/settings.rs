use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TotpError};

/// Environment variable that points at the collection file.
pub const COLLECTION_ENV: &str = "TOTP_CONFIG";

/// Environment variable that points at `settings.toml`.
pub const SETTINGS_ENV: &str = "TOTP_SETTINGS";

/// Base name of the default collection file.
const COLLECTION_FILE_NAME: &str = "totp-config.json";

/// Names that would collide with subcommands.
const RESERVED_NAMES: &[&str] = &["config", "version", "completion", "help"];

/// User-level configuration, optionally loaded from `settings.toml`.
///
/// Built once at startup and passed by reference to every command.
/// Every field has a sensible default so totp works without any
/// settings file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Collection file to use when neither `--file` nor `TOTP_CONFIG`
    /// is given.  After [`Settings::resolve_collection_file`] this holds
    /// the path every command should use.
    #[serde(default)]
    pub collection_file: Option<PathBuf>,

    /// Milliseconds added to the follow-mode alignment sleep.
    #[serde(default = "default_follow_settle_ms")]
    pub follow_settle_ms: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_follow_settle_ms() -> u64 {
    10
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            collection_file: None,
            follow_settle_ms: default_follow_settle_ms(),
        }
    }
}

impl Settings {
    /// Name of the settings file inside the config directory.
    const FILE_NAME: &'static str = "settings.toml";

    /// Load settings from `path`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            TotpError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;

        Ok(settings)
    }

    /// Load settings from `TOTP_SETTINGS`, or from
    /// `<config dir>/totp/settings.toml` when it is unset.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Where `load_default` looks for the settings file.
    pub fn default_path() -> Option<PathBuf> {
        match std::env::var_os(SETTINGS_ENV).filter(|v| !v.is_empty()) {
            Some(path) => Some(PathBuf::from(path)),
            None => dirs::config_dir().map(|dir| dir.join("totp").join(Self::FILE_NAME)),
        }
    }

    /// Decide which collection file this process uses and remember it.
    ///
    /// Precedence: `cli_file` (the `--file` flag), then `TOTP_CONFIG`,
    /// then `collection_file` from the settings file, then the
    /// platform default.
    pub fn resolve_collection_file(&mut self, cli_file: Option<&Path>) -> &Path {
        let resolved = resolve_collection_file(
            cli_file,
            std::env::var_os(COLLECTION_ENV),
            self.collection_file.as_deref(),
            platform_default_collection_file,
        );
        self.collection_file.insert(resolved)
    }

    /// The collection file, resolving it without a `--file` override
    /// if that has not happened yet.
    pub fn collection_file(&self) -> PathBuf {
        match &self.collection_file {
            Some(path) => path.clone(),
            None => resolve_collection_file(
                None,
                std::env::var_os(COLLECTION_ENV),
                None,
                platform_default_collection_file,
            ),
        }
    }

    /// Margin added to the follow-mode alignment sleep.
    pub fn settle_margin(&self) -> Duration {
        Duration::from_millis(self.follow_settle_ms)
    }

    /// Returns `true` if `name` cannot be used for a secret.
    pub fn is_reserved(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name)
    }
}

fn resolve_collection_file(
    cli_file: Option<&Path>,
    env_value: Option<OsString>,
    from_settings: Option<&Path>,
    platform_default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    if let Some(path) = cli_file {
        return path.to_path_buf();
    }
    if let Some(value) = env_value.filter(|v| !v.is_empty()) {
        return PathBuf::from(value);
    }
    if let Some(path) = from_settings {
        return path.to_path_buf();
    }
    platform_default()
}

/// `%LOCALAPPDATA%\totp-config.json` on Windows, `~/.totp-config.json`
/// elsewhere.
fn platform_default_collection_file() -> PathBuf {
    if cfg!(windows) {
        dirs::data_local_dir()
            .unwrap_or_default()
            .join(COLLECTION_FILE_NAME)
    } else {
        dirs::home_dir()
            .unwrap_or_default()
            .join(format!(".{COLLECTION_FILE_NAME}"))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
