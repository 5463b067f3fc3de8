//! `totp [NAME]` — print the current code, optionally following it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::cli::commands::qrcode;
use crate::cli::output;
use crate::cli::{load_collection, parse_duration, parse_time, Cli, GenerateArgs};
use crate::collection::Collection;
use crate::config::Settings;
use crate::errors::{Result, TotpError};
use crate::follow::FollowScheduler;
use crate::otp;

/// Where codes come from.
#[derive(Debug)]
pub enum CodeSource {
    /// A shared secret given on the command line.
    Secret(String),
    /// A stored secret.  `preloaded` is set when the collection was
    /// piped in; otherwise the file is re-read for every code so edits
    /// made while following are picked up.
    Stored {
        name: String,
        preloaded: Option<Collection>,
    },
}

impl CodeSource {
    /// Generate the code for `at`.
    pub fn code(&self, settings: &Settings, at: DateTime<Utc>) -> Result<String> {
        match self {
            CodeSource::Secret(secret) => otp::generate_code(secret, at),
            CodeSource::Stored {
                name,
                preloaded: Some(collection),
            } => collection.generate_code(name, at),
            CodeSource::Stored {
                name,
                preloaded: None,
            } => load_collection(settings, false)?.generate_code(name, at),
        }
    }
}

/// Check the name/secret combination.
///
/// Exactly one of the two is needed, except for QR codes where the
/// name labels a secret given on the command line.
pub fn validate(args: &GenerateArgs) -> Result<()> {
    match (&args.name, &args.secret) {
        (None, None) => Err(TotpError::Usage(
            "Secret name or secret is required.".into(),
        )),
        (Some(_), Some(_)) if !args.qrcode => Err(TotpError::Usage(
            "Secret was given so additional arguments are not needed.".into(),
        )),
        _ => Ok(()),
    }
}

/// `--forward` minus `--backward`.
pub fn shift(args: &GenerateArgs) -> Result<TimeDelta> {
    let forward = args.forward.as_deref().map(parse_duration).transpose()?;
    let backward = args.backward.as_deref().map(parse_duration).transpose()?;
    Ok(forward.unwrap_or_default() - backward.unwrap_or_default())
}

/// Execute the default command.
pub fn execute(cli: &Cli, settings: &Settings) -> Result<()> {
    let args = &cli.generate;
    if let Err(e) = validate(args) {
        output::tip("Run `totp --help` for usage.");
        return Err(e);
    }

    if args.qrcode {
        return qrcode::execute(cli, settings);
    }

    let now = Utc::now();
    let base = match &args.time {
        Some(t) => parse_time(t)?,
        None => now,
    };
    let shift = shift(args)?;
    let runtime = match &args.runtime {
        Some(r) => to_std(r, parse_duration(r)?)?,
        None => Duration::ZERO,
    };

    let source = match (&args.secret, &args.name) {
        (Some(secret), _) => CodeSource::Secret(secret.clone()),
        (None, Some(name)) => CodeSource::Stored {
            name: name.clone(),
            preloaded: if cli.stdio {
                Some(load_collection(settings, true)?)
            } else {
                None
            },
        },
        (None, None) => {
            return Err(TotpError::Usage(
                "Secret name or secret is required.".into(),
            ))
        }
    };

    println!("{}", source.code(settings, base + shift)?);

    if args.follow {
        let offset = base - now + shift;
        follow(&source, settings, offset, runtime)?;
    }

    Ok(())
}

/// Print a fresh code on every step boundary until the runtime elapses
/// or Ctrl-C is pressed.
fn follow(
    source: &CodeSource,
    settings: &Settings,
    offset: TimeDelta,
    runtime: Duration,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        let scheduler = FollowScheduler::new(offset)
            .runtime(runtime)
            .settle(settings.settle_margin());

        let stop = scheduler.stop_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.stop();
            }
        });

        tracing::info!(offset_ms = offset.num_milliseconds(), ?runtime, "following");

        let report = scheduler
            .run(|at| {
                let code = source.code(settings, at)?;
                tracing::debug!(%at, "emitting code");
                println!("{code}");
                Ok(())
            })
            .await?;

        tracing::info!(emissions = report.emissions, reason = ?report.reason, "follow finished");
        Ok::<(), TotpError>(())
    })
}

fn to_std(input: &str, delta: TimeDelta) -> Result<Duration> {
    delta
        .to_std()
        .map_err(|_| TotpError::InvalidDuration(input.to_string()))
}
