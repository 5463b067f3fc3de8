use clap::Parser;
use tracing_subscriber::EnvFilter;

use totp::cli::{Cli, Commands, ConfigAction};
use totp::config::Settings;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = Settings::load_default().and_then(|mut settings| {
        let path = settings.resolve_collection_file(cli.file.as_deref());
        tracing::debug!(path = %path.display(), "using collection file");
        run(&cli, &settings)
    });

    if let Err(e) = result {
        totp::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: &Cli, settings: &Settings) -> totp::errors::Result<()> {
    use totp::cli::commands;

    match &cli.command {
        None => commands::generate::execute(cli, settings),
        Some(Commands::Config { action }) => match action {
            ConfigAction::List { names, all } => {
                commands::list::execute(cli, settings, *names, *all)
            }
            ConfigAction::Update { name, value } => {
                commands::update::execute(cli, settings, name, value)
            }
            ConfigAction::Rename { old, new } => {
                commands::rename::execute(cli, settings, old, new)
            }
            ConfigAction::Delete { name, yes } => {
                commands::delete::execute(cli, settings, name, *yes)
            }
            ConfigAction::Reset { yes } => commands::reset::execute(cli, settings, *yes),
        },
        Some(Commands::Version) => commands::version::execute(),
        Some(Commands::Completion { shell }) => commands::completions::execute(shell),
    }
}

/// Log to stderr so stdout stays clean for codes and piped collections.
/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
