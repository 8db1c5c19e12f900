use std::io;
use std::process;

use clap::Parser;
use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

use formula_settings::app::{AppConfig, AppState, Result};
use formula_settings::ui::cli::{self, Cli};

fn main() {
    let cli = Cli::parse();
    let config = cli.load_config();
    init_logging(cli.verbose, &config);

    if let Err(e) = run(&cli, &config) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let mut app = AppState::from_config(config)?;
    let stdout = io::stdout();
    cli::execute(&mut app, &cli.command, &mut stdout.lock())
}

/// `-v` wins over the configured level; `LOG` wins over both.
fn init_logging(verbosity: u8, config: &AppConfig) {
    let level = match verbosity {
        0 => config.log_level.parse().unwrap_or(LevelFilter::WARN),
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var("LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
