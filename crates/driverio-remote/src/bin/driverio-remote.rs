//! CLI entrypoint for the Driver IO remote.

#[path = "driverio-remote/cli.rs"]
mod cli;
#[path = "driverio-remote/serve.rs"]
mod serve;
#[path = "driverio-remote/style.rs"]
mod style;
#[path = "driverio-remote/tools.rs"]
mod tools;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use driverio_remote::Settings;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};

fn main() -> anyhow::Result<()> {
    if let Err(err) = run() {
        eprintln!("{}", style::error(format!("Error: {err:#}")));
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load_from_dir(&cli.config_dir)
        .with_context(|| format!("loading settings from {}", cli.config_dir.display()))?;
    init_logging(&settings, cli.verbose);

    match cli.command.unwrap_or_default() {
        Command::Serve {
            listen,
            gpio_backend,
        } => serve::run_serve(&cli.config_dir, settings, listen, gpio_backend),
        Command::CheckConfig => tools::run_check_config(&cli.config_dir, &settings),
        Command::Probe { host } => tools::run_probe(&cli.config_dir, &settings, host),
        Command::Pulse { line } => tools::run_pulse(&settings, line),
        Command::NetCheck => tools::run_net_check(&cli.config_dir, &settings),
        Command::EncodeLogo { image, out } => {
            let out = out.unwrap_or_else(|| default_logo_path(&cli.config_dir));
            tools::run_encode_logo(&image, &out)
        }
    }
}

fn init_logging(settings: &Settings, verbose: bool) {
    let level = if verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_logo_path(config_dir: &Path) -> std::path::PathBuf {
    config_dir.join(driverio_remote::config::LOGO_FILE)
}
