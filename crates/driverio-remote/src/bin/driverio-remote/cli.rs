//! CLI definitions for driverio-remote.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "driverio-remote",
    version,
    about = "Passcode-protected web remote for a Driver IO board",
    infer_subcommands = true,
    after_help = "Examples:\n  driverio-remote                          # serve from the current directory\n  driverio-remote --config-dir /etc/driverio serve\n  driverio-remote probe --host 192.168.1.50\n  driverio-remote pulse run"
)]
pub struct Cli {
    /// Show debug logging.
    #[arg(long, short, global = true)]
    pub verbose: bool,
    /// Directory holding the configuration files.
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Join the network and serve the dashboard (default).
    Serve {
        /// Listen address override (host:port).
        #[arg(long)]
        listen: Option<String>,
        /// GPIO backend override (sysfs or loopback).
        #[arg(long)]
        gpio_backend: Option<String>,
    },
    /// Load and summarize the configuration without serving.
    CheckConfig,
    /// Probe the Driver IO board once.
    Probe {
        /// Host to probe instead of the configured DRIVERIO_IP.
        #[arg(long)]
        host: Option<String>,
    },
    /// Pulse one control line once.
    Pulse {
        /// Line to pulse.
        #[arg(value_enum)]
        line: PulseLine,
    },
    /// Load network credentials and wait for an address.
    NetCheck,
    /// Encode an image into the dashboard logo file.
    EncodeLogo {
        /// Image file to encode.
        image: PathBuf,
        /// Output file (default: logo_base64.txt in the config directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Serve {
            listen: None,
            gpio_backend: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PulseLine {
    /// BOOT line, forces bootloader recovery mode.
    Boot,
    /// RUN line, hardware reset.
    Run,
}
