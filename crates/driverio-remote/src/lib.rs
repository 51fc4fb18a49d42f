//! `driverio-remote` - HTTP remote control for the Driver IO board.
//!
//! A single-threaded listener accepts one connection at a time, parses a
//! minimal HTTP request, gates privileged actions behind a shared passcode,
//! pulses the board's BOOT or RUN line, or probes the board's administrative
//! port, then answers with an HTML page.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

/// Persisted key=value configuration and credentials.
pub mod config;
/// Runtime errors.
pub mod error;
/// Action execution (pulses and probes).
pub mod executor;
/// Shared-secret passcode gate.
pub mod gate;
/// GPIO backends.
pub mod io;
/// Optional dashboard logo.
pub mod logo;
/// Network association collaborator.
pub mod network;
/// Reachability probe for the Driver IO board.
pub mod probe;
/// Timed pulses on output lines.
pub mod pulse;
/// HTML rendering for dashboard and outcome pages.
pub mod render;
/// Minimal HTTP request parsing.
pub mod request;
/// Path to action routing.
pub mod router;
/// Single-threaded HTTP listener.
pub mod server;
/// Service settings (`driverio-remote.toml`).
pub mod settings;

pub use config::{ConfigStore, DriverIoConfig, WifiCredentials};
pub use error::RemoteError;
pub use executor::{ActionExecutor, ActionOutcome, OutcomeFailure};
pub use gate::PasscodeGate;
pub use probe::{ProbeResult, ReachabilityProbe, TcpProbe};
pub use pulse::{PulseActuator, PulseSpec};
pub use request::Request;
pub use router::Action;
pub use server::{RemoteContext, Server};
pub use settings::Settings;
