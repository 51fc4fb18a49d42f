//! Shared-secret passcode gate.
//!
//! An empty or absent configured passcode leaves the gate open: every
//! privileged request is admitted. That state is logged at WARN when the
//! gate is built and again on each request it admits.

use smol_str::SmolStr;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
enum GateMode {
    /// No passcode configured; privileged actions are unguarded.
    Open,
    Secret(SmolStr),
}

/// Authorizes privileged actions against the configured passcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeGate {
    mode: GateMode,
}

impl PasscodeGate {
    /// Build the gate from the configured passcode.
    #[must_use]
    pub fn new(configured: Option<&str>) -> Self {
        let mode = match configured {
            Some(secret) if !secret.is_empty() => GateMode::Secret(SmolStr::new(secret)),
            _ => {
                warn!("no PASSCODE configured: boot, reboot and status are open to anyone");
                GateMode::Open
            }
        };
        Self { mode }
    }

    /// `true` when no passcode is configured.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.mode, GateMode::Open)
    }

    /// Check a caller-supplied passcode.
    #[must_use]
    pub fn verify(&self, provided: Option<&str>) -> bool {
        match &self.mode {
            GateMode::Open => {
                warn!("no passcode configured, allowing access");
                true
            }
            GateMode::Secret(secret) => {
                if provided == Some(secret.as_str()) {
                    info!("passcode verified");
                    true
                } else {
                    warn!(supplied = provided.is_some(), "invalid passcode provided");
                    false
                }
            }
        }
    }
}

/// Stateless form of [`PasscodeGate::verify`].
///
/// `true` iff `provided == configured`, or `configured` is absent or empty.
/// Exact byte comparison: no trimming, no case folding, no format checks.
#[must_use]
pub fn verify(provided: Option<&str>, configured: Option<&str>) -> bool {
    PasscodeGate::new(configured).verify(provided)
}
