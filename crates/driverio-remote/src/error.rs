//! Remote control errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Errors surfaced by the remote control service.
///
/// Request parse failures and probe failures never appear here: the parser
/// degrades to the dashboard route and the probe reports "unreachable".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Configuration error.
    #[error("invalid config '{0}'")]
    InvalidConfig(SmolStr),

    /// Network credentials missing or incomplete.
    #[error("missing network credentials '{0}'")]
    MissingCredentials(SmolStr),

    /// Network association or address discovery failed.
    #[error("network error '{0}'")]
    Network(SmolStr),

    /// Listener bind failure.
    #[error("bind {addr} failed: {reason}")]
    Bind { addr: SmolStr, reason: SmolStr },

    /// GPIO driver error.
    #[error("gpio driver error '{0}'")]
    IoDriver(SmolStr),

    /// Per-connection accept/read/write failure.
    #[error("transport error '{0}'")]
    Transport(SmolStr),
}

impl RemoteError {
    /// Startup errors stop the service before it serves anything.
    #[must_use]
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials(_) | Self::Network(_) | Self::Bind { .. }
        )
    }
}
