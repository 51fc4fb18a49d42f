//! Path to action routing.

use std::fmt;

/// Closed set of actions the service can take for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Serve the dashboard page.
    Dashboard,
    /// Pulse the BOOT line (bootloader recovery).
    Boot,
    /// Pulse the RUN line (hardware reset).
    Reboot,
    /// Probe the board's administrative port.
    Status,
    /// A privileged action was refused by the passcode gate.
    Unauthorized,
    /// An action with no handler.
    NotFound,
}

impl Action {
    /// Actions that require the passcode gate.
    #[must_use]
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Boot | Self::Reboot | Self::Status)
    }

    /// Lowercase name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Boot => "boot",
            Self::Reboot => "reboot",
            Self::Status => "status",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRIVILEGED_ROUTES: [(&str, Action); 3] = [
    ("/boot", Action::Boot),
    ("/reboot", Action::Reboot),
    ("/status", Action::Status),
];

/// Map a request path to an action.
///
/// Matching is "startswith" in the order `/boot`, `/reboot`, `/status`, so
/// `/bootxyz` routes to [`Action::Boot`]. Everything else is the dashboard.
/// The request method is not considered.
#[must_use]
pub fn route(path: &str) -> Action {
    PRIVILEGED_ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map_or(Action::Dashboard, |(_, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_prefixes() {
        assert_eq!(route("/boot"), Action::Boot);
        assert_eq!(route("/reboot"), Action::Reboot);
        assert_eq!(route("/status"), Action::Status);
    }

    #[test]
    fn suffixes_after_prefix_are_ignored() {
        assert_eq!(route("/bootxyz"), Action::Boot);
        assert_eq!(route("/reboot/now"), Action::Reboot);
        assert_eq!(route("/statusfoo"), Action::Status);
    }

    #[test]
    fn everything_else_is_dashboard() {
        for path in ["/", "", "/index.html", "boot", "/BOOT", "/favicon.ico", "//boot"] {
            assert_eq!(route(path), Action::Dashboard, "path {path:?}");
        }
    }

    #[test]
    fn only_routed_actions_are_privileged() {
        assert!(Action::Boot.is_privileged());
        assert!(Action::Reboot.is_privileged());
        assert!(Action::Status.is_privileged());
        assert!(!Action::Dashboard.is_privileged());
        assert!(!Action::NotFound.is_privileged());
    }
}
