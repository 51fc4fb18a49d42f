//! Persisted `key=value` configuration.
//!
//! Files live in one configuration directory:
//!
//! - `driverio_config.txt`: `DRIVERIO_IP`, `DRIVERIO_USER`, `DRIVERIO_PASS`, `PASSCODE`
//! - `wifi_config.txt`: `SSID`, `PASSWORD`
//! - `logo_base64.txt`: optional dashboard logo (see [`crate::logo`])

#![allow(missing_docs)]

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{info, warn};

use crate::error::RemoteError;

pub const DRIVERIO_CONFIG_FILE: &str = "driverio_config.txt";
pub const WIFI_CONFIG_FILE: &str = "wifi_config.txt";
pub const LOGO_FILE: &str = "logo_base64.txt";

const DEFAULT_REMOTE_USER: &str = "pi";

/// Connection details for the Driver IO board and the service passcode.
#[derive(Clone, PartialEq, Eq)]
pub struct DriverIoConfig {
    pub remote_ip: Option<SmolStr>,
    pub remote_user: SmolStr,
    pub remote_pass: SmolStr,
    pub passcode: Option<SmolStr>,
}

impl fmt::Debug for DriverIoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverIoConfig")
            .field("remote_ip", &self.remote_ip)
            .field("remote_user", &self.remote_user)
            .field("remote_pass", &"<redacted>")
            .field("passcode", &self.passcode.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for DriverIoConfig {
    fn default() -> Self {
        Self {
            remote_ip: None,
            remote_user: SmolStr::new_static(DEFAULT_REMOTE_USER),
            remote_pass: SmolStr::default(),
            passcode: None,
        }
    }
}

impl DriverIoConfig {
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let values = parse_key_values(text);
        let non_empty = |key: &str| {
            values
                .get(key)
                .filter(|value| !value.is_empty())
                .map(SmolStr::new)
        };
        Self {
            remote_ip: non_empty("DRIVERIO_IP"),
            remote_user: non_empty("DRIVERIO_USER")
                .unwrap_or_else(|| SmolStr::new_static(DEFAULT_REMOTE_USER)),
            remote_pass: values.get("DRIVERIO_PASS").map(SmolStr::new).unwrap_or_default(),
            passcode: non_empty("PASSCODE"),
        }
    }

    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, RemoteError> {
        let text = read_config(path.as_ref())?;
        Ok(Self::from_text(&text))
    }
}

/// Network name and secret for association.
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: SmolStr,
    pub password: SmolStr,
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl WifiCredentials {
    pub fn from_text(text: &str) -> Result<Self, RemoteError> {
        let values = parse_key_values(text);
        let required = |key: &str| {
            values
                .get(key)
                .filter(|value| !value.is_empty())
                .map(SmolStr::new)
                .ok_or_else(|| {
                    RemoteError::MissingCredentials(
                        format!("{WIFI_CONFIG_FILE} has no {key}= entry").into(),
                    )
                })
        };
        Ok(Self {
            ssid: required("SSID")?,
            password: required("PASSWORD")?,
        })
    }

    /// Password with every character masked, for console output.
    #[must_use]
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

/// Reads the persisted configuration files from one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Load the Driver IO configuration. A missing or unreadable file is
    /// logged and yields the default (no IP, no passcode).
    #[must_use]
    pub fn load(&self) -> DriverIoConfig {
        let path = self.path(DRIVERIO_CONFIG_FILE);
        match DriverIoConfig::try_load(&path) {
            Ok(config) => {
                if config.remote_ip.is_none() {
                    warn!(path = %path.display(), "DRIVERIO_IP not configured, status checks will report offline");
                }
                info!(path = %path.display(), "loaded driver io config");
                config
            }
            Err(err) => {
                warn!(%err, "using default driver io config");
                DriverIoConfig::default()
            }
        }
    }

    /// Load network credentials. Missing credentials are a startup error.
    pub fn load_credentials(&self) -> Result<WifiCredentials, RemoteError> {
        let path = self.path(WIFI_CONFIG_FILE);
        let text = read_config(&path).map_err(|err| {
            RemoteError::MissingCredentials(
                format!("could not read {} ({err})", path.display()).into(),
            )
        })?;
        WifiCredentials::from_text(&text)
    }
}

fn read_config(path: &Path) -> Result<String, RemoteError> {
    std::fs::read_to_string(path)
        .map_err(|err| RemoteError::InvalidConfig(format!("{}: {err}", path.display()).into()))
}

/// Parse `KEY=value` lines. Lines are trimmed, blank lines and `#` comments
/// are skipped, the first `=` splits key from value, and later duplicates
/// override earlier ones.
#[must_use]
pub fn parse_key_values(text: &str) -> IndexMap<String, String> {
    let mut values = IndexMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.to_string(), value.to_string());
        }
    }
    values
}
