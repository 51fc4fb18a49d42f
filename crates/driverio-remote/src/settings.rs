//! Service settings loaded from `driverio-remote.toml`.
//!
//! Every key is optional. A missing file yields [`Settings::default`].

#![allow(missing_docs)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use smol_str::SmolStr;

use crate::error::RemoteError;

pub const SETTINGS_FILE: &str = "driverio-remote.toml";

pub const DEFAULT_LISTEN: &str = "0.0.0.0:80";
pub const DEFAULT_SYSFS_BASE: &str = "/sys/class/gpio";
pub const DEFAULT_BOOT_LINE: u32 = 8;
pub const DEFAULT_RUN_LINE: u32 = 9;
pub const DEFAULT_PROBE_PORT: u16 = 22;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_NETWORK_POLL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server: ServerSettings,
    pub gpio: GpioSettings,
    pub probe: ProbeSettings,
    pub network: NetworkSettings,
    pub log_level: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub listen: SocketAddr,
    /// `None` leaves the request read unbounded.
    pub read_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioBackendKind {
    Sysfs,
    Loopback,
}

impl GpioBackendKind {
    pub fn parse(text: &str) -> Result<Self, RemoteError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "sysfs" => Ok(Self::Sysfs),
            "loopback" => Ok(Self::Loopback),
            _ => Err(RemoteError::InvalidConfig(
                format!("unsupported gpio backend '{text}' (expected sysfs/loopback)").into(),
            )),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sysfs => "sysfs",
            Self::Loopback => "loopback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioSettings {
    pub backend: GpioBackendKind,
    pub sysfs_base: SmolStr,
    pub boot_line: u32,
    pub run_line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub port: u16,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                listen: SocketAddr::from(([0, 0, 0, 0], 80)),
                read_timeout: None,
            },
            gpio: GpioSettings {
                backend: GpioBackendKind::Sysfs,
                sysfs_base: SmolStr::new_static(DEFAULT_SYSFS_BASE),
                boot_line: DEFAULT_BOOT_LINE,
                run_line: DEFAULT_RUN_LINE,
            },
            probe: ProbeSettings {
                port: DEFAULT_PROBE_PORT,
                timeout: DEFAULT_PROBE_TIMEOUT,
            },
            network: NetworkSettings {
                timeout: DEFAULT_NETWORK_TIMEOUT,
                poll_interval: DEFAULT_NETWORK_POLL,
            },
            log_level: SmolStr::new_static("info"),
        }
    }
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RemoteError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            RemoteError::InvalidConfig(format!("{}: {err}", path.display()).into())
        })?;
        Self::from_toml(&text)
    }

    /// Load from `dir/driverio-remote.toml`, or defaults when the file is absent.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self, RemoteError> {
        let path = dir.as_ref().join(SETTINGS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(text: &str) -> Result<Self, RemoteError> {
        let raw: SettingsToml = toml::from_str(text)
            .map_err(|err| RemoteError::InvalidConfig(format!("{SETTINGS_FILE}: {err}").into()))?;
        raw.into_settings()
    }

    pub fn set_listen(&mut self, text: &str) -> Result<(), RemoteError> {
        self.server.listen = parse_listen(text)?;
        Ok(())
    }
}

fn parse_listen(text: &str) -> Result<SocketAddr, RemoteError> {
    text.trim().parse().map_err(|_| {
        RemoteError::InvalidConfig(format!("invalid server.listen '{text}'").into())
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    server: Option<ServerSection>,
    gpio: Option<GpioSection>,
    probe: Option<ProbeSection>,
    network: Option<NetworkSection>,
    log: Option<LogSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerSection {
    listen: Option<String>,
    read_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GpioSection {
    backend: Option<String>,
    sysfs_base: Option<String>,
    boot_line: Option<u32>,
    run_line: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProbeSection {
    port: Option<u16>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkSection {
    timeout_ms: Option<u64>,
    poll_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogSection {
    level: Option<String>,
}

impl SettingsToml {
    fn into_settings(self) -> Result<Settings, RemoteError> {
        let mut settings = Settings::default();

        if let Some(server) = self.server {
            if let Some(listen) = server.listen {
                settings.server.listen = parse_listen(&listen)?;
            }
            settings.server.read_timeout = server
                .read_timeout_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis);
        }

        if let Some(gpio) = self.gpio {
            if let Some(backend) = gpio.backend {
                settings.gpio.backend = GpioBackendKind::parse(&backend)?;
            }
            if let Some(base) = gpio.sysfs_base {
                settings.gpio.sysfs_base = SmolStr::new(base);
            }
            settings.gpio.boot_line = gpio.boot_line.unwrap_or(DEFAULT_BOOT_LINE);
            settings.gpio.run_line = gpio.run_line.unwrap_or(DEFAULT_RUN_LINE);
            if settings.gpio.boot_line == settings.gpio.run_line {
                return Err(RemoteError::InvalidConfig(
                    format!(
                        "gpio.boot_line and gpio.run_line must differ (both {})",
                        settings.gpio.boot_line
                    )
                    .into(),
                ));
            }
        }

        if let Some(probe) = self.probe {
            settings.probe.port = probe.port.unwrap_or(DEFAULT_PROBE_PORT);
            if let Some(ms) = probe.timeout_ms {
                if ms == 0 {
                    return Err(RemoteError::InvalidConfig(
                        "probe.timeout_ms must be greater than 0".into(),
                    ));
                }
                settings.probe.timeout = Duration::from_millis(ms);
            }
        }

        if let Some(network) = self.network {
            if let Some(ms) = network.timeout_ms {
                settings.network.timeout = Duration::from_millis(ms);
            }
            if let Some(ms) = network.poll_interval_ms {
                settings.network.poll_interval = Duration::from_millis(ms.max(1));
            }
        }

        if let Some(level) = self.log.and_then(|log| log.level) {
            settings.log_level = SmolStr::new(level.trim().to_ascii_lowercase());
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_defaults() {
        let settings = Settings::from_toml("").expect("settings");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server.listen.to_string(), DEFAULT_LISTEN);
        assert_eq!(settings.gpio.boot_line, 8);
        assert_eq!(settings.gpio.run_line, 9);
        assert_eq!(settings.probe.port, 22);
        assert_eq!(settings.probe.timeout, Duration::from_secs(5));
        assert_eq!(settings.server.read_timeout, None);
    }

    #[test]
    fn parses_all_sections() {
        let settings = Settings::from_toml(
            r#"
[server]
listen = "127.0.0.1:8080"
read_timeout_ms = 2500

[gpio]
backend = "loopback"
sysfs_base = "/tmp/gpio"
boot_line = 17
run_line = 27

[probe]
port = 2222
timeout_ms = 1500

[network]
timeout_ms = 3000
poll_interval_ms = 100

[log]
level = "DEBUG"
"#,
        )
        .expect("settings");
        assert_eq!(settings.server.listen.port(), 8080);
        assert_eq!(settings.server.read_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(settings.gpio.backend, GpioBackendKind::Loopback);
        assert_eq!(settings.gpio.sysfs_base, "/tmp/gpio");
        assert_eq!((settings.gpio.boot_line, settings.gpio.run_line), (17, 27));
        assert_eq!(settings.probe.port, 2222);
        assert_eq!(settings.probe.timeout, Duration::from_millis(1500));
        assert_eq!(settings.network.poll_interval, Duration::from_millis(100));
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn zero_read_timeout_means_unbounded() {
        let settings = Settings::from_toml("[server]\nread_timeout_ms = 0\n").expect("settings");
        assert_eq!(settings.server.read_timeout, None);
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "[gpio]\nbackend = \"gpiod\"\n",
            "[server]\nlisten = \"not-an-address\"\n",
            "[gpio]\nboot_line = 5\nrun_line = 5\n",
            "[probe]\ntimeout_ms = 0\n",
            "[unknown]\nkey = 1\n",
        ] {
            let err = Settings::from_toml(text).unwrap_err();
            assert!(matches!(err, RemoteError::InvalidConfig(_)), "{text}: {err}");
        }
    }

    #[test]
    fn missing_file_in_dir_is_defaults() {
        let dir = std::env::temp_dir().join("driverio-settings-missing-dir");
        let settings = Settings::load_from_dir(&dir).expect("settings");
        assert_eq!(settings, Settings::default());
    }
}
