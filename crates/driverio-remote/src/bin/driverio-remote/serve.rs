//! `serve`: join the network and run the dashboard listener.

use std::path::Path;

use anyhow::Context;
use driverio_remote::network::{HostNetwork, NetworkLink};
use driverio_remote::settings::GpioBackendKind;
use driverio_remote::{ConfigStore, RemoteContext, Server, Settings};
use tracing::info;

use crate::style;

pub fn run_serve(
    config_dir: &Path,
    mut settings: Settings,
    listen: Option<String>,
    gpio_backend: Option<String>,
) -> anyhow::Result<()> {
    if let Some(listen) = listen {
        settings.set_listen(&listen)?;
    }
    if let Some(backend) = gpio_backend {
        settings.gpio.backend = GpioBackendKind::parse(&backend)?;
    }

    let store = ConfigStore::new(config_dir);
    let credentials = store
        .load_credentials()
        .context("network credentials are required to serve")?;
    let mut link = HostNetwork::new(&settings.network);
    let ip = link
        .associate(&credentials, settings.network.timeout)
        .with_context(|| format!("failed to join network '{}'", credentials.ssid))?;

    let context = RemoteContext::load(&store);
    let server = Server::from_settings(&settings, context)?;
    let port = server.local_addr()?.port();
    info!(
        gpio = settings.gpio.backend.as_str(),
        boot_line = settings.gpio.boot_line,
        run_line = settings.gpio.run_line,
        "gpio ready"
    );
    println!(
        "{}",
        style::success(format!("Driver IO remote running at http://{ip}:{port}"))
    );
    server.run()
}
