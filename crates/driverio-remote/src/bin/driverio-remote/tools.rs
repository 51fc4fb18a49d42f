//! One-shot maintenance commands.

use std::path::Path;

use anyhow::Context;
use driverio_remote::io::backend_from_settings;
use driverio_remote::logo::Logo;
use driverio_remote::network::{HostNetwork, NetworkLink};
use driverio_remote::{
    ActionExecutor, ConfigStore, PasscodeGate, PulseActuator, ReachabilityProbe, RemoteContext,
    Settings, TcpProbe,
};

use crate::cli::PulseLine;
use crate::style;

pub fn run_check_config(config_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let store = ConfigStore::new(config_dir);
    let context = RemoteContext::load(&store);
    let config = &context.config;
    println!("{}", style::accent(format!("Config dir: {}", store.dir().display())));
    println!(
        "Driver IO: {}@{}",
        config.remote_user,
        config.remote_ip.as_deref().unwrap_or("<not configured>")
    );
    let gate = PasscodeGate::new(config.passcode.as_deref());
    if gate.is_open() {
        println!(
            "{}",
            style::warning("Passcode: not configured, privileged actions are open to anyone")
        );
    } else {
        println!("Passcode: configured");
    }
    match &context.logo {
        Some(logo) => println!("Logo: {} base64 characters", logo.as_base64().len()),
        None => println!("Logo: none"),
    }
    match store.load_credentials() {
        Ok(credentials) => println!("Network: {}", credentials.ssid),
        Err(err) => println!("{}", style::warning(format!("Network: {err}"))),
    }
    println!("Listen: {}", settings.server.listen);
    match settings.server.read_timeout {
        Some(timeout) => println!("Read timeout: {}ms", timeout.as_millis()),
        None => println!("Read timeout: unbounded"),
    }
    println!(
        "GPIO: {} (boot line {}, run line {})",
        settings.gpio.backend.as_str(),
        settings.gpio.boot_line,
        settings.gpio.run_line
    );
    println!(
        "Probe: port {} timeout {}ms",
        settings.probe.port,
        settings.probe.timeout.as_millis()
    );
    Ok(())
}

pub fn run_probe(config_dir: &Path, settings: &Settings, host: Option<String>) -> anyhow::Result<()> {
    let host = match host {
        Some(host) => host,
        None => ConfigStore::new(config_dir)
            .load()
            .remote_ip
            .map(|ip| ip.to_string())
            .context("DRIVERIO_IP is not configured; pass --host")?,
    };
    let probe = TcpProbe::from_settings(&settings.probe);
    let result = probe.probe(&host);
    println!(
        "Driver IO {host}:{} is {}",
        probe.port(),
        style::reachability(result.reachable)
    );
    Ok(())
}

pub fn run_pulse(settings: &Settings, line: PulseLine) -> anyhow::Result<()> {
    let actuator = PulseActuator::new(backend_from_settings(&settings.gpio));
    let probe = TcpProbe::from_settings(&settings.probe);
    let mut executor =
        ActionExecutor::new(actuator, Box::new(probe)).with_lines(&settings.gpio);
    let spec = match line {
        PulseLine::Boot => executor.boot_pulse(),
        PulseLine::Run => executor.reset_pulse(),
    };
    executor.pulse_line(spec)?;
    println!(
        "{}",
        style::success(format!(
            "Pulsed line {} for {}ms",
            spec.line,
            spec.assert_for.as_millis()
        ))
    );
    Ok(())
}

pub fn run_net_check(config_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    let credentials = ConfigStore::new(config_dir).load_credentials()?;
    println!("SSID: {}", credentials.ssid);
    println!("Password: {}", credentials.masked_password());
    let mut link = HostNetwork::new(&settings.network);
    let ip = link.associate(&credentials, settings.network.timeout)?;
    println!("{}", style::success(format!("Connected, address {ip}")));
    Ok(())
}

pub fn run_encode_logo(image: &Path, out: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(image).with_context(|| format!("reading image {}", image.display()))?;
    let logo = Logo::from_image_bytes(&bytes);
    logo.write(out)?;
    println!(
        "{}",
        style::success(format!(
            "Wrote {} ({} base64 characters)",
            out.display(),
            logo.as_base64().len()
        ))
    );
    Ok(())
}
