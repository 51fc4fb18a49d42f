//! Action execution.
//!
//! The executor is the only component that touches output lines or opens
//! connections to the Driver IO board.

#![allow(missing_docs)]

use smol_str::SmolStr;
use tracing::{info, warn};

use crate::config::DriverIoConfig;
use crate::error::RemoteError;
use crate::probe::ReachabilityProbe;
use crate::pulse::{PulseActuator, PulseSpec};
use crate::router::Action;
use crate::settings::GpioSettings;

/// Why an action did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeFailure {
    /// Status requested but no `DRIVERIO_IP` is configured.
    StatusNotConfigured,
    /// The board did not accept a connection in time.
    Unreachable,
    /// The GPIO backend failed during a pulse.
    Pin(SmolStr),
}

/// Result of executing one action, handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub action: Action,
    pub succeeded: bool,
    /// Set whenever `succeeded` is false, except for refused requests.
    pub failure: Option<OutcomeFailure>,
}

impl ActionOutcome {
    #[must_use]
    pub fn success(action: Action) -> Self {
        Self {
            action,
            succeeded: true,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(action: Action, failure: OutcomeFailure) -> Self {
        Self {
            action,
            succeeded: false,
            failure: Some(failure),
        }
    }

    #[must_use]
    pub fn unauthorized() -> Self {
        Self {
            action: Action::Unauthorized,
            succeeded: false,
            failure: None,
        }
    }
}

/// Runs actions against the pulse actuator and reachability probe.
pub struct ActionExecutor {
    actuator: PulseActuator,
    probe: Box<dyn ReachabilityProbe>,
    boot: PulseSpec,
    reset: PulseSpec,
}

impl std::fmt::Debug for ActionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionExecutor")
            .field("actuator", &self.actuator)
            .field("boot", &self.boot)
            .field("reset", &self.reset)
            .finish_non_exhaustive()
    }
}

impl ActionExecutor {
    /// Executor using the well-known BOOT and RESET pulses.
    #[must_use]
    pub fn new(actuator: PulseActuator, probe: Box<dyn ReachabilityProbe>) -> Self {
        Self {
            actuator,
            probe,
            boot: PulseSpec::BOOT,
            reset: PulseSpec::RESET,
        }
    }

    /// Move the BOOT and RUN pulses to the lines named in settings.
    #[must_use]
    pub fn with_lines(mut self, gpio: &GpioSettings) -> Self {
        self.boot = PulseSpec::BOOT.on_line(gpio.boot_line);
        self.reset = PulseSpec::RESET.on_line(gpio.run_line);
        self
    }

    #[must_use]
    pub fn boot_pulse(&self) -> PulseSpec {
        self.boot
    }

    #[must_use]
    pub fn reset_pulse(&self) -> PulseSpec {
        self.reset
    }

    /// Execute `action`. Privileged actions do nothing unless `gate_passed`.
    pub fn execute(
        &mut self,
        action: Action,
        gate_passed: bool,
        config: &DriverIoConfig,
    ) -> ActionOutcome {
        if action.is_privileged() && !gate_passed {
            info!(%action, "refused, no command executed");
            return ActionOutcome::unauthorized();
        }
        match action {
            Action::Boot => self.pulse(action, self.boot),
            Action::Reboot => self.pulse(action, self.reset),
            Action::Status => self.status(config),
            Action::Dashboard | Action::Unauthorized | Action::NotFound => {
                ActionOutcome::success(action)
            }
        }
    }

    /// Pulse a line directly, outside the request pipeline.
    pub fn pulse_line(&mut self, spec: PulseSpec) -> Result<(), RemoteError> {
        self.actuator.pulse(spec)
    }

    fn pulse(&mut self, action: Action, spec: PulseSpec) -> ActionOutcome {
        info!(%action, line = spec.line, "command received");
        match self.actuator.pulse(spec) {
            Ok(()) => ActionOutcome::success(action),
            Err(err) => {
                warn!(%action, %err, "pulse failed");
                ActionOutcome::failed(action, OutcomeFailure::Pin(SmolStr::new(err.to_string())))
            }
        }
    }

    fn status(&mut self, config: &DriverIoConfig) -> ActionOutcome {
        let Some(host) = config.remote_ip.as_deref() else {
            warn!("status check unavailable: DRIVERIO_IP not configured");
            return ActionOutcome::failed(Action::Status, OutcomeFailure::StatusNotConfigured);
        };
        if self.probe.probe(host).reachable {
            ActionOutcome::success(Action::Status)
        } else {
            ActionOutcome::failed(Action::Status, OutcomeFailure::Unreachable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{LoopbackBackend, PinLog};
    use crate::probe::ProbeResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProbe {
        reachable: bool,
        calls: Arc<AtomicUsize>,
    }

    impl ReachabilityProbe for CountingProbe {
        fn probe(&self, _host: &str) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ProbeResult {
                reachable: self.reachable,
            }
        }
    }

    fn executor(reachable: bool) -> (ActionExecutor, PinLog, Arc<AtomicUsize>) {
        let log = PinLog::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let actuator = PulseActuator::new(Box::new(LoopbackBackend::with_log(log.clone())));
        let probe = CountingProbe {
            reachable,
            calls: calls.clone(),
        };
        (ActionExecutor::new(actuator, Box::new(probe)), log, calls)
    }

    fn config_with_ip() -> DriverIoConfig {
        DriverIoConfig {
            remote_ip: Some("192.0.2.10".into()),
            ..DriverIoConfig::default()
        }
    }

    #[test]
    fn refused_actions_touch_nothing() {
        let (mut executor, log, calls) = executor(true);
        for action in [Action::Boot, Action::Reboot, Action::Status] {
            let outcome = executor.execute(action, false, &config_with_ip());
            assert_eq!(outcome, ActionOutcome::unauthorized());
        }
        assert!(log.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reboot_pulses_run_line() {
        let (mut executor, log, calls) = executor(true);
        let outcome = executor.execute(Action::Reboot, true, &DriverIoConfig::default());
        assert_eq!(outcome, ActionOutcome::success(Action::Reboot));
        let writes = log.writes(9);
        assert_eq!(writes.len(), 2);
        assert!(writes[1].1.duration_since(writes[0].1) >= PulseSpec::RESET.assert_for);
        assert!(log.writes(8).is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn status_follows_probe() {
        let (mut online, log, calls) = executor(true);
        assert!(online.execute(Action::Status, true, &config_with_ip()).succeeded);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(log.is_empty());

        let (mut offline, _, _) = executor(false);
        assert_eq!(
            offline.execute(Action::Status, true, &config_with_ip()),
            ActionOutcome::failed(Action::Status, OutcomeFailure::Unreachable)
        );
    }

    #[test]
    fn status_without_ip_is_not_configured() {
        let (mut executor, _, calls) = executor(true);
        let outcome = executor.execute(Action::Status, true, &DriverIoConfig::default());
        assert_eq!(
            outcome,
            ActionOutcome::failed(Action::Status, OutcomeFailure::StatusNotConfigured)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dashboard_and_not_found_pass_through() {
        let (mut executor, log, calls) = executor(true);
        for action in [Action::Dashboard, Action::NotFound] {
            for gate in [true, false] {
                let outcome = executor.execute(action, gate, &config_with_ip());
                assert_eq!(outcome.action, action);
            }
        }
        assert!(log.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lines_follow_settings() {
        let gpio = GpioSettings {
            backend: crate::settings::GpioBackendKind::Loopback,
            sysfs_base: "/sys/class/gpio".into(),
            boot_line: 17,
            run_line: 27,
        };
        let (executor, _, _) = executor(true);
        let executor = executor.with_lines(&gpio);
        assert_eq!(executor.boot_pulse(), PulseSpec::BOOT.on_line(17));
        assert_eq!(executor.reset_pulse().line, 27);
    }

    #[test]
    fn direct_pulse_skips_gate_and_probe() {
        let gpio = GpioSettings {
            backend: crate::settings::GpioBackendKind::Loopback,
            sysfs_base: "/sys/class/gpio".into(),
            boot_line: 5,
            run_line: 6,
        };
        let (executor, log, calls) = executor(true);
        let mut executor = executor.with_lines(&gpio);
        let spec = executor.reset_pulse();
        executor.pulse_line(spec).expect("pulse");
        assert_eq!(log.writes(6).len(), 2);
        assert_eq!(log.level(6), Some(false));
        assert!(log.writes(9).is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
