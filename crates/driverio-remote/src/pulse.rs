//! Timed pulses on output lines.
//!
//! A pulse drives a line high, sleeps for the assert duration, then drives
//! it low. The calling thread is blocked for the whole pulse. Pulses take
//! `&mut self`, so two pulses can never overlap on one actuator.

use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

use tracing::{error, info};

use crate::error::RemoteError;
use crate::io::GpioBackend;

/// Which line to pulse and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseSpec {
    /// Output line number.
    pub line: u32,
    /// How long the line stays high.
    pub assert_for: Duration,
}

impl PulseSpec {
    /// BOOT line: held 1.0 s to force bootloader recovery.
    pub const BOOT: Self = Self {
        line: 8,
        assert_for: Duration::from_millis(1000),
    };

    /// RUN line: held 0.3 s to trigger a hardware reset.
    pub const RESET: Self = Self {
        line: 9,
        assert_for: Duration::from_millis(300),
    };

    /// Same duration on a different line.
    #[must_use]
    pub const fn on_line(self, line: u32) -> Self {
        Self {
            line,
            assert_for: self.assert_for,
        }
    }
}

/// Drives pulses through a GPIO backend.
pub struct PulseActuator {
    backend: Box<dyn GpioBackend>,
    configured: BTreeSet<u32>,
}

impl std::fmt::Debug for PulseActuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PulseActuator")
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

impl PulseActuator {
    /// Lines are switched to output on first use.
    #[must_use]
    pub fn new(backend: Box<dyn GpioBackend>) -> Self {
        Self {
            backend,
            configured: BTreeSet::new(),
        }
    }

    /// Assert `spec.line`, hold for `spec.assert_for`, then release it.
    ///
    /// The line is released before returning on every path that asserted
    /// it. A failed release is returned as an error.
    pub fn pulse(&mut self, spec: PulseSpec) -> Result<(), RemoteError> {
        self.ensure_output(spec.line)?;

        let asserted = self.backend.write(spec.line, true);
        if asserted.is_ok() {
            info!(
                line = spec.line,
                duration_ms = u64::try_from(spec.assert_for.as_millis()).unwrap_or(u64::MAX),
                "pulse asserted"
            );
            thread::sleep(spec.assert_for);
        }
        let released = self.backend.write(spec.line, false);
        if let Err(err) = &released {
            error!(line = spec.line, %err, "failed to release line after pulse");
        }
        asserted?;
        released?;
        info!(line = spec.line, "pulse released");
        Ok(())
    }

    fn ensure_output(&mut self, line: u32) -> Result<(), RemoteError> {
        if self.configured.contains(&line) {
            return Ok(());
        }
        self.backend.configure_output(line, false)?;
        self.configured.insert(line);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{LoopbackBackend, PinEvent, PinLog};
    use std::time::Instant;

    const SHORT: PulseSpec = PulseSpec {
        line: 3,
        assert_for: Duration::from_millis(20),
    };

    #[test]
    fn well_known_pulses() {
        assert_eq!(PulseSpec::BOOT.line, 8);
        assert_eq!(PulseSpec::BOOT.assert_for, Duration::from_secs(1));
        assert_eq!(PulseSpec::RESET.line, 9);
        assert_eq!(PulseSpec::RESET.assert_for, Duration::from_millis(300));
        assert_eq!(PulseSpec::BOOT.on_line(17).assert_for, Duration::from_secs(1));
    }

    #[test]
    fn pulse_configures_once_and_ends_low() {
        let log = PinLog::default();
        let mut actuator = PulseActuator::new(Box::new(LoopbackBackend::with_log(log.clone())));

        let started = Instant::now();
        actuator.pulse(SHORT).expect("pulse");
        actuator.pulse(SHORT).expect("pulse");
        assert!(started.elapsed() >= Duration::from_millis(40));

        let configured = log
            .events()
            .iter()
            .filter(|event| matches!(event, PinEvent::Configured { .. }))
            .count();
        assert_eq!(configured, 1);
        let levels: Vec<bool> = log.writes(3).into_iter().map(|(value, _)| value).collect();
        assert_eq!(levels, vec![true, false, true, false]);
        assert_eq!(log.level(3), Some(false));
    }

    #[test]
    fn line_is_held_for_the_assert_duration() {
        let log = PinLog::default();
        let mut actuator = PulseActuator::new(Box::new(LoopbackBackend::with_log(log.clone())));
        actuator.pulse(SHORT).expect("pulse");

        let writes = log.writes(3);
        let held = writes[1].1.duration_since(writes[0].1);
        assert!(held >= SHORT.assert_for, "held {held:?}");
    }

    struct FailingHigh {
        inner: LoopbackBackend,
    }

    impl GpioBackend for FailingHigh {
        fn configure_output(&mut self, line: u32, initial: bool) -> Result<(), RemoteError> {
            self.inner.configure_output(line, initial)
        }

        fn write(&mut self, line: u32, value: bool) -> Result<(), RemoteError> {
            if value {
                return Err(RemoteError::IoDriver("stuck".into()));
            }
            self.inner.write(line, value)
        }
    }

    #[test]
    fn failed_assert_still_releases_line() {
        let log = PinLog::default();
        let backend = FailingHigh {
            inner: LoopbackBackend::with_log(log.clone()),
        };
        let mut actuator = PulseActuator::new(Box::new(backend));

        let started = Instant::now();
        let err = actuator.pulse(PulseSpec::BOOT.on_line(4)).unwrap_err();
        assert!(matches!(err, RemoteError::IoDriver(_)));
        assert!(started.elapsed() < Duration::from_millis(500));
        assert_eq!(log.level(4), Some(false));
    }
}
