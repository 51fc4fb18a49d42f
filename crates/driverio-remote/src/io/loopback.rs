//! Loopback GPIO backend for bench runs and tests.
//!
//! Nothing is driven; every call is recorded in a shared [`PinLog`].

#![allow(missing_docs)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::info;

use crate::error::RemoteError;
use crate::io::GpioBackend;

/// One recorded call on the loopback backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    Configured { line: u32, initial: bool, at: Instant },
    Written { line: u32, value: bool, at: Instant },
}

/// Cloneable handle onto the events recorded by a [`LoopbackBackend`].
#[derive(Debug, Clone, Default)]
pub struct PinLog {
    events: Arc<Mutex<Vec<PinEvent>>>,
}

impl PinLog {
    fn lock(&self) -> MutexGuard<'_, Vec<PinEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, event: PinEvent) {
        self.lock().push(event);
    }

    #[must_use]
    pub fn events(&self) -> Vec<PinEvent> {
        self.lock().clone()
    }

    /// Level writes on `line`, in order, with their timestamps.
    #[must_use]
    pub fn writes(&self, line: u32) -> Vec<(bool, Instant)> {
        self.lock()
            .iter()
            .filter_map(|event| match *event {
                PinEvent::Written { line: l, value, at } if l == line => Some((value, at)),
                _ => None,
            })
            .collect()
    }

    /// Last level written to `line`, if any.
    #[must_use]
    pub fn level(&self, line: u32) -> Option<bool> {
        self.lock().iter().rev().find_map(|event| match *event {
            PinEvent::Configured { line: l, initial, .. } if l == line => Some(initial),
            PinEvent::Written { line: l, value, .. } if l == line => Some(value),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[derive(Debug, Default)]
pub struct LoopbackBackend {
    log: PinLog,
}

impl LoopbackBackend {
    #[must_use]
    pub fn with_log(log: PinLog) -> Self {
        Self { log }
    }
}

impl GpioBackend for LoopbackBackend {
    fn configure_output(&mut self, line: u32, initial: bool) -> Result<(), RemoteError> {
        info!(line, initial, "loopback gpio configured as output");
        self.log.push(PinEvent::Configured {
            line,
            initial,
            at: Instant::now(),
        });
        Ok(())
    }

    fn write(&mut self, line: u32, value: bool) -> Result<(), RemoteError> {
        info!(line, value, "loopback gpio write");
        self.log.push(PinEvent::Written {
            line,
            value,
            at: Instant::now(),
        });
        Ok(())
    }
}
