//! GPIO backends for the BOOT and RUN lines.

use std::path::PathBuf;

mod gpio;
mod loopback;
pub use gpio::SysfsBackend;
pub use loopback::{LoopbackBackend, PinEvent, PinLog};

use crate::error::RemoteError;
use crate::settings::{GpioBackendKind, GpioSettings};

/// Digital output lines driven by the pulse actuator.
pub trait GpioBackend: Send {
    /// Put `line` into output mode and drive it to `initial`.
    fn configure_output(&mut self, line: u32, initial: bool) -> Result<(), RemoteError>;

    /// Drive `line` high (`true`) or low (`false`).
    fn write(&mut self, line: u32, value: bool) -> Result<(), RemoteError>;
}

/// Build the backend selected by settings.
#[must_use]
pub fn backend_from_settings(settings: &GpioSettings) -> Box<dyn GpioBackend> {
    match settings.backend {
        GpioBackendKind::Sysfs => Box::new(SysfsBackend::new(PathBuf::from(
            settings.sysfs_base.as_str(),
        ))),
        GpioBackendKind::Loopback => Box::new(LoopbackBackend::default()),
    }
}
