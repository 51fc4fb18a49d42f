//! Linux sysfs GPIO backend.

#![allow(missing_docs)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use tracing::debug;

use crate::error::RemoteError;
use crate::io::GpioBackend;

/// Drives lines through `<base>/gpio<N>/{direction,value}`.
#[derive(Debug)]
pub struct SysfsBackend {
    base: PathBuf,
}

impl SysfsBackend {
    #[must_use]
    pub fn new(base: PathBuf) -> Self {
        Self { base }
    }

    fn line_dir(&self, line: u32) -> PathBuf {
        self.base.join(format!("gpio{line}"))
    }

    fn ensure_exported(&self, line: u32) -> Result<(), RemoteError> {
        if self.line_dir(line).exists() {
            return Ok(());
        }
        debug!(line, base = %self.base.display(), "exporting line");
        let export = self.base.join("export");
        fs::write(&export, line.to_string()).map_err(|err| driver_error("export", &export, &err))
    }

    /// Sysfs attributes already exist; never create them.
    fn set_attr(&self, line: u32, attr: &str, value: &str) -> Result<(), RemoteError> {
        let path = self.line_dir(line).join(attr);
        fs::OpenOptions::new()
            .write(true)
            .open(&path)
            .and_then(|mut file| file.write_all(value.as_bytes()))
            .map_err(|err| driver_error("write", &path, &err))
    }
}

fn driver_error(op: &str, path: &Path, err: &std::io::Error) -> RemoteError {
    RemoteError::IoDriver(SmolStr::new(format!("gpio {op} {} failed: {err}", path.display())))
}

impl GpioBackend for SysfsBackend {
    fn configure_output(&mut self, line: u32, initial: bool) -> Result<(), RemoteError> {
        self.ensure_exported(line)?;
        self.set_attr(line, "direction", "out")?;
        self.write(line, initial)
    }

    fn write(&mut self, line: u32, value: bool) -> Result<(), RemoteError> {
        self.set_attr(line, "value", if value { "1" } else { "0" })
    }
}
