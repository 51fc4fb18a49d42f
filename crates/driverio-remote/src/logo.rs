//! Optional dashboard logo stored as base64 text.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::{info, warn};

use crate::error::RemoteError;

/// Base64 image payload, without any `data:` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    base64: String,
}

impl Logo {
    /// Parse logo file contents: raw base64, or a full `data:` URI whose
    /// prefix up to the first comma is stripped. Returns `None` for empty
    /// content or content that does not decode.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut data = text.trim();
        if data.starts_with("data:") {
            if let Some(comma) = data.find(',') {
                data = &data[comma + 1..];
            }
        }
        let data: String = data.split_whitespace().collect();
        if data.is_empty() {
            return None;
        }
        if let Err(err) = STANDARD.decode(&data) {
            warn!(%err, "logo is not valid base64, ignoring");
            return None;
        }
        Some(Self { base64: data })
    }

    /// Load the logo file; a missing, empty or malformed file yields `None`.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let logo = Self::parse(&text);
                match &logo {
                    Some(logo) => info!(len = logo.base64.len(), "loaded logo"),
                    None => warn!(path = %path.display(), "logo file empty or invalid"),
                }
                logo
            }
            Err(err) => {
                info!(path = %path.display(), %err, "no logo loaded");
                None
            }
        }
    }

    /// Encode raw image bytes.
    #[must_use]
    pub fn from_image_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
        }
    }

    /// Base64 text for an inline `data:image/png;base64,` source.
    #[must_use]
    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    /// Write the logo file format read back by [`Logo::load`].
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), RemoteError> {
        let path = path.as_ref();
        std::fs::write(path, format!("{}\n", self.base64)).map_err(|err| {
            RemoteError::InvalidConfig(format!("write {}: {err}", path.display()).into())
        })
    }
}
