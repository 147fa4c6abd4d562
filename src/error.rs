//! Error types for the HID link crate.
//!
//! Arbitration entry points are infallible by design: connect and
//! disconnect requests are fire-and-forget and their outcomes arrive as
//! later callbacks. The errors here cover configuration I/O and
//! identifier parsing.

use thiserror::Error;

/// Main error type for the HID link crate.
#[derive(Error, Debug)]
pub enum HidLinkError {
   #[error("I/O error: {0}")]
   Io(#[from] std::io::Error),

   #[error("invalid device id: {0}")]
   InvalidDeviceId(String),

   #[error("could not determine config directory")]
   ConfigDirNotFound,

   #[error("TOML parsing error: {0}")]
   TomlParse(#[from] toml::de::Error),

   #[error("TOML serialization error: {0}")]
   TomlSerialize(#[from] toml::ser::Error),
}

/// Convenience type alias for Results with `HidLinkError`.
pub type Result<T> = std::result::Result<T, HidLinkError>;
