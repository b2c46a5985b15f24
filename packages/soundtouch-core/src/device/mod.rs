//! SoundTouch speaker control.
//!
//! This module talks to a speaker's HTTP/XML control API on port 8090,
//! either directly or through the relay.
//!
//! # Module Structure
//!
//! - `types` - Domain types (address, content items, presets, keys)
//! - `xml` - Lenient XML tree used by the parsers
//! - `parser` - Read-response parsers (`/info`, `/volume`, `/now_playing`, `/presets`)
//! - `commands` - Write-body builders (`/key`, `/volume`, `/select`, `/preset`)
//! - `http` - Low-level HTTP requests to the control port
//! - `transport` - [`DeviceTransport`] trait with relay and direct implementations
//! - `controller` - [`DeviceController`], the logical operations

pub mod commands;
pub mod controller;
pub mod http;
pub mod parser;
pub mod transport;
pub mod types;
pub(crate) mod xml;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export domain types
pub use types::{
    ContentItem, DeviceAddress, DeviceInfo, DeviceKey, KeyState, PlaybackStatus, Preset,
    PresetSlots, VolumeReading, VolumeState,
};

// Re-export transport layer
pub use http::{DeviceError, DeviceHttp, DeviceResult, UpstreamResponse};
pub use transport::{DeviceTransport, DirectTransport, RelayTransport, WriteResponse};

pub use controller::DeviceController;
