//! SoundTouch Core - shared library for the SoundTouch relay and remote.
//!
//! This crate provides everything needed to control a Bose SoundTouch speaker
//! over its HTTP/XML API from environments that cannot reach the speaker
//! directly. It is used by both the standalone relay server and the
//! command-line remote.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`api`]: Relay HTTP server (device forwarding and directory search)
//! - [`device`]: Speaker XML protocol, transports and the [`DeviceController`]
//! - [`directory`]: Station search against TuneIn and Radio-Browser
//! - [`session`]: Connected-device state, favorites and persistence
//! - [`events`]: Session change notifications
//! - [`config`]: Relay and client configuration
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! The crate defines several traits to decouple core logic from the
//! environment it runs in:
//!
//! - [`DeviceTransport`](device::DeviceTransport): Direct or relayed device access
//! - [`StationDirectory`](directory::StationDirectory): Station search providers
//! - [`KeyValueStore`](session::KeyValueStore): Durable client settings
//! - [`EventEmitter`](events::EventEmitter): Emitting session events
//!
//! Each trait has default implementations suitable for the relay and the CLI.

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod device;
pub mod directory;
pub mod error;
pub mod events;
pub mod protocol_constants;
pub mod session;
pub mod utils;

// Re-export commonly used types at the crate root
pub use config::{Config, DirectoryProvider};
pub use error::{ControlError, ControlResult, ErrorCode, RelayError, RelayResult};
pub use events::{EventEmitter, LoggingEventEmitter, NoopEventEmitter, SessionEvent};
pub use utils::{escape_xml, normalize_location, now_millis};

// Re-export device types
pub use device::{
    ContentItem, DeviceAddress, DeviceController, DeviceError, DeviceHttp, DeviceInfo, DeviceKey,
    DeviceTransport, DirectTransport, PlaybackStatus, Preset, PresetSlots, RelayTransport,
    VolumeState,
};

// Re-export directory types
pub use directory::{build_directory, RelayDirectory, StationDirectory, StationResult};

// Re-export session types
pub use session::{FavoriteEntry, JsonFileStore, KeyValueStore, MemoryStore, Session};

// Re-export API types
pub use api::http::create_router;
pub use api::{start_server, AppState, ServerError};
