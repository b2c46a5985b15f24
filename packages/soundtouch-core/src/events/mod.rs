//! Session events for presentation layers.
//!
//! This module provides:
//! - [`EventEmitter`] trait the controller emits through
//! - [`SessionEvent`], one variant per observable state change
//!
//! Each event carries the new value, so a consumer never has to read the
//! session back to render a change.

mod emitter;

pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

use crate::device::{DeviceInfo, PlaybackStatus, PresetSlots, VolumeState};
use crate::directory::StationResult;
use crate::session::FavoriteEntry;

/// State changes of the local session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Connected to a device.
    Connected {
        /// Address the session is connected to.
        address: String,
        /// Identity reported by the device.
        device: DeviceInfo,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// Disconnected from the device; device-derived state was reset.
    Disconnected {
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// A newer now-playing snapshot was applied.
    NowPlayingChanged {
        status: PlaybackStatus,
        timestamp: u64,
    },
    /// Volume level or mute flag changed.
    VolumeChanged {
        volume: VolumeState,
        timestamp: u64,
    },
    /// Preset slots were refreshed.
    PresetsChanged {
        presets: PresetSlots,
        timestamp: u64,
    },
    /// Favorites list changed (added or removed).
    FavoritesChanged {
        favorites: Vec<FavoriteEntry>,
        timestamp: u64,
    },
    /// A directory search completed.
    SearchResults {
        query: String,
        results: Vec<StationResult>,
        timestamp: u64,
    },
    /// An operation failed; `message` is user-facing.
    Error {
        code: String,
        message: String,
        timestamp: u64,
    },
}
