//! Local session state.
//!
//! [`Session`] owns everything the presentation layer shows: connectivity,
//! the device-derived snapshots, favorites, the last search and the current
//! error. All mutation goes through the narrow methods below.
//!
//! Polls and commands complete out of order (background polls after a PLAY
//! overlap with user-triggered fetches), so every device read takes a
//! [`Ticket`] before it is issued. A result is applied only if its ticket is
//! newer than the last applied ticket of the same kind and was issued after
//! the most recent connect/disconnect.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::device::{
    ContentItem, DeviceAddress, DeviceInfo, PlaybackStatus, PresetSlots, VolumeReading,
    VolumeState,
};
use crate::directory::StationResult;
use crate::protocol_constants::{DEVICE_ADDRESS_KEY, FAVORITES_KEY};
use crate::session::store::{KeyValueStore, StoreResult};
use crate::utils::now_millis;

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A station the user bookmarked locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    /// Creation time in Unix milliseconds; unique and strictly increasing.
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl FavoriteEntry {
    /// Content item to select when playing this favorite.
    pub fn item(&self) -> ContentItem {
        ContentItem {
            source: self.source.clone(),
            location: self.location.clone(),
            name: Some(self.name.clone()),
        }
    }
}

/// Kinds of device-derived snapshots guarded by tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    NowPlaying,
    Volume,
    Presets,
}

impl SnapshotKind {
    fn index(self) -> usize {
        match self {
            Self::NowPlaying => 0,
            Self::Volume => 1,
            Self::Presets => 2,
        }
    }
}

/// Sequence number taken before a device read is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    kind: SnapshotKind,
    seq: u64,
}

/// Point-in-time copy of the session, for rendering.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Current (or last remembered) device address.
    pub address: Option<DeviceAddress>,
    pub connected: bool,
    pub device: Option<DeviceInfo>,
    pub now_playing: Option<PlaybackStatus>,
    pub volume: VolumeState,
    pub presets: PresetSlots,
    pub favorites: Vec<FavoriteEntry>,
    /// Results of the last search. Never persisted.
    pub search_results: Vec<StationResult>,
    /// User-facing message of the last failed operation.
    pub last_error: Option<String>,
}

struct SessionInner {
    snapshot: SessionSnapshot,
    next_seq: u64,
    /// Tickets below this were issued before the last connect/disconnect.
    floor: u64,
    applied: [u64; 3],
}

impl SessionInner {
    fn accepts(&self, ticket: Ticket) -> bool {
        ticket.seq >= self.floor && ticket.seq > self.applied[ticket.kind.index()]
    }

    fn take(&mut self, kind: SnapshotKind) -> Ticket {
        self.next_seq += 1;
        Ticket {
            kind,
            seq: self.next_seq,
        }
    }

    fn invalidate_tickets(&mut self) {
        self.floor = self.next_seq + 1;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Shared session state, persisted through a [`KeyValueStore`].
pub struct Session {
    inner: RwLock<SessionInner>,
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    /// Creates a session, restoring the remembered address and favorites.
    ///
    /// Unreadable persisted values are ignored.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let address = match store.get(DEVICE_ADDRESS_KEY) {
            Ok(Some(value)) => value.as_str().and_then(DeviceAddress::parse),
            Ok(None) => None,
            Err(e) => {
                log::warn!("[Session] Failed to load saved address: {}", e);
                None
            }
        };

        let favorites = match store.get(FAVORITES_KEY) {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("[Session] Ignoring unreadable favorites: {}", e);
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("[Session] Failed to load favorites: {}", e);
                Vec::new()
            }
        };

        log::debug!(
            "[Session] Restored address={:?}, {} favorite(s)",
            address.as_ref().map(DeviceAddress::as_str),
            favorites.len()
        );

        Self {
            inner: RwLock::new(SessionInner {
                snapshot: SessionSnapshot {
                    address,
                    favorites,
                    ..Default::default()
                },
                next_seq: 0,
                floor: 0,
                applied: [0; 3],
            }),
            store,
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.read().snapshot.clone()
    }

    /// Current or remembered address, whether or not connected.
    pub fn address(&self) -> Option<DeviceAddress> {
        self.inner.read().snapshot.address.clone()
    }

    /// Address of the connected device; `None` while disconnected.
    pub fn connected_address(&self) -> Option<DeviceAddress> {
        let inner = self.inner.read();
        inner
            .snapshot
            .connected
            .then(|| inner.snapshot.address.clone())
            .flatten()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.read().snapshot.connected
    }

    pub fn volume(&self) -> VolumeState {
        self.inner.read().snapshot.volume
    }

    pub fn now_playing(&self) -> Option<PlaybackStatus> {
        self.inner.read().snapshot.now_playing.clone()
    }

    pub fn presets(&self) -> PresetSlots {
        self.inner.read().snapshot.presets.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().snapshot.last_error.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connectivity
    // ─────────────────────────────────────────────────────────────────────────

    /// Marks the session connected to `address` and remembers the address.
    ///
    /// In-memory state is updated even if persisting the address fails.
    pub fn mark_connected(&self, address: DeviceAddress, device: DeviceInfo) -> StoreResult<()> {
        {
            let mut inner = self.inner.write();
            inner.invalidate_tickets();
            inner.snapshot.address = Some(address.clone());
            inner.snapshot.connected = true;
            inner.snapshot.device = Some(device);
        }
        log::info!("[Session] Connected to {}", address);
        self.store.set(DEVICE_ADDRESS_KEY, json!(address.as_str()))
    }

    /// Marks the session disconnected.
    ///
    /// Device-derived snapshots reset and outstanding tickets are invalidated.
    /// Favorites and the remembered address are kept.
    pub fn mark_disconnected(&self) {
        let mut inner = self.inner.write();
        inner.invalidate_tickets();
        let snapshot = &mut inner.snapshot;
        snapshot.connected = false;
        snapshot.device = None;
        snapshot.now_playing = None;
        snapshot.volume = VolumeState::default();
        snapshot.presets = PresetSlots::default();
        log::info!("[Session] Disconnected");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Takes a ticket for a read of `kind` about to be issued.
    pub fn issue_ticket(&self, kind: SnapshotKind) -> Ticket {
        self.inner.write().take(kind)
    }

    /// Applies a now-playing result. Returns false if the ticket is stale.
    pub fn apply_now_playing(&self, ticket: Ticket, status: PlaybackStatus) -> bool {
        let mut inner = self.inner.write();
        if !inner.accepts(ticket) {
            log::debug!("[Session] Dropping stale now-playing result");
            return false;
        }
        inner.applied[ticket.kind.index()] = ticket.seq;
        inner.snapshot.now_playing = Some(status);
        true
    }

    /// Applies a volume reading. An absent level keeps the previous one.
    ///
    /// Returns the new state, or `None` if the ticket is stale.
    pub fn apply_volume(&self, ticket: Ticket, reading: VolumeReading) -> Option<VolumeState> {
        let mut inner = self.inner.write();
        if !inner.accepts(ticket) {
            log::debug!("[Session] Dropping stale volume result");
            return None;
        }
        inner.applied[ticket.kind.index()] = ticket.seq;
        let volume = &mut inner.snapshot.volume;
        if let Some(level) = reading.level {
            volume.level = level.min(100);
        }
        volume.muted = reading.muted;
        Some(*volume)
    }

    /// Applies a presets result. Returns false if the ticket is stale.
    pub fn apply_presets(&self, ticket: Ticket, presets: PresetSlots) -> bool {
        let mut inner = self.inner.write();
        if !inner.accepts(ticket) {
            log::debug!("[Session] Dropping stale presets result");
            return false;
        }
        inner.applied[ticket.kind.index()] = ticket.seq;
        inner.snapshot.presets = presets;
        true
    }

    /// Sets the volume level after a successful write.
    ///
    /// Supersedes any volume read still in flight.
    pub fn set_volume_level(&self, level: u8) -> VolumeState {
        let mut inner = self.inner.write();
        let ticket = inner.take(SnapshotKind::Volume);
        inner.applied[ticket.kind.index()] = ticket.seq;
        inner.snapshot.volume.level = level.min(100);
        inner.snapshot.volume
    }

    /// Sets the mute flag after a successful write.
    ///
    /// Supersedes any volume read still in flight.
    pub fn set_muted(&self, muted: bool) -> VolumeState {
        let mut inner = self.inner.write();
        let ticket = inner.take(SnapshotKind::Volume);
        inner.applied[ticket.kind.index()] = ticket.seq;
        inner.snapshot.volume.muted = muted;
        inner.snapshot.volume
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Favorites
    // ─────────────────────────────────────────────────────────────────────────

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.inner.read().snapshot.favorites.clone()
    }

    pub fn find_favorite(&self, id: u64) -> Option<FavoriteEntry> {
        self.inner
            .read()
            .snapshot
            .favorites
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }

    /// Bookmarks the given now-playing status.
    ///
    /// The entry is named after [`PlaybackStatus::display_name`]. Returns
    /// `Ok(None)` if nothing is playing. The list is only updated once the
    /// store accepted it.
    pub fn add_favorite(
        &self,
        status: Option<&PlaybackStatus>,
    ) -> StoreResult<Option<FavoriteEntry>> {
        let Some(status) = status else {
            return Ok(None);
        };

        let mut inner = self.inner.write();
        let last_id = inner.snapshot.favorites.iter().map(|f| f.id).max();
        let id = match last_id {
            Some(last) => now_millis().max(last + 1),
            None => now_millis(),
        };

        let entry = FavoriteEntry {
            id,
            name: status.display_name().to_string(),
            track: status.display_track().map(str::to_string),
            artist: status.artist.clone(),
            source: status.item.source.clone(),
            location: status.item.location.clone(),
        };
        let mut favorites = inner.snapshot.favorites.clone();
        favorites.push(entry.clone());

        self.persist_favorites(&favorites)?;
        inner.snapshot.favorites = favorites;
        log::info!("[Session] Added favorite {} ({})", entry.id, entry.name);
        Ok(Some(entry))
    }

    /// Removes the favorite with `id`. Returns false if there was none.
    ///
    /// The list is only updated once the store accepted it.
    pub fn remove_favorite(&self, id: u64) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        if !inner.snapshot.favorites.iter().any(|f| f.id == id) {
            return Ok(false);
        }
        let favorites: Vec<FavoriteEntry> = inner
            .snapshot
            .favorites
            .iter()
            .filter(|f| f.id != id)
            .cloned()
            .collect();

        self.persist_favorites(&favorites)?;
        inner.snapshot.favorites = favorites;
        log::info!("[Session] Removed favorite {}", id);
        Ok(true)
    }

    fn persist_favorites(&self, favorites: &[FavoriteEntry]) -> StoreResult<()> {
        self.store
            .set(FAVORITES_KEY, serde_json::to_value(favorites)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Errors & Search
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.write().snapshot.last_error = Some(message.into());
    }

    pub fn clear_error(&self) {
        self.inner.write().snapshot.last_error = None;
    }

    pub fn set_search_results(&self, results: Vec<StationResult>) {
        self.inner.write().snapshot.search_results = results;
    }

    pub fn search_results(&self) -> Vec<StationResult> {
        self.inner.read().snapshot.search_results.clone()
    }
}
