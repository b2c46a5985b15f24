//! Logical speaker operations.
//!
//! [`DeviceController`] sequences transport calls into the operations a
//! remote offers (connect, keys, volume, presets, station playback,
//! favorites, search), parses the device's XML answers into the
//! [`Session`], and reports every state change through an [`EventEmitter`].
//!
//! Failures never panic and are never retried: each becomes a
//! [`ControlError`] that is recorded as the session's current error,
//! emitted, and returned.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::device::commands::{
    key_body, mute_body, select_body, store_preset_body, volume_body,
};
use crate::device::http::DeviceResult;
use crate::device::parser::{parse_device_info, parse_now_playing, parse_presets, parse_volume};
use crate::device::transport::DeviceTransport;
use crate::device::types::{
    ContentItem, DeviceAddress, DeviceInfo, DeviceKey, KeyState, PlaybackStatus, PresetSlots,
    VolumeState,
};
use crate::directory::{StationDirectory, StationResult};
use crate::error::{ControlError, ControlResult, ErrorCode};
use crate::events::{EventEmitter, SessionEvent};
use crate::protocol_constants::{
    INFO_PATH, KEY_PATH, KEY_RELEASE_DELAY_MS, NOW_PLAYING_PATH, PLAY_POLL_DELAYS_MS,
    PRESETS_PATH, PRESET_POLL_DELAY_MS, SELECT_PATH, SELECT_SETTLE_DELAY_MS, STORE_PRESET_PATH,
    VOLUME_PATH,
};
use crate::session::{FavoriteEntry, Session, SnapshotKind};
use crate::utils::{normalize_location, now_millis};

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Refresh
// ─────────────────────────────────────────────────────────────────────────────

/// Handles shared with background poll tasks.
#[derive(Clone)]
struct Shared {
    transport: Arc<dyn DeviceTransport>,
    session: Arc<Session>,
    emitter: Arc<dyn EventEmitter>,
}

impl Shared {
    async fn refresh_now_playing(&self, address: &DeviceAddress) -> DeviceResult<()> {
        let ticket = self.session.issue_ticket(SnapshotKind::NowPlaying);
        let xml = self.transport.read(address, NOW_PLAYING_PATH).await?;
        let status = parse_now_playing(&xml);

        if self.session.apply_now_playing(ticket, status.clone()) {
            self.emitter.emit(SessionEvent::NowPlayingChanged {
                status,
                timestamp: now_millis(),
            });
        }
        Ok(())
    }

    async fn refresh_volume(&self, address: &DeviceAddress) -> DeviceResult<()> {
        let ticket = self.session.issue_ticket(SnapshotKind::Volume);
        let xml = self.transport.read(address, VOLUME_PATH).await?;

        if let Some(volume) = self.session.apply_volume(ticket, parse_volume(&xml)) {
            self.emitter.emit(SessionEvent::VolumeChanged {
                volume,
                timestamp: now_millis(),
            });
        }
        Ok(())
    }

    async fn refresh_presets(&self, address: &DeviceAddress) -> DeviceResult<()> {
        let ticket = self.session.issue_ticket(SnapshotKind::Presets);
        let xml = self.transport.read(address, PRESETS_PATH).await?;
        let presets = parse_presets(&xml);

        if self.session.apply_presets(ticket, presets.clone()) {
            self.emitter.emit(SessionEvent::PresetsChanged {
                presets,
                timestamp: now_millis(),
            });
        }
        Ok(())
    }

    /// Sends `key` as a press followed by a release.
    async fn press_and_release(&self, address: &DeviceAddress, key: DeviceKey) -> DeviceResult<()> {
        self.transport
            .write(address, KEY_PATH, key_body(key, KeyState::Press))
            .await?
            .accepted()?;

        tokio::time::sleep(Duration::from_millis(KEY_RELEASE_DELAY_MS)).await;

        self.transport
            .write(address, KEY_PATH, key_body(key, KeyState::Release))
            .await?
            .accepted()?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Remote control for one speaker at a time.
pub struct DeviceController {
    shared: Shared,
    directory: Option<Arc<dyn StationDirectory>>,
    pending_polls: Mutex<Vec<JoinHandle<()>>>,
}

impl DeviceController {
    pub fn new(
        transport: Arc<dyn DeviceTransport>,
        session: Arc<Session>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            shared: Shared {
                transport,
                session,
                emitter,
            },
            directory: None,
            pending_polls: Mutex::new(Vec::new()),
        }
    }

    /// Enables [`search`](Self::search) through `directory`.
    #[must_use]
    pub fn with_directory(mut self, directory: Arc<dyn StationDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.shared.session
    }

    /// Records `err` as the current error, emits it, and hands it back.
    fn fail(&self, err: ControlError) -> ControlError {
        log::warn!("[Device] {}", err);
        self.shared.session.set_error(err.to_string());
        self.shared.emitter.emit(SessionEvent::Error {
            code: err.code().to_string(),
            message: err.to_string(),
            timestamp: now_millis(),
        });
        err
    }

    fn require_address(&self) -> ControlResult<DeviceAddress> {
        self.shared
            .session
            .connected_address()
            .ok_or_else(|| self.fail(ControlError::NotConnected))
    }

    fn schedule_now_playing_poll(&self, address: &DeviceAddress, delay_ms: u64) {
        let shared = self.shared.clone();
        let address = address.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if let Err(e) = shared.refresh_now_playing(&address).await {
                log::debug!("[Device] Now-playing poll (+{}ms) failed: {}", delay_ms, e);
            }
        });

        let mut pending = self.pending_polls.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Waits until every scheduled background poll has finished.
    pub async fn wait_for_pending_polls(&self) {
        loop {
            let handles = std::mem::take(&mut *self.pending_polls.lock());
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    log::warn!("[Device] Poll task failed: {}", e);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────────────────────

    /// Connects to the device at `address`.
    ///
    /// Reads `/info` first; on success the address is remembered and presets,
    /// now-playing and volume are fetched concurrently, once each.
    pub async fn connect(&self, address: &str) -> ControlResult<DeviceInfo> {
        let Some(address) = DeviceAddress::parse(address) else {
            return Err(self.fail(ControlError::MissingAddress));
        };
        log::info!("[Device] Connecting to {}", address);

        let xml = match self.shared.transport.read(&address, INFO_PATH).await {
            Ok(xml) => xml,
            Err(e) => {
                log::warn!("[Device] Connect to {} failed: {}", address, e);
                self.shared.session.mark_disconnected();
                return Err(self.fail(ControlError::ConnectFailed));
            }
        };

        let info = parse_device_info(&xml);
        if let Err(e) = self.shared.session.mark_connected(address.clone(), info.clone()) {
            log::warn!("[Device] Failed to remember address {}: {}", address, e);
        }
        self.shared.session.clear_error();
        self.shared.emitter.emit(SessionEvent::Connected {
            address: address.to_string(),
            device: info.clone(),
            timestamp: now_millis(),
        });

        let (presets, now_playing, volume) = tokio::join!(
            self.shared.refresh_presets(&address),
            self.shared.refresh_now_playing(&address),
            self.shared.refresh_volume(&address),
        );
        for (what, result) in [
            ("presets", presets),
            ("now playing", now_playing),
            ("volume", volume),
        ] {
            if let Err(e) = result {
                log::warn!("[Device] Initial {} fetch failed: {}", what, e);
            }
        }

        Ok(info)
    }

    /// Disconnects; favorites and the remembered address are kept.
    pub fn disconnect(&self) {
        self.shared.session.mark_disconnected();
        self.shared.emitter.emit(SessionEvent::Disconnected {
            timestamp: now_millis(),
        });
    }

    /// Connects to the remembered address, if there is one.
    pub async fn reconnect_saved(&self) -> ControlResult<Option<DeviceInfo>> {
        match self.shared.session.address() {
            Some(address) => self.connect(address.as_str()).await.map(Some),
            None => Ok(None),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn fetch_volume(&self) -> ControlResult<VolumeState> {
        let address = self.require_address()?;
        self.shared.refresh_volume(&address).await.map_err(|e| {
            log::warn!("[Device] Volume fetch failed: {}", e);
            self.fail(ControlError::StatusFailed)
        })?;
        Ok(self.shared.session.volume())
    }

    pub async fn fetch_now_playing(&self) -> ControlResult<Option<PlaybackStatus>> {
        let address = self.require_address()?;
        self.shared.refresh_now_playing(&address).await.map_err(|e| {
            log::warn!("[Device] Now-playing fetch failed: {}", e);
            self.fail(ControlError::StatusFailed)
        })?;
        Ok(self.shared.session.now_playing())
    }

    pub async fn fetch_presets(&self) -> ControlResult<PresetSlots> {
        let address = self.require_address()?;
        self.shared.refresh_presets(&address).await.map_err(|e| {
            log::warn!("[Device] Presets fetch failed: {}", e);
            self.fail(ControlError::StatusFailed)
        })?;
        Ok(self.shared.session.presets())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keys & Volume
    // ─────────────────────────────────────────────────────────────────────────

    /// Presses and releases `key`. Does nothing while disconnected.
    pub async fn send_key(&self, key: DeviceKey) -> ControlResult<()> {
        if let DeviceKey::Preset(slot) = key {
            if !PresetSlots::is_valid_slot(slot) {
                return Err(self.fail(ControlError::InvalidPresetSlot(slot)));
            }
        }
        let Some(address) = self.shared.session.connected_address() else {
            log::debug!("[Device] Ignoring {} while disconnected", key);
            return Ok(());
        };

        self.shared
            .press_and_release(&address, key)
            .await
            .map_err(|e| {
                log::warn!("[Device] Key {} failed: {}", key, e);
                self.fail(ControlError::CommandFailed)
            })
    }

    /// Sets the volume level (clamped to 0..=100). Does nothing while disconnected.
    pub async fn set_volume(&self, level: u8) -> ControlResult<VolumeState> {
        let Some(address) = self.shared.session.connected_address() else {
            return Ok(self.shared.session.volume());
        };
        let level = level.min(100);

        let result = self
            .shared
            .transport
            .write(&address, VOLUME_PATH, volume_body(level))
            .await
            .and_then(|res| res.accepted());
        if let Err(e) = result {
            log::warn!("[Device] Set volume {} failed: {}", level, e);
            return Err(self.fail(ControlError::VolumeFailed));
        }

        let volume = self.shared.session.set_volume_level(level);
        self.shared.emitter.emit(SessionEvent::VolumeChanged {
            volume,
            timestamp: now_millis(),
        });
        Ok(volume)
    }

    /// Flips the mute flag. Does nothing while disconnected.
    ///
    /// The write carries the current level alongside the new flag.
    pub async fn toggle_mute(&self) -> ControlResult<VolumeState> {
        let Some(address) = self.shared.session.connected_address() else {
            return Ok(self.shared.session.volume());
        };
        let current = self.shared.session.volume();
        let muted = !current.muted;

        let result = self
            .shared
            .transport
            .write(&address, VOLUME_PATH, mute_body(current.level, muted))
            .await
            .and_then(|res| res.accepted());
        if let Err(e) = result {
            log::warn!("[Device] Toggle mute failed: {}", e);
            return Err(self.fail(ControlError::VolumeFailed));
        }

        let volume = self.shared.session.set_muted(muted);
        self.shared.emitter.emit(SessionEvent::VolumeChanged {
            volume,
            timestamp: now_millis(),
        });
        Ok(volume)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Presets
    // ─────────────────────────────────────────────────────────────────────────

    /// Recalls preset `slot`, then polls now-playing once.
    pub async fn select_preset(&self, slot: u8) -> ControlResult<()> {
        let Some(key) = DeviceKey::preset(slot) else {
            return Err(self.fail(ControlError::InvalidPresetSlot(slot)));
        };
        let Some(address) = self.shared.session.connected_address() else {
            return Ok(());
        };

        if let Err(e) = self.shared.press_and_release(&address, key).await {
            log::warn!("[Device] Preset {} failed: {}", slot, e);
            return Err(self.fail(ControlError::PresetSelectFailed));
        }

        self.schedule_now_playing_poll(&address, PRESET_POLL_DELAY_MS);
        Ok(())
    }

    /// Stores the currently playing item in preset `slot`, then refreshes presets.
    pub async fn save_current_to_preset(&self, slot: u8) -> ControlResult<PresetSlots> {
        if !PresetSlots::is_valid_slot(slot) {
            return Err(self.fail(ControlError::InvalidPresetSlot(slot)));
        }

        let status = self.shared.session.now_playing().unwrap_or_default();
        let Some((source, location)) = status.item.playable() else {
            return Err(self.fail(ControlError::NothingPlaying));
        };
        let address = self.require_address()?;

        let name = status
            .station_name
            .as_deref()
            .or(status.item.name.as_deref())
            .unwrap_or_else(|| status.display_name());
        let body = store_preset_body(slot, source, location, name);

        let result = self
            .shared
            .transport
            .write(&address, STORE_PRESET_PATH, body)
            .await
            .and_then(|res| res.accepted());
        if let Err(e) = result {
            log::warn!("[Device] Save preset {} failed: {}", slot, e);
            return Err(self.fail(ControlError::SavePresetFailed));
        }
        log::info!("[Device] Saved {:?} to preset {}", name, slot);

        if let Err(e) = self.shared.refresh_presets(&address).await {
            log::warn!("[Device] Presets refresh after save failed: {}", e);
        }
        self.shared.session.clear_error();
        Ok(self.shared.session.presets())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Playback
    // ─────────────────────────────────────────────────────────────────────────

    /// Selects `item` and starts playback.
    ///
    /// Background now-playing polls follow the PLAY key; see
    /// [`wait_for_pending_polls`](Self::wait_for_pending_polls).
    pub async fn select_and_play(&self, item: &ContentItem) -> ControlResult<()> {
        self.play_item(item, ControlError::PlayFailed).await
    }

    /// Plays a directory search result.
    pub async fn play_station(&self, station: &StationResult) -> ControlResult<()> {
        let item = ContentItem::new(&station.source, &station.location, &station.name);
        self.select_and_play(&item).await
    }

    /// Plays the favorite with `id`.
    pub async fn play_favorite(&self, id: u64) -> ControlResult<()> {
        let Some(favorite) = self.shared.session.find_favorite(id) else {
            return Err(self.fail(ControlError::FavoriteNotFound(id)));
        };
        self.play_item(&favorite.item(), ControlError::PlayFavoriteFailed)
            .await
    }

    async fn play_item(&self, item: &ContentItem, failure: ControlError) -> ControlResult<()> {
        let Some((source, location)) = item.playable() else {
            return Err(self.fail(ControlError::NotPlayable));
        };
        let address = self.require_address()?;

        let location = normalize_location(location);
        let name = item.name.as_deref().unwrap_or_default();
        log::info!("[Device] Selecting {} {} ({:?})", source, location, name);

        let selected = self
            .shared
            .transport
            .write(&address, SELECT_PATH, select_body(source, &location, name))
            .await
            .and_then(|res| res.accepted());
        if let Err(e) = selected {
            log::warn!("[Device] Select failed: {}", e);
            return Err(self.fail(failure));
        }

        tokio::time::sleep(Duration::from_millis(SELECT_SETTLE_DELAY_MS)).await;

        if let Err(e) = self.shared.press_and_release(&address, DeviceKey::Play).await {
            log::warn!("[Device] PLAY after select failed: {}", e);
            return Err(self.fail(failure));
        }

        for delay_ms in PLAY_POLL_DELAYS_MS {
            self.schedule_now_playing_poll(&address, delay_ms);
        }
        self.shared.session.clear_error();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Favorites
    // ─────────────────────────────────────────────────────────────────────────

    /// Bookmarks the currently playing station.
    pub fn add_current_to_favorites(&self) -> ControlResult<FavoriteEntry> {
        let status = self.shared.session.now_playing();

        match self.shared.session.add_favorite(status.as_ref()) {
            Ok(Some(entry)) => {
                self.emit_favorites();
                Ok(entry)
            }
            Ok(None) => Err(self.fail(ControlError::NothingToFavorite)),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Removes the favorite with `id`.
    pub fn remove_favorite(&self, id: u64) -> ControlResult<()> {
        match self.shared.session.remove_favorite(id) {
            Ok(true) => {
                self.emit_favorites();
                Ok(())
            }
            Ok(false) => Err(self.fail(ControlError::FavoriteNotFound(id))),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    fn emit_favorites(&self) {
        self.shared.emitter.emit(SessionEvent::FavoritesChanged {
            favorites: self.shared.session.favorites(),
            timestamp: now_millis(),
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    /// Searches the station directory and stores the results in the session.
    pub async fn search(&self, query: &str) -> ControlResult<Vec<StationResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(self.fail(ControlError::EmptyQuery));
        }
        let Some(directory) = &self.directory else {
            return Err(self.fail(ControlError::SearchUnavailable));
        };

        let results = directory.search(query).await;
        self.shared.session.set_search_results(results.clone());
        self.shared.emitter.emit(SessionEvent::SearchResults {
            query: query.to_string(),
            results: results.clone(),
            timestamp: now_millis(),
        });

        if results.is_empty() {
            return Err(self.fail(ControlError::NoStationsFound));
        }
        self.shared.session.clear_error();
        Ok(results)
    }
}
