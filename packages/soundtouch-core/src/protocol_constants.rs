//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by the device's HTTP/XML control API and by the
//! timing it tolerates. Tunable values (ports, timeouts, provider URLs) live
//! in [`crate::config::Config`] instead.

// ─────────────────────────────────────────────────────────────────────────────
// Device Control API
// ─────────────────────────────────────────────────────────────────────────────

/// Well-known HTTP control port of the speaker.
pub const DEFAULT_DEVICE_PORT: u16 = 8090;

/// Read endpoint returning device identity (`<info>`).
pub const INFO_PATH: &str = "/info";

/// Read/write endpoint for volume and mute.
pub const VOLUME_PATH: &str = "/volume";

/// Read endpoint for the currently playing content item.
pub const NOW_PLAYING_PATH: &str = "/now_playing";

/// Read endpoint for the six preset slots.
pub const PRESETS_PATH: &str = "/presets";

/// Write endpoint for key press/release events.
pub const KEY_PATH: &str = "/key";

/// Write endpoint that selects a content item.
pub const SELECT_PATH: &str = "/select";

/// Write endpoint that stores a content item in a preset slot.
pub const STORE_PRESET_PATH: &str = "/preset";

/// Sender tag attached to every `<key>` element.
pub const KEY_SENDER: &str = "BoseApp";

/// `playStatus` value reported while audio is playing.
pub const PLAY_STATE: &str = "PLAY_STATE";

/// Number of preset slots on the device. Slots are numbered 1 through 6.
pub const PRESET_SLOT_COUNT: u8 = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Command Timing
// ─────────────────────────────────────────────────────────────────────────────

/// Delay between a key press and its release (ms).
///
/// The key API models discrete down/up transitions, so both halves must be
/// sent with a gap between them.
pub const KEY_RELEASE_DELAY_MS: u64 = 100;

/// Delay between selecting a content item and pressing PLAY (ms).
///
/// The device is not ready to play immediately after a select.
pub const SELECT_SETTLE_DELAY_MS: u64 = 500;

/// Now-playing poll offsets after a PLAY command (ms, measured from the
/// PLAY release). The device updates now-playing asynchronously, so several
/// samples are taken.
pub const PLAY_POLL_DELAYS_MS: [u64; 3] = [500, 1500, 3000];

/// Now-playing poll offset after a preset key (ms).
pub const PRESET_POLL_DELAY_MS: u64 = 500;

// ─────────────────────────────────────────────────────────────────────────────
// Station Directories
// ─────────────────────────────────────────────────────────────────────────────

/// Content source tag for TuneIn stations.
pub const TUNEIN_SOURCE: &str = "TUNEIN";

/// Content source tag for plain internet radio stream URLs.
pub const INTERNET_RADIO_SOURCE: &str = "LOCAL_INTERNET_RADIO";

/// User-Agent sent to directory providers (Radio-Browser asks clients to
/// identify themselves).
pub const DIRECTORY_USER_AGENT: &str = "SoundTouchRelay/0.1";

/// Category label used when a provider gives none.
pub const DEFAULT_STATION_CATEGORY: &str = "Radio Station";

// ─────────────────────────────────────────────────────────────────────────────
// Relay
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum accepted size of a relayed write body (bytes).
pub const MAX_RELAY_BODY_SIZE: usize = 64 * 1024;

/// Content type of relayed device responses.
pub const XML_CONTENT_TYPE: &str = "text/xml";

/// Content type of outbound device writes.
pub const XML_WRITE_CONTENT_TYPE: &str = "text/xml; charset=UTF-8";

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "soundtouch-relay";

// ─────────────────────────────────────────────────────────────────────────────
// Persistence Keys
// ─────────────────────────────────────────────────────────────────────────────

/// Store key holding the last successfully connected device address.
pub const DEVICE_ADDRESS_KEY: &str = "deviceAddress";

/// Store key holding the favorites list (JSON array).
pub const FAVORITES_KEY: &str = "favorites";
