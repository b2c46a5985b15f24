//! Domain types for the speaker's control API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::PRESET_SLOT_COUNT;

/// Network address (host or IP) of a speaker.
///
/// The control port is configuration, not part of the address. An address
/// carries no validation beyond being non-empty; a successful connect is the
/// only proof that it is correct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Creates an address from user input, trimming whitespace.
    ///
    /// Returns `None` for empty input.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity reported by the `/info` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub device_id: Option<String>,
    pub name: Option<String>,
    pub device_type: Option<String>,
}

/// The device's representation of a playable source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub source: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
}

impl ContentItem {
    pub fn new(
        source: impl Into<String>,
        location: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            location: Some(location.into()),
            name: Some(name.into()),
        }
    }

    /// Returns `(source, location)` if both are present and non-empty.
    pub fn playable(&self) -> Option<(&str, &str)> {
        let source = self.source.as_deref().filter(|s| !s.is_empty())?;
        let location = self.location.as_deref().filter(|l| !l.is_empty())?;
        Some((source, location))
    }
}

/// Snapshot of the `/now_playing` response.
///
/// Replaced wholesale on every poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackStatus {
    pub playing: bool,
    pub station_name: Option<String>,
    pub track: Option<String>,
    pub artist: Option<String>,
    pub art_url: Option<String>,
    pub item: ContentItem,
}

impl PlaybackStatus {
    /// Name to show for the current item: station, then track, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.station_name
            .as_deref()
            .or(self.track.as_deref())
            .unwrap_or("Unknown Station")
    }

    /// Track title, unless it merely repeats the station name.
    pub fn display_track(&self) -> Option<&str> {
        self.track
            .as_deref()
            .filter(|t| Some(*t) != self.station_name.as_deref())
    }
}

/// Volume and mute state of the speaker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeState {
    /// Level in 0..=100.
    pub level: u8,
    pub muted: bool,
}

/// Parsed `/volume` response.
///
/// `level` is `None` when `actualvolume` is absent or unparsable; the
/// previous level is kept in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeReading {
    pub level: Option<u8>,
    pub muted: bool,
}

/// A content item stored in one of the device's preset slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    /// Slot number, 1 through 6.
    pub slot: u8,
    pub item: ContentItem,
}

/// The six preset slots, indexed by slot number.
///
/// Slot identity is the ordinal; slots are never renumbered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSlots([Option<Preset>; PRESET_SLOT_COUNT as usize]);

impl PresetSlots {
    /// Returns true if `slot` is a valid slot number.
    pub fn is_valid_slot(slot: u8) -> bool {
        (1..=PRESET_SLOT_COUNT).contains(&slot)
    }

    /// Returns the preset bound to `slot`, if any.
    pub fn get(&self, slot: u8) -> Option<&Preset> {
        if !Self::is_valid_slot(slot) {
            return None;
        }
        self.0[usize::from(slot - 1)].as_ref()
    }

    /// Binds a preset to its slot. Out-of-range slots are ignored.
    ///
    /// Returns true if the preset was stored.
    pub fn insert(&mut self, preset: Preset) -> bool {
        if !Self::is_valid_slot(preset.slot) {
            return false;
        }
        let index = usize::from(preset.slot - 1);
        self.0[index] = Some(preset);
        true
    }

    /// Iterates over `(slot, preset)` for all six slots, in order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Option<&Preset>)> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u8 + 1, p.as_ref()))
    }

    /// Number of bound slots.
    pub fn bound_count(&self) -> usize {
        self.0.iter().filter(|p| p.is_some()).count()
    }
}

/// State of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Press,
    Release,
}

impl KeyState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Press => "press",
            Self::Release => "release",
        }
    }
}

/// Logical buttons accepted by the `/key` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKey {
    Play,
    Pause,
    PlayPause,
    NextTrack,
    PrevTrack,
    Mute,
    Power,
    /// Preset recall, slot 1 through 6.
    Preset(u8),
}

impl DeviceKey {
    /// Key identifier as sent on the wire.
    pub fn identifier(self) -> String {
        match self {
            Self::Play => "PLAY".to_string(),
            Self::Pause => "PAUSE".to_string(),
            Self::PlayPause => "PLAY_PAUSE".to_string(),
            Self::NextTrack => "NEXT_TRACK".to_string(),
            Self::PrevTrack => "PREV_TRACK".to_string(),
            Self::Mute => "MUTE".to_string(),
            Self::Power => "POWER".to_string(),
            Self::Preset(slot) => format!("PRESET_{slot}"),
        }
    }

    /// Creates a preset key, rejecting slots outside 1..=6.
    pub fn preset(slot: u8) -> Option<Self> {
        PresetSlots::is_valid_slot(slot).then_some(Self::Preset(slot))
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier())
    }
}

impl std::str::FromStr for DeviceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase().replace('-', "_");
        let key = match upper.as_str() {
            "PLAY" => Self::Play,
            "PAUSE" => Self::Pause,
            "PLAY_PAUSE" => Self::PlayPause,
            "NEXT_TRACK" | "NEXT" => Self::NextTrack,
            "PREV_TRACK" | "PREV" => Self::PrevTrack,
            "MUTE" => Self::Mute,
            "POWER" => Self::Power,
            other => {
                let slot = other
                    .strip_prefix("PRESET_")
                    .and_then(|n| n.parse::<u8>().ok())
                    .ok_or_else(|| format!("unknown key: {s}"))?;
                Self::preset(slot).ok_or_else(|| format!("preset slot out of range: {slot}"))?
            }
        };
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_rejects_blank_input() {
        assert!(DeviceAddress::parse("   ").is_none());
        assert_eq!(
            DeviceAddress::parse(" 10.0.0.5 ").map(|a| a.to_string()),
            Some("10.0.0.5".to_string())
        );
    }

    #[test]
    fn content_item_needs_source_and_location_to_play() {
        assert!(ContentItem::new("TUNEIN", "s1", "x").playable().is_some());

        let missing_location = ContentItem {
            source: Some("TUNEIN".into()),
            location: None,
            name: None,
        };
        assert!(missing_location.playable().is_none());

        let empty_source = ContentItem {
            source: Some(String::new()),
            location: Some("s1".into()),
            name: None,
        };
        assert!(empty_source.playable().is_none());
    }

    #[test]
    fn display_name_falls_back_to_track_then_placeholder() {
        let mut status = PlaybackStatus {
            track: Some("Song".into()),
            ..Default::default()
        };
        assert_eq!(status.display_name(), "Song");

        status.track = None;
        assert_eq!(status.display_name(), "Unknown Station");
    }

    #[test]
    fn display_track_hides_duplicate_of_station() {
        let status = PlaybackStatus {
            station_name: Some("Radio 1".into()),
            track: Some("Radio 1".into()),
            ..Default::default()
        };
        assert_eq!(status.display_track(), None);
    }

    #[test]
    fn preset_slots_ignore_out_of_range() {
        let mut slots = PresetSlots::default();
        assert!(!slots.insert(Preset {
            slot: 7,
            item: ContentItem::default(),
        }));
        assert!(!slots.insert(Preset {
            slot: 0,
            item: ContentItem::default(),
        }));
        assert!(slots.insert(Preset {
            slot: 6,
            item: ContentItem::new("TUNEIN", "s1", "Six"),
        }));

        assert_eq!(slots.bound_count(), 1);
        assert_eq!(slots.iter().count(), 6);
        assert_eq!(slots.get(6).and_then(|p| p.item.name.as_deref()), Some("Six"));
        assert!(slots.get(7).is_none());
    }

    #[test]
    fn key_identifiers_match_wire_names() {
        assert_eq!(DeviceKey::PlayPause.identifier(), "PLAY_PAUSE");
        assert_eq!(DeviceKey::Preset(3).identifier(), "PRESET_3");
        assert!(DeviceKey::preset(7).is_none());
    }

    #[test]
    fn key_parses_from_cli_input() {
        assert_eq!("play-pause".parse(), Ok(DeviceKey::PlayPause));
        assert_eq!("next".parse(), Ok(DeviceKey::NextTrack));
        assert_eq!("PRESET_2".parse(), Ok(DeviceKey::Preset(2)));
        assert!("PRESET_9".parse::<DeviceKey>().is_err());
        assert!("EJECT".parse::<DeviceKey>().is_err());
    }
}
