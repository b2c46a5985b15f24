//! Parsers for the device's XML read responses.
//!
//! Every field is optional: absent or malformed fields fall back to their
//! default instead of failing the whole response.

use crate::device::types::{
    ContentItem, DeviceInfo, PlaybackStatus, Preset, PresetSlots, VolumeReading,
};
use crate::device::xml::{parse_document, XmlElement};
use crate::protocol_constants::PLAY_STATE;

/// Parses an `/info` response.
#[must_use]
pub fn parse_device_info(xml: &str) -> DeviceInfo {
    let doc = parse_document(xml);
    let Some(info) = doc.find("info") else {
        return DeviceInfo::default();
    };

    DeviceInfo {
        device_id: info.attr_owned("deviceID"),
        name: info.find_text("name"),
        device_type: info.find_text("type"),
    }
}

/// Parses a `/volume` response.
///
/// `actualvolume` is clamped to 0..=100; a missing or non-numeric value
/// yields `level: None`. `muteenabled` is true only for the literal `true`.
#[must_use]
pub fn parse_volume(xml: &str) -> VolumeReading {
    let doc = parse_document(xml);

    let level = doc
        .find_text("actualvolume")
        .and_then(|v| v.parse::<i64>().ok())
        .map(|v| v.clamp(0, 100) as u8);

    let muted = doc
        .find_text("muteenabled")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    VolumeReading { level, muted }
}

/// Parses a `/now_playing` response.
#[must_use]
pub fn parse_now_playing(xml: &str) -> PlaybackStatus {
    let doc = parse_document(xml);

    PlaybackStatus {
        playing: doc.find_text("playStatus").as_deref() == Some(PLAY_STATE),
        station_name: doc.find_text("stationName"),
        track: doc.find_text("track"),
        artist: doc.find_text("artist"),
        art_url: doc.find_text("art"),
        item: doc.find("ContentItem").map(content_item).unwrap_or_default(),
    }
}

/// Parses a `/presets` response into the six fixed slots.
///
/// Presets whose `id` is missing or outside 1..=6 are dropped.
#[must_use]
pub fn parse_presets(xml: &str) -> PresetSlots {
    let doc = parse_document(xml);
    let mut slots = PresetSlots::default();

    for element in doc.find_all("preset") {
        let Some(slot) = element.attr("id").and_then(|id| id.trim().parse::<u8>().ok()) else {
            log::debug!("[Device] Skipping preset without numeric id");
            continue;
        };

        let mut item = element.find("ContentItem").map(content_item).unwrap_or_default();
        if item.name.is_none() {
            item.name = element.find_text("itemName");
        }

        if !slots.insert(Preset { slot, item }) {
            log::debug!("[Device] Ignoring preset with out-of-range slot {}", slot);
        }
    }

    slots
}

/// Extracts a device error from a write response, if it reports one.
///
/// The device answers rejected writes with `<errors><error name="..">`.
/// Returns the error name (or its text) for such responses.
#[must_use]
pub fn parse_device_error(xml: &str) -> Option<String> {
    let doc = parse_document(xml);
    let error = doc.find("error")?;

    Some(
        error
            .attr_owned("name")
            .or_else(|| Some(error.text()).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| "unknown device error".to_string()),
    )
}

fn content_item(element: &XmlElement) -> ContentItem {
    ContentItem {
        source: element.attr_owned("source"),
        location: element.attr_owned("location"),
        name: element.find_text("itemName"),
    }
}
