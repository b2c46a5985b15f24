//! XML bodies for the device's write endpoints.
//!
//! Bodies are single-line with no XML declaration; the device accepts them
//! as-is. All interpolated values are escaped.

use crate::device::types::{DeviceKey, KeyState};
use crate::protocol_constants::KEY_SENDER;
use crate::utils::escape_xml;

/// `<key>` body for one half of a button press.
#[must_use]
pub fn key_body(key: DeviceKey, state: KeyState) -> String {
    format!(
        r#"<key state="{}" sender="{}">{}</key>"#,
        state.as_str(),
        KEY_SENDER,
        key.identifier()
    )
}

/// `<volume>` body setting an absolute level (clamped to 0..=100).
#[must_use]
pub fn volume_body(level: u8) -> String {
    format!("<volume>{}</volume>", level.min(100))
}

/// `<volume>` body changing the mute flag.
///
/// The device's schema requires the current level to accompany a mute change.
#[must_use]
pub fn mute_body(current_level: u8, muted: bool) -> String {
    format!(
        "<volume>{}<muteenabled>{}</muteenabled></volume>",
        current_level.min(100),
        muted
    )
}

/// `<ContentItem>` body for the select endpoint.
#[must_use]
pub fn select_body(source: &str, location: &str, name: &str) -> String {
    format!(
        r#"<ContentItem source="{}" location="{}"><itemName>{}</itemName></ContentItem>"#,
        escape_xml(source),
        escape_xml(location),
        escape_xml(name)
    )
}

/// `<preset>` body storing a content item in `slot`.
#[must_use]
pub fn store_preset_body(slot: u8, source: &str, location: &str, name: &str) -> String {
    format!(
        r#"<preset id="{}"><ContentItem source="{}" location="{}" sourceAccount=""><itemName>{}</itemName></ContentItem></preset>"#,
        slot,
        escape_xml(source),
        escape_xml(location),
        escape_xml(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_body_carries_state_sender_and_identifier() {
        assert_eq!(
            key_body(DeviceKey::PlayPause, KeyState::Press),
            r#"<key state="press" sender="BoseApp">PLAY_PAUSE</key>"#
        );
        assert_eq!(
            key_body(DeviceKey::Preset(4), KeyState::Release),
            r#"<key state="release" sender="BoseApp">PRESET_4</key>"#
        );
    }

    #[test]
    fn volume_body_clamps_level() {
        assert_eq!(volume_body(73), "<volume>73</volume>");
        assert_eq!(volume_body(150), "<volume>100</volume>");
    }

    #[test]
    fn mute_body_includes_level() {
        assert_eq!(
            mute_body(40, true),
            "<volume>40<muteenabled>true</muteenabled></volume>"
        );
    }

    #[test]
    fn select_body_escapes_values() {
        assert_eq!(
            select_body("TUNEIN", "s12345", "Rock & Roll <Live>"),
            r#"<ContentItem source="TUNEIN" location="s12345"><itemName>Rock &amp; Roll &lt;Live&gt;</itemName></ContentItem>"#
        );
    }

    #[test]
    fn store_preset_body_shape() {
        assert_eq!(
            store_preset_body(2, "TUNEIN", "/v1/playback/station/s1", "One"),
            r#"<preset id="2"><ContentItem source="TUNEIN" location="/v1/playback/station/s1" sourceAccount=""><itemName>One</itemName></ContentItem></preset>"#
        );
    }
}
