//! Plain-text rendering of session state for the terminal.

use std::fmt::Write;

use soundtouch_core::session::SessionSnapshot;
use soundtouch_core::{DeviceInfo, FavoriteEntry, PlaybackStatus, PresetSlots, StationResult, VolumeState};

pub fn connected(address: &str, info: &DeviceInfo) -> String {
    format!("Connected to {} at {}", device_label(info), address)
}

fn device_label(info: &DeviceInfo) -> String {
    match (&info.name, &info.device_type) {
        (Some(name), Some(kind)) => format!("{name} ({kind})"),
        (Some(name), None) => name.clone(),
        (None, Some(kind)) => kind.clone(),
        (None, None) => "SoundTouch".to_string(),
    }
}

pub fn volume(volume: &VolumeState) -> String {
    if volume.muted {
        format!("Volume: {} (muted)", volume.level)
    } else {
        format!("Volume: {}", volume.level)
    }
}

fn now_playing(status: Option<&PlaybackStatus>) -> String {
    let Some(status) = status.filter(|s| s.item.source.as_deref() != Some("STANDBY")) else {
        return "Now playing: nothing".to_string();
    };

    let mut line = format!("Now playing: {}", status.display_name());
    if let Some(track) = status.display_track() {
        let _ = write!(line, " - {track}");
    }
    if let Some(artist) = &status.artist {
        let _ = write!(line, " by {artist}");
    }
    if !status.playing {
        line.push_str(" (paused)");
    }
    line
}

pub fn presets(presets: &PresetSlots) -> String {
    let mut out = String::from("Presets:");
    for (slot, preset) in presets.iter() {
        let label = preset
            .map(|p| p.item.name.as_deref().unwrap_or("(unnamed)"))
            .unwrap_or("(empty)");
        let _ = write!(out, "\n  {slot}. {label}");
    }
    out
}

pub fn favorites(favorites: &[FavoriteEntry]) -> String {
    if favorites.is_empty() {
        return "No favorites yet".to_string();
    }
    let mut out = String::from("Favorites:");
    for fav in favorites {
        let _ = write!(out, "\n  [{}] {}", fav.id, fav.name);
        if let Some(artist) = &fav.artist {
            let _ = write!(out, " ({artist})");
        }
    }
    out
}

pub fn stations(results: &[StationResult]) -> String {
    let mut out = String::new();
    for (i, station) in results.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{:>2}. {} [{}]", i + 1, station.name, station.category);
    }
    out
}

pub fn status(snapshot: &SessionSnapshot) -> String {
    let device = snapshot
        .device
        .as_ref()
        .map(device_label)
        .unwrap_or_else(|| "SoundTouch".to_string());
    let address = snapshot
        .address
        .as_ref()
        .map(|a| a.to_string())
        .unwrap_or_default();

    let mut out = format!("Device: {device} at {address}");
    let _ = write!(out, "\n{}", now_playing(snapshot.now_playing.as_ref()));
    let _ = write!(out, "\n{}", volume(&snapshot.volume));
    let _ = write!(out, "\n{}", presets(&snapshot.presets));
    if let Some(err) = &snapshot.last_error {
        let _ = write!(out, "\nLast error: {err}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use soundtouch_core::{ContentItem, Preset};

    #[test]
    fn now_playing_skips_repeated_track() {
        let status = PlaybackStatus {
            playing: true,
            station_name: Some("Jazz FM".into()),
            track: Some("Jazz FM".into()),
            artist: None,
            art_url: None,
            item: ContentItem::new("TUNEIN", "s1", "Jazz FM"),
        };
        assert_eq!(now_playing(Some(&status)), "Now playing: Jazz FM");
    }

    #[test]
    fn standby_reads_as_nothing() {
        let status = PlaybackStatus {
            item: ContentItem {
                source: Some("STANDBY".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(now_playing(Some(&status)), "Now playing: nothing");
    }

    #[test]
    fn presets_list_all_six_slots() {
        let mut slots = PresetSlots::default();
        slots.insert(Preset {
            slot: 2,
            item: ContentItem::new("TUNEIN", "s2", "Rock"),
        });
        let text = presets(&slots);
        assert!(text.contains("  1. (empty)"));
        assert!(text.contains("  2. Rock"));
        assert!(text.contains("  6. (empty)"));
    }

    #[test]
    fn muted_volume_is_flagged() {
        let text = volume(&VolumeState {
            level: 55,
            muted: true,
        });
        assert_eq!(text, "Volume: 55 (muted)");
    }
}
