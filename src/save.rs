use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::pattern::{DEFAULT_STEPS, MAX_BPM, MAX_STEPS, MIN_BPM, MIN_STEPS};
use crate::scale::Scale;

pub const SETTINGS_FILE: &str = "gridbeat.json";

/// Scalar settings that survive across sessions. The note grid itself is
/// session-local and is deliberately not written here.
#[derive(Serialize, Deserialize)]
pub struct Settings {
    pub bpm: u32,
    pub scale: Scale,
    pub root: u8,
    pub pattern_length: usize,
    pub show_ghosts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: 120,
            scale: Scale::Major,
            root: 0,
            pattern_length: DEFAULT_STEPS,
            show_ghosts: true,
        }
    }
}

impl Settings {
    /// Pull every field back into its valid range; a hand-edited or stale
    /// file must not smuggle invalid values past the setters.
    fn sanitized(mut self) -> Self {
        self.bpm = self.bpm.clamp(MIN_BPM, MAX_BPM);
        self.root %= 12;
        self.pattern_length = self.pattern_length.clamp(MIN_STEPS, MAX_STEPS);
        self
    }
}

/// Load settings, falling back to defaults when the file is missing or
/// unreadable. Never an error: a fresh machine simply starts fresh.
pub fn load(path: &Path) -> Settings {
    fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str::<Settings>(&text).ok())
        .map(Settings::sanitized)
        .unwrap_or_default()
}

pub fn store(path: &Path, settings: &Settings) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn scratch(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("gridbeat-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn settings_round_trip_through_json() {
        let path = scratch("roundtrip");
        let settings = Settings {
            bpm: 96,
            scale: Scale::Pentatonic,
            root: 7,
            pattern_length: 16,
            show_ghosts: false,
        };
        store(&path, &settings).unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.bpm, 96);
        assert_eq!(loaded.scale, Scale::Pentatonic);
        assert_eq!(loaded.root, 7);
        assert_eq!(loaded.pattern_length, 16);
        assert!(!loaded.show_ghosts);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let loaded = load(Path::new("definitely-not-here/gridbeat.json"));
        assert_eq!(loaded.bpm, 120);
        assert_eq!(loaded.pattern_length, DEFAULT_STEPS);
        assert!(loaded.show_ghosts);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let path = scratch("clamp");
        fs::write(
            &path,
            r#"{"bpm":999,"scale":"Major","root":14,"pattern_length":2,"show_ghosts":true}"#,
        )
        .unwrap();
        let loaded = load(&path);
        assert_eq!(loaded.bpm, MAX_BPM);
        assert_eq!(loaded.root, 2);
        assert_eq!(loaded.pattern_length, MIN_STEPS);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let path = scratch("garbage");
        fs::write(&path, "not json at all").unwrap();
        assert_eq!(load(&path).bpm, 120);
        let _ = fs::remove_file(&path);
    }
}
