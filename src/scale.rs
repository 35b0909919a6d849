use serde::{Deserialize, Serialize};

// ── Scale ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    Major,
    Minor,
    Pentatonic,
}

impl Scale {
    pub fn name(self) -> &'static str {
        match self {
            Self::Major => "Major",
            Self::Minor => "Minor",
            Self::Pentatonic => "Penta",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Major => Self::Minor,
            Self::Minor => Self::Pentatonic,
            Self::Pentatonic => Self::Major,
        }
    }

    /// Semitone offsets from the root.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            Self::Major => &[0, 2, 4, 5, 7, 9, 11],
            Self::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Self::Pentatonic => &[0, 2, 4, 7, 9],
        }
    }
}

// ── Chord intervals ───────────────────────────────────────────────────────────

pub const MAJOR_TRIAD: [u8; 3] = [0, 4, 7];
pub const MINOR_TRIAD: [u8; 3] = [0, 3, 7];
pub const MAJ7: [u8; 4] = [0, 4, 7, 11];

/// The triad matching the active scale flavour.
pub fn triad(scale: Scale) -> &'static [u8; 3] {
    if scale == Scale::Minor { &MINOR_TRIAD } else { &MAJOR_TRIAD }
}

// ── Note names ────────────────────────────────────────────────────────────────

pub const NOTE_NAMES: [&str; 12] =
    ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

// ── Keyed scale helpers ───────────────────────────────────────────────────────

/// Chromatic pitches belonging to `scale` rooted at `root`.
pub fn scale_notes(scale: Scale, root: u8) -> Vec<u8> {
    scale.intervals().iter().map(|&i| (i + root) % 12).collect()
}

/// Snap a chromatic pitch to the nearest member of `notes`.
///
/// Offsets are scanned 1..5, checking +offset before −offset, so ties
/// resolve upward.
pub fn snap_to_scale(pitch: u8, notes: &[u8]) -> u8 {
    let pitch = pitch % 12;
    if notes.contains(&pitch) {
        return pitch;
    }
    for offset in 1..6u8 {
        let up = (pitch + offset) % 12;
        if notes.contains(&up) {
            return up;
        }
        let down = (pitch + 12 - offset) % 12;
        if notes.contains(&down) {
            return down;
        }
    }
    pitch
}

/// Position of `pitch` within `notes`, or 0 when it is not a scale member.
pub fn scale_index_of(pitch: u8, notes: &[u8]) -> usize {
    notes.iter().position(|&n| n == pitch % 12).unwrap_or(0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_notes_offset_by_root() {
        assert_eq!(scale_notes(Scale::Major, 0), vec![0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(scale_notes(Scale::Major, 2), vec![2, 4, 6, 7, 9, 11, 1]);
        assert_eq!(scale_notes(Scale::Pentatonic, 0), vec![0, 2, 4, 7, 9]);
    }

    #[test]
    fn snap_keeps_scale_members() {
        let notes = scale_notes(Scale::Major, 0);
        for &n in &notes {
            assert_eq!(snap_to_scale(n, &notes), n);
        }
    }

    #[test]
    fn snap_prefers_upward_on_ties() {
        // C major: pitch 1 is one step from both 0 and 2; upward wins.
        let notes = scale_notes(Scale::Major, 0);
        assert_eq!(snap_to_scale(1, &notes), 2);
        assert_eq!(snap_to_scale(10, &notes), 11);
        // C pentatonic: 6 is not a member either, so 5 falls down to 4.
        let penta = scale_notes(Scale::Pentatonic, 0);
        assert_eq!(snap_to_scale(5, &penta), 4);
    }

    #[test]
    fn scale_index_is_exact_match_or_zero() {
        let notes = scale_notes(Scale::Major, 0);
        assert_eq!(scale_index_of(4, &notes), 2);
        assert_eq!(scale_index_of(7, &notes), 4);
        // Non-members fall back to the root position.
        assert_eq!(scale_index_of(6, &notes), 0);
    }

    #[test]
    fn triad_follows_scale_flavour() {
        assert_eq!(triad(Scale::Major), &MAJOR_TRIAD);
        assert_eq!(triad(Scale::Minor), &MINOR_TRIAD);
        assert_eq!(triad(Scale::Pentatonic), &MAJOR_TRIAD);
    }
}
