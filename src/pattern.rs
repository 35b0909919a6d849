// ── Grid dimensions ───────────────────────────────────────────────────────────

pub const PITCHES: usize = 12;
pub const MAX_STEPS: usize = 44;
pub const MIN_STEPS: usize = 8;
pub const DEFAULT_STEPS: usize = 32;

pub const MIN_BPM: u32 = 40;
pub const MAX_BPM: u32 = 240;

// ── Track ─────────────────────────────────────────────────────────────────────

/// One of the four instrument lanes. Rhythm pitches index the drum-timbre
/// table instead of the chromatic scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Track {
    Melody,
    Chords,
    Bass,
    Rhythm,
}

impl Track {
    pub const ALL: [Track; 4] = [Track::Melody, Track::Chords, Track::Bass, Track::Rhythm];

    pub fn name(self) -> &'static str {
        match self {
            Self::Melody => "Melody",
            Self::Chords => "Chords",
            Self::Bass   => "Bass",
            Self::Rhythm => "Rhythm",
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Melody => 0,
            Self::Chords => 1,
            Self::Bass   => 2,
            Self::Rhythm => 3,
        }
    }
}

// ── Pattern ───────────────────────────────────────────────────────────────────

/// Per-track velocity grid. Storage is always the full 12×44; `length`
/// bounds which steps are addressable.
pub type Cells = [[[u8; MAX_STEPS]; PITCHES]; 4];

/// The note grid plus the musical metadata that travels with it.
///
/// Velocity codes: 0 = empty, 1 = normal, 2 = accent / sustain start,
/// 3 = sustain continuation.
#[derive(Clone, PartialEq)]
pub struct Pattern {
    cells:  Cells,
    pub bpm:   u32,
    pub scale: crate::scale::Scale,
    pub root:  u8,
    length: usize,
}

impl Pattern {
    pub fn new() -> Self {
        Self {
            cells:  [[[0; MAX_STEPS]; PITCHES]; 4],
            bpm:    120,
            scale:  crate::scale::Scale::Major,
            root:   0,
            length: DEFAULT_STEPS,
        }
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }

    /// Out-of-range requests clamp to the nearest valid bound.
    pub fn set_length(&mut self, steps: usize) {
        self.length = steps.clamp(MIN_STEPS, MAX_STEPS);
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Velocity at (track, pitch, step), or 0 for any out-of-range address.
    #[inline]
    pub fn get(&self, track: Track, pitch: i32, step: i32) -> u8 {
        if pitch < 0 || pitch >= PITCHES as i32 || step < 0 || step >= self.length as i32 {
            return 0;
        }
        self.cells[track.index()][pitch as usize][step as usize]
    }

    /// Write a velocity. Out-of-range pitch/step/velocity is silently
    /// ignored; this path must never fail mid-gesture or mid-tick.
    pub fn set(&mut self, track: Track, pitch: i32, step: i32, velocity: u8) {
        if pitch < 0 || pitch >= PITCHES as i32 || step < 0 || step >= self.length as i32 {
            return;
        }
        if velocity > 3 {
            return;
        }
        self.cells[track.index()][pitch as usize][step as usize] = velocity;
    }

    pub fn clear_track(&mut self, track: Track) {
        self.cells[track.index()] = [[0; MAX_STEPS]; PITCHES];
    }

    pub fn clear_all(&mut self) {
        for track in Track::ALL {
            self.clear_track(track);
        }
    }

    /// Clear every pitch at one (track, step) column.
    pub fn erase_step(&mut self, track: Track, step: i32) {
        for pitch in 0..PITCHES as i32 {
            self.set(track, pitch, step, 0);
        }
    }

    /// Value snapshot of the grid for the history stack.
    pub fn cells(&self) -> Cells {
        self.cells
    }

    pub fn restore(&mut self, cells: &Cells) {
        self.cells = *cells;
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new()
    }
}

// ── Mute / solo ───────────────────────────────────────────────────────────────

/// Per-track mute flags plus at most one soloed track. Solo wins: every
/// other track is silenced regardless of its own flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MixState {
    muted: [bool; 4],
    solo:  Option<Track>,
}

impl MixState {
    /// Muting the soloed track un-solos it instead of flipping its flag.
    pub fn toggle_mute(&mut self, track: Track) {
        if self.solo == Some(track) {
            self.solo = None;
        } else {
            self.muted[track.index()] = !self.muted[track.index()];
        }
    }

    pub fn toggle_solo(&mut self, track: Track) {
        self.solo = if self.solo == Some(track) { None } else { Some(track) };
    }

    #[inline]
    pub fn is_muted(&self, track: Track) -> bool {
        (self.solo.is_some() && self.solo != Some(track)) || self.muted[track.index()]
    }

    pub fn is_soloed(&self, track: Track) -> bool {
        self.solo == Some(track)
    }

    pub fn mute_flag(&self, track: Track) -> bool {
        self.muted[track.index()]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
