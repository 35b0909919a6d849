use crate::pattern::{MixState, Pattern, Track, PITCHES};

/// Shortest tone the scheduler will request, in seconds.
pub const MIN_TONE_SECS: f32 = 0.15;

// ── Step clock ────────────────────────────────────────────────────────────────

/// One 16th-note step clock, counted in audio samples.
///
/// The clock is a countdown rather than a running modulo of a master clock:
/// a bpm or length edit rebuilds the countdown in place, which discards the
/// partial step in flight (no stale boundary can fire against an outdated
/// period) while `current_step` stays where it was.
pub struct StepClock {
    pub current_step: usize,
    period: u64,
    phase:  u64,
    sample_rate: f32,
}

impl StepClock {
    pub fn new(sample_rate: f32, bpm: u32) -> Self {
        Self {
            current_step: 0,
            period: samples_per_step(sample_rate, bpm),
            phase:  0,
            sample_rate,
        }
    }

    /// Advance one sample. Returns true when a step boundary is crossed,
    /// with `current_step` already moved to the new step.
    pub fn tick(&mut self, length: usize) -> bool {
        self.phase += 1;
        if self.phase < self.period {
            return false;
        }
        self.phase = 0;
        self.current_step = (self.current_step + 1) % length.max(1);
        true
    }

    /// Rebuild the countdown for a new tempo, preserving the step position.
    pub fn retime(&mut self, bpm: u32) {
        self.period = samples_per_step(self.sample_rate, bpm);
        self.phase = 0;
    }

    /// Restart the countdown, so the next boundary is a full period away.
    pub fn rewind_phase(&mut self) {
        self.phase = 0;
    }

    /// Keep the step addressable after a length edit.
    pub fn clamp_step(&mut self, length: usize) {
        if self.current_step >= length {
            self.current_step = 0;
        }
    }

    pub fn step_secs(&self, bpm: u32) -> f32 {
        60.0 / bpm as f32 / 4.0
    }
}

fn samples_per_step(sample_rate: f32, bpm: u32) -> u64 {
    ((sample_rate * 60.0) / (bpm as f32 * 4.0)).round().max(1.0) as u64
}

// ── Trigger collection ────────────────────────────────────────────────────────

/// One synthesis dispatch decided by a tick. Drums carry no duration; the
/// timbre's own envelope bounds the hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    Tone { track: Track, pitch: usize, velocity: u8, duration: f32 },
    Drum { pitch: usize, velocity: u8 },
}

/// Length of the sustain run anchored at (track, pitch, step): 1 plus the
/// contiguous velocity-3 cells that follow, wrapping, stopping at the first
/// other value. An orphaned 3 therefore reads as run length 1 from its own
/// cell, which is all the scheduler ever asks of it.
pub fn sustain_run_len(pattern: &Pattern, track: Track, pitch: i32, step: usize) -> usize {
    let length = pattern.length();
    let mut run = 1;
    for s in 1..length {
        let next = ((step + s) % length) as i32;
        if pattern.get(track, pitch, next) == 3 {
            run += 1;
        } else {
            break;
        }
    }
    run
}

/// Everything due at `step`: drums retrigger unconditionally, sustain
/// continuations stay silent, and fresh tonal notes get a duration covering
/// their whole run (slightly shortened so adjacent retriggers do not touch).
pub fn collect_triggers(
    pattern: &Pattern,
    mix: &MixState,
    step: usize,
    step_secs: f32,
) -> Vec<Trigger> {
    let mut out = Vec::new();
    for track in Track::ALL {
        if mix.is_muted(track) {
            continue;
        }
        for pitch in 0..PITCHES {
            let velocity = pattern.get(track, pitch as i32, step as i32);
            if velocity == 0 {
                continue;
            }
            if track == Track::Rhythm {
                out.push(Trigger::Drum { pitch, velocity });
            } else if velocity != 3 {
                let run = sustain_run_len(pattern, track, pitch as i32, step);
                let duration = (step_secs * run as f32 * 0.95).max(MIN_TONE_SECS);
                out.push(Trigger::Tone { track, pitch, velocity, duration });
            }
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
