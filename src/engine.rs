use crate::drums::{self, DrumKind};
use crate::pattern::{MixState, Pattern};
use crate::sequencer::{collect_triggers, StepClock, Trigger};
use crate::synth;

// ── Voice ─────────────────────────────────────────────────────────────────────

/// One rendered buffer playing itself out. Voices are never pooled or
/// capped; each drains its buffer and is dropped.
struct Voice {
    samples: Vec<f32>,
    pos: usize,
}

impl Voice {
    fn new(samples: Vec<f32>) -> Self {
        Self { samples, pos: 0 }
    }

    #[inline]
    fn next_sample(&mut self) -> f32 {
        let Some(&s) = self.samples.get(self.pos) else { return 0.0 };
        self.pos += 1;
        s
    }

    #[inline]
    fn is_finished(&self) -> bool {
        self.pos >= self.samples.len()
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// Pattern, transport and voice mixing behind one lock.
///
/// `generate_sample` is called once per frame from the audio callback; the
/// step clock lives on that timeline, so triggering never waits on anything
/// but the sample counter. Control-surface edits (gestures, tempo, mutes)
/// come in through the same mutex from the input thread.
pub struct Engine {
    pub pattern: Pattern,
    pub mix:     MixState,
    pub playing: bool,

    clock:  StepClock,
    voices: Vec<Voice>,
    sample_rate: f32,
    /// Fire the current step on the next sample (set when playback starts).
    fire_pending: bool,
    /// Advanced per trigger so simultaneous noise hits differ.
    seed: u32,
}

impl Engine {
    pub fn new(sample_rate: f32) -> Self {
        let pattern = Pattern::new();
        let clock = StepClock::new(sample_rate, pattern.bpm);
        Self {
            pattern,
            mix: MixState::default(),
            playing: false,
            clock,
            voices: Vec::with_capacity(32),
            sample_rate,
            fire_pending: false,
            seed: 0xBEEF_CAFE,
        }
    }

    // ── Transport ─────────────────────────────────────────────────────────

    /// Toggle Stopped ⇄ Running. Starting fires the current step right
    /// away; stopping cancels the pending boundary but lets sounding voices
    /// finish naturally.
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        if self.playing {
            self.clock.rewind_phase();
            self.fire_pending = true;
        } else {
            self.fire_pending = false;
        }
        self.playing
    }

    pub fn current_step(&self) -> usize {
        self.clock.current_step
    }

    // ── Parameter edits ───────────────────────────────────────────────────

    pub fn set_bpm(&mut self, bpm: u32) {
        self.pattern.set_bpm(bpm);
        self.clock.retime(self.pattern.bpm);
    }

    pub fn set_pattern_length(&mut self, steps: usize) {
        self.pattern.set_length(steps);
        // Same contract as a tempo edit: rebuild the countdown, keep the
        // step (clamped into the new range).
        self.clock.retime(self.pattern.bpm);
        self.clock.clamp_step(self.pattern.length());
    }

    // ── Audio render ──────────────────────────────────────────────────────

    /// Produce the next mono output sample and advance the clock.
    pub fn generate_sample(&mut self) -> f32 {
        if self.playing {
            if std::mem::take(&mut self.fire_pending) {
                self.fire_step(self.clock.current_step);
            } else if self.clock.tick(self.pattern.length()) {
                self.fire_step(self.clock.current_step);
            }
        }

        let mut mix = 0.0f32;
        for v in &mut self.voices {
            mix += v.next_sample();
        }
        self.voices.retain(|v| !v.is_finished());

        mix.tanh()
    }

    /// Render and launch every note due at `step`. Fire-and-forget: each
    /// trigger becomes an independent voice, and an empty render is simply
    /// dropped.
    fn fire_step(&mut self, step: usize) {
        let step_secs = self.clock.step_secs(self.pattern.bpm);
        for trigger in collect_triggers(&self.pattern, &self.mix, step, step_secs) {
            let buffer = match trigger {
                Trigger::Tone { track, pitch, velocity, duration } => {
                    synth::render_note(track, pitch, velocity, duration, self.sample_rate)
                }
                Trigger::Drum { pitch, velocity } => {
                    self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                    drums::render(DrumKind::from_pitch(pitch), velocity, self.seed, self.sample_rate)
                }
            };
            if !buffer.is_empty() {
                self.voices.push(Voice::new(buffer));
            }
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Track;

    const SR: f32 = 44100.0;

    #[test]
    fn starting_playback_fires_the_current_step() {
        let mut e = Engine::new(SR);
        e.pattern.set(Track::Melody, 0, 0, 1);
        e.toggle_playback();
        assert_eq!(e.active_voices(), 0);
        e.generate_sample();
        assert_eq!(e.active_voices(), 1);
    }

    #[test]
    fn stopped_engine_never_triggers() {
        let mut e = Engine::new(SR);
        e.pattern.set(Track::Melody, 0, 0, 1);
        for _ in 0..1000 {
            e.generate_sample();
        }
        assert_eq!(e.active_voices(), 0);
    }

    #[test]
    fn muted_tracks_stay_silent() {
        let mut e = Engine::new(SR);
        e.pattern.set(Track::Rhythm, 0, 0, 1);
        e.mix.toggle_mute(Track::Rhythm);
        e.toggle_playback();
        e.generate_sample();
        assert_eq!(e.active_voices(), 0);
    }

    #[test]
    fn stopping_lets_voices_drain() {
        let mut e = Engine::new(SR);
        e.pattern.set(Track::Rhythm, 5, 0, 1);
        e.toggle_playback();
        e.generate_sample();
        assert_eq!(e.active_voices(), 1);
        e.toggle_playback();
        assert!(!e.playing);
        // The voice keeps sounding and eventually self-releases.
        assert_eq!(e.active_voices(), 1);
        let rimshot_len = (0.05 * SR).round() as usize;
        for _ in 0..rimshot_len + 1 {
            e.generate_sample();
        }
        assert_eq!(e.active_voices(), 0);
    }

    #[test]
    fn bpm_and_length_edits_clamp_and_keep_the_step() {
        let mut e = Engine::new(SR);
        e.set_bpm(300);
        assert_eq!(e.pattern.bpm, 240);
        e.set_bpm(10);
        assert_eq!(e.pattern.bpm, 40);
        e.set_pattern_length(100);
        assert_eq!(e.pattern.length(), 44);
        e.set_pattern_length(1);
        assert_eq!(e.pattern.length(), 8);
    }

    #[test]
    fn step_advances_across_a_full_period() {
        let mut e = Engine::new(SR);
        e.set_bpm(120);
        e.toggle_playback();
        // 44100 * 60 / (120 * 4) = 5512.5 → 5513 samples per step.
        for _ in 0..5514 {
            e.generate_sample();
        }
        assert_eq!(e.current_step(), 1);
    }

    #[test]
    fn output_is_bounded() {
        let mut e = Engine::new(SR);
        for pitch in 0..12 {
            e.pattern.set(Track::Rhythm, pitch, 0, 2);
            e.pattern.set(Track::Chords, pitch, 0, 2);
        }
        e.toggle_playback();
        for _ in 0..2000 {
            let s = e.generate_sample();
            assert!(s.abs() <= 1.0);
        }
    }
}
