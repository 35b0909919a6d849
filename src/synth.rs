use std::f32::consts::PI;

use crate::pattern::Track;

// ── Waveform ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaveType { Sine, Triangle, Sawtooth }

/// Per-track voicing: waveform, low-pass cutoff (Hz), base MIDI note for
/// pitch index 0.
fn tone_params(track: Track) -> Option<(WaveType, f32, i32)> {
    match track {
        Track::Melody => Some((WaveType::Sine, 2000.0, 60)),
        Track::Chords => Some((WaveType::Triangle, 1500.0, 48)),
        Track::Bass   => Some((WaveType::Sawtooth, 400.0, 36)),
        Track::Rhythm => None, // rhythm pitches are drum timbres, not tones
    }
}

// ── Tonal rendering ───────────────────────────────────────────────────────────

/// Render one tonal note into a finished mono buffer.
///
/// Amplitude scales with the velocity code, a one-pole-ish factor
/// `min(1, cutoff / 4f)` stands in for a real low-pass, and the envelope is
/// a linear attack and release around a flat middle.
pub fn render_note(
    track: Track,
    pitch: usize,
    velocity: u8,
    duration: f32,
    sample_rate: f32,
) -> Vec<f32> {
    let Some((wave, cutoff, base_midi)) = tone_params(track) else {
        return Vec::new();
    };

    let freq = note_to_freq(base_midi + pitch as i32);
    let amp = 0.08 * velocity as f32;
    let filter = (cutoff / (freq * 4.0)).min(1.0);
    let attack = if duration > 0.2 { 0.02 } else { 0.01 };
    let release = (duration * 0.3).min(0.15);

    let frames = (duration * sample_rate).round() as usize;
    let mut out = Vec::with_capacity(frames);
    let mut phase = 0.0f32;
    for i in 0..frames {
        let t = i as f32 / sample_rate;
        let sample = match wave {
            WaveType::Sine     => (phase * 2.0 * PI).sin(),
            WaveType::Triangle => 4.0 * (phase - 0.5).abs() - 1.0,
            WaveType::Sawtooth => 2.0 * phase - 1.0,
        };
        let env = if t < attack {
            t / attack
        } else if t > duration - release {
            ((duration - t) / release).max(0.0)
        } else {
            1.0
        };
        out.push(sample * filter * amp * env);

        phase += freq / sample_rate;
        if phase >= 1.0 { phase -= 1.0; }
    }
    out
}

// ── Helpers ───────────────────────────────────────────────────────────────────

pub fn note_to_freq(note: i32) -> f32 {
    440.0 * 2f32.powf((note as f32 - 69.0) / 12.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    #[test]
    fn buffer_length_matches_duration() {
        let buf = render_note(Track::Melody, 0, 1, 0.5, SR);
        assert_eq!(buf.len(), (0.5 * SR).round() as usize);
    }

    #[test]
    fn rhythm_renders_nothing() {
        assert!(render_note(Track::Rhythm, 0, 1, 0.3, SR).is_empty());
    }

    #[test]
    fn amplitude_scales_with_velocity() {
        let quiet = render_note(Track::Melody, 0, 1, 0.3, SR);
        let loud = render_note(Track::Melody, 0, 2, 0.3, SR);
        let peak = |b: &[f32]| b.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let (pq, pl) = (peak(&quiet), peak(&loud));
        assert!(pq > 0.0);
        assert!((pl / pq - 2.0).abs() < 0.05);
    }

    #[test]
    fn attack_starts_from_silence() {
        let buf = render_note(Track::Bass, 0, 2, 0.5, SR);
        assert_eq!(buf[0], 0.0);
        // Attack is 0.02 s for long notes; the first millisecond stays small.
        let early = buf[..44].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let body = buf[1000..2000].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(early < body);
    }

    #[test]
    fn release_fades_to_silence() {
        let buf = render_note(Track::Chords, 4, 1, 0.4, SR);
        let tail = buf[buf.len() - 20..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < 0.01);
    }

    #[test]
    fn bass_cutoff_attenuates_high_pitches() {
        // Bass cutoff is 400 Hz; C2 is ~65 Hz so 4f ≈ 262 < 400 passes
        // unattenuated, while higher pitches shrink.
        let low = render_note(Track::Bass, 0, 1, 0.3, SR);
        let high = render_note(Track::Bass, 11, 1, 0.3, SR);
        let peak = |b: &[f32]| b.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak(&high) < peak(&low));
    }

    #[test]
    fn note_to_freq_matches_concert_pitch() {
        assert!((note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((note_to_freq(60) - 261.626).abs() < 0.01);
    }
}
