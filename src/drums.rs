use std::f32::consts::PI;

// ── Drum kind ─────────────────────────────────────────────────────────────────

/// The twelve timbres of the rhythm lane, one per pitch row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrumKind {
    Kick,
    Kick2,
    Tom,
    Snare,
    Snare2,
    Rimshot,
    Clap,
    ClosedHat,
    OpenHat,
    Crash,
    Ride,
    Cowbell,
}

impl DrumKind {
    pub const ALL: [DrumKind; 12] = [
        DrumKind::Kick,
        DrumKind::Kick2,
        DrumKind::Tom,
        DrumKind::Snare,
        DrumKind::Snare2,
        DrumKind::Rimshot,
        DrumKind::Clap,
        DrumKind::ClosedHat,
        DrumKind::OpenHat,
        DrumKind::Crash,
        DrumKind::Ride,
        DrumKind::Cowbell,
    ];

    /// Rhythm pitch row → timbre.
    pub fn from_pitch(pitch: usize) -> DrumKind {
        Self::ALL[pitch % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Kick      => "Kick",
            Self::Kick2     => "Kick2",
            Self::Tom       => "Tom",
            Self::Snare     => "Snare",
            Self::Snare2    => "Snare2",
            Self::Rimshot   => "Rim",
            Self::Clap      => "Clap",
            Self::ClosedHat => "C-Hat",
            Self::OpenHat   => "O-Hat",
            Self::Crash     => "Crash",
            Self::Ride      => "Ride",
            Self::Cowbell   => "Bell",
        }
    }

    fn duration(self) -> f32 {
        match self {
            Self::Kick | Self::Kick2 => 0.30,
            Self::Tom                => 0.25,
            Self::Snare | Self::Snare2 => 0.15,
            Self::Rimshot            => 0.05,
            Self::Clap               => 0.12,
            Self::ClosedHat          => 0.05,
            Self::OpenHat            => 0.25,
            Self::Crash              => 0.50,
            Self::Ride               => 0.40,
            Self::Cowbell            => 0.15,
        }
    }
}

// ── Noise ─────────────────────────────────────────────────────────────────────

/// Fast XOR-shift PRNG.  Returns values uniformly in [-1, 1].
#[inline(always)]
fn xorshift(state: &mut u32) -> f32 {
    *state ^= *state << 13;
    *state ^= *state >> 17;
    *state ^= *state << 5;
    (*state as i32 as f32) * (1.0 / i32::MAX as f32)
}

// ── Oscillator phase ──────────────────────────────────────────────────────────

/// Phase accumulator, normalised 0..1.
struct Phase(f32);

impl Phase {
    fn new() -> Self { Phase(0.0) }

    /// Return the current phase and advance by one sample at `freq`.
    #[inline]
    fn advance(&mut self, freq: f32, sample_rate: f32) -> f32 {
        let p = self.0;
        self.0 += freq / sample_rate;
        if self.0 >= 1.0 { self.0 -= 1.0; }
        p
    }
}

#[inline]
fn sine(p: f32) -> f32 {
    (p * 2.0 * PI).sin()
}

#[inline]
fn triangle(p: f32) -> f32 {
    4.0 * (p - 0.5).abs() - 1.0
}

#[inline]
fn square(p: f32) -> f32 {
    if (p * 2.0 * PI).sin() > 0.0 { 1.0 } else { -1.0 }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render one drum hit into a finished mono buffer.
///
/// Every timbre is an independent pure function over (t, seed); all share the
/// `0.15 × velocity` hit volume and an exponential-decay envelope. The seed
/// only flavours the noise-based timbres, so simultaneous hits can differ.
pub fn render(kind: DrumKind, velocity: u8, seed: u32, sample_rate: f32) -> Vec<f32> {
    let vol = 0.15 * velocity as f32;
    match kind {
        DrumKind::Kick      => kick(150.0, vol, sample_rate),
        DrumKind::Kick2     => kick(120.0, vol, sample_rate),
        DrumKind::Tom       => tom(vol, sample_rate),
        DrumKind::Snare     => snare(180.0, 1000.0, vol, seed, sample_rate),
        DrumKind::Snare2    => snare(200.0, 1500.0, vol, seed, sample_rate),
        DrumKind::Rimshot   => rimshot(vol, sample_rate),
        DrumKind::Clap      => clap(vol, seed, sample_rate),
        DrumKind::ClosedHat => hat(40.0, 0.4, vol, seed, sample_rate, DrumKind::ClosedHat),
        DrumKind::OpenHat   => hat(4.0, 0.35, vol, seed, sample_rate, DrumKind::OpenHat),
        DrumKind::Crash     => crash(vol, seed, sample_rate),
        DrumKind::Ride      => ride(vol, sample_rate),
        DrumKind::Cowbell   => cowbell(vol, sample_rate),
    }
}

fn frames(kind: DrumKind, sample_rate: f32) -> usize {
    (kind.duration() * sample_rate).round() as usize
}

// ── Individual drum synthesisers ──────────────────────────────────────────────

/// Exponential pitch sweep down to 30 Hz over the first 0.1 s.
fn kick(start_hz: f32, vol: f32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Kick, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut phase = Phase::new();
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let freq = start_hz * (30.0 / start_hz).powf(t / 0.1);
        let tone = sine(phase.advance(freq, sample_rate));
        let env = (-t * 10.0).exp();
        out.push(tone * vol * 1.5 * env);
    }
    out
}

fn tom(vol: f32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Tom, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut phase = Phase::new();
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let freq = 100.0 * (60.0f32 / 100.0).powf(t / 0.15);
        let tone = sine(phase.advance(freq, sample_rate));
        let env = (-t * 8.0).exp();
        out.push(tone * vol * env);
    }
    out
}

/// Filtered noise burst over a short tonal body.
fn snare(tone_hz: f32, filter_hz: f32, vol: f32, seed: u32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Snare, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut phase = Phase::new();
    let mut noise = seed | 1;
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let hiss = xorshift(&mut noise) * (filter_hz / 2000.0) * (-t * 15.0).exp() * 0.8;
        let body = sine(phase.advance(tone_hz, sample_rate)) * (-t * 25.0).exp() * 0.5;
        out.push((hiss + body) * vol);
    }
    out
}

fn rimshot(vol: f32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Rimshot, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut phase = Phase::new();
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let tone = triangle(phase.advance(800.0, sample_rate));
        out.push(tone * vol * 0.5 * (-t * 40.0).exp());
    }
    out
}

/// Three staggered noise bursts 15 ms apart, each with its own fast decay.
fn clap(vol: f32, seed: u32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Clap, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut noise = seed | 1;
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let mut sample = 0.0;
        for b in 0..3 {
            let burst = b as f32 * 0.015;
            if t >= burst && t < burst + 0.02 {
                sample += xorshift(&mut noise) * (-(t - burst) * 50.0).exp() * 0.6;
            }
        }
        out.push(sample * vol);
    }
    out
}

fn hat(decay: f32, level: f32, vol: f32, seed: u32, sample_rate: f32, kind: DrumKind) -> Vec<f32> {
    let n = frames(kind, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut noise = seed | 1;
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let filtered = xorshift(&mut noise) * 0.6;
        out.push(filtered * vol * level * (-t * decay).exp());
    }
    out
}

fn crash(vol: f32, seed: u32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Crash, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut noise = seed | 1;
    for i in 0..n {
        let t = i as f32 / sample_rate;
        out.push(xorshift(&mut noise) * 0.5 * vol * 0.5 * (-t * 4.0).exp());
    }
    out
}

/// Triangle and sine partials a tritone-and-change apart.
fn ride(vol: f32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Ride, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut p1 = Phase::new();
    let mut p2 = Phase::new();
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let osc1 = triangle(p1.advance(350.0, sample_rate));
        let osc2 = sine(p2.advance(620.0, sample_rate));
        out.push((osc1 + osc2) * 0.5 * vol * 0.25 * (-t * 5.0).exp());
    }
    out
}

/// Two detuned square waves, the classic clanky pair.
fn cowbell(vol: f32, sample_rate: f32) -> Vec<f32> {
    let n = frames(DrumKind::Cowbell, sample_rate);
    let mut out = Vec::with_capacity(n);
    let mut p1 = Phase::new();
    let mut p2 = Phase::new();
    for i in 0..n {
        let t = i as f32 / sample_rate;
        let sq1 = square(p1.advance(560.0, sample_rate));
        let sq2 = square(p2.advance(845.0, sample_rate));
        out.push((sq1 + sq2) * 0.5 * vol * 0.25 * (-t * 13.0).exp());
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 44100.0;

    fn peak(buf: &[f32]) -> f32 {
        buf.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn kick_buffer_spans_its_duration() {
        let buf = render(DrumKind::Kick, 1, 1, SR);
        assert_eq!(buf.len(), (0.3 * SR).round() as usize);
    }

    #[test]
    fn every_timbre_renders_its_duration() {
        for kind in DrumKind::ALL {
            let buf = render(kind, 1, 0xBEEF_CAFE, SR);
            assert_eq!(buf.len(), (kind.duration() * SR).round() as usize, "{:?}", kind);
            assert!(buf.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn kick_envelope_decays_exponentially() {
        let buf = render(DrumKind::Kick, 1, 1, SR);
        let head = peak(&buf[..buf.len() / 10]);
        let tail = peak(&buf[buf.len() * 9 / 10..]);
        // Head sits near exp(0), tail under exp(-2.7): the ratio bounds the
        // decay without depending on where the sine crosses zero.
        assert!(head > 0.05);
        assert!(tail < head * 0.15);
    }

    #[test]
    fn velocity_scales_hit_volume() {
        let soft = render(DrumKind::Cowbell, 1, 1, SR);
        let hard = render(DrumKind::Cowbell, 2, 1, SR);
        assert!((peak(&hard) / peak(&soft) - 2.0).abs() < 0.05);
    }

    #[test]
    fn clap_bursts_are_staggered() {
        let buf = render(DrumKind::Clap, 1, 0xBEEF_CAFE, SR);
        // The last burst window closes at 50 ms; everything after is silence.
        let first = peak(&buf[..(0.015 * SR) as usize]);
        let gap = peak(&buf[(0.051 * SR) as usize..(0.119 * SR) as usize]);
        assert!(first > 0.0);
        assert_eq!(gap, 0.0);
    }

    #[test]
    fn open_hat_rings_longer_than_closed() {
        let open = render(DrumKind::OpenHat, 1, 7, SR);
        let closed = render(DrumKind::ClosedHat, 1, 7, SR);
        assert!(open.len() > closed.len());
        // Closed hat is effectively silent long before the open hat is.
        let at_40ms = |b: &[f32]| peak(&b[(0.04 * SR) as usize..(0.045 * SR) as usize]);
        assert!(at_40ms(&closed) < at_40ms(&open));
    }

    #[test]
    fn seed_varies_noise_timbres() {
        let a = render(DrumKind::Snare, 1, 1, SR);
        let b = render(DrumKind::Snare, 1, 2, SR);
        assert_ne!(a, b);
    }

    #[test]
    fn pitch_rows_map_onto_the_kit_in_order() {
        assert_eq!(DrumKind::from_pitch(0), DrumKind::Kick);
        assert_eq!(DrumKind::from_pitch(2), DrumKind::Tom);
        assert_eq!(DrumKind::from_pitch(11), DrumKind::Cowbell);
    }
}
