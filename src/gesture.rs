use crate::pattern::Track;
use crate::scale::{self, Scale, MAJ7};

// ── Classification ────────────────────────────────────────────────────────────

/// What a drag turned out to mean, for feedback display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Tap,
    Accent,
    Arpeggio,
    Run,
    Walking,
    Roll,
    Stack,
    Multi,
    Fifth,
    Phrase,
    Fill,
    Sustain,
    Erase,
    Clear,
}

impl GestureKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Tap      => "TAP",
            Self::Accent   => "ACCENT!",
            Self::Arpeggio => "ARPEGGIO",
            Self::Run      => "RUN",
            Self::Walking  => "WALK",
            Self::Roll     => "ROLL",
            Self::Stack    => "CHORD",
            Self::Multi    => "MULTI",
            Self::Fifth    => "ROOT+5",
            Self::Phrase   => "PHRASE",
            Self::Fill     => "FILL",
            Self::Sustain  => "SUSTAIN",
            Self::Erase    => "ERASE",
            Self::Clear    => "CLEARED!",
        }
    }
}

// ── Points and output ─────────────────────────────────────────────────────────

/// A cell address on the gesture grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPoint {
    pub pitch: i32,
    pub step:  i32,
}

/// One note produced by interpretation, not yet committed to the pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratedNote {
    pub pitch:    i32,
    pub step:     i32,
    pub velocity: u8,
}

#[inline]
fn wrap(step: i32, length: usize) -> i32 {
    step.rem_euclid(length as i32)
}

// ── Interpreter ───────────────────────────────────────────────────────────────

/// Expand a start/end point pair into the notes it stands for.
///
/// Pure and deterministic: the same arguments always yield the same ordered
/// list and classification. When two entries target the same cell, the later
/// one wins at commit time.
///
/// Classification, in priority order: tap (movement within one cell),
/// horizontal (|dx| dominates by 1.3×), vertical (|dy| dominates by 1.3×),
/// diagonal (everything else).
pub fn interpret(
    start: GridPoint,
    end: GridPoint,
    track: Track,
    velocity: u8,
    scale: Scale,
    root: u8,
    length: usize,
) -> (Vec<GeneratedNote>, GestureKind) {
    let dx = end.step - start.step;
    let dy = end.pitch - start.pitch;
    let adx = dx.abs();
    let ady = dy.abs();

    let notes = scale::scale_notes(scale, root);
    let mut out = Vec::new();

    if adx <= 1 && ady <= 1 {
        let kind = tap(&mut out, start, track, velocity, scale, &notes, length);
        return (out, kind);
    }

    if adx as f32 > ady as f32 * 1.3 {
        let kind = horizontal(&mut out, start, dx, dy, track, velocity, scale, &notes, length);
        return (out, kind);
    }

    if ady as f32 > adx as f32 * 1.3 {
        let kind = vertical(&mut out, start, end, track, velocity);
        return (out, kind);
    }

    let kind = diagonal(&mut out, start, end, dx, dy, track, velocity, &notes, length);
    (out, kind)
}

fn push(out: &mut Vec<GeneratedNote>, pitch: i32, step: i32, velocity: u8) {
    out.push(GeneratedNote { pitch, step, velocity });
}

// ── Tap ───────────────────────────────────────────────────────────────────────

fn tap(
    out: &mut Vec<GeneratedNote>,
    start: GridPoint,
    track: Track,
    velocity: u8,
    scale: Scale,
    notes: &[u8],
    length: usize,
) -> GestureKind {
    match track {
        Track::Rhythm => {
            // One hit plus an echo two steps later when it still fits.
            push(out, start.pitch, start.step, velocity);
            if start.step + 2 < length as i32 {
                push(out, start.pitch, start.step + 2, 1);
            }
        }
        Track::Bass => {
            push(out, start.pitch, start.step, velocity);
            push(out, (start.pitch + 7).rem_euclid(12), start.step, 1);
        }
        Track::Chords => {
            for &interval in scale::triad(scale) {
                push(out, (start.pitch + interval as i32).rem_euclid(12), start.step, velocity);
            }
        }
        Track::Melody => {
            push(out, scale::snap_to_scale(start.pitch as u8, notes) as i32, start.step, velocity);
        }
    }
    if velocity > 1 { GestureKind::Accent } else { GestureKind::Tap }
}

// ── Horizontal ────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn horizontal(
    out: &mut Vec<GeneratedNote>,
    start: GridPoint,
    dx: i32,
    dy: i32,
    track: Track,
    velocity: u8,
    scale: Scale,
    notes: &[u8],
    length: usize,
) -> GestureKind {
    let direction = if dx > 0 { 1 } else { -1 };
    let count = dx.abs().min(8);

    // A held press dragged sideways lays down one sustained note: accent at
    // the origin, continuation markers on every following step.
    if velocity > 1 && track != Track::Rhythm {
        let pitches: Vec<i32> = if track == Track::Chords {
            scale::triad(scale)
                .iter()
                .map(|&i| (start.pitch + i as i32).rem_euclid(12))
                .collect()
        } else {
            vec![scale::snap_to_scale(start.pitch as u8, notes) as i32]
        };
        for i in 0..=count {
            let step = wrap(start.step + i * direction, length);
            for &pitch in &pitches {
                push(out, pitch, step, if i == 0 { 2 } else { 3 });
            }
        }
        return GestureKind::Sustain;
    }

    match track {
        Track::Chords => {
            for i in 0..=count {
                let interval = MAJ7[i as usize % MAJ7.len()] as i32;
                let step = wrap(start.step + i * direction, length);
                push(out, (start.pitch + interval).rem_euclid(12), step,
                     if i == 0 { velocity } else { 1 });
            }
            GestureKind::Arpeggio
        }
        Track::Bass => {
            const WALK: [i32; 4] = [0, 7, 4, 7];
            for i in 0..=count {
                let interval = WALK[i as usize % WALK.len()];
                let step = wrap(start.step + i * direction, length);
                push(out, (start.pitch + interval).rem_euclid(12), step,
                     if i % 2 == 0 { velocity } else { 1 });
            }
            GestureKind::Walking
        }
        Track::Rhythm => {
            for i in 0..=count {
                let step = wrap(start.step + i * direction, length);
                push(out, start.pitch, step,
                     if i == 0 || i == count { velocity } else { 1 });
            }
            GestureKind::Roll
        }
        Track::Melody => {
            let base = scale::scale_index_of(start.pitch as u8, notes) as i32;
            let scale_dir = if dy >= 0 { 1 } else { -1 };
            for i in 0..=count {
                let idx = (base + i * scale_dir).rem_euclid(notes.len() as i32);
                let step = wrap(start.step + i * direction, length);
                push(out, notes[idx as usize] as i32, step,
                     if i == 0 { velocity } else { 1 });
            }
            GestureKind::Run
        }
    }
}

// ── Vertical ──────────────────────────────────────────────────────────────────

fn vertical(
    out: &mut Vec<GeneratedNote>,
    start: GridPoint,
    end: GridPoint,
    track: Track,
    velocity: u8,
) -> GestureKind {
    match track {
        Track::Chords | Track::Melody => {
            let span = (end.pitch - start.pitch).abs().min(MAJ7.len() as i32 - 1);
            for i in 0..=span {
                push(out, (start.pitch + MAJ7[i as usize] as i32).rem_euclid(12),
                     start.step, velocity);
            }
            GestureKind::Stack
        }
        Track::Bass => {
            push(out, start.pitch, start.step, velocity);
            push(out, (start.pitch + 5).rem_euclid(12), start.step, 1);
            GestureKind::Fifth
        }
        Track::Rhythm => {
            let lo = start.pitch.min(end.pitch);
            let hi = start.pitch.max(end.pitch);
            for pitch in lo..=hi {
                push(out, pitch, start.step, velocity);
            }
            GestureKind::Multi
        }
    }
}

// ── Diagonal ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn diagonal(
    out: &mut Vec<GeneratedNote>,
    start: GridPoint,
    end: GridPoint,
    dx: i32,
    dy: i32,
    track: Track,
    velocity: u8,
    notes: &[u8],
    length: usize,
) -> GestureKind {
    match track {
        Track::Melody | Track::Chords => {
            // A phrase walks the scale along the drag, half a scale degree
            // per pitch row. Steps that land outside the pattern are dropped.
            let steps = dx.abs().max(dy.abs());
            let base = scale::scale_index_of(start.pitch as u8, notes) as i32;
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                let step = (start.step as f32 + dx as f32 * t).round() as i32;
                let offset = (dy as f32 * t / 2.0).round() as i32;
                let idx = (base + offset).rem_euclid(notes.len() as i32);
                if step >= 0 && step < length as i32 {
                    push(out, notes[idx as usize] as i32, step,
                         if i == 0 { velocity } else { 1 });
                }
            }
            GestureKind::Phrase
        }
        Track::Bass | Track::Rhythm => {
            let lo_s = start.step.min(end.step);
            let hi_s = start.step.max(end.step);
            let lo_p = start.pitch.min(end.pitch);
            let hi_p = start.pitch.max(end.pitch);
            for step in lo_s..=hi_s {
                let t = if hi_s == lo_s {
                    0.0
                } else {
                    (step - lo_s) as f32 / (hi_s - lo_s) as f32
                };
                let pitch = (lo_p as f32 + (hi_p - lo_p) as f32 * t).round() as i32;
                push(out, pitch, step, velocity);
            }
            GestureKind::Fill
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
