use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::drums::DrumKind;
use crate::engine::Engine;
use crate::pattern::Track;
use crate::scale::NOTE_NAMES;

// ── Layout geometry ───────────────────────────────────────────────────────────

const TITLE_H:  u16 = 3;
const STATUS_H: u16 = 3;
/// First grid column inside a track panel (after the border).
const GRID_X: u16 = 1;

/// Lane display heights, top to bottom. Rows compress the 12 pitches the
/// same way the pointer hit-test expands them, so what you click is what
/// you painted.
const LANES: [(Track, u16); 4] = [
    (Track::Melody, 6),
    (Track::Chords, 6),
    (Track::Bass,   4),
    (Track::Rhythm, 4),
];

fn track_color(track: Track) -> Color {
    match track {
        Track::Melody => Color::Yellow,
        Track::Chords => Color::Cyan,
        Track::Bass   => Color::Blue,
        Track::Rhythm => Color::Red,
    }
}

/// Base pitch shown on one display row of a lane `h` rows tall.
fn row_pitch(local: u16, h: u16) -> i32 {
    (((h - 1 - local) as f32 / (h - 1) as f32) * 11.0).round() as i32
}

/// Map a terminal cell to (track, pitch, step). Geometry mirrors `draw`.
pub fn hit_test(col: u16, row: u16, length: usize) -> Option<(Track, i32, i32)> {
    if col < GRID_X {
        return None;
    }
    let step = (col - GRID_X) as i32;
    if step >= length as i32 {
        return None;
    }
    let mut top = TITLE_H + 1;
    for (track, h) in LANES {
        if row >= top && row < top + h {
            return Some((track, row_pitch(row - top, h), step));
        }
        top += h + 2;
    }
    None
}

// ── Top-level drawing ─────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let engine = app.engine.lock().unwrap();
    let area = f.area();

    let mut constraints = vec![Constraint::Length(TITLE_H)];
    for (_, h) in LANES {
        constraints.push(Constraint::Length(h + 2));
    }
    constraints.push(Constraint::Length(STATUS_H));
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_title(f, chunks[0], app, &engine);
    for (i, (track, _)) in LANES.iter().enumerate() {
        draw_lane(f, chunks[i + 1], app, &engine, *track);
    }
    draw_status(f, chunks[5], app);
    draw_help(f, chunks[6]);
}

// ── Title bar ─────────────────────────────────────────────────────────────────

fn draw_title(f: &mut Frame, area: Rect, app: &App, engine: &Engine) {
    let transport = if engine.playing { "▶ playing" } else { "■ stopped" };
    let text = format!(
        "  gridbeat  ─  {}  ─  {} bpm  ─  {} {}  ─  {} steps  ─  ghosts {}  ─  voices {}",
        transport,
        engine.pattern.bpm,
        NOTE_NAMES[engine.pattern.root as usize],
        engine.pattern.scale.name(),
        engine.pattern.length(),
        if app.show_ghosts { "on" } else { "off" },
        engine.active_voices(),
    );
    f.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

// ── Track lanes ───────────────────────────────────────────────────────────────

fn draw_lane(f: &mut Frame, area: Rect, app: &App, engine: &Engine, track: Track) {
    let muted = engine.mix.is_muted(track);
    let mut title = format!(" {} ", track.name());
    if engine.mix.is_soloed(track) {
        title.push_str("[solo] ");
    } else if engine.mix.mute_flag(track) {
        title.push_str("[mute] ");
    }

    let border = if muted {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(track_color(track))
    };
    let block = Block::default().title(title).borders(Borders::ALL).border_style(border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let h = LANES.iter().find(|(t, _)| *t == track).map(|(_, h)| *h).unwrap_or(4);
    let length = engine.pattern.length();
    let playhead = engine.playing.then(|| engine.current_step());
    let previewing = app.session_track() == Some(track);

    let mut lines: Vec<Line> = Vec::with_capacity(h as usize);
    for local in 0..h.min(inner.height) {
        let base = row_pitch(local, h);
        let mut spans: Vec<Span> = Vec::with_capacity(length);
        for step in 0..length {
            spans.push(cell_span(app, engine, track, base, step, playhead, previewing, muted));
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

/// Velocity of the first occupied pitch within ±1 of `base`, scanning from
/// below, matching how the pointer maps a row back onto pitches.
fn window_velocity(engine: &Engine, track: Track, base: i32, step: usize) -> u8 {
    for pitch in (base - 1).max(0)..=(base + 1).min(11) {
        let v = engine.pattern.get(track, pitch, step as i32);
        if v > 0 {
            return v;
        }
    }
    0
}

#[allow(clippy::too_many_arguments)]
fn cell_span(
    app: &App,
    engine: &Engine,
    track: Track,
    base: i32,
    step: usize,
    playhead: Option<usize>,
    previewing: bool,
    muted: bool,
) -> Span<'static> {
    let color = if muted { Color::DarkGray } else { track_color(track) };

    // Drag preview paints over everything on its own lane.
    if previewing {
        let hit = app
            .preview
            .iter()
            .rev()
            .find(|n| n.step == step as i32 && (n.pitch - base).abs() <= 1);
        if let Some(note) = hit {
            let style = Style::default().fg(Color::White);
            let style = if note.velocity > 1 { style.add_modifier(Modifier::BOLD) } else { style };
            return Span::styled("▓", style);
        }
    }

    let velocity = window_velocity(engine, track, base, step);
    let (ch, mut style) = match velocity {
        1 => ("█", Style::default().fg(color)),
        2 => ("█", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        3 => ("░", Style::default().fg(color)),
        _ => {
            if app.show_ghosts {
                if let Some(other) = ghost_track(engine, track, base, step) {
                    ("·", Style::default().fg(track_color(other)))
                } else {
                    beat_marker(step)
                }
            } else {
                beat_marker(step)
            }
        }
    };
    if playhead == Some(step) {
        style = style.bg(Color::DarkGray);
    }
    Span::styled(ch, style)
}

/// Another lane occupying this pitch window, for ghost-note shading.
fn ghost_track(engine: &Engine, track: Track, base: i32, step: usize) -> Option<Track> {
    Track::ALL
        .into_iter()
        .filter(|&other| other != track)
        .find(|&other| window_velocity(engine, other, base, step) > 0)
}

fn beat_marker(step: usize) -> (&'static str, Style) {
    if step % 4 == 0 {
        ("·", Style::default().fg(Color::DarkGray))
    } else {
        (" ", Style::default())
    }
}

// ── Status and help ───────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    f.render_widget(
        Paragraph::new(format!("  {}", app.status_msg))
            .block(Block::default().title(" Status ").borders(Borders::ALL)),
        area,
    );
}

fn draw_help(f: &mut Frame, area: Rect) {
    let kit: Vec<&str> = DrumKind::ALL.iter().map(|k| k.name()).collect();
    let lines = vec![
        Line::from("  Mouse: drag on a lane to paint; hold before dragging for accent/sustain,"),
        Line::from("  double-click a cell to erase that step column."),
        Line::from("  Space play/stop   ↑/↓ bpm   ←/→ length   Tab scale   r root   g ghosts"),
        Line::from("  z undo   y redo   c clear   1-4 mute   !@#$ solo   q quit"),
        Line::from(format!("  Rhythm rows, low to high: {}", kit.join(" "))),
    ];
    f.render_widget(
        Paragraph::new(lines).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
