use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::engine::Engine;
use crate::gesture::{self, GeneratedNote, GestureKind, GridPoint};
use crate::history::History;
use crate::pattern::Track;
use crate::save::{self, Settings};
use crate::scale::{Scale, NOTE_NAMES};

/// Holding a press this long before releasing commits the gesture as an
/// accent (velocity 2).
pub const HOLD_ACCENT: Duration = Duration::from_millis(400);

/// Second tap within this window (and within a cell of the first) erases
/// the step column.
pub const DOUBLE_TAP: Duration = Duration::from_millis(300);

pub fn hold_velocity(held: Duration) -> u8 {
    if held > HOLD_ACCENT { 2 } else { 1 }
}

// ── Gesture session ───────────────────────────────────────────────────────────

struct GestureSession {
    track:   Track,
    start:   GridPoint,
    current: GridPoint,
    began:   Instant,
}

struct TapStamp {
    at:    Instant,
    track: Track,
    pitch: i32,
    step:  i32,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Command surface between the input/presentation layer and the engine.
///
/// All pointer traffic flows through `start_gesture` / `update_gesture` /
/// `end_gesture`; everything else is a one-shot control edit. The engine
/// mutex is taken briefly per command, never held across commands.
pub struct App {
    pub engine: Arc<Mutex<Engine>>,
    pub status_msg:   String,
    pub last_gesture: Option<GestureKind>,
    pub show_ghosts:  bool,
    pub should_quit:  bool,
    /// Live interpretation of the drag in progress, for overlay rendering.
    pub preview: Vec<GeneratedNote>,

    session:  Option<GestureSession>,
    last_tap: Option<TapStamp>,
    history:  History,
    settings_path: PathBuf,
}

impl App {
    pub fn new(engine: Arc<Mutex<Engine>>) -> Self {
        let initial = engine.lock().unwrap().pattern.cells();
        Self {
            engine,
            status_msg:   String::new(),
            last_gesture: None,
            show_ghosts:  true,
            should_quit:  false,
            preview:      Vec::new(),
            session:  None,
            last_tap: None,
            history:  History::new(initial),
            settings_path: PathBuf::from(save::SETTINGS_FILE),
        }
    }

    // ── Settings ──────────────────────────────────────────────────────────

    pub fn load_settings(&mut self) {
        let s = save::load(&self.settings_path);
        let mut engine = self.engine.lock().unwrap();
        engine.set_bpm(s.bpm);
        engine.set_pattern_length(s.pattern_length);
        engine.pattern.scale = s.scale;
        engine.pattern.root = s.root;
        drop(engine);
        self.show_ghosts = s.show_ghosts;
    }

    fn save_settings(&self) {
        let engine = self.engine.lock().unwrap();
        let settings = Settings {
            bpm: engine.pattern.bpm,
            scale: engine.pattern.scale,
            root: engine.pattern.root,
            pattern_length: engine.pattern.length(),
            show_ghosts: self.show_ghosts,
        };
        drop(engine);
        // Fail-soft: a read-only directory costs persistence, not the session.
        let _ = save::store(&self.settings_path, &settings);
    }

    // ── Gestures ──────────────────────────────────────────────────────────

    pub fn start_gesture(&mut self, track: Track, pitch: i32, step: i32) {
        let now = Instant::now();

        // Double tap on (roughly) the same cell erases the step column.
        // One display row spans about two semitones, hence the pitch slack.
        let double_tap = self.last_tap.as_ref().is_some_and(|tap| {
            now.duration_since(tap.at) < DOUBLE_TAP
                && tap.track == track
                && (tap.step - step).abs() <= 1
                && (tap.pitch - pitch).abs() <= 2
        });
        if double_tap {
            self.last_tap = None;
            self.erase_step(track, step);
            return;
        }
        self.last_tap = Some(TapStamp { at: now, track, pitch, step });

        let point = GridPoint { pitch, step };
        self.session = Some(GestureSession { track, start: point, current: point, began: now });
        self.preview = vec![GeneratedNote { pitch, step, velocity: 1 }];
    }

    pub fn update_gesture(&mut self, track: Track, pitch: i32, step: i32) {
        let Some(session) = &mut self.session else { return };
        // Drags that stray onto another lane are ignored, not re-targeted.
        if session.track != track {
            return;
        }
        session.current = GridPoint { pitch, step };

        let velocity = hold_velocity(session.began.elapsed());
        let engine = self.engine.lock().unwrap();
        let (notes, _) = gesture::interpret(
            session.start,
            session.current,
            session.track,
            velocity,
            engine.pattern.scale,
            engine.pattern.root,
            engine.pattern.length(),
        );
        drop(engine);
        self.preview = notes;
    }

    pub fn end_gesture(&mut self) {
        let Some(session) = self.session.take() else {
            self.preview.clear();
            return;
        };
        let velocity = hold_velocity(session.began.elapsed());

        let mut engine = self.engine.lock().unwrap();
        let (notes, kind) = gesture::interpret(
            session.start,
            session.current,
            session.track,
            velocity,
            engine.pattern.scale,
            engine.pattern.root,
            engine.pattern.length(),
        );
        // List order is authoritative: later entries overwrite earlier ones.
        for note in &notes {
            engine.pattern.set(session.track, note.pitch, note.step, note.velocity);
        }
        let cells = engine.pattern.cells();
        drop(engine);

        self.history.push(cells);
        self.preview.clear();
        self.last_gesture = Some(kind);
        self.status_msg = kind.label().to_string();
    }

    /// The lane a drag is currently painting, if any.
    pub fn session_track(&self) -> Option<Track> {
        self.session.as_ref().map(|s| s.track)
    }

    // ── Transport and tempo ───────────────────────────────────────────────

    pub fn toggle_playback(&mut self) {
        let playing = self.engine.lock().unwrap().toggle_playback();
        self.status_msg = if playing { "Playing".to_string() } else { "Stopped".to_string() };
    }

    pub fn set_bpm(&mut self, bpm: u32) {
        let mut engine = self.engine.lock().unwrap();
        engine.set_bpm(bpm);
        let bpm = engine.pattern.bpm;
        drop(engine);
        self.save_settings();
        self.status_msg = format!("BPM: {bpm}");
    }

    pub fn adjust_bpm(&mut self, delta: i32) {
        let current = self.engine.lock().unwrap().pattern.bpm as i32;
        self.set_bpm((current + delta).max(0) as u32);
    }

    pub fn set_pattern_length(&mut self, steps: usize) {
        let mut engine = self.engine.lock().unwrap();
        engine.set_pattern_length(steps);
        let length = engine.pattern.length();
        drop(engine);
        self.save_settings();
        self.status_msg = format!("Length: {length}");
    }

    pub fn adjust_pattern_length(&mut self, delta: i32) {
        let current = self.engine.lock().unwrap().pattern.length() as i32;
        self.set_pattern_length((current + delta).max(0) as usize);
    }

    // ── Scale and root ────────────────────────────────────────────────────

    pub fn set_scale(&mut self, scale: Scale) {
        self.engine.lock().unwrap().pattern.scale = scale;
        self.save_settings();
        self.status_msg = format!("Scale: {}", scale.name());
    }

    pub fn cycle_scale(&mut self) {
        let next = self.engine.lock().unwrap().pattern.scale.next();
        self.set_scale(next);
    }

    pub fn set_root(&mut self, root: u8) {
        let root = root % 12;
        self.engine.lock().unwrap().pattern.root = root;
        self.save_settings();
        self.status_msg = format!("Root: {}", NOTE_NAMES[root as usize]);
    }

    pub fn cycle_root(&mut self) {
        let next = (self.engine.lock().unwrap().pattern.root + 1) % 12;
        self.set_root(next);
    }

    pub fn toggle_ghosts(&mut self) {
        self.show_ghosts = !self.show_ghosts;
        self.save_settings();
        self.status_msg = if self.show_ghosts {
            "Ghost notes on".to_string()
        } else {
            "Ghost notes off".to_string()
        };
    }

    // ── Pattern edits ─────────────────────────────────────────────────────

    pub fn clear_all(&mut self) {
        let mut engine = self.engine.lock().unwrap();
        engine.pattern.clear_all();
        let cells = engine.pattern.cells();
        drop(engine);
        self.history.push(cells);
        self.last_gesture = Some(GestureKind::Clear);
        self.status_msg = GestureKind::Clear.label().to_string();
    }

    pub fn erase_step(&mut self, track: Track, step: i32) {
        let mut engine = self.engine.lock().unwrap();
        engine.pattern.erase_step(track, step);
        let cells = engine.pattern.cells();
        drop(engine);
        self.history.push(cells);
        self.last_gesture = Some(GestureKind::Erase);
        self.status_msg = GestureKind::Erase.label().to_string();
    }

    pub fn toggle_mute(&mut self, track: Track) {
        let mut engine = self.engine.lock().unwrap();
        engine.mix.toggle_mute(track);
        let muted = engine.mix.is_muted(track);
        drop(engine);
        self.status_msg = format!("{} {}", track.name(), if muted { "muted" } else { "unmuted" });
    }

    pub fn toggle_solo(&mut self, track: Track) {
        let mut engine = self.engine.lock().unwrap();
        engine.mix.toggle_solo(track);
        let soloed = engine.mix.is_soloed(track);
        drop(engine);
        self.status_msg = if soloed {
            format!("{} solo", track.name())
        } else {
            "Solo off".to_string()
        };
    }

    // ── Undo / redo ───────────────────────────────────────────────────────

    pub fn undo(&mut self) {
        if let Some(cells) = self.history.undo() {
            self.engine.lock().unwrap().pattern.restore(&cells);
            self.status_msg = "Undo".to_string();
        }
    }

    pub fn redo(&mut self) {
        if let Some(cells) = self.history.redo() {
            self.engine.lock().unwrap().pattern.restore(&cells);
            self.status_msg = "Redo".to_string();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let engine = Arc::new(Mutex::new(Engine::new(44100.0)));
        let mut app = App::new(engine);
        // Keep tests from touching the real settings file.
        app.settings_path = std::env::temp_dir()
            .join(format!("gridbeat-app-test-{}.json", std::process::id()));
        app
    }

    fn velocity_at(app: &App, track: Track, pitch: i32, step: i32) -> u8 {
        app.engine.lock().unwrap().pattern.get(track, pitch, step)
    }

    #[test]
    fn hold_velocity_thresholds() {
        assert_eq!(hold_velocity(Duration::from_millis(0)), 1);
        assert_eq!(hold_velocity(Duration::from_millis(400)), 1);
        assert_eq!(hold_velocity(Duration::from_millis(401)), 2);
    }

    #[test]
    fn a_tap_commits_one_melody_note() {
        let mut app = app();
        app.start_gesture(Track::Melody, 0, 4);
        app.end_gesture();
        assert_eq!(velocity_at(&app, Track::Melody, 0, 4), 1);
        assert_eq!(app.last_gesture, Some(GestureKind::Tap));
    }

    #[test]
    fn drag_commits_the_full_production() {
        let mut app = app();
        app.start_gesture(Track::Bass, 0, 0);
        app.update_gesture(Track::Bass, 0, 4);
        app.end_gesture();
        // Walking bass: steps 0..4, pitches cycling 0,7,4,7,0.
        assert_eq!(velocity_at(&app, Track::Bass, 0, 0), 1);
        assert_eq!(velocity_at(&app, Track::Bass, 7, 1), 1);
        assert_eq!(velocity_at(&app, Track::Bass, 4, 2), 1);
        assert_eq!(app.last_gesture, Some(GestureKind::Walking));
    }

    #[test]
    fn updates_on_another_track_are_ignored() {
        let mut app = app();
        app.start_gesture(Track::Melody, 0, 0);
        app.update_gesture(Track::Bass, 0, 10);
        app.end_gesture();
        // The stray drag never registered: still a tap at the origin.
        assert_eq!(app.last_gesture, Some(GestureKind::Tap));
        assert_eq!(velocity_at(&app, Track::Bass, 0, 10), 0);
    }

    #[test]
    fn double_tap_erases_the_step_column() {
        let mut app = app();
        app.start_gesture(Track::Rhythm, 3, 6);
        app.end_gesture();
        assert_eq!(velocity_at(&app, Track::Rhythm, 3, 6), 1);

        // Second tap lands immediately, well inside the window.
        app.start_gesture(Track::Rhythm, 3, 6);
        assert_eq!(app.last_gesture, Some(GestureKind::Erase));
        assert_eq!(velocity_at(&app, Track::Rhythm, 3, 6), 0);
        // The echo hit two steps later survives: only the column is erased.
        assert_eq!(velocity_at(&app, Track::Rhythm, 3, 8), 1);
    }

    #[test]
    fn gesture_commits_can_be_undone_and_redone() {
        let mut app = app();
        app.start_gesture(Track::Melody, 0, 0);
        app.end_gesture();
        app.undo();
        assert_eq!(velocity_at(&app, Track::Melody, 0, 0), 0);
        app.redo();
        assert_eq!(velocity_at(&app, Track::Melody, 0, 0), 1);
    }

    #[test]
    fn bpm_and_length_clamp_at_the_surface() {
        let mut app = app();
        app.set_bpm(300);
        assert_eq!(app.engine.lock().unwrap().pattern.bpm, 240);
        app.set_bpm(10);
        assert_eq!(app.engine.lock().unwrap().pattern.bpm, 40);
        app.set_pattern_length(100);
        assert_eq!(app.engine.lock().unwrap().pattern.length(), 44);
        app.set_pattern_length(1);
        assert_eq!(app.engine.lock().unwrap().pattern.length(), 8);
        let _ = std::fs::remove_file(&app.settings_path);
    }

    #[test]
    fn clear_all_is_undoable() {
        let mut app = app();
        app.start_gesture(Track::Chords, 0, 0);
        app.end_gesture();
        app.clear_all();
        assert_eq!(velocity_at(&app, Track::Chords, 0, 0), 0);
        app.undo();
        assert_eq!(velocity_at(&app, Track::Chords, 0, 0), 1);
    }
}
