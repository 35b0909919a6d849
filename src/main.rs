mod app;
mod audio;
mod drums;
mod engine;
mod gesture;
mod history;
mod pattern;
mod save;
mod scale;
mod sequencer;
mod synth;
mod ui;

use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use app::App;
use audio::AudioOutput;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use engine::Engine;
use pattern::Track;
use ratatui::{backend::CrosstermBackend, Terminal};

const SAMPLE_RATE: f32 = 44100.0;

fn main() -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let result = run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let engine = Arc::new(Mutex::new(Engine::new(SAMPLE_RATE)));
    let mut app = App::new(Arc::clone(&engine));
    app.load_settings();

    // Audio is best-effort: a headless box still gets a working editor.
    let _audio = match AudioOutput::new(Arc::clone(&engine)) {
        Ok(stream) => Some(stream),
        Err(e) => {
            app.status_msg = format!("audio unavailable: {e}");
            None
        }
    };

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') => break,

                        KeyCode::Char(' ') => app.toggle_playback(),
                        KeyCode::Up        => app.adjust_bpm(5),
                        KeyCode::Down      => app.adjust_bpm(-5),
                        KeyCode::Right     => app.adjust_pattern_length(1),
                        KeyCode::Left      => app.adjust_pattern_length(-1),
                        KeyCode::Tab       => app.cycle_scale(),
                        KeyCode::Char('r') => app.cycle_root(),
                        KeyCode::Char('g') => app.toggle_ghosts(),

                        KeyCode::Char('z') => app.undo(),
                        KeyCode::Char('y') => app.redo(),
                        KeyCode::Char('c') => app.clear_all(),

                        KeyCode::Char('1') => app.toggle_mute(Track::Melody),
                        KeyCode::Char('2') => app.toggle_mute(Track::Chords),
                        KeyCode::Char('3') => app.toggle_mute(Track::Bass),
                        KeyCode::Char('4') => app.toggle_mute(Track::Rhythm),
                        KeyCode::Char('!') => app.toggle_solo(Track::Melody),
                        KeyCode::Char('@') => app.toggle_solo(Track::Chords),
                        KeyCode::Char('#') => app.toggle_solo(Track::Bass),
                        KeyCode::Char('$') => app.toggle_solo(Track::Rhythm),

                        _ => {}
                    }
                }
                Event::Mouse(mouse) => {
                    let length = engine.lock().unwrap().pattern.length();
                    match mouse.kind {
                        MouseEventKind::Down(MouseButton::Left) => {
                            if let Some((track, pitch, step)) =
                                ui::hit_test(mouse.column, mouse.row, length)
                            {
                                app.start_gesture(track, pitch, step);
                            }
                        }
                        MouseEventKind::Drag(MouseButton::Left) => {
                            if let Some((track, pitch, step)) =
                                ui::hit_test(mouse.column, mouse.row, length)
                            {
                                app.update_gesture(track, pitch, step);
                            }
                        }
                        MouseEventKind::Up(MouseButton::Left) => app.end_gesture(),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
