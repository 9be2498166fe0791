/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::certificate;
use sim::event::SessionEvent;
use sim::session::{GameSession, Phase};
use sim::step;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    let mut session = GameSession::new(&config);

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Awardo!");
    println!(
        "Secrets collected: {}/{}",
        session.tracker.completed_count(),
        session.tracker.total()
    );
    if let Some(path) = &session.certificate_path {
        println!("Your certificate: {}", path.display());
    }
}

fn game_loop(
    session: &mut GameSession,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.tuning.tick_rate_ms);

    // Player-typed text: console command while playing, name at the prompt.
    let mut input_line = String::new();
    let mut started = false;
    let mut konami = KonamiTracker::new();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }

        match session.phase {
            // ── Title Screen ──
            Phase::Title => {
                if kb.was_pressed(KeyCode::Enter) {
                    if started {
                        // Back from Esc: resume where the player left off.
                        session.phase = Phase::Playing;
                    } else {
                        session.start();
                        started = true;
                    }
                } else if kb.any_pressed(&[KeyCode::Char('n'), KeyCode::Char('N')]) {
                    // Fresh session: flags are monotonic, so a restart
                    // means a new tracker, page, and console.
                    *session = GameSession::new(config);
                    session.start();
                    started = true;
                } else if kb.any_pressed(&[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc]) {
                    break;
                }
            }

            // ── Playing: typed console ──
            Phase::Playing => {
                if kb.was_pressed(KeyCode::Esc) {
                    // Session state is kept; Enter on the title resumes.
                    input_line.clear();
                    session.phase = Phase::Title;
                } else {
                    for &c in kb.typed_chars() {
                        input_line.push(c);
                    }
                    if kb.was_pressed(KeyCode::Backspace) {
                        input_line.pop();
                    }
                    if kb.was_pressed(KeyCode::Enter) {
                        let line = std::mem::take(&mut input_line);
                        let events = session.submit(&line);
                        process_sound_events(sound, &events);
                    }
                    if konami.advance(kb.presses()) {
                        // The trailing 'b' 'a' of the code also landed in
                        // the input line; take them back out.
                        if input_line.ends_with("ba") || input_line.ends_with("BA") {
                            input_line.truncate(input_line.len() - 2);
                        }
                        let events = session.reveal_hints();
                        process_sound_events(sound, &events);
                    }
                }
            }

            // ── Name Prompt ──
            Phase::NamePrompt => {
                for &c in kb.typed_chars() {
                    if input_line.chars().count() < 40 {
                        input_line.push(c);
                    }
                }
                if kb.was_pressed(KeyCode::Backspace) {
                    input_line.pop();
                }
                if kb.was_pressed(KeyCode::Enter) {
                    let name = std::mem::take(&mut input_line);
                    finalize_certificate(session, config, name.trim());
                }
            }

            // ── Certificate ──
            Phase::Certificate => {
                if kb.any_pressed(&[KeyCode::Enter, KeyCode::Esc]) {
                    session.phase = Phase::Title;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::tick(session);
            process_sound_events(sound, &events);
            last_tick = Instant::now();
        }

        renderer.render(session, &input_line)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Generate the prize, write it to disk, and open the certificate screen.
fn finalize_certificate(session: &mut GameSession, config: &GameConfig, name: &str) {
    let name = if name.is_empty() { "Anonymous Challenger" } else { name };
    session.player_name = name.to_string();

    let date = chrono::Local::now().format("%Y-%m-%d").to_string();
    let cert = certificate::generate(
        &config.template_file,
        &date,
        session.tracker.completed_count(),
        name,
    );
    if let certificate::TemplateSource::Embedded { reason } = &cert.source {
        session.console.push(format!("using built-in template ({reason})"));
        session.certificate_note = reason.clone();
    }

    match certificate::save_certificate(&cert.html) {
        Ok(path) => {
            session.console.push(format!("certificate written: {}", path.display()));
            session.certificate_path = Some(path);
        }
        Err(e) => {
            // The on-screen certificate still shows; only the file is lost.
            session.console.push(e.clone());
            session.certificate_note = e;
        }
    }

    session.phase = Phase::Certificate;
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[SessionEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            SessionEvent::LevelCompleted { .. } => sfx.play_complete(),
            SessionEvent::AllLevelsCompleted => sfx.play_fanfare(),
            SessionEvent::CommandFailed => sfx.play_error(),
            SessionEvent::KonamiUnlocked => sfx.play_konami(),
        }
    }
}

/// Tracks progress through the cheat-code sequence across frames.
struct KonamiTracker {
    progress: usize,
}

impl KonamiTracker {
    fn new() -> Self {
        KonamiTracker { progress: 0 }
    }

    /// Feed this frame's presses; true when the full code just landed.
    fn advance(&mut self, presses: &[KeyCode]) -> bool {
        for &press in presses {
            let press = normalize(press);
            if press == config::KONAMI_CODE[self.progress] {
                self.progress += 1;
                if self.progress == config::KONAMI_CODE.len() {
                    self.progress = 0;
                    return true;
                }
            } else if press == config::KONAMI_CODE[0] {
                self.progress = 1;
            } else {
                self.progress = 0;
            }
        }
        false
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}
