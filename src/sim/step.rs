/// The tick function: advances the session by one tick.
///
/// Processing order:
///   1. Message timer
///   2. Storage poll (re-read the file on its interval)
///   3. Probe run (newly-true probes mark their levels complete)
///   4. Transition countdown (advance the challenge pane; open the
///      name prompt once everything is complete)
///
/// Everything runs on the game-loop thread; there is no other mutation
/// path, so sequencing is the only synchronization needed.

use crate::sim::event::SessionEvent;
use crate::sim::session::{GameSession, Phase};

pub fn tick(s: &mut GameSession) -> Vec<SessionEvent> {
    s.anim_tick = s.anim_tick.wrapping_add(1);

    if s.phase != Phase::Playing {
        return vec![];
    }
    s.tick += 1;

    if s.message_timer > 0 {
        s.message_timer -= 1;
        if s.message_timer == 0 {
            s.message.clear();
        }
    }

    // Storage poll: out-of-band edits to storage.dat count as solves.
    s.poll_countdown = s.poll_countdown.saturating_sub(1);
    if s.poll_countdown == 0 {
        s.store.reload();
        s.poll_countdown = s.poll_interval;
    }

    let events = s.run_probe_pass();

    resolve_transition(s);

    events
}

/// After the configured delay, move the challenge pane past the
/// just-completed level, or open the name prompt after the last one.
fn resolve_transition(s: &mut GameSession) {
    let Some(remaining) = s.pending_transition else { return };
    if remaining > 0 {
        s.pending_transition = Some(remaining - 1);
        return;
    }
    s.pending_transition = None;

    if s.tracker.all_complete() {
        s.phase = Phase::NamePrompt;
        return;
    }
    if let Some(level) = s.tracker.active_level() {
        let id = level.id;
        s.shown_level = s
            .tracker
            .levels()
            .iter()
            .position(|l| l.id == id)
            .unwrap_or(s.shown_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, TuningConfig};
    use crate::sim::storage::KeyStore;
    use std::path::PathBuf;

    fn test_config() -> GameConfig {
        GameConfig {
            tuning: TuningConfig {
                tick_rate_ms: 50,
                console_max_lines: 10,
                storage_poll_ms: 200, // 4 ticks
                transition_delay_ms: 100, // 2 ticks
            },
            template_file: "certificate-template.html".into(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("awardo-step-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("storage.dat");
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn storage_poll_detects_out_of_band_edits_on_its_cadence() {
        let path = temp_path("poll");
        let mut s = GameSession::with_store(&test_config(), KeyStore::at(path.clone()));
        s.start();

        std::fs::write(&path, "puzzleKey=unlocked\n").unwrap();

        // Poll interval is 4 ticks; the first three see nothing.
        for _ in 0..3 {
            assert!(tick(&mut s).is_empty());
        }
        let events = tick(&mut s);
        assert_eq!(events, vec![SessionEvent::LevelCompleted { id: 3 }]);
        assert!(s.tracker.is_complete(3));
    }

    #[test]
    fn ticking_without_signals_marks_nothing() {
        let path = temp_path("idle");
        let mut s = GameSession::with_store(&test_config(), KeyStore::at(path));
        s.start();
        for _ in 0..20 {
            assert!(tick(&mut s).is_empty());
        }
        assert_eq!(s.tracker.completed_count(), 0);
    }

    #[test]
    fn non_playing_phases_do_not_tick_the_session() {
        let path = temp_path("title");
        let mut s = GameSession::with_store(&test_config(), KeyStore::at(path.clone()));
        std::fs::write(&path, "puzzleKey=unlocked\n").unwrap();
        for _ in 0..10 {
            assert!(tick(&mut s).is_empty());
        }
        assert_eq!(s.tick, 0);
        assert_eq!(s.tracker.completed_count(), 0);
    }

    #[test]
    fn name_prompt_opens_after_the_transition_delay() {
        let path = temp_path("prompt");
        let mut s = GameSession::with_store(&test_config(), KeyStore::at(path));
        s.start();

        s.submit("focus");
        s.submit("focus");
        s.submit("style [data-puzzle=level1] background red");
        s.submit("call secretFunction");
        s.submit("storage set puzzleKey unlocked");
        s.submit("listen mystery-box mysteryBoxClick");
        s.submit("click mystery-box");
        assert!(s.tracker.all_complete());
        assert_eq!(s.phase, Phase::Playing);

        // Transition delay is 2 ticks.
        tick(&mut s);
        tick(&mut s);
        tick(&mut s);
        assert_eq!(s.phase, Phase::NamePrompt);
    }

    #[test]
    fn shown_level_advances_after_a_completion() {
        let path = temp_path("shown");
        let mut s = GameSession::with_store(&test_config(), KeyStore::at(path));
        s.start();
        assert_eq!(s.shown_level, 0);

        s.submit("inspect #hidden-button");
        for _ in 0..4 {
            tick(&mut s);
        }
        assert_eq!(s.shown_level, 1);
    }
}
