/// Input state tracker.
///
/// This game is typed, not steered: commands go into the console line
/// character by character, with a handful of edge-triggered control
/// keys (Enter, Esc, Backspace, arrows for the cheat code). So the
/// tracker drains terminal events once per frame and exposes:
///   - the fresh key presses of that frame (edge-triggered)
///   - the printable characters typed, in order

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

pub struct InputState {
    /// Key codes pressed during the most recent drain_events() call.
    presses: Vec<KeyCode>,
    /// Printable characters typed this frame, in order.
    typed: Vec<char>,
    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            typed: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.typed.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    self.raw_events.push(key);
                    self.presses.push(key.code);
                    if let KeyCode::Char(c) = key.code {
                        // Ctrl-chords are commands, not text.
                        if !key.modifiers.contains(KeyModifiers::CONTROL) {
                            self.typed.push(c);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Was this key pressed this frame?
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.presses.contains(&code)
    }

    /// Convenience: was any of these keys pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// All key codes pressed this frame, in arrival order.
    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    /// Printable characters typed this frame, in arrival order.
    pub fn typed_chars(&self) -> &[char] {
        &self.typed
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }
}
