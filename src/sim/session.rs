/// GameSession: the complete state of a running challenge session.
///
/// Owns the tracker, the probes, the simulated page, the key/value
/// store, and the console. Commands are executed here; the per-tick
/// update (timers, storage poll, probe run) lives in `step`.

use crate::config::GameConfig;
use crate::domain::probe::{self, Probe, SignalSource};
use crate::domain::tracker::CompletionTracker;
use crate::sim::console::{self, Command, Console, StorageCmd};
use crate::sim::event::SessionEvent;
use crate::sim::page::{Page, Selector};
use crate::sim::storage::KeyStore;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Title,
    Playing,
    NamePrompt,
    Certificate,
}

/// The capability surface the probes read: page signals plus storage.
pub struct HostSignals<'a> {
    pub page: &'a Page,
    pub store: &'a KeyStore,
}

impl SignalSource for HostSignals<'_> {
    fn hidden_element_observed(&self, element: &str) -> bool {
        // Only one hidden element exists on this page.
        let _ = element;
        self.page.hidden_observed()
    }

    fn all_have_background(&self, attr: &str, value: &str, color: &str) -> bool {
        self.page.all_have_background(attr, value, color)
    }

    fn global_invocations(&self, name: &str) -> u32 {
        self.page.invocations(name)
    }

    fn storage_value(&self, key: &str) -> Option<String> {
        self.store.get(key).map(|v| v.to_string())
    }

    fn click_dispatched(&self, element: &str, callback: &str) -> bool {
        self.page.dispatched(element, callback)
    }
}

pub struct GameSession {
    pub phase: Phase,

    // ── Core ──
    pub tracker: CompletionTracker,
    probes: Vec<Probe>,

    // ── Host collaborators ──
    pub page: Page,
    pub store: KeyStore,
    pub console: Console,

    // ── Timers (in ticks) ──
    pub tick: u64,
    pub anim_tick: u32,
    pub(crate) poll_interval: u64,
    pub(crate) poll_countdown: u64,
    pub(crate) transition_delay: u64,
    /// Countdown between a completion and the challenge pane advancing
    /// (or, after the last level, the name prompt opening).
    pub(crate) pending_transition: Option<u64>,
    pub(crate) all_announced: bool,

    // ── UI-facing ──
    /// Index of the challenge currently highlighted in the pane.
    pub shown_level: usize,
    pub hints_revealed: bool,
    pub player_name: String,
    pub message: String,
    pub message_timer: u32,

    // ── Certificate outcome (set when the prize is generated) ──
    pub certificate_path: Option<std::path::PathBuf>,
    /// Non-empty when the embedded template stood in for the file.
    pub certificate_note: String,
}

/// Convert a millisecond tunable to whole ticks, at least one.
fn ms_to_ticks(ms: u64, tick_rate_ms: u64) -> u64 {
    (ms / tick_rate_ms.max(1)).max(1)
}

impl GameSession {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_store(config, KeyStore::open())
    }

    /// Session over an explicit store (tests use a temp-dir store).
    pub fn with_store(config: &GameConfig, store: KeyStore) -> Self {
        let tick_rate = config.tuning.tick_rate_ms;
        let poll_interval = ms_to_ticks(config.tuning.storage_poll_ms, tick_rate);
        GameSession {
            phase: Phase::Title,
            tracker: CompletionTracker::new(),
            probes: probe::standard_probes(),
            page: Page::new(),
            store,
            console: Console::new(config.tuning.console_max_lines),
            tick: 0,
            anim_tick: 0,
            poll_interval,
            poll_countdown: poll_interval,
            transition_delay: ms_to_ticks(config.tuning.transition_delay_ms, tick_rate),
            pending_transition: None,
            all_announced: false,
            shown_level: 0,
            hints_revealed: false,
            player_name: String::new(),
            message: String::new(),
            message_timer: 0,
            certificate_path: None,
            certificate_note: String::new(),
        }
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }

    /// Start play: greet the challenger on the console.
    pub fn start(&mut self) {
        self.phase = Phase::Playing;
        self.console.push("Welcome to the Awardo Frontend Puzzle Challenge.");
        self.console.push("Type 'help' for the console verbs, 'hint' when stuck.");
    }

    /// Konami payoff: every hint at once.
    pub fn reveal_hints(&mut self) -> Vec<SessionEvent> {
        if self.hints_revealed {
            return vec![];
        }
        self.hints_revealed = true;
        self.console.push("~ cheat code accepted: all hints revealed ~");
        self.set_message("All hints revealed!", 40);
        vec![SessionEvent::KonamiUnlocked]
    }

    /// Execute one console command. Returns the events it produced,
    /// including any completions detected by the event-driven probe run.
    pub fn submit(&mut self, input: &str) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let cmd = console::parse(input);
        if cmd == Command::Empty {
            return events;
        }
        self.console.push(format!("> {}", input.trim()));

        let mut failed = false;
        match cmd {
            Command::Empty => {}
            Command::Inspect(sel) => match Selector::parse(&sel) {
                Some(selector) => {
                    let lines = self.page.inspect(&selector);
                    self.console.push_all(lines);
                }
                None => {
                    self.console.push(format!("invalid selector '{sel}' (use #id or [attr=value])"));
                    failed = true;
                }
            },
            Command::Focus => match self.page.focus_next() {
                Some(el) => {
                    let line = format!("focus moved to #{} ({})", el.id, el.label);
                    self.console.push(line);
                }
                None => self.console.push("nothing on this page is focusable"),
            },
            Command::Style { selector, property, value } => match Selector::parse(&selector) {
                Some(sel) => {
                    if property.eq_ignore_ascii_case("background")
                        || property.eq_ignore_ascii_case("background-color")
                    {
                        let n = self.page.set_background(&sel, &value);
                        if n == 0 {
                            self.console.push(format!("no element matches {selector}"));
                            failed = true;
                        } else {
                            self.console.push(format!("styled {n} element(s)"));
                        }
                    } else {
                        self.console
                            .push(format!("'{property}' has no visible effect on this page"));
                    }
                }
                None => {
                    self.console.push(format!("invalid selector '{selector}'"));
                    failed = true;
                }
            },
            Command::Call(name) => match self.page.call_global(&name) {
                Ok(output) => self.console.push(output),
                Err(e) => {
                    self.console.push(e);
                    failed = true;
                }
            },
            Command::Window => {
                for global in self.page.globals() {
                    self.console.push(format!("window.{}  [function]", global.name));
                }
            }
            Command::Storage(cmd) => failed = self.exec_storage(cmd),
            Command::Listen { element, callback } => {
                match self.page.add_listener(&element, &callback) {
                    Ok(()) => self
                        .console
                        .push(format!("listener registered: #{element} -> {callback}")),
                    Err(e) => {
                        self.console.push(e);
                        failed = true;
                    }
                }
            }
            Command::Click(element) => match self.page.click(&element) {
                Ok(lines) => {
                    self.console.push(format!("click: #{element}"));
                    self.console.push_all(lines);
                }
                Err(e) => {
                    self.console.push(e);
                    failed = true;
                }
            },
            Command::Hint => self.exec_hint(),
            Command::Levels => {
                for level in self.tracker.levels() {
                    let mark = if level.completed { "[x]" } else { "[ ]" };
                    self.console.push(format!("{mark} {}  {}", level.id, level.title));
                }
            }
            Command::Help => {
                for line in console::HELP_LINES {
                    self.console.push(*line);
                }
            }
            Command::Clear => self.console.clear(),
            Command::Unknown(cmd) => {
                self.console.push(format!("unknown command: {cmd} (try 'help')"));
                failed = true;
            }
        }

        if failed {
            events.push(SessionEvent::CommandFailed);
        }
        // Event-driven probe pass so completions land immediately.
        events.extend(self.run_probe_pass());
        events
    }

    fn exec_storage(&mut self, cmd: StorageCmd) -> bool {
        match cmd {
            StorageCmd::Set { key, value } => match self.store.set(&key, &value) {
                Ok(()) => {
                    self.console.push(format!("storage: {key} = {value}"));
                    false
                }
                Err(e) => {
                    self.console.push(e);
                    true
                }
            },
            StorageCmd::Get(key) => {
                match self.store.get(&key) {
                    Some(value) => self.console.push(format!("{key} = {value}")),
                    None => self.console.push(format!("{key} is not set")),
                }
                false
            }
            StorageCmd::Remove(key) => match self.store.remove(&key) {
                Ok(()) => {
                    self.console.push(format!("storage: removed {key}"));
                    false
                }
                Err(e) => {
                    self.console.push(e);
                    true
                }
            },
            StorageCmd::List => {
                if self.store.entries().is_empty() {
                    self.console.push("storage is empty");
                } else {
                    let lines: Vec<String> = self
                        .store
                        .entries()
                        .iter()
                        .map(|(k, v)| format!("{k} = {v}"))
                        .collect();
                    self.console.push_all(lines);
                }
                false
            }
        }
    }

    fn exec_hint(&mut self) {
        if self.hints_revealed {
            let lines: Vec<String> = self
                .tracker
                .levels()
                .iter()
                .map(|l| format!("{}: {}", l.id, l.hint))
                .collect();
            self.console.push_all(lines);
            return;
        }
        match self.tracker.active_level() {
            Some(level) => {
                let line = format!("hint: {}", level.hint);
                self.console.push(line);
                if let Some(link) = self.tracker.active_level().and_then(|l| l.link) {
                    self.console.push(format!("see: {link}"));
                }
            }
            None => self.console.push("all challenges complete - nothing left to hint"),
        }
    }

    /// Evaluate all probes and fold newly-true ones into events.
    /// Shared by the tick pipeline and command submission.
    pub(crate) fn run_probe_pass(&mut self) -> Vec<SessionEvent> {
        let signals = HostSignals { page: &self.page, store: &self.store };
        let newly = match probe::run_probes(&self.probes, &signals, &mut self.tracker) {
            Ok(ids) => ids,
            Err(e) => {
                // A probe referencing an unknown level is a wiring bug;
                // surface it loudly on the console.
                self.console.push(format!("probe fault: {e}"));
                return vec![SessionEvent::CommandFailed];
            }
        };

        let mut events = Vec::new();
        for id in newly {
            if let Some(level) = self.tracker.level(id) {
                let title = level.title;
                self.console.push(format!("*** challenge complete: {title} ***"));
                self.set_message(&format!("Secret collected: {title}"), 60);
            }
            events.push(SessionEvent::LevelCompleted { id });
            self.pending_transition = Some(self.transition_delay);
        }

        if self.tracker.all_complete() && !self.all_announced {
            self.all_announced = true;
            self.console.push("*** ALL CHALLENGES COMPLETE ***");
            self.set_message("All secrets collected!", 80);
            self.pending_transition = Some(self.transition_delay);
            events.push(SessionEvent::AllLevelsCompleted);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GameConfig, TuningConfig};
    use std::path::PathBuf;

    fn test_config() -> GameConfig {
        GameConfig {
            tuning: TuningConfig {
                tick_rate_ms: 50,
                console_max_lines: 10,
                storage_poll_ms: 1000,
                transition_delay_ms: 1000,
            },
            template_file: "certificate-template.html".into(),
        }
    }

    fn temp_store(name: &str) -> (KeyStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("awardo-session-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("storage.dat");
        let _ = std::fs::remove_file(&path);
        (KeyStore::at(path.clone()), path)
    }

    fn session(name: &str) -> GameSession {
        let (store, _) = temp_store(name);
        let mut s = GameSession::with_store(&test_config(), store);
        s.start();
        s
    }

    fn completed(events: &[SessionEvent]) -> Vec<u32> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::LevelCompleted { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn full_playthrough_completes_all_levels() {
        let mut s = session("playthrough");

        // Level 0: focus cycling finds the hidden button.
        let mut done = vec![];
        done.extend(completed(&s.submit("focus")));
        done.extend(completed(&s.submit("focus")));
        assert_eq!(done, vec![0]);

        // Level 1: style all puzzle cards red.
        let ev = s.submit("style [data-puzzle=level1] background red");
        assert_eq!(completed(&ev), vec![1]);

        // Level 2: call the secret function.
        let ev = s.submit("call secretFunction()");
        assert_eq!(completed(&ev), vec![2]);

        // Level 3: the storage key.
        let ev = s.submit("storage set puzzleKey unlocked");
        assert_eq!(completed(&ev), vec![3]);

        // Level 4: listener, then click.
        assert!(completed(&s.submit("listen #mystery-box mysteryBoxClick")).is_empty());
        let ev = s.submit("click mystery-box");
        assert_eq!(completed(&ev), vec![4]);
        assert!(ev.contains(&SessionEvent::AllLevelsCompleted));
        assert!(s.tracker.all_complete());
        assert!(s.console.lines().iter().any(|l| l.contains("Box clicked!")));
    }

    #[test]
    fn inspect_also_solves_the_first_level() {
        let mut s = session("inspect");
        let ev = s.submit("inspect #hidden-button");
        assert_eq!(completed(&ev), vec![0]);
    }

    #[test]
    fn wrong_storage_value_does_not_complete() {
        let mut s = session("wrong-value");
        let ev = s.submit("storage set puzzleKey locked");
        assert!(completed(&ev).is_empty());
        let ev = s.submit("storage set puzzleKey unlocked");
        assert_eq!(completed(&ev), vec![3]);
    }

    #[test]
    fn click_without_listener_does_not_complete() {
        let mut s = session("no-listener");
        assert!(completed(&s.submit("click mystery-box")).is_empty());
        s.submit("listen #mystery-box mysteryBoxClick");
        assert_eq!(completed(&s.submit("click mystery-box")), vec![4]);
    }

    #[test]
    fn unknown_command_fails_without_side_effects() {
        let mut s = session("unknown");
        let ev = s.submit("frobnicate everything");
        assert!(ev.contains(&SessionEvent::CommandFailed));
        assert_eq!(s.tracker.completed_count(), 0);
    }

    #[test]
    fn hint_follows_the_active_level_and_konami_reveals_all() {
        let mut s = session("hints");
        s.submit("hint");
        assert!(s.console.lines().iter().any(|l| l.contains("*focus*")));

        let ev = s.reveal_hints();
        assert_eq!(ev, vec![SessionEvent::KonamiUnlocked]);
        s.submit("clear");
        s.submit("hint");
        // All five hints listed once revealed; the cap is 10, hints are 5+echo.
        assert!(s.console.lines().iter().any(|l| l.contains("addEventListener") || l.contains("listen")));
        // Revealing twice is a no-op.
        assert!(s.reveal_hints().is_empty());
    }

    #[test]
    fn all_complete_is_announced_exactly_once() {
        let mut s = session("announce");
        s.submit("focus");
        s.submit("focus");
        s.submit("style [data-puzzle=level1] background red");
        s.submit("call secretFunction");
        s.submit("storage set puzzleKey unlocked");
        s.submit("listen mystery-box mysteryBoxClick");
        let ev = s.submit("click mystery-box");
        assert!(ev.contains(&SessionEvent::AllLevelsCompleted));
        // Further commands never announce again.
        let ev = s.submit("levels");
        assert!(!ev.contains(&SessionEvent::AllLevelsCompleted));
    }
}
