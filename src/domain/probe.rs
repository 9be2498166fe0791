/// Detection probes: each observes one page/storage signal and reports a
/// boolean. Signals are read through the injected `SignalSource`
/// capability so the probe/tracker logic tests without a terminal host.
///
/// Probe evaluation is side-effect-free on tracked state; the runner is
/// the one place a newly-true probe turns into `mark_complete`.

use crate::domain::level;
use crate::domain::tracker::{CompletionTracker, TrackerError};

/// What the probes can observe of the host.
///
/// A source that cannot observe a signal simply answers false/None;
/// probes never raise errors toward the tracker.
pub trait SignalSource {
    /// Has the designated hidden element been located or interacted with?
    fn hidden_element_observed(&self, element: &str) -> bool;

    /// Do ALL elements carrying `attr=value` have the given background?
    /// False when no element carries the attribute.
    fn all_have_background(&self, attr: &str, value: &str, color: &str) -> bool;

    /// How many times has the named global been invoked this session?
    fn global_invocations(&self, name: &str) -> u32;

    /// Current value of a storage key, if present.
    fn storage_value(&self, key: &str) -> Option<String>;

    /// Has a click on `element` dispatched the named global callback?
    fn click_dispatched(&self, element: &str, callback: &str) -> bool;
}

/// The observable condition a probe waits for.
#[derive(Clone, Debug)]
pub enum Signal {
    HiddenElement { element: &'static str },
    Background { attr: &'static str, value: &'static str, color: &'static str },
    GlobalCall { name: &'static str },
    StorageKey { key: &'static str, expected: &'static str },
    ClickListener { element: &'static str, callback: &'static str },
}

#[derive(Clone, Debug)]
pub struct Probe {
    pub level_id: u32,
    pub signal: Signal,
}

impl Probe {
    /// Evaluate against the source. Idempotent: without new external
    /// action, two evaluations yield the same boolean.
    pub fn satisfied(&self, src: &dyn SignalSource) -> bool {
        match &self.signal {
            Signal::HiddenElement { element } => src.hidden_element_observed(element),
            Signal::Background { attr, value, color } => {
                src.all_have_background(attr, value, color)
            }
            Signal::GlobalCall { name } => src.global_invocations(name) > 0,
            Signal::StorageKey { key, expected } => {
                src.storage_value(key).as_deref() == Some(*expected)
            }
            Signal::ClickListener { element, callback } => {
                src.click_dispatched(element, callback)
            }
        }
    }
}

/// The five probes wired to the standard roster.
pub fn standard_probes() -> Vec<Probe> {
    vec![
        Probe {
            level_id: 0,
            signal: Signal::HiddenElement { element: level::HIDDEN_BUTTON },
        },
        Probe {
            level_id: 1,
            signal: Signal::Background {
                attr: level::PUZZLE_ATTR,
                value: level::PUZZLE_ATTR_VALUE,
                color: level::PUZZLE_COLOR,
            },
        },
        Probe {
            level_id: 2,
            signal: Signal::GlobalCall { name: level::SECRET_FUNCTION },
        },
        Probe {
            level_id: 3,
            signal: Signal::StorageKey {
                key: level::STORAGE_KEY,
                expected: level::STORAGE_VALUE,
            },
        },
        Probe {
            level_id: 4,
            signal: Signal::ClickListener {
                element: level::MYSTERY_BOX,
                callback: level::MYSTERY_BOX_CALLBACK,
            },
        },
    ]
}

/// Evaluate all probes and mark newly-true ones complete, exactly once
/// per level. Returns the level ids that transitioned this run.
///
/// An `UnknownLevel` error means a probe references a level the tracker
/// doesn't have — a wiring bug, surfaced to the caller.
pub fn run_probes(
    probes: &[Probe],
    src: &dyn SignalSource,
    tracker: &mut CompletionTracker,
) -> Result<Vec<u32>, TrackerError> {
    let mut newly = Vec::new();
    for probe in probes {
        if tracker.is_complete(probe.level_id) {
            continue;
        }
        if probe.satisfied(src) {
            tracker.mark_complete(probe.level_id)?;
            newly.push(probe.level_id);
        }
    }
    Ok(newly)
}
