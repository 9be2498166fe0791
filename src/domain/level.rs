/// Level roster and the page/storage contract strings the challenges
/// are checked against. Strings are centralized here so the probes,
/// the simulated page, and the console all agree on them.

/// Storage challenge: key that must exist with [`STORAGE_VALUE`].
pub const STORAGE_KEY: &str = "puzzleKey";
pub const STORAGE_VALUE: &str = "unlocked";

/// Console challenge: the global function hidden on the page.
pub const SECRET_FUNCTION: &str = "secretFunction";

/// Event challenge: element and the global callback that must be
/// registered as its click handler.
pub const MYSTERY_BOX: &str = "mystery-box";
pub const MYSTERY_BOX_CALLBACK: &str = "mysteryBoxClick";
pub const MYSTERY_BOX_LOG: &str = "Box clicked!";

/// DOM challenge: the hidden element to discover.
pub const HIDDEN_BUTTON: &str = "hidden-button";

/// CSS challenge: attribute, its value, and the required background.
pub const PUZZLE_ATTR: &str = "data-puzzle";
pub const PUZZLE_ATTR_VALUE: &str = "level1";
pub const PUZZLE_COLOR: &str = "red";

/// One puzzle challenge. `completed` is the only mutable field and only
/// ever flips false → true within a session.
#[derive(Clone, Debug)]
pub struct Level {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub hint: &'static str,
    pub link: Option<&'static str>,
    pub completed: bool,
}

/// The fixed five-challenge roster, in solve order.
pub fn roster() -> Vec<Level> {
    vec![
        Level {
            id: 0,
            title: "Welcome, Challenger!",
            description: "Your first challenge: find the hidden button by inspecting the page",
            hint: "There are multiple ways to find it, even some that don't require \
                   inspecting elements if you *focus*",
            link: None,
            completed: false,
        },
        Level {
            id: 1,
            title: "CSS Selector Mastery",
            description: "Style all elements with the attribute data-puzzle='level1' \
                          to have a red background",
            hint: "style [data-puzzle=level1] background red",
            link: Some("https://developer.mozilla.org/en-US/docs/Web/API/Node/textContent"),
            completed: false,
        },
        Level {
            id: 2,
            title: "JavaScript Console Challenge",
            description: "Execute the secret function in the console",
            hint: "find the function that's attached to window",
            link: None,
            completed: false,
        },
        Level {
            id: 3,
            title: "Local Storage Secret",
            description: "Set a storage key 'puzzleKey' with value 'unlocked'",
            hint: "storage set <key> <value>",
            link: Some("https://developer.mozilla.org/en-US/docs/Web/API/Window/localStorage"),
            completed: false,
        },
        Level {
            id: 4,
            title: "Event Listener Challenge",
            description: "Add a click listener to the mystery box that logs 'Box clicked!'; \
                          the callback must be window.mysteryBoxClick",
            hint: "listen, then click",
            link: Some("https://developer.mozilla.org/en-US/docs/Web/API/EventTarget/addEventListener"),
            completed: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_has_five_levels_with_unique_ids() {
        let levels = roster();
        assert_eq!(levels.len(), 5);
        for (i, level) in levels.iter().enumerate() {
            assert_eq!(level.id, i as u32);
            assert!(!level.completed);
        }
    }
}
