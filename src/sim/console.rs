/// The in-game developer console: command grammar and the capped
/// output log. Execution lives in the session, which owns the page,
/// the store, and the tracker; this module only parses and logs.

/// `storage` subcommands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageCmd {
    Set { key: String, value: String },
    Get(String),
    Remove(String),
    List,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Inspect(String),
    Focus,
    Style { selector: String, property: String, value: String },
    Call(String),
    Window,
    Storage(StorageCmd),
    Listen { element: String, callback: String },
    Click(String),
    Hint,
    Levels,
    Help,
    Clear,
    Empty,
    Unknown(String),
}

/// Tolerant, whitespace-split parsing. Verbs are case-insensitive;
/// arguments keep their case (selectors and keys are case-sensitive).
pub fn parse(input: &str) -> Command {
    let mut words = input.split_whitespace();
    let verb = match words.next() {
        Some(v) => v.to_ascii_lowercase(),
        None => return Command::Empty,
    };
    let rest: Vec<&str> = words.collect();

    match verb.as_str() {
        "inspect" if rest.len() == 1 => Command::Inspect(rest[0].to_string()),
        "focus" if rest.is_empty() => Command::Focus,
        "style" if rest.len() >= 3 => Command::Style {
            selector: rest[0].to_string(),
            property: rest[1].to_string(),
            // Multi-word values like `rgb(255, 0, 0)` rejoin here.
            value: rest[2..].join(" "),
        },
        "call" if rest.len() == 1 => {
            // `call secretFunction()` and `call secretFunction` both work.
            let name = rest[0].trim_end_matches("()");
            Command::Call(name.to_string())
        }
        "window" if rest.is_empty() => Command::Window,
        "storage" => parse_storage(&rest),
        "listen" if rest.len() == 2 => Command::Listen {
            element: rest[0].trim_start_matches('#').to_string(),
            callback: rest[1].to_string(),
        },
        "click" if rest.len() == 1 => {
            Command::Click(rest[0].trim_start_matches('#').to_string())
        }
        "hint" if rest.is_empty() => Command::Hint,
        "levels" if rest.is_empty() => Command::Levels,
        "help" if rest.is_empty() => Command::Help,
        "clear" if rest.is_empty() => Command::Clear,
        _ => Command::Unknown(input.trim().to_string()),
    }
}

fn parse_storage(rest: &[&str]) -> Command {
    match rest {
        ["set", key, value @ ..] if !value.is_empty() => Command::Storage(StorageCmd::Set {
            key: key.to_string(),
            value: value.join(" "),
        }),
        ["get", key] => Command::Storage(StorageCmd::Get(key.to_string())),
        ["remove", key] => Command::Storage(StorageCmd::Remove(key.to_string())),
        ["list"] | [] => Command::Storage(StorageCmd::List),
        _ => Command::Unknown(format!("storage {}", rest.join(" "))),
    }
}

pub const HELP_LINES: &[&str] = &[
    "inspect <sel>          examine elements (#id or [attr=value])",
    "focus                  move focus to the next focusable element",
    "style <sel> <prop> <v> set a style on every match",
    "call <name>            invoke a global function",
    "window                 list the globals attached to the page",
    "storage set|get|remove|list",
    "listen <el> <callback> register a click handler",
    "click <el>             click an element",
    "hint / levels / help / clear",
];

/// Output log, capped at the configured maximum line count; the oldest
/// lines scroll off.
pub struct Console {
    lines: Vec<String>,
    max_lines: usize,
}

impl Console {
    pub fn new(max_lines: usize) -> Self {
        Console { lines: Vec::new(), max_lines: max_lines.max(1) }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        let overflow = self.lines.len().saturating_sub(self.max_lines);
        if overflow > 0 {
            self.lines.drain(..overflow);
        }
    }

    pub fn push_all<I: IntoIterator<Item = String>>(&mut self, lines: I) {
        for line in lines {
            self.push(line);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_verb_parses() {
        assert_eq!(parse("inspect #hidden-button"), Command::Inspect("#hidden-button".into()));
        assert_eq!(parse("focus"), Command::Focus);
        assert_eq!(
            parse("style [data-puzzle=level1] background red"),
            Command::Style {
                selector: "[data-puzzle=level1]".into(),
                property: "background".into(),
                value: "red".into(),
            }
        );
        assert_eq!(parse("call secretFunction()"), Command::Call("secretFunction".into()));
        assert_eq!(parse("call secretFunction"), Command::Call("secretFunction".into()));
        assert_eq!(parse("window"), Command::Window);
        assert_eq!(
            parse("storage set puzzleKey unlocked"),
            Command::Storage(StorageCmd::Set { key: "puzzleKey".into(), value: "unlocked".into() })
        );
        assert_eq!(parse("storage get puzzleKey"), Command::Storage(StorageCmd::Get("puzzleKey".into())));
        assert_eq!(parse("storage remove puzzleKey"), Command::Storage(StorageCmd::Remove("puzzleKey".into())));
        assert_eq!(parse("storage list"), Command::Storage(StorageCmd::List));
        assert_eq!(parse("storage"), Command::Storage(StorageCmd::List));
        assert_eq!(
            parse("listen #mystery-box mysteryBoxClick"),
            Command::Listen { element: "mystery-box".into(), callback: "mysteryBoxClick".into() }
        );
        assert_eq!(parse("click mystery-box"), Command::Click("mystery-box".into()));
        assert_eq!(parse("hint"), Command::Hint);
        assert_eq!(parse("levels"), Command::Levels);
        assert_eq!(parse("help"), Command::Help);
        assert_eq!(parse("clear"), Command::Clear);
        assert_eq!(parse("   "), Command::Empty);
    }

    #[test]
    fn verbs_are_case_insensitive_but_arguments_are_not() {
        assert_eq!(parse("CALL secretFunction"), Command::Call("secretFunction".into()));
        // Storage subcommands are case-sensitive like other arguments.
        assert!(matches!(parse("STORAGE SET k v"), Command::Unknown(_)));
    }

    #[test]
    fn multi_word_style_values_rejoin() {
        assert_eq!(
            parse("style #card-1 background rgb(255, 0, 0)"),
            Command::Style {
                selector: "#card-1".into(),
                property: "background".into(),
                value: "rgb(255, 0, 0)".into(),
            }
        );
    }

    #[test]
    fn bad_arity_is_unknown() {
        assert!(matches!(parse("inspect"), Command::Unknown(_)));
        assert!(matches!(parse("style #a background"), Command::Unknown(_)));
        assert!(matches!(parse("listen mystery-box"), Command::Unknown(_)));
        assert!(matches!(parse("frobnicate"), Command::Unknown(_)));
    }

    #[test]
    fn log_is_capped_at_max_lines() {
        let mut console = Console::new(3);
        for i in 0..5 {
            console.push(format!("line {i}"));
        }
        assert_eq!(console.lines(), ["line 2", "line 3", "line 4"]);
        console.clear();
        assert!(console.lines().is_empty());
    }
}
