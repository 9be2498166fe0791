/// The simulated challenge page: a small fixed element tree the player
/// manipulates through the in-game console.
///
/// The roster is fixed — a hidden button,
/// three cards carrying `data-puzzle="level1"`, a mystery box, and some
/// inert chrome. State the probes read: hidden-element observation,
/// per-element backgrounds, global invocation counts, and which clicks
/// dispatched which callbacks.

use crate::domain::level;

#[derive(Clone, Debug)]
pub struct Element {
    pub id: &'static str,
    pub tag: &'static str,
    pub label: &'static str,
    pub hidden: bool,
    pub focusable: bool,
    pub attrs: Vec<(&'static str, &'static str)>,
    pub background: Option<String>,
}

impl Element {
    fn new(id: &'static str, tag: &'static str, label: &'static str) -> Self {
        Element {
            id,
            tag,
            label,
            hidden: false,
            focusable: false,
            attrs: vec![],
            background: None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }
}

/// A globally reachable function on the page.
#[derive(Clone, Debug)]
pub struct Global {
    pub name: &'static str,
    pub invoked: u32,
}

/// `#id` or `[attr=value]` (quotes around the value optional).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Attr { name: String, value: String },
}

impl Selector {
    pub fn parse(s: &str) -> Option<Selector> {
        let s = s.trim();
        if let Some(id) = s.strip_prefix('#') {
            if id.is_empty() { return None; }
            return Some(Selector::Id(id.to_string()));
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (name, value) = inner.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if name.trim().is_empty() || value.is_empty() { return None; }
            return Some(Selector::Attr {
                name: name.trim().to_string(),
                value: value.to_string(),
            });
        }
        None
    }

    fn matches(&self, el: &Element) -> bool {
        match self {
            Selector::Id(id) => el.id == id,
            Selector::Attr { name, value } => el.attr(name) == Some(value.as_str()),
        }
    }
}

pub struct Page {
    elements: Vec<Element>,
    focus: Option<usize>,
    hidden_observed: bool,
    globals: Vec<Global>,
    /// (element id, callback name) pairs registered via `listen`.
    listeners: Vec<(String, String)>,
    /// (element id, callback name) pairs that actually fired on a click.
    dispatches: Vec<(String, String)>,
}

impl Page {
    pub fn new() -> Self {
        let mut hidden_button = Element::new(level::HIDDEN_BUTTON, "button", "Claim your prize");
        hidden_button.hidden = true;
        hidden_button.focusable = true;

        let card = |id: &'static str, label: &'static str| {
            let mut el = Element::new(id, "div", label);
            el.attrs.push((level::PUZZLE_ATTR, level::PUZZLE_ATTR_VALUE));
            el
        };

        let mut mystery_box = Element::new(level::MYSTERY_BOX, "div", "??? Mystery Box ???");
        mystery_box.focusable = true;

        Page {
            elements: vec![
                Element::new("header", "h1", "Awardo Frontend Puzzle Challenge"),
                Element::new("intro", "p", "Five challenges stand between you and the certificate."),
                hidden_button,
                card("card-1", "Puzzle Card I"),
                card("card-2", "Puzzle Card II"),
                card("card-3", "Puzzle Card III"),
                mystery_box,
                Element::new("footer", "p", "Awardo Frontend Academy"),
            ],
            focus: None,
            hidden_observed: false,
            globals: vec![
                Global { name: level::SECRET_FUNCTION, invoked: 0 },
                Global { name: level::MYSTERY_BOX_CALLBACK, invoked: 0 },
            ],
            listeners: vec![],
            dispatches: vec![],
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn focused(&self) -> Option<&Element> {
        self.focus.map(|i| &self.elements[i])
    }

    /// Advance focus to the next focusable element, wrapping around.
    /// Landing on the hidden button counts as observing it — the trick
    /// behind the first challenge.
    pub fn focus_next(&mut self) -> Option<&Element> {
        let total = self.elements.len();
        if !self.elements.iter().any(|e| e.focusable) {
            return None;
        }
        let start = self.focus.map(|i| i + 1).unwrap_or(0);
        for offset in 0..total {
            let idx = (start + offset) % total;
            if self.elements[idx].focusable {
                self.focus = Some(idx);
                if self.elements[idx].id == level::HIDDEN_BUTTON {
                    self.hidden_observed = true;
                }
                return Some(&self.elements[idx]);
            }
        }
        None
    }

    /// Inspect matching elements: one description line each. Inspecting
    /// the hidden button reveals it.
    pub fn inspect(&mut self, selector: &Selector) -> Vec<String> {
        let matches: Vec<usize> = self.select(selector);
        if matches.is_empty() {
            return vec![format!("no element matches {}", selector_text(selector))];
        }
        let mut lines = Vec::with_capacity(matches.len());
        for idx in matches {
            if self.elements[idx].id == level::HIDDEN_BUTTON {
                self.hidden_observed = true;
            }
            lines.push(describe(&self.elements[idx]));
        }
        lines
    }

    fn select(&self, selector: &Selector) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| selector.matches(el))
            .map(|(i, _)| i)
            .collect()
    }

    /// Apply a background color to every match. Returns how many
    /// elements were styled.
    pub fn set_background(&mut self, selector: &Selector, color: &str) -> usize {
        let color = normalize_color(color);
        let matches = self.select(selector);
        for &idx in &matches {
            self.elements[idx].background = Some(color.clone());
        }
        matches.len()
    }

    pub fn globals(&self) -> &[Global] {
        &self.globals
    }

    /// Invoke a global by name. Unknown names are reference errors.
    pub fn call_global(&mut self, name: &str) -> Result<String, String> {
        match self.globals.iter_mut().find(|g| g.name == name) {
            Some(g) => {
                g.invoked += 1;
                let output = match g.name {
                    level::SECRET_FUNCTION => "You found the secret function. Well done.".to_string(),
                    level::MYSTERY_BOX_CALLBACK => level::MYSTERY_BOX_LOG.to_string(),
                    other => format!("{other} returned undefined"),
                };
                Ok(output)
            }
            None => Err(format!("ReferenceError: {name} is not defined")),
        }
    }

    /// Register a global callback as a click handler on an element.
    pub fn add_listener(&mut self, element_id: &str, callback: &str) -> Result<(), String> {
        if !self.elements.iter().any(|e| e.id == element_id) {
            return Err(format!("no element with id '{element_id}'"));
        }
        if !self.globals.iter().any(|g| g.name == callback) {
            return Err(format!("ReferenceError: {callback} is not defined"));
        }
        let entry = (element_id.to_string(), callback.to_string());
        if !self.listeners.contains(&entry) {
            self.listeners.push(entry);
        }
        Ok(())
    }

    /// Click an element: every registered listener on it fires its
    /// callback. Returns the log lines the callbacks produced.
    pub fn click(&mut self, element_id: &str) -> Result<Vec<String>, String> {
        if !self.elements.iter().any(|e| e.id == element_id) {
            return Err(format!("no element with id '{element_id}'"));
        }
        if element_id == level::HIDDEN_BUTTON {
            self.hidden_observed = true;
        }
        let callbacks: Vec<String> = self
            .listeners
            .iter()
            .filter(|(el, _)| el == element_id)
            .map(|(_, cb)| cb.clone())
            .collect();
        let mut lines = Vec::new();
        for cb in callbacks {
            if let Ok(output) = self.call_global(&cb) {
                lines.push(output);
            }
            let entry = (element_id.to_string(), cb);
            if !self.dispatches.contains(&entry) {
                self.dispatches.push(entry);
            }
        }
        Ok(lines)
    }

    // ── Signal queries (read by the probes through HostSignals) ──

    pub fn hidden_observed(&self) -> bool {
        self.hidden_observed
    }

    /// Do all elements carrying `attr=value` have the given background?
    /// False when nothing carries the attribute.
    pub fn all_have_background(&self, attr: &str, value: &str, color: &str) -> bool {
        let mut any = false;
        for el in &self.elements {
            if el.attr(attr) == Some(value) {
                any = true;
                if el.background.as_deref() != Some(color) {
                    return false;
                }
            }
        }
        any
    }

    pub fn invocations(&self, name: &str) -> u32 {
        self.globals
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.invoked)
            .unwrap_or(0)
    }

    pub fn dispatched(&self, element_id: &str, callback: &str) -> bool {
        self.dispatches
            .iter()
            .any(|(el, cb)| el == element_id && cb == callback)
    }
}

fn selector_text(selector: &Selector) -> String {
    match selector {
        Selector::Id(id) => format!("#{id}"),
        Selector::Attr { name, value } => format!("[{name}={value}]"),
    }
}

fn describe(el: &Element) -> String {
    let mut line = format!("<{} id=\"{}\"", el.tag, el.id);
    for (name, value) in &el.attrs {
        line.push_str(&format!(" {name}=\"{value}\""));
    }
    if el.hidden {
        line.push_str(" hidden");
    }
    if let Some(bg) = &el.background {
        line.push_str(&format!(" style=\"background: {bg}\""));
    }
    line.push_str(&format!("> {}", el.label));
    line
}

/// Computed-style equivalence: common spellings of the primary colors
/// collapse to their keyword.
fn normalize_color(color: &str) -> String {
    match color.trim().to_ascii_lowercase().replace(' ', "").as_str() {
        "#f00" | "#ff0000" | "rgb(255,0,0)" => "red".to_string(),
        "#0f0" | "#00ff00" | "rgb(0,255,0)" => "lime".to_string(),
        "#00f" | "#0000ff" | "rgb(0,0,255)" => "blue".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parsing() {
        assert_eq!(Selector::parse("#mystery-box"), Some(Selector::Id("mystery-box".into())));
        assert_eq!(
            Selector::parse("[data-puzzle=level1]"),
            Some(Selector::Attr { name: "data-puzzle".into(), value: "level1".into() })
        );
        assert_eq!(
            Selector::parse("[data-puzzle='level1']"),
            Some(Selector::Attr { name: "data-puzzle".into(), value: "level1".into() })
        );
        assert_eq!(Selector::parse("mystery-box"), None);
        assert_eq!(Selector::parse("#"), None);
        assert_eq!(Selector::parse("[data-puzzle]"), None);
    }

    #[test]
    fn focus_cycle_reaches_the_hidden_button() {
        let mut page = Page::new();
        assert!(!page.hidden_observed());
        // Two focusable elements; at most two steps to land on the button.
        let mut seen = vec![];
        for _ in 0..2 {
            seen.push(page.focus_next().unwrap().id);
        }
        assert!(seen.contains(&level::HIDDEN_BUTTON));
        assert!(page.hidden_observed());
    }

    #[test]
    fn inspecting_the_hidden_button_reveals_it() {
        let mut page = Page::new();
        let sel = Selector::parse("#hidden-button").unwrap();
        let lines = page.inspect(&sel);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("hidden"));
        assert!(page.hidden_observed());
    }

    #[test]
    fn styling_by_attribute_hits_all_three_cards() {
        let mut page = Page::new();
        let sel = Selector::parse("[data-puzzle=level1]").unwrap();
        assert!(!page.all_have_background("data-puzzle", "level1", "red"));
        let n = page.set_background(&sel, "red");
        assert_eq!(n, 3);
        assert!(page.all_have_background("data-puzzle", "level1", "red"));
    }

    #[test]
    fn hex_red_counts_as_red() {
        let mut page = Page::new();
        let sel = Selector::parse("[data-puzzle=level1]").unwrap();
        page.set_background(&sel, "#FF0000");
        assert!(page.all_have_background("data-puzzle", "level1", "red"));
    }

    #[test]
    fn partial_styling_is_not_enough() {
        let mut page = Page::new();
        let sel = Selector::parse("#card-2").unwrap();
        page.set_background(&sel, "red");
        assert!(!page.all_have_background("data-puzzle", "level1", "red"));
    }

    #[test]
    fn calling_the_secret_function_is_counted() {
        let mut page = Page::new();
        assert_eq!(page.invocations(level::SECRET_FUNCTION), 0);
        page.call_global(level::SECRET_FUNCTION).unwrap();
        page.call_global(level::SECRET_FUNCTION).unwrap();
        assert_eq!(page.invocations(level::SECRET_FUNCTION), 2);
    }

    #[test]
    fn unknown_global_is_a_reference_error() {
        let mut page = Page::new();
        assert!(page.call_global("definitelyNotHere").is_err());
    }

    #[test]
    fn click_without_listener_dispatches_nothing() {
        let mut page = Page::new();
        let lines = page.click(level::MYSTERY_BOX).unwrap();
        assert!(lines.is_empty());
        assert!(!page.dispatched(level::MYSTERY_BOX, level::MYSTERY_BOX_CALLBACK));
    }

    #[test]
    fn click_with_listener_logs_and_records_the_dispatch() {
        let mut page = Page::new();
        page.add_listener(level::MYSTERY_BOX, level::MYSTERY_BOX_CALLBACK).unwrap();
        let lines = page.click(level::MYSTERY_BOX).unwrap();
        assert_eq!(lines, vec![level::MYSTERY_BOX_LOG.to_string()]);
        assert!(page.dispatched(level::MYSTERY_BOX, level::MYSTERY_BOX_CALLBACK));
    }

    #[test]
    fn listener_registration_validates_both_ends() {
        let mut page = Page::new();
        assert!(page.add_listener("no-such-element", level::MYSTERY_BOX_CALLBACK).is_err());
        assert!(page.add_listener(level::MYSTERY_BOX, "noSuchCallback").is_err());
    }
}
