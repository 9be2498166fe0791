/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::page::Element;
use crate::sim::session::{GameSession, Phase};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// By using the SAME explicit RGB for both `Clear(ClearType::All)`
    /// and every cell's background, the inter-row gap color matches the
    /// cell color exactly, eliminating visible horizontal lines on
    /// VTE-based terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 { return " "; }
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::from_char(ch, fg, bg));
            cx += 1;
        }
    }

    /// Fill a full row with a background color.
    fn fill_row(&mut self, y: usize, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', fg, bg));
        }
    }
}

// ── Renderer ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const BODY_ROW: usize = 2;
/// Left pane (the simulated page) width in columns.
const PAGE_PANE_W: usize = 46;
/// Rows reserved at the bottom: console log + prompt + message + help.
const CONSOLE_ROWS: usize = 10;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM: Color = Color::DarkGrey;
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// `input_line` is whatever the player has typed but not submitted
    /// (console command or, in the name prompt, the name).
    pub fn render(&mut self, s: &GameSession, input_line: &str) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Detect phase change → clear for clean transition
        if self.last_phase != Some(s.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(s.phase);
        }

        // Build front buffer
        self.front.clear();

        match s.phase {
            Phase::Title => self.compose_title(s),
            Phase::Playing => self.compose_playing(s, input_line),
            Phase::NamePrompt => self.compose_name_prompt(s, input_line),
            Phase::Certificate => self.compose_certificate(s),
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here — it resets to the terminal's
        // native default, which may differ from BASE_BG and cause line artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Playing screen: page pane + challenge pane + console ──

    fn compose_playing(&mut self, s: &GameSession, input_line: &str) {
        // ── HUD row ──
        self.front.fill_row(HUD_ROW, Color::White, HUD_BG);
        let hud = format!(
            " AWARDO  Secrets: {}/{}   Challenge {}",
            s.tracker.completed_count(),
            s.tracker.total(),
            s.shown_level,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
        if s.hints_revealed {
            let tag = "[hints unlocked] ";
            let x = self.term_w.saturating_sub(tag.len());
            self.front.put_str(x, HUD_ROW, tag, GOLD, HUD_BG);
        }

        let console_top = self.term_h.saturating_sub(CONSOLE_ROWS + 4);

        self.compose_page_pane(s, BODY_ROW, console_top);
        self.compose_challenge_pane(s, BODY_ROW, console_top);
        self.compose_console_pane(s, input_line, console_top);

        // ── Message bar ──
        let msg_row = self.term_h.saturating_sub(2);
        if !s.message.is_empty() {
            self.front.fill_row(msg_row, Color::Black, MSG_BG);
            let msg = format!(" * {} ", s.message);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = self.term_h.saturating_sub(1);
        let help = " type a command, ENTER to run  |  'help' for verbs  |  ESC: title";
        self.front.put_str(0, help_row, help, DIM, Color::Reset);
    }

    /// The simulated page, rendered like a tiny browser viewport.
    fn compose_page_pane(&mut self, s: &GameSession, top: usize, bottom: usize) {
        let w = PAGE_PANE_W.min(self.term_w);
        self.front.put_str(0, top, "- SIMULATED PAGE ", GOLD, Color::Reset);
        for x in 17..w {
            self.front.set(x, top, Cell::from_char('-', DIM, Color::Reset));
        }

        let mut row = top + 1;
        let focused_id = s.page.focused().map(|e| e.id);
        for el in s.page.elements() {
            if row + 1 >= bottom { break; }
            // The hidden button stays invisible until discovered.
            if el.hidden && !s.page.hidden_observed() {
                continue;
            }
            let (line, fg, bg) = element_line(el, focused_id == Some(el.id));
            if bg != Color::Reset {
                for x in 0..w {
                    self.front.set(x, row, Cell::from_char(' ', fg, bg));
                }
            }
            self.front.put_str(1, row, &line, fg, bg);
            row += 1;
            // Cards and the box get a breathing row, like block elements.
            if el.tag == "div" {
                row += 1;
            }
        }
    }

    /// Challenge list with the active one expanded.
    fn compose_challenge_pane(&mut self, s: &GameSession, top: usize, bottom: usize) {
        let x0 = PAGE_PANE_W + 2;
        if x0 + 10 > self.term_w { return; }
        let pane_w = self.term_w - x0;

        self.front.put_str(x0, top, "- CHALLENGES ", GOLD, Color::Reset);
        for x in (x0 + 13)..self.term_w {
            self.front.set(x, top, Cell::from_char('-', DIM, Color::Reset));
        }

        let mut row = top + 1;
        for (idx, level) in s.tracker.levels().iter().enumerate() {
            if row >= bottom { break; }
            let is_shown = idx == s.shown_level && !s.tracker.all_complete();
            let mark = if level.completed { "[x]" } else if is_shown { " > " } else { "[ ]" };
            let fg = if level.completed {
                GREEN
            } else if is_shown {
                GOLD
            } else {
                Color::White
            };
            let line = format!("{mark} {}. {}", level.id, level.title);
            self.front.put_str(x0, row, &line, fg, Color::Reset);
            row += 1;

            if is_shown {
                for desc_line in wrap_text(level.description, pane_w.saturating_sub(6)) {
                    if row >= bottom { break; }
                    self.front.put_str(x0 + 4, row, &desc_line, Color::White, Color::Reset);
                    row += 1;
                }
                if s.hints_revealed {
                    if row < bottom {
                        let hint = format!("hint: {}", level.hint);
                        for hint_line in wrap_text(&hint, pane_w.saturating_sub(6)) {
                            if row >= bottom { break; }
                            self.front.put_str(x0 + 4, row, &hint_line, CYAN, Color::Reset);
                            row += 1;
                        }
                    }
                }
                if let Some(link) = level.link {
                    if row < bottom {
                        self.front.put_str(x0 + 4, row, link, DIM, Color::Reset);
                        row += 1;
                    }
                }
                row += 1;
            }
        }
    }

    /// Console log and the prompt line.
    fn compose_console_pane(&mut self, s: &GameSession, input_line: &str, top: usize) {
        self.front.put_str(0, top, "- CONSOLE ", GOLD, Color::Reset);
        for x in 10..self.term_w {
            self.front.set(x, top, Cell::from_char('-', DIM, Color::Reset));
        }

        let log_rows = CONSOLE_ROWS.min(self.term_h.saturating_sub(top + 2));
        let lines = s.console.lines();
        let start = lines.len().saturating_sub(log_rows);
        for (i, line) in lines[start..].iter().enumerate() {
            let fg = if line.starts_with('>') {
                CYAN
            } else if line.starts_with("***") {
                GREEN
            } else {
                Color::White
            };
            self.front.put_str(1, top + 1 + i, line, fg, Color::Reset);
        }

        // Prompt with a block cursor.
        let prompt_row = top + 1 + log_rows;
        let prompt = format!("> {input_line}");
        self.front.put_str(0, prompt_row, &prompt, GREEN, Color::Reset);
        let cursor_x = prompt.chars().count();
        let blink = (s.anim_tick / 6) % 2 == 0;
        if blink && cursor_x < self.term_w {
            self.front.set(cursor_x, prompt_row, Cell::from_char('_', GREEN, Color::Reset));
        }
    }

    // ── Static screens ──

    fn compose_title(&mut self, s: &GameSession) {
        let title = [
            r"    ___   _      __ ___     ____  ____   ____ ",
            r"   /   | | | /| / //   |   / __ \/ __ \ / __ \",
            r"  / /| | | |/ |/ // /| |  / /_/ / / / // / / /",
            r" / ___ | |__/|__// ___ | / _, _/ /_/ // /_/ / ",
            r"/_/  |_|        /_/  |_|/_/ |_|\____/ \____/  ",
        ];

        for (i, line) in title.iter().enumerate() {
            self.front.put_str(4, 2 + i, line, GOLD, Color::Reset);
        }

        let subtitle = "** Frontend Puzzle Challenge **";
        let sx = 4 + (title[1].len().saturating_sub(subtitle.len())) / 2;
        self.front.put_str(sx, 8, subtitle, GREEN, Color::Reset);

        let tagline = "--- Terminal Edition (Rust) ---";
        let tx = 4 + (title[1].len().saturating_sub(tagline.len())) / 2;
        self.front.put_str(tx, 10, tagline, Color::Rgb { r: 180, g: 140, b: 50 }, Color::Reset);

        let menu_base = 13;
        self.front.put_str(8, menu_base, "ENTER   Start / resume the challenge", GREEN, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  N     New session", Color::White, Color::Reset);
        self.front.put_str(8, menu_base + 2, "  Q     Quit", Color::White, Color::Reset);

        let blurb = [
            "Five challenges, one page, one console.",
            "Inspect the page, bend its styles, call its secrets,",
            "and earn a very official certificate.",
        ];
        for (i, line) in blurb.iter().enumerate() {
            self.front.put_str(8, menu_base + 4 + i, line, DIM, Color::Reset);
        }

        if !s.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            self.front.fill_row(msg_row, Color::Black, MSG_BG);
            let msg = format!(" * {} ", s.message);
            self.front.put_str(0, msg_row, &msg, Color::Black, MSG_BG);
        }
    }

    fn compose_name_prompt(&mut self, s: &GameSession, input_line: &str) {
        let cy = self.term_h / 2;
        let box_art = [
            "+----------------------------------------------+",
            "|        ALL FIVE SECRETS COLLECTED!           |",
            "|                                              |",
            "|  Your certificate awaits. Who earned it?     |",
            "+----------------------------------------------+",
        ];
        let bx = self.term_w.saturating_sub(box_art[0].len()) / 2;
        let by = cy.saturating_sub(5);
        for (i, line) in box_art.iter().enumerate() {
            self.front.put_str(bx, by + i, line, GOLD, Color::Reset);
        }

        let prompt = format!("Name: {input_line}");
        self.front.put_str(bx + 2, by + 6, &prompt, GREEN, Color::Reset);
        let blink = (s.anim_tick / 6) % 2 == 0;
        if blink {
            let cursor_x = bx + 2 + prompt.chars().count();
            self.front.set(cursor_x, by + 6, Cell::from_char('_', GREEN, Color::Reset));
        }

        self.front.put_str(
            bx + 2,
            by + 8,
            "ENTER: generate certificate",
            DIM,
            Color::Reset,
        );
    }

    fn compose_certificate(&mut self, s: &GameSession) {
        let box_art = [
            "+================================================+",
            "|      * CERTIFIED FRONTEND PUZZLE MASTER *      |",
            "+================================================+",
        ];
        for (i, line) in box_art.iter().enumerate() {
            self.front.put_str(4, 3 + i, line, GOLD, Color::Reset);
        }

        let mut row = 8;
        let name = format!("* Challenger: {}", s.player_name);
        self.front.put_str(6, row, &name, Color::White, Color::Reset);
        row += 1;
        let secrets = format!("* Secrets collected: {}/{}", s.tracker.completed_count(), s.tracker.total());
        self.front.put_str(6, row, &secrets, Color::White, Color::Reset);
        row += 2;

        if let Some(path) = &s.certificate_path {
            let line = format!("Certificate written to: {}", path.display());
            self.front.put_str(6, row, &line, GREEN, Color::Reset);
            row += 1;
            self.front.put_str(6, row, "Open it in a browser to print.", Color::White, Color::Reset);
            row += 1;
        }
        if !s.certificate_note.is_empty() {
            let note = format!("note: {}", s.certificate_note);
            self.front.put_str(6, row, &note, DIM, Color::Reset);
            row += 1;
        }

        row += 2;
        self.front.put_str(6, row, "ENTER / ESC: Back to Title", GREEN, Color::Reset);
    }
}

/// One line of the page pane for an element, plus its colors.
fn element_line(el: &Element, focused: bool) -> (String, Color, Color) {
    let marker = if focused { "> " } else { "  " };
    let line = match el.tag {
        "h1" => format!("{marker}== {} ==", el.label),
        "button" => format!("{marker}[ {} ]", el.label),
        "div" => format!("{marker}+--- {} ---+", el.label),
        _ => format!("{marker}{}", el.label),
    };
    let bg = match el.background.as_deref() {
        Some("red") => Color::Rgb { r: 170, g: 30, b: 30 },
        Some("lime") => Color::Rgb { r: 30, g: 150, b: 30 },
        Some("blue") => Color::Rgb { r: 30, g: 60, b: 170 },
        Some(_) => Color::Rgb { r: 90, g: 90, b: 90 },
        None => Color::Reset,
    };
    let fg = if focused {
        GREEN
    } else if el.tag == "h1" {
        GOLD
    } else {
        Color::White
    };
    (line, fg, bg)
}

/// Greedy word wrap; words longer than the width are hard-cut.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(8);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
        while current.chars().count() > width {
            let head: String = current.chars().take(width).collect();
            let tail: String = current.chars().skip(width).collect();
            lines.push(head);
            current = tail;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
