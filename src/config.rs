/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

use crossterm::event::KeyCode;

/// The classic ten-key sequence. Entering it during play reveals every hint.
pub const KONAMI_CODE: [KeyCode; 10] = [
    KeyCode::Up, KeyCode::Up,
    KeyCode::Down, KeyCode::Down,
    KeyCode::Left, KeyCode::Right,
    KeyCode::Left, KeyCode::Right,
    KeyCode::Char('b'), KeyCode::Char('a'),
];

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: TuningConfig,
    pub template_file: String,
}

#[derive(Clone, Debug)]
pub struct TuningConfig {
    pub tick_rate_ms: u64,
    pub console_max_lines: usize,
    pub storage_poll_ms: u64,
    pub transition_delay_ms: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_console_lines")]
    console_max_lines: usize,
    #[serde(default = "default_storage_poll")]
    storage_poll_ms: u64,
    #[serde(default = "default_transition_delay")]
    transition_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_template_file")]
    template_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_console_lines() -> usize { 10 }
fn default_storage_poll() -> u64 { 1000 }
fn default_transition_delay() -> u64 { 1000 }
fn default_template_file() -> String { "certificate-template.html".into() }

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            tick_rate_ms: default_tick_rate(),
            console_max_lines: default_console_lines(),
            storage_poll_ms: default_storage_poll(),
            transition_delay_ms: default_transition_delay(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            template_file: default_template_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        GameConfig {
            tuning: TuningConfig {
                tick_rate_ms: toml_cfg.tuning.tick_rate_ms.max(1),
                console_max_lines: toml_cfg.tuning.console_max_lines.max(1),
                storage_poll_ms: toml_cfg.tuning.storage_poll_ms.max(1),
                transition_delay_ms: toml_cfg.tuning.transition_delay_ms,
            },
            template_file: toml_cfg.general.template_file,
        }
    }
}

/// Candidate directories to search for data files: exe dir + CWD + system
/// paths (deduplicated). Shared by the config loader and the certificate
/// template lookup.
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so /usr/bin/awardo → /usr/games/awardo
        // still finds data relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/awardo)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/awardo");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/awardo)
    let sys = PathBuf::from("/usr/share/awardo");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    // 5. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Directory for files the game writes (storage.dat, certificate.html).
pub fn data_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs like /usr/games/ won't be)
            let test_path = parent.join(".write_test_awardo");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/awardo) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/awardo");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
