/// Key/value store: the localStorage analog backing the storage
/// challenge.
///
/// ## File format:
///   Plain `key=value` lines in `storage.dat`. Writes go straight
///   through to the file; `reload()` re-reads it so edits made outside
///   the game (the intended way to solve the level out-of-band) are
///   picked up on the poll interval.

use std::path::{Path, PathBuf};

use crate::config;

const STORAGE_FILE: &str = "storage.dat";

pub struct KeyStore {
    path: PathBuf,
    entries: Vec<(String, String)>,
}

impl KeyStore {
    /// Store backed by `storage.dat` in the writable data directory.
    pub fn open() -> Self {
        Self::at(config::data_dir().join(STORAGE_FILE))
    }

    /// Store backed by an explicit path (tests).
    pub fn at(path: PathBuf) -> Self {
        let entries = read_entries(&path);
        KeyStore { path, entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set a key and write the file through.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self.flush()
    }

    /// Remove a key. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str) -> Result<(), String> {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        if self.entries.len() == before {
            return Ok(());
        }
        self.flush()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Re-read the backing file, picking up out-of-band edits.
    pub fn reload(&mut self) {
        self.entries = read_entries(&self.path);
    }

    fn flush(&self) -> Result<(), String> {
        let mut out = String::new();
        for (k, v) in &self.entries {
            out.push_str(&format!("{k}={v}\n"));
        }
        std::fs::write(&self.path, out)
            .map_err(|e| format!("could not write {}: {e}", self.path.display()))
    }
}

fn read_entries(path: &Path) -> Vec<(String, String)> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return vec![],
    };
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            entries.push((key.to_string(), value.trim().to_string()));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> KeyStore {
        let dir = std::env::temp_dir().join(format!("awardo-store-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(STORAGE_FILE);
        let _ = std::fs::remove_file(&path);
        KeyStore::at(path)
    }

    #[test]
    fn set_get_round_trips_through_the_file() {
        let mut store = temp_store("roundtrip");
        store.set("puzzleKey", "unlocked").unwrap();
        assert_eq!(store.get("puzzleKey"), Some("unlocked"));

        // A fresh store over the same file sees the value.
        let reopened = KeyStore::at(store.path.clone());
        assert_eq!(reopened.get("puzzleKey"), Some("unlocked"));
    }

    #[test]
    fn set_overwrites_existing_key() {
        let mut store = temp_store("overwrite");
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k"), Some("two"));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn remove_deletes_and_tolerates_absent_keys() {
        let mut store = temp_store("remove");
        store.set("k", "v").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
        store.remove("k").unwrap();
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let mut store = temp_store("reload");
        store.set("other", "x").unwrap();
        assert_eq!(store.get("puzzleKey"), None);

        // Simulate an out-of-band edit to the file.
        std::fs::write(&store.path, "other=x\npuzzleKey=unlocked\n").unwrap();
        assert_eq!(store.get("puzzleKey"), None);
        store.reload();
        assert_eq!(store.get("puzzleKey"), Some("unlocked"));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut store = temp_store("malformed");
        std::fs::write(&store.path, "# comment\nno-equals-here\n=novalue\nok=yes\n").unwrap();
        store.reload();
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.get("ok"), Some("yes"));
    }
}
