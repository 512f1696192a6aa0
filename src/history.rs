use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage key the ring is persisted under.
pub const HISTORY_KEY: &str = "sessionLog";
pub const HISTORY_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    pub label: String,
    pub time: String,
}

/// Newest-first log of recent spins, never longer than [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryRing {
    events: VecDeque<SelectionEvent>,
}

impl HistoryRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: impl IntoIterator<Item = SelectionEvent>) -> Self {
        let events = events.into_iter().take(HISTORY_CAPACITY).collect();
        Self { events }
    }

    pub fn push(&mut self, event: SelectionEvent) {
        self.events.push_front(event);
        self.events.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEvent> {
        self.events.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.label.as_str()).collect()
    }
}

/// Persistence port for the history ring.
///
/// `load` never fails: anything missing or unreadable comes back as an
/// empty ring. Writes are best-effort and callers only log their errors.
pub trait HistoryStore: Send {
    fn load(&self) -> HistoryRing;
    fn save(&mut self, ring: &HistoryRing) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

fn decode(bytes: &[u8]) -> HistoryRing {
    match serde_json::from_slice::<Vec<SelectionEvent>>(bytes) {
        Ok(events) => HistoryRing::from_events(events),
        Err(err) => {
            debug!("Ignoring unreadable history entry: {}", err);
            HistoryRing::new()
        }
    }
}

fn encode(ring: &HistoryRing) -> io::Result<Vec<u8>> {
    serde_json::to_vec(ring).map_err(|err| io::Error::other(format!("serialize history: {err}")))
}

/// Key-value store on disk: one JSON file per key inside `dir`.
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_key(dir, HISTORY_KEY)
    }

    pub fn with_key(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for FileHistoryStore {
    fn load(&self) -> HistoryRing {
        match std::fs::read(&self.path) {
            Ok(bytes) => decode(&bytes),
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    debug!("Could not read {}: {}", self.path.display(), err);
                }
                HistoryRing::new()
            }
        }
    }

    fn save(&mut self, ring: &HistoryRing) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, encode(ring)?)
    }

    fn clear(&mut self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Keeps the serialized entry in memory. Used when persistence is turned off
/// and as the fake in tests.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    raw: Option<Vec<u8>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self {
            raw: Some(raw.into()),
        }
    }

    #[cfg(test)]
    pub fn raw(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> HistoryRing {
        self.raw.as_deref().map(decode).unwrap_or_default()
    }

    fn save(&mut self, ring: &HistoryRing) -> io::Result<()> {
        self.raw = Some(encode(ring)?);
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.raw = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn event(label: &str) -> SelectionEvent {
        SelectionEvent {
            label: label.to_string(),
            time: "10:00:00 AM".to_string(),
        }
    }

    #[test]
    fn push_keeps_newest_first_and_evicts_oldest() {
        let mut ring = HistoryRing::new();
        for label in ["a", "b", "c", "d", "e", "f", "g"] {
            ring.push(event(label));
        }
        assert_eq!(ring.len(), HISTORY_CAPACITY);
        assert_eq!(ring.labels(), vec!["g", "f", "e", "d", "c"]);
    }

    #[test]
    fn serialized_shape_is_label_time_array() {
        let mut ring = HistoryRing::new();
        ring.push(event("Bounce"));
        let json = serde_json::to_string(&ring).expect("serialize");
        assert_eq!(json, r#"[{"label":"Bounce","time":"10:00:00 AM"}]"#);
    }

    #[test]
    fn file_store_missing_entry_loads_empty() {
        let dir = tempdir().expect("tmpdir");
        let store = FileHistoryStore::new(dir.path());
        assert!(store.load().is_empty());
    }

    #[test]
    fn file_store_save_then_load() {
        let dir = tempdir().expect("tmpdir");
        let mut store = FileHistoryStore::new(dir.path().join("nested"));
        let mut ring = HistoryRing::new();
        ring.push(event("Waves"));
        ring.push(event("Groove"));
        store.save(&ring).expect("save");

        let reopened = FileHistoryStore::new(dir.path().join("nested"));
        assert_eq!(reopened.load(), ring);
        assert!(reopened.path().ends_with("sessionLog.json"));
    }

    #[test]
    fn file_store_malformed_entry_loads_empty() {
        let dir = tempdir().expect("tmpdir");
        let store = FileHistoryStore::new(dir.path());
        std::fs::write(store.path(), b"{not json").expect("write");
        assert!(store.load().is_empty());

        std::fs::write(store.path(), br#"{"label":"Bounce"}"#).expect("write");
        assert!(store.load().is_empty());
    }

    #[test]
    fn oversized_entry_is_truncated_on_load() {
        let events: Vec<SelectionEvent> =
            ["1", "2", "3", "4", "5", "6", "7"].iter().map(|l| event(l)).collect();
        let store = MemoryHistoryStore::with_raw(serde_json::to_vec(&events).expect("encode"));
        assert_eq!(store.load().labels(), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn clear_removes_entry_and_is_idempotent() {
        let dir = tempdir().expect("tmpdir");
        let mut store = FileHistoryStore::new(dir.path());
        let mut ring = HistoryRing::new();
        ring.push(event("Levels"));
        store.save(&ring).expect("save");
        assert!(store.path().exists());

        store.clear().expect("clear");
        assert!(!store.path().exists());
        store.clear().expect("second clear");
        assert!(store.load().is_empty());
    }

    #[test]
    fn memory_store_malformed_raw_loads_empty() {
        let store = MemoryHistoryStore::with_raw("garbage");
        assert!(store.load().is_empty());
        assert!(MemoryHistoryStore::new().load().is_empty());
    }
}
