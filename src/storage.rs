use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// String-keyed persisted values, the durable backing of the dashboard layout.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// In-memory store. `fail_reads` and `fail_writes` make every `get` or
/// `set` error, so tests can reach the degraded persistence paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_reads {
            anyhow::bail!("read rejected for key '{key}'");
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.fail_writes {
            anyhow::bail!("write rejected for key '{key}'");
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File backed store holding a single JSON object of string values.
///
/// The whole document is rewritten on every mutation through a temporary file
/// followed by a rename, so a crash mid-write leaves the previous copy intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        let values = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to finalize {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("layout.json");
        let mut store = JsonFileStore::open(&path).expect("open");
        store.set("k", "[\"funnel\"]").expect("set");

        let reopened = JsonFileStore::open(&path).expect("reopen");
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("[\"funnel\"]"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(JsonFileStore::open(&path).is_err());
    }

    #[test]
    fn undecodable_file_is_an_error_and_left_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("layout.json");
        std::fs::write(&path, [0xff, 0xfe]).unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
        assert_eq!(std::fs::read(&path).unwrap(), vec![0xff, 0xfe]);
    }

    #[test]
    fn directory_in_place_of_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(JsonFileStore::open(dir.path()).is_err());
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::open(dir.path().join("absent.json")).expect("open");
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn memory_store_can_reject_reads() {
        let mut store = MemoryStore::new().with_value("a", "b");
        store.fail_reads = true;
        assert!(store.get("a").is_err());
    }

    #[test]
    fn memory_store_can_reject_writes() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        assert!(store.set("a", "b").is_err());
        assert_eq!(store.get("a").unwrap(), None);
    }
}
