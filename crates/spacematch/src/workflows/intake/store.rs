use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum DraftStoreError {
    #[error("draft store I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("draft store unavailable: {0}")]
    Unavailable(String),
}

/// Durable mirror for a single serialized draft snapshot.
pub trait DraftStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, DraftStoreError>;
    fn save(&self, snapshot: &str) -> Result<(), DraftStoreError>;
    fn remove(&self) -> Result<(), DraftStoreError>;
}

/// Keeps one JSON file per intake session.
///
/// Saves go to a sibling temp file that is renamed over the previous snapshot.
#[derive(Debug, Clone)]
pub struct FileDraftStore {
    path: PathBuf,
}

impl FileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn for_session(dir: impl AsRef<Path>, session: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{session}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> DraftStoreError {
        DraftStoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self) -> Result<Option<String>, DraftStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error(&self.path, err)),
        }
    }

    fn save(&self, snapshot: &str) -> Result<(), DraftStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(parent, err))?;
        }
        let temp = self.temp_path();
        fs::write(&temp, snapshot).map_err(|err| self.io_error(&temp, err))?;
        fs::rename(&temp, &self.path).map_err(|err| self.io_error(&self.path, err))
    }

    fn remove(&self) -> Result<(), DraftStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(&self.path, err)),
        }
    }
}

/// In-process store; can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    slot: Mutex<Option<String>>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw contents, bypassing serialization.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let store = Self::default();
        *store.slot.lock().expect("draft slot mutex poisoned") = Some(contents.into());
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.lock().expect("draft slot mutex poisoned").clone()
    }

    /// Successful saves so far.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), DraftStoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DraftStoreError::Unavailable(
                "memory store is in failing mode".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<String>, DraftStoreError> {
        self.check()?;
        Ok(self.contents())
    }

    fn save(&self, snapshot: &str) -> Result<(), DraftStoreError> {
        self.check()?;
        *self.slot.lock().expect("draft slot mutex poisoned") = Some(snapshot.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn remove(&self) -> Result<(), DraftStoreError> {
        self.check()?;
        self.slot.lock().expect("draft slot mutex poisoned").take();
        Ok(())
    }
}
