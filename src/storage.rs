use std::fs::{self, File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// One keyed record of serialized state. The whole payload is written in a
/// single operation — no partial writes.
///
/// Two instances back a [`crate::store::Store`]: a durable one for the
/// application document and a session-scoped one for the active user.
pub trait Storage: Send + Sync {
    /// The stored payload, or `None` when nothing has been written yet.
    fn read(&self) -> std::io::Result<Option<String>>;

    fn write(&self, payload: &str) -> std::io::Result<()>;

    fn clear(&self) -> std::io::Result<()>;
}

/// Durable storage: one pretty-printed JSON file on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Creates the parent directory if needed; the file itself is created on
    /// the first write.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent)?;
            }
        }
        Ok(FileStorage { path })
    }
}

impl Storage for FileStorage {
    fn read(&self) -> std::io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut contents = String::new();
        File::open(&self.path)?.read_to_string(&mut contents)?;
        Ok(Some(contents))
    }

    fn write(&self, payload: &str) -> std::io::Result<()> {
        let mut file = File::create(&self.path)?;
        file.write_all(payload.as_bytes())
    }

    fn clear(&self) -> std::io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory storage slot. Stands in for session-scoped browser storage
/// (dropped with the process, never durable) and, shared behind an `Arc`,
/// for the common store two simulated tabs write to in tests.
#[derive(Default)]
pub struct MemoryStorage {
    slot: RwLock<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> std::io::Result<Option<String>> {
        Ok(self.slot.read().unwrap().clone())
    }

    fn write(&self, payload: &str) -> std::io::Result<()> {
        *self.slot.write().unwrap() = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        *self.slot.write().unwrap() = None;
        Ok(())
    }
}
