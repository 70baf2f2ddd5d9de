//! File-backed durable store.
//!
//! Each key is stored as its own `<key>.json` file in a single directory.
//! Writes are atomic per key (tmp file + fsync + rename) and serialised with
//! an advisory lock so two processes sharing a directory cannot interleave a
//! half-written file. There is no atomicity across keys.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as IoWrite};
use std::path::{Path, PathBuf};

use solace_core::error::{Result, SolaceError};
use solace_core::store::DurableStore;

const LOCK_FILE: &str = ".store.lock";

/// Directory of JSON files, one per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to its file, replacing anything that is not safe in a file name.
    fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_stem}.json"))
    }

    fn write_atomic(&self, path: &Path, value: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let _lock = FileLock::acquire(&self.root.join(LOCK_FILE))?;

        let file_name = path
            .file_name()
            .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "Path has no file name"))?;
        let tmp_path = self
            .root
            .join(format!(".{}.tmp", file_name.to_string_lossy()));

        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(value.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, path)
    }
}

impl DurableStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(key, path = %path.display(), error = %e, "Unreadable store entry, treating as absent");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        self.write_atomic(&path, value)
            .map_err(|e| SolaceError::persistence(key, e.to_string()))?;
        tracing::trace!(key, bytes = value.len(), "Store entry written");
        Ok(())
    }

    fn erase(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SolaceError::persistence(key, e.to_string())),
        }
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(lock_path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()?;
        }

        Ok(FileLock { file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path().join("store"));

        store.write("solace-dark-mode", "true").unwrap();
        assert_eq!(store.read("solace-dark-mode").as_deref(), Some("true"));
    }

    #[test]
    fn test_read_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        assert!(store.read("absent").is_none());
    }

    #[test]
    fn test_erase() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.write("k", "[]").unwrap();
        store.erase("k").unwrap();
        assert!(store.read("k").is_none());
        // Erasing again is fine
        store.erase("k").unwrap();
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.write("solace-users", "[]").unwrap();

        assert!(temp_dir.path().join("solace-users.json").exists());
        assert!(!temp_dir.path().join(".solace-users.json.tmp").exists());
    }

    #[test]
    fn test_keys_are_sanitised() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.write("../escape/attempt", "1").unwrap();

        assert!(temp_dir.path().join("___escape_attempt.json").exists());
        assert_eq!(store.read("../escape/attempt").as_deref(), Some("1"));
    }

    #[test]
    fn test_reopen_sees_previous_writes() {
        let temp_dir = TempDir::new().unwrap();
        FileStore::new(temp_dir.path()).write("k", "\"v\"").unwrap();
        let reopened = FileStore::new(temp_dir.path());
        assert_eq!(reopened.read("k").as_deref(), Some("\"v\""));
    }
}
