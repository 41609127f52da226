//! JSONL storage for bottles
//!
//! Bottles are stored in `bottles.jsonl` with one JSON object per line.
//! Every save rewrites the whole file through a temp file and a rename, so
//! a crash mid-write leaves the previous contents intact and readers always
//! see a complete file.
//!
//! Commands that change the collection hold [`StoreLock`], an `fs2`
//! exclusive lock on `bottles.jsonl.lock`, from load to save. Concurrent
//! changes therefore run one after another instead of overwriting each
//! other.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::{Bottle, Collection};

/// File name of the collection inside the data directory
pub const STORE_FILE: &str = "bottles.jsonl";

/// Held while a command reads, changes and writes back the collection;
/// dropping it releases the lock
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
}

/// Store for the bottle collection in JSONL format
pub struct BottleStore {
    path: PathBuf,
}

impl BottleStore {
    /// Creates a new bottle store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the store inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(STORE_FILE))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blocks until no other invocation is changing the collection
    pub fn lock(&self) -> Result<StoreLock> {
        self.ensure_parent()?;

        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;

        file.lock_exclusive()
            .context("Failed to acquire write lock on bottle store")?;

        Ok(StoreLock { _file: file })
    }

    /// Reads the whole collection, in file order
    ///
    /// A missing file is an empty collection (first run). Anything that
    /// cannot be read or parsed is an error.
    pub fn load(&self) -> Result<Collection> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Collection::default()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to open bottle store: {}", self.path.display())
                })
            }
        };

        let reader = BufReader::new(&file);
        let mut bottles = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| {
                format!("Failed to read line {} of {}", line_num + 1, self.path.display())
            })?;

            if line.trim().is_empty() {
                continue;
            }

            let bottle: Bottle = serde_json::from_str(&line).with_context(|| {
                format!(
                    "Failed to parse bottle at line {} of {}",
                    line_num + 1,
                    self.path.display()
                )
            })?;

            bottles.push(bottle);
        }

        Ok(Collection::new(bottles))
    }

    /// Writes the whole collection (full rewrite, order preserved)
    ///
    /// Callers that loaded the collection first should hold [`Self::lock`].
    pub fn save(&self, collection: &Collection) -> Result<()> {
        self.ensure_parent()?;

        // Write to temp file first
        let temp_path = self.temp_path();

        let written = self.write_temp(&temp_path, collection);
        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
            return written;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }

    fn write_temp(&self, temp_path: &Path, collection: &Collection) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);

        for bottle in collection {
            let line = serde_json::to_string(bottle).context("Failed to serialize bottle")?;
            writeln!(writer, "{}", line).context("Failed to write bottle")?;
        }

        writer.flush().context("Failed to flush bottle store")?;
        file.sync_all().context("Failed to sync bottle store")?;

        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.tmp")
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("jsonl.lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{validate_date, Codec, FixedClock};
    use tempfile::TempDir;

    fn make_bottle(name: &str) -> Bottle {
        Bottle::seal(
            name,
            validate_date("01.01.2030").unwrap(),
            &format!("message for {}", name),
            &Codec::default(),
            &FixedClock::ymd(2025, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn load_missing_store_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(&dir.path().join("never-created"));

        let collection = store.load().unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn save_and_load_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());

        let collection = Collection::new(vec![make_bottle("b"), make_bottle("a"), make_bottle("c")]);
        store.save(&collection).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, collection);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());

        store
            .save(&Collection::new(vec![make_bottle("a"), make_bottle("b")]))
            .unwrap();
        store.save(&Collection::new(vec![make_bottle("c")])).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get(1).unwrap().name, "c");
    }

    #[test]
    fn corrupted_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());
        store.save(&Collection::new(vec![make_bottle("a")])).unwrap();

        let mut content = fs::read_to_string(store.path()).unwrap();
        content.push_str("{\"name\": \"broken\", \"unlock_date\": \n");
        fs::write(store.path(), content).unwrap();

        let err = store.load().unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn invalid_date_in_store_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"name":"x","unlock_date":"31.04.2024","message":"","opened":false,"created_date":"01.01.2024"}"#,
        )
        .unwrap();

        assert!(store.load().is_err());
    }

    #[test]
    fn skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());
        fs::write(
            store.path(),
            "\n{\"name\":\"x\",\"unlock_date\":\"01.01.2024\",\"message\":\"\",\"opened\":true,\"created_date\":\"01.01.2023\"}\n\n",
        )
        .unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.get(1).unwrap().is_opened());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(&dir.path().join("nested").join("dir"));

        store.save(&Collection::new(vec![make_bottle("a")])).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn atomic_write() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());

        store.save(&Collection::new(vec![make_bottle("a")])).unwrap();

        // Temp file should not exist after write
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn lock_excludes_other_writers_until_dropped() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(&dir.path().join("data"));

        let guard = store.lock().unwrap();
        let other = File::open(store.lock_path()).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(guard);
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[test]
    fn second_lock_waits_for_the_first() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(STORE_FILE);
        let guard = BottleStore::new(&path).lock().unwrap();

        let (tx, rx) = mpsc::channel();
        let waiter = std::thread::spawn(move || {
            let _lock = BottleStore::new(path).lock().unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(guard);
        rx.recv_timeout(Duration::from_secs(10)).unwrap();
        waiter.join().unwrap();
    }

    #[test]
    fn plaintext_never_written() {
        let dir = TempDir::new().unwrap();
        let store = BottleStore::in_dir(dir.path());

        store.save(&Collection::new(vec![make_bottle("secret")])).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"name\":\"secret\""));
        assert!(!content.contains("message for secret"));
    }
}
