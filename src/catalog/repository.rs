//! Local store for the cached book list.
//!
//! The cache lives under a single well-known key. `BookStore` is the port the
//! builder and views talk to; `FileStore` keeps a JSON key/value file on disk
//! and `MemoryStore` backs tests. Whole-list replacement is the only write.

use crate::catalog::model::BookRecord;
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Key the book list is stored under.
pub const STORE_KEY: &str = "books";

/// Persistence port for the cached book list.
pub trait BookStore {
    /// Read the list. `None` when nothing has been stored yet; an error when
    /// something is stored but cannot be parsed.
    fn load(&self) -> Result<Option<Vec<BookRecord>>>;

    /// Replace the stored list.
    fn set(&self, books: &[BookRecord]) -> Result<()>;

    /// Read the list, treating an absent or unparsable entry as empty.
    fn get(&self) -> Vec<BookRecord> {
        match self.load() {
            Ok(books) => books.unwrap_or_default(),
            Err(err) => {
                warn!("ignoring unreadable book cache: {err:#}");
                Vec::new()
            }
        }
    }
}

/// Key/value file on disk, one JSON object mapping keys to values.
///
/// Other keys present in the file are preserved on write.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    key: String,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            key: STORE_KEY.to_string(),
        }
    }

    /// Use a different key inside the same file.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    fn read_area(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => bail!("{} does not hold a JSON object", self.path.display()),
        }
    }

    fn write_area(&self, area: &Map<String, Value>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("creating {}", parent.display()))?;

        let mut staged = NamedTempFile::new_in(&parent)
            .with_context(|| format!("staging write in {}", parent.display()))?;
        serde_json::to_writer_pretty(&mut staged, area)?;
        staged.write_all(b"\n")?;
        staged
            .persist(&self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl BookStore for FileStore {
    fn load(&self) -> Result<Option<Vec<BookRecord>>> {
        let area = self.read_area()?;
        match area.get(&self.key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .with_context(|| {
                    format!("parsing '{}' in {}", self.key, self.path.display())
                }),
        }
    }

    fn set(&self, books: &[BookRecord]) -> Result<()> {
        // Unreadable files are replaced rather than blocking the write.
        let mut area = match self.read_area() {
            Ok(area) => area,
            Err(err) => {
                warn!("replacing unreadable store file: {err:#}");
                Map::new()
            }
        };
        area.insert(self.key.clone(), serde_json::to_value(books)?);
        self.write_area(&area)?;
        debug!(
            "stored {} books under '{}' in {}",
            books.len(),
            self.key,
            self.path.display()
        );
        Ok(())
    }
}

/// In-memory store holding the serialized list, as the file store would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    raw: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the given records.
    pub fn with_books(books: &[BookRecord]) -> Result<Self> {
        let store = Self::new();
        store.set(books)?;
        Ok(store)
    }

    /// Store seeded with arbitrary serialized text.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: RefCell::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }
}

impl BookStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<BookRecord>>> {
        match self.raw.borrow().as_deref() {
            None => Ok(None),
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .context("parsing cached book list"),
        }
    }

    fn set(&self, books: &[BookRecord]) -> Result<()> {
        let serialized = serde_json::to_string(books)?;
        *self.raw.borrow_mut() = Some(serialized);
        Ok(())
    }
}
