//! Persistent JSON index of processed articles.
//!
//! The index is a single JSON array rewritten in full on every append. An
//! unreadable, malformed or non-array index is recovered as an empty list;
//! the previous file is kept next to it as `<name>.corrupt` so its entries
//! can still be salvaged by hand.

use crate::models::IndexRecord;
use serde_json::Value;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write index {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What was found on disk when the index was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    /// No index file yet
    Absent,
    /// File exists but holds only whitespace
    Empty,
    /// A valid JSON array
    Loaded,
    /// Unreadable or not valid JSON
    Corrupt(String),
    /// Valid JSON, but not an array
    NotArray,
}

impl IndexState {
    /// Whether prior content was discarded during recovery
    pub fn is_recovered(&self) -> bool {
        matches!(self, IndexState::Corrupt(_) | IndexState::NotArray)
    }
}

/// Entries read from disk together with how they were obtained
#[derive(Debug, Clone)]
pub struct LoadedIndex {
    /// Raw entries, kept verbatim even when they are not index records
    pub entries: Vec<Value>,
    pub state: IndexState,
}

/// JSON array index at a fixed path
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the previous index is copied to before a recovery overwrite
    pub fn backup_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Read the index, recovering any unusable state as an empty list
    pub fn load(&self) -> LoadedIndex {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return LoadedIndex {
                    entries: Vec::new(),
                    state: IndexState::Absent,
                };
            }
            Err(err) => {
                return LoadedIndex {
                    entries: Vec::new(),
                    state: IndexState::Corrupt(err.to_string()),
                };
            }
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return LoadedIndex {
                entries: Vec::new(),
                state: IndexState::Empty,
            };
        }

        match serde_json::from_slice::<Value>(&data) {
            Ok(Value::Array(entries)) => LoadedIndex {
                entries,
                state: IndexState::Loaded,
            },
            Ok(_) => LoadedIndex {
                entries: Vec::new(),
                state: IndexState::NotArray,
            },
            Err(err) => LoadedIndex {
                entries: Vec::new(),
                state: IndexState::Corrupt(err.to_string()),
            },
        }
    }

    /// Entries that parse as index records, in stored order
    pub fn records(&self) -> Vec<IndexRecord> {
        self.load()
            .entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()
    }

    /// Append one record and rewrite the whole index
    ///
    /// Returns the state the index was in before the append.
    pub fn append(&self, record: &IndexRecord) -> Result<IndexState, IndexError> {
        let LoadedIndex { mut entries, state } = self.load();

        match &state {
            IndexState::Corrupt(reason) => {
                tracing::warn!(
                    "Index {:?} is not valid JSON ({}); starting a new index",
                    self.path,
                    reason
                );
                self.backup();
            }
            IndexState::NotArray => {
                tracing::warn!(
                    "Index {:?} does not hold a JSON array; starting a new index",
                    self.path
                );
                self.backup();
            }
            IndexState::Absent => {
                tracing::debug!("Creating index {:?}", self.path);
            }
            IndexState::Empty | IndexState::Loaded => {}
        }

        entries.push(serde_json::to_value(record)?);
        self.write(&entries)?;

        tracing::debug!(
            "Appended {} to index ({} entries)",
            record.filename,
            entries.len()
        );
        Ok(state)
    }

    fn backup(&self) {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => tracing::warn!("Previous index saved to {:?}", backup),
            Err(err) => tracing::warn!("Could not back up index to {:?}: {}", backup, err),
        }
    }

    /// Write the full array through a temp file renamed over the index
    fn write(&self, entries: &[Value]) -> Result<(), IndexError> {
        let write_err = |source: io::Error| IndexError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        serde_json::to_writer_pretty(&mut tmp, entries)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}
