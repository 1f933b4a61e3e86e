//! Audit storage backends.
//!
//! Every backend is append-only. Writers are serialized so that events
//! from concurrent cycles never interleave inside a record.

use crate::error::AuditError;
use async_trait::async_trait;
use mediator_core::AuditEvent;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

/// Trait for audit storage backends.
#[async_trait]
pub trait AuditStorage: Send + Sync {
    /// Append an audit event.
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError>;

    /// All stored events in insertion order. Write-only backends return nothing.
    async fn events(&self) -> Result<Vec<AuditEvent>, AuditError>;
}

/// Console storage (human-readable lines on stdout).
pub struct ConsoleStorage;

impl ConsoleStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditStorage for ConsoleStorage {
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        println!("[AUDIT] {}", event.to_log_line());
        Ok(())
    }

    async fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        // Console storage doesn't support retrieval
        Ok(vec![])
    }
}

/// File storage (JSON Lines, one event per line).
pub struct FileStorage {
    path: PathBuf,
    writer: Mutex<File>,
}

impl FileStorage {
    /// Start a fresh log at `path`, truncating any previous content.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        Self::open(path.as_ref(), true)
    }

    /// Continue an existing log at `path`, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        Self::open(path.as_ref(), false)
    }

    fn open(path: &Path, truncate: bool) -> Result<Self, AuditError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditStorage for FileStorage {
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(event)?;

        let mut file = self.writer.lock().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        writeln!(file, "{}", json)?;
        file.flush()?;

        Ok(())
    }

    async fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        read_log(&self.path)
    }
}

/// In-memory storage, for embedding and tests.
#[derive(Default)]
pub struct MemoryStorage {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStorage for MemoryStorage {
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let mut events = self.events.write().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire write lock: {}", e))
        })?;
        events.push(event.clone());
        Ok(())
    }

    async fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        let events = self.events.read().map_err(|e| {
            AuditError::StorageError(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(events.clone())
    }
}

/// File storage that also echoes every event to the console.
pub struct DualStorage {
    file: FileStorage,
    console: ConsoleStorage,
}

impl DualStorage {
    pub fn new(file: FileStorage) -> Self {
        Self {
            file,
            console: ConsoleStorage::new(),
        }
    }
}

#[async_trait]
impl AuditStorage for DualStorage {
    async fn store(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.file.store(event).await?;
        self.console.store(event).await
    }

    async fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        self.file.events().await
    }
}

/// Discards everything.
#[derive(Default)]
pub struct NullStorage;

impl NullStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditStorage for NullStorage {
    async fn store(&self, _event: &AuditEvent) -> Result<(), AuditError> {
        Ok(())
    }

    async fn events(&self) -> Result<Vec<AuditEvent>, AuditError> {
        Ok(vec![])
    }
}

/// Parse a JSON Lines audit log. Blank lines are skipped.
pub fn read_log(path: impl AsRef<Path>) -> Result<Vec<AuditEvent>, AuditError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let mut events = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line)
            .map_err(|source| AuditError::MalformedRecord { line: idx + 1, source })?;
        events.push(event);
    }

    Ok(events)
}
