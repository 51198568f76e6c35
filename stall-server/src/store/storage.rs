//! redb-backed document storage
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `store_documents` | `"festival-stall-data"` | JSON `StoreDocument` | Whole stall state |
//!
//! Every write rewrites the whole document inside one write transaction and
//! bumps `version`. redb serializes write transactions, so closures passed to
//! [`DocumentStorage::update`] never lose updates to each other. Writers that
//! load, edit elsewhere, then save use [`DocumentStorage::save_if_version`].

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

use super::document::StoreDocument;
use super::error::{StorageError, StorageResult};
use super::seed;

/// key = fixed document key, value = JSON-serialized StoreDocument
const DOCUMENTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("store_documents");

/// Fixed storage key of the stall document
pub const DOCUMENT_KEY: &str = "festival-stall-data";

#[derive(Clone)]
pub struct DocumentStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for DocumentStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStorage").finish_non_exhaustive()
    }
}

impl DocumentStorage {
    /// Open or create the database file, seeding the default menu on first use
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Open an in-memory database (tests, oneshot tools)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS_TABLE)?;
            if table.get(DOCUMENT_KEY)?.is_none() {
                let mut doc = seed::default_document();
                doc.version = 1;
                let value = serde_json::to_vec(&doc)?;
                table.insert(DOCUMENT_KEY, value.as_slice())?;
                tracing::info!("Store document seeded with default menu");
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Load the current document
    pub fn load(&self) -> StorageResult<StoreDocument> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS_TABLE)?;
        let raw = table.get(DOCUMENT_KEY)?.map(|guard| guard.value().to_vec());
        decode(raw)
    }

    /// Current committed version
    pub fn version(&self) -> StorageResult<u64> {
        Ok(self.load()?.version)
    }

    /// Last-writer-wins save; returns the new version
    pub fn save(&self, doc: &StoreDocument) -> StorageResult<u64> {
        self.write(doc, None)
    }

    /// Save only if nobody committed since `expected_version` was loaded
    pub fn save_if_version(&self, doc: &StoreDocument, expected_version: u64) -> StorageResult<u64> {
        self.write(doc, Some(expected_version))
    }

    fn write(&self, doc: &StoreDocument, expected_version: Option<u64>) -> StorageResult<u64> {
        let write_txn = self.db.begin_write()?;
        let version = {
            let mut table = write_txn.open_table(DOCUMENTS_TABLE)?;
            let raw = table.get(DOCUMENT_KEY)?.map(|guard| guard.value().to_vec());
            let current = decode(raw)?.version;
            if let Some(expected) = expected_version
                && expected != current
            {
                return Err(StorageError::VersionConflict {
                    expected,
                    actual: current,
                });
            }
            let mut next = doc.clone();
            next.version = current + 1;
            let value = serde_json::to_vec(&next)?;
            table.insert(DOCUMENT_KEY, value.as_slice())?;
            next.version
        };
        write_txn.commit()?;
        Ok(version)
    }

    /// Read-modify-write inside one write transaction
    ///
    /// When `f` fails the transaction is dropped and nothing is written.
    /// Returns the closure's value and the committed version.
    pub fn update<T, E, F>(&self, f: F) -> Result<(T, u64), E>
    where
        F: FnOnce(&mut StoreDocument) -> Result<T, E>,
        E: From<StorageError>,
    {
        let write_txn = self.db.begin_write().map_err(StorageError::from)?;
        let (value, version) = {
            let mut table = write_txn
                .open_table(DOCUMENTS_TABLE)
                .map_err(StorageError::from)?;
            let raw = table
                .get(DOCUMENT_KEY)
                .map_err(StorageError::from)?
                .map(|guard| guard.value().to_vec());
            let mut doc = decode(raw)?;
            let version = doc.version + 1;

            let value = f(&mut doc)?;

            doc.version = version;
            let bytes = serde_json::to_vec(&doc).map_err(StorageError::from)?;
            table
                .insert(DOCUMENT_KEY, bytes.as_slice())
                .map_err(StorageError::from)?;
            (value, version)
        };
        write_txn.commit().map_err(StorageError::from)?;
        Ok((value, version))
    }
}

fn decode(raw: Option<Vec<u8>>) -> StorageResult<StoreDocument> {
    let raw = raw.ok_or(StorageError::MissingDocument(DOCUMENT_KEY))?;
    Ok(serde_json::from_slice(&raw)?)
}
