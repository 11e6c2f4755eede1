//! Local document store
//!
//! A sled-backed stand-in for the search backend, so listings can be browsed
//! and bulk actions applied without a remote cluster. Documents are kept in a
//! single `documents` tree keyed by `(index, id)`; see [`types`] for the
//! encodings.

use crate::actions::{ActionError, DocumentBackend, set_source_path};
use crate::codec::RowIdentifier;
use crate::query::RowSource;
use serde_json::Value;
use sled::{Db, Tree};
use std::collections::BTreeSet;
use std::path::Path;

pub mod error;
pub mod query;
pub mod types;

pub use error::DbError;
pub use query::IndexQuery;
pub use types::{DocumentKey, StoredDocument};

/// Database wrapper that encapsulates all document operations
pub struct Database {
    db: Db,
    documents: Tree,
}

impl Database {
    /// Opens or creates a database at the specified path
    ///
    /// # Examples
    /// ```no_run
    /// use bulkform::db::Database;
    /// let db = Database::open("my_index").unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the database or its tree cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let db = sled::open(path)?;
        let documents = db.open_tree("documents")?;
        Ok(Self { db, documents })
    }

    /// Insert or replace a document
    ///
    /// # Errors
    ///
    /// Returns `DbError::InvalidInput` if the hit has an empty index or id,
    /// or any storage or encoding error.
    pub fn insert(&self, row: &RowSource) -> Result<(), DbError> {
        if row.index.is_empty() || row.id.is_empty() {
            return Err(DbError::InvalidInput(
                "documents need a non-empty _index and _id".to_string(),
            ));
        }
        self.put(&row.identifier(), &row.source)
    }

    /// Insert a batch of documents, returning how many were stored
    ///
    /// # Errors
    ///
    /// Stops at the first document that cannot be stored.
    pub fn insert_many(&self, rows: &[RowSource]) -> Result<usize, DbError> {
        for row in rows {
            self.insert(row)?;
        }
        tracing::debug!(count = rows.len(), "stored documents");
        Ok(rows.len())
    }

    /// Fetch one document
    ///
    /// # Errors
    ///
    /// Returns `DbError` if reading or decoding fails.
    pub fn get(&self, row: &RowIdentifier) -> Result<Option<RowSource>, DbError> {
        let key: Vec<u8> = (&DocumentKey::new(row.clone())).try_into()?;
        match self.documents.get(key)? {
            Some(value) => {
                let source = StoredDocument::from_bytes(&value)?.to_source()?;
                Ok(Some(RowSource::new(row.index(), row.id(), source)))
            }
            None => Ok(None),
        }
    }

    /// Remove a document, returning whether it existed
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the storage operation fails.
    pub fn remove(&self, row: &RowIdentifier) -> Result<bool, DbError> {
        let key: Vec<u8> = (&DocumentKey::new(row.clone())).try_into()?;
        Ok(self.documents.remove(key)?.is_some())
    }

    /// # Errors
    ///
    /// Returns `DbError` if the storage operation fails.
    pub fn contains(&self, row: &RowIdentifier) -> Result<bool, DbError> {
        let key: Vec<u8> = (&DocumentKey::new(row.clone())).try_into()?;
        Ok(self.documents.contains_key(key)?)
    }

    /// Set the dotted `path` of a stored document's source
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotFound` if there is no such document.
    pub fn update_field(&self, row: &RowIdentifier, path: &str, value: Value) -> Result<(), DbError> {
        let mut doc = self
            .get(row)?
            .ok_or_else(|| DbError::NotFound(row.to_string()))?;
        set_source_path(&mut doc.source, path, value);
        self.put(row, &doc.source)
    }

    /// Get the number of stored documents
    #[must_use]
    pub fn count(&self) -> usize {
        self.documents.len()
    }

    /// Names of every index holding at least one document
    ///
    /// # Errors
    ///
    /// Returns `DbError` if iteration or key decoding fails.
    pub fn list_indices(&self) -> Result<Vec<String>, DbError> {
        let mut indices = BTreeSet::new();
        for result in self.documents.iter().keys() {
            let key = DocumentKey::from_bytes(&result?)?;
            indices.insert(key.into_inner().index().to_string());
        }
        Ok(indices.into_iter().collect())
    }

    /// Query over every document, or only those of `index`
    #[must_use]
    pub fn query(&self, index: Option<&str>) -> IndexQuery<'_> {
        IndexQuery::new(self, index)
    }

    /// Flush all pending writes to disk
    ///
    /// # Errors
    ///
    /// Returns `DbError` if the flush operation fails.
    pub fn flush(&self) -> Result<(), DbError> {
        self.db.flush()?;
        Ok(())
    }

    /// Clear all documents
    ///
    /// # Errors
    ///
    /// Returns `DbError` if clearing the tree fails.
    pub fn clear(&self) -> Result<(), DbError> {
        self.documents.clear()?;
        Ok(())
    }

    pub(crate) const fn documents(&self) -> &Tree {
        &self.documents
    }

    fn put(&self, row: &RowIdentifier, source: &Value) -> Result<(), DbError> {
        let key: Vec<u8> = (&DocumentKey::new(row.clone())).try_into()?;
        let value = StoredDocument::from_source(source)?.to_bytes()?;
        self.documents.insert(key, value)?;
        Ok(())
    }
}

impl DocumentBackend for Database {
    fn delete(&self, row: &RowIdentifier) -> Result<bool, ActionError> {
        Ok(self.remove(row)?)
    }

    fn exists(&self, row: &RowIdentifier) -> Result<bool, ActionError> {
        Ok(self.contains(row)?)
    }

    fn set_field(&self, row: &RowIdentifier, path: &str, value: Value) -> Result<bool, ActionError> {
        match self.update_field(row, path, value) {
            Ok(()) => Ok(true),
            Err(DbError::NotFound(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        // Errors can't propagate out of Drop; callers flush() when they need durability
        let _ = self.db.flush();
    }
}
