//! Windowed queries over the document store
//!
//! [`IndexQuery`] is the store's [`ResultQuery`]: the same scan every time,
//! optionally restricted to one index, with only the window varying. Rows
//! come back grouped by index name in alphabetical order; within an index
//! they follow key order, which sorts shorter ids first, so numeric ids list
//! in numeric order.

use super::types::{DocumentKey, StoredDocument, index_prefix};
use super::{Database, DbError};
use crate::codec::RowIdentifier;
use crate::query::{QueryError, QueryPage, ResultQuery, RowSource};

/// Re-executable scan over a [`Database`]
pub struct IndexQuery<'a> {
    db: &'a Database,
    index: Option<String>,
}

impl<'a> IndexQuery<'a> {
    #[must_use]
    pub fn new(db: &'a Database, index: Option<&str>) -> Self {
        Self {
            db,
            index: index.map(str::to_string),
        }
    }

    #[must_use]
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// One prefix scan per index, in index name order
    ///
    /// Keys lead with the length of the index name, so a plain scan of the
    /// tree would group short names first.
    fn scans(&self) -> Result<Vec<sled::Iter>, DbError> {
        let indices = match &self.index {
            Some(index) => vec![index.clone()],
            None => self.db.list_indices()?,
        };
        indices
            .iter()
            .map(|index| Ok(self.db.documents().scan_prefix(index_prefix(index)?)))
            .collect()
    }

    fn decode(key: &[u8], value: &[u8]) -> Result<RowSource, DbError> {
        let row = DocumentKey::from_bytes(key)?.into_inner();
        let source = StoredDocument::from_bytes(value)?.to_source()?;
        Ok(RowSource::new(row.index(), row.id(), source))
    }
}

impl ResultQuery for IndexQuery<'_> {
    fn execute(&self, page_size: usize, offset: usize) -> Result<QueryPage, QueryError> {
        let mut rows = Vec::with_capacity(page_size.min(1024));
        let mut total_count = 0;

        for (position, entry) in self.scans()?.into_iter().flatten().enumerate() {
            let (key, value) = entry.map_err(DbError::from)?;
            total_count += 1;
            if position >= offset && rows.len() < page_size {
                rows.push(Self::decode(&key, &value)?);
            }
        }

        tracing::debug!(
            index = self.index.as_deref().unwrap_or("*"),
            page_size,
            offset,
            rows = rows.len(),
            total = total_count,
            "executed index query"
        );

        Ok(QueryPage { rows, total_count })
    }

    fn in_scope(&self, row: &RowIdentifier) -> bool {
        self.index.as_deref().is_none_or(|index| row.index() == index)
    }
}
