//! Result query interface and listing pages
//!
//! The search backend is an external collaborator. This module defines the one
//! call the bulk workflow needs from it, [`ResultQuery::execute`], and builds
//! the paginated [`Listing`] an operator selects rows from.

pub mod error;

pub use error::QueryError;

use crate::codec::{RowIdentifier, SelectionToken};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One hit returned by the search backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSource {
    /// Index the document lives in
    #[serde(rename = "_index")]
    pub index: String,

    /// Document id
    #[serde(rename = "_id")]
    pub id: String,

    /// Stored document body
    #[serde(rename = "_source", default)]
    pub source: Value,
}

impl RowSource {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            source,
        }
    }

    /// Identity of this row, derived directly from the hit
    #[must_use]
    pub fn identifier(&self) -> RowIdentifier {
        RowIdentifier::new(&self.index, &self.id)
    }
}

/// A page of results plus the total number of matches across all pages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub rows: Vec<RowSource>,
    pub total_count: usize,
}

/// The query behind a listing, re-executable with a different window
///
/// Implementations run the same underlying query every time; only the
/// `page_size`/`offset` window changes between calls.
pub trait ResultQuery {
    /// Fetch `page_size` rows starting at `offset`
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the backend call fails.
    fn execute(&self, page_size: usize, offset: usize) -> Result<QueryPage, QueryError>;

    /// Whether `row` can be one of this query's results
    ///
    /// Checked tokens naming rows outside the query are not acted on.
    fn in_scope(&self, _row: &RowIdentifier) -> bool {
        true
    }
}

impl<Q: ResultQuery + ?Sized> ResultQuery for &Q {
    fn execute(&self, page_size: usize, offset: usize) -> Result<QueryPage, QueryError> {
        (**self).execute(page_size, offset)
    }

    fn in_scope(&self, row: &RowIdentifier) -> bool {
        (**self).in_scope(row)
    }
}

/// A row on the current page together with its checkbox value
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    pub token: SelectionToken,
    pub row: RowSource,
}

/// One rendered page of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    /// Zero-based page number
    pub page: usize,
    pub page_size: usize,
    pub rows: Vec<ListingRow>,
    /// Number of matches across all pages
    pub total_count: usize,
}

impl Listing {
    /// Run `query` for page `page` of `page_size` rows
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPageSize` for a zero page size, or any
    /// error the backend reports.
    pub fn fetch<Q: ResultQuery + ?Sized>(
        query: &Q,
        page: usize,
        page_size: usize,
    ) -> Result<Self, QueryError> {
        if page_size == 0 {
            return Err(QueryError::InvalidPageSize);
        }

        let offset = page.saturating_mul(page_size);
        let result = query.execute(page_size, offset)?;

        tracing::debug!(
            page,
            page_size,
            rows = result.rows.len(),
            total = result.total_count,
            "fetched listing page"
        );

        let rows = result
            .rows
            .into_iter()
            .map(|row| ListingRow {
                token: row.identifier().token(),
                row,
            })
            .collect();

        Ok(Self {
            page,
            page_size,
            rows,
            total_count: result.total_count,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows shown on this page
    #[must_use]
    pub fn count_this_page(&self) -> usize {
        self.rows.len()
    }

    /// Number of pages needed to show every match
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total_count.div_ceil(self.page_size)
    }

    /// Label of the control that widens the selection to every page
    #[must_use]
    pub fn select_all_pages_label(&self) -> String {
        format!("Select all {} in this view", self.total_count)
    }

    /// Label of the control that narrows the selection back to this page
    #[must_use]
    pub fn select_this_page_label(&self) -> String {
        format!("Select only {} on this page", self.count_this_page())
    }

    /// Selection summary shown next to the controls
    #[must_use]
    pub fn selected_label(&self, all_pages: bool) -> String {
        if all_pages {
            format!("Selected {} rows in this view", self.total_count)
        } else {
            format!("Selected {} rows on this page", self.count_this_page())
        }
    }

    /// Find a row on this page by its token
    #[must_use]
    pub fn row_for(&self, token: &SelectionToken) -> Option<&RowSource> {
        self.rows.iter().find(|r| &r.token == token).map(|r| &r.row)
    }
}
