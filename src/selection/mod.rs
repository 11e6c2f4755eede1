//! Row selection and target resolution
//!
//! A [`SelectionSet`] records what the operator ticked on one listing page,
//! plus the "all pages" flag. The ticked tokens were computed against a single
//! page, so when the flag is set they cannot describe the selection; the
//! [`SelectionManager`] then re-runs the listing query with a widened window
//! and derives the targets from the fresh hits.
//!
//! Checked tokens belong to the listing session that produced them. Carrying
//! them over to a different query is not supported.

use crate::codec::{self, RowIdentifier, SelectionToken};
use crate::query::{Listing, QueryError, ResultQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default cap on how many rows an all-pages resolution may fetch
pub const DEFAULT_MAX_FETCH_SIZE: usize = 10_000;

/// Ticked rows of a listing and the all-pages flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    checked: BTreeSet<SelectionToken>,
    all_pages: bool,
    /// Total matches reported by the listing the selection was made on
    total_count: usize,
}

impl SelectionSet {
    /// Empty selection for a listing with `total_count` matches
    #[must_use]
    pub fn new(total_count: usize) -> Self {
        Self {
            total_count,
            ..Self::default()
        }
    }

    /// Empty selection for `listing`
    #[must_use]
    pub fn for_listing(listing: &Listing) -> Self {
        Self::new(listing.total_count)
    }

    /// Flip the checkbox for `token`, returning whether it is now checked
    pub fn toggle(&mut self, token: SelectionToken) -> bool {
        if self.checked.remove(&token) {
            false
        } else {
            self.checked.insert(token);
            true
        }
    }

    pub fn check(&mut self, token: SelectionToken) {
        self.checked.insert(token);
    }

    pub fn uncheck(&mut self, token: &SelectionToken) {
        self.checked.remove(token);
    }

    /// Tick every row of `listing`
    pub fn check_page(&mut self, listing: &Listing) {
        self.checked
            .extend(listing.rows.iter().map(|r| r.token.clone()));
    }

    pub fn clear(&mut self) {
        self.checked.clear();
    }

    /// Switch between "this page only" and "every matching result"
    ///
    /// Only flips the flag; nothing is fetched until targets are resolved.
    pub fn set_all_pages(&mut self, all_pages: bool) {
        self.all_pages = all_pages;
    }

    #[must_use]
    pub const fn all_pages(&self) -> bool {
        self.all_pages
    }

    #[must_use]
    pub fn is_checked(&self, token: &SelectionToken) -> bool {
        self.checked.contains(token)
    }

    pub fn checked(&self) -> impl Iterator<Item = &SelectionToken> {
        self.checked.iter()
    }

    /// Number of ticked rows on the page
    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn set_total_count(&mut self, total_count: usize) {
        self.total_count = total_count;
    }

    /// How many items the selection stands for
    #[must_use]
    pub fn selected_count(&self) -> usize {
        if self.all_pages {
            self.total_count
        } else {
            self.checked.len()
        }
    }

    /// Whether nothing would be targeted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected_count() == 0
    }
}

/// Preview of what an action is about to be applied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSummary {
    /// Number of items targeted
    pub count: usize,
    /// Listed items, rendered as `index:id`
    pub items: Vec<String>,
}

impl SelectionSummary {
    /// Heading line, e.g. "You are about to apply an action on 3 items:"
    #[must_use]
    pub fn heading(&self) -> String {
        if self.count == 1 {
            "You are about to apply an action on 1 item:".to_string()
        } else {
            format!("You are about to apply an action on {} items:", self.count)
        }
    }

    /// Items counted but not listed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.count.saturating_sub(self.items.len())
    }

    /// Trailer for items that were not listed
    #[must_use]
    pub fn trailer(&self) -> Option<String> {
        match self.remaining() {
            0 => None,
            n => Some(format!("and other {n} items.")),
        }
    }
}

/// Resolves a [`SelectionSet`] into concrete targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionManager {
    max_fetch_size: usize,
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FETCH_SIZE)
    }
}

impl SelectionManager {
    /// Manager whose all-pages resolution fetches at most `max_fetch_size` rows
    #[must_use]
    pub const fn new(max_fetch_size: usize) -> Self {
        Self { max_fetch_size }
    }

    #[must_use]
    pub const fn max_fetch_size(&self) -> usize {
        self.max_fetch_size
    }

    /// Window size for an all-pages re-query
    ///
    /// Covers the known total, capped at the fetch bound. An unknown (zero)
    /// total asks for the bound.
    #[must_use]
    pub fn all_pages_window(&self, selection: &SelectionSet) -> usize {
        match selection.total_count() {
            0 => self.max_fetch_size,
            total => total.min(self.max_fetch_size),
        }
    }

    /// Concrete targets of `selection`
    ///
    /// Without the all-pages flag every checked token is decoded; tokens that
    /// fail to decode are stale or tampered and are dropped, as are rows the
    /// query would never return. With the flag the
    /// checked tokens are ignored and `query` is executed once from offset
    /// zero with a window covering every known match.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the all-pages re-query fails.
    pub fn resolve_targets<Q: ResultQuery + ?Sized>(
        &self,
        selection: &SelectionSet,
        query: &Q,
    ) -> Result<Vec<RowIdentifier>, QueryError> {
        if !selection.all_pages() {
            return Ok(decode_checked(selection)
                .into_iter()
                .filter(|row| {
                    let keep = query.in_scope(row);
                    if !keep {
                        tracing::warn!(%row, "dropping selection token outside the listing");
                    }
                    keep
                })
                .collect());
        }

        let window = self.all_pages_window(selection);
        if selection.total_count() > self.max_fetch_size {
            tracing::warn!(
                total = selection.total_count(),
                max_fetch_size = self.max_fetch_size,
                "all-pages selection exceeds fetch bound, truncating"
            );
        }

        tracing::info!(page_size = window, offset = 0, "re-querying all pages");
        let result = query.execute(window, 0)?;

        if result.total_count > result.rows.len() && result.rows.len() == window {
            tracing::warn!(
                total = result.total_count,
                fetched = result.rows.len(),
                "result set is larger than the resolved targets"
            );
        }

        Ok(result.rows.iter().map(|row| row.identifier()).collect())
    }

    /// Preview of `selection`, listing at most `limit` items
    #[must_use]
    pub fn summarize(&self, selection: &SelectionSet, limit: usize) -> Option<SelectionSummary> {
        let count = selection.selected_count();
        if count == 0 {
            return None;
        }

        let items = decode_checked(selection)
            .into_iter()
            .take(limit)
            .map(|row| row.to_string())
            .collect();

        Some(SelectionSummary { count, items })
    }
}

fn decode_checked(selection: &SelectionSet) -> Vec<RowIdentifier> {
    selection
        .checked()
        .filter_map(|token| match codec::decode(token) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::warn!(token = %token, error = %e, "dropping undecodable selection token");
                None
            }
        })
        .collect()
}
