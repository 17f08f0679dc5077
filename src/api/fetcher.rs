//! Range and name reconciliation against the durable store
//!
//! The fetcher answers "give me records for this index span" and "give me
//! the record with this name" by diffing the request against what the
//! disk cache already holds, fetching only the complement from the
//! network, merging the results back, and returning the full requested
//! set. One instance exists per record kind.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::client::{ApiError, RecordSource};
use crate::cache::{PageStore, StoreError};
use crate::data::CatalogRecord;

/// Errors raised while reconciling a request against cache and network
#[derive(Debug, Error)]
pub enum FetchError {
    /// The durable store failed (corrupt or unreadable page)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The network collaborator failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The requested span crosses a page boundary
    #[error("index range {min_index}..={max_index} spans more than one cache page")]
    RangeSpansPages { min_index: u32, max_index: u32 },

    /// A just-merged identity is still absent from its page
    #[error("record {id} missing from its page after merge")]
    MissingAfterMerge { id: u32 },
}

/// Two-tier fetcher for one record kind
///
/// Couples a [`PageStore`] with a [`RecordSource`]. All reads prefer the
/// store; the network is consulted only for identities the store does not
/// yet hold, and everything fetched is persisted before being returned.
#[derive(Debug)]
pub struct ReconcilingFetcher<R, S> {
    store: PageStore<R>,
    source: S,
}

impl<R, S> ReconcilingFetcher<R, S>
where
    R: CatalogRecord + Clone + Serialize + DeserializeOwned,
    S: RecordSource<R>,
{
    pub fn new(store: PageStore<R>, source: S) -> Self {
        Self { store, source }
    }

    /// Returns exactly `max_index - min_index + 1` records whose
    /// identities are `min_index+1 ..= max_index+1`, ascending.
    ///
    /// Indices are zero-based; the span is inclusive and must lie within
    /// a single page. Identities already on disk are not refetched;
    /// missing ones are fetched individually in ascending order, and any
    /// single failure aborts the whole call with no partial result.
    pub async fn fetch_range(&self, min_index: u32, max_index: u32) -> Result<Vec<R>, FetchError> {
        let page = PageStore::<R>::page_for(min_index);
        if page != PageStore::<R>::page_for(max_index) {
            return Err(FetchError::RangeSpansPages {
                min_index,
                max_index,
            });
        }

        let span = (max_index - min_index + 1) as usize;
        let cached = self.store.records_in_range(min_index, max_index)?;
        if cached.len() == span {
            debug!(min_index, max_index, "range fully cached on disk");
            return Ok(cached);
        }

        // Presence array over the span: every unmarked slot is a missing
        // identity (slot + min_index + 1).
        let mut present = vec![false; span];
        for record in &cached {
            present[(record.id() - 1 - min_index) as usize] = true;
        }
        let missing: Vec<u32> = present
            .iter()
            .enumerate()
            .filter(|(_, seen)| !**seen)
            .map(|(slot, _)| min_index + slot as u32 + 1)
            .collect();
        debug!(
            min_index,
            max_index,
            cached = cached.len(),
            missing = missing.len(),
            "range partially cached; fetching missing identities"
        );

        let mut fetched = Vec::with_capacity(missing.len());
        for id in missing {
            fetched.push(self.source.fetch_by_id(id).await?);
        }
        self.store.merge_page(page, fetched, true)?;

        // Re-read the merged span so the caller sees exactly what was
        // persisted, in identity order.
        let records = self.store.records_in_range(min_index, max_index)?;
        if records.len() != span {
            let id = first_absent_identity(&records, min_index, max_index);
            return Err(FetchError::MissingAfterMerge { id });
        }
        Ok(records)
    }

    /// Returns the record with the given catalog name.
    ///
    /// The name-index segments are searched first; a hit is served from
    /// the owning page with no network call. On a miss the record is
    /// fetched by name, persisted into the page its identity belongs to
    /// (with its name-index entry), and returned.
    pub async fn fetch_by_name(&self, name: &str) -> Result<R, FetchError> {
        if let Some(entry) = self.store.lookup_name(name)? {
            debug!(name, id = entry.id, "name resolved from index");
            if let Some(record) = self.store.record_by_id(entry.id)? {
                return Ok(record);
            }
            // Index entry without a backing record: fall through to the
            // network and let the merge restore consistency.
        }

        debug!(name, "name not cached; fetching from catalog");
        let record = self.source.fetch_by_name(name).await?;
        let page = PageStore::<R>::page_for(record.id() - 1);
        self.store.merge_page(page, vec![record.clone()], true)?;
        Ok(record)
    }
}

/// First identity in `[min_index+1, max_index+1]` absent from `records`.
fn first_absent_identity<R: CatalogRecord>(records: &[R], min_index: u32, max_index: u32) -> u32 {
    for id in min_index + 1..=max_index + 1 {
        if !records.iter().any(|record| record.id() == id) {
            return id;
        }
    }
    max_index + 1
}
