//! Durable page store for catalog records
//!
//! Persists fetched catalog records to disk as JSON page files so that
//! later sessions can serve overlapping requests without the network. The
//! catalog is partitioned into fixed 20-record pages, one file per page,
//! to bound per-request decode cost. Each page has a sibling name-index
//! segment of `{name, id}` pairs for name-to-identity lookup without
//! decoding full records.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::data::CatalogRecord;

/// Number of records per on-disk page segment
pub const PAGE_SIZE: u32 = 20;

/// Errors raised by the durable store
///
/// An absent file is never an error (a cold page is simply empty); a file
/// that exists but cannot be read or parsed is, so that previously fetched
/// data is never silently discarded and refetched.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a cache file failed
    #[error("cache file access failed: {0}")]
    Io(#[from] std::io::Error),

    /// A cache file exists but does not decode
    #[error("cache file {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A name-to-identity pair in a page's name-index segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameIndexEntry {
    pub name: String,
    pub id: u32,
}

/// Disk-backed store of one record kind, partitioned into pages
///
/// The base path names the catalog (e.g. `areas.json`); page N lives at
/// the base path with N spliced in before the extension (`areas0.json`),
/// and its name-index segment at `areas0-names.json`. Single-process,
/// single-writer: persistence is truncate-and-rewrite, not atomic rename.
#[derive(Debug, Clone)]
pub struct PageStore<R> {
    base_path: PathBuf,
    _record: PhantomData<R>,
}

impl<R> PageStore<R>
where
    R: CatalogRecord + Serialize + DeserializeOwned,
{
    /// Creates a store rooted at `base_path`. Nothing is touched on disk
    /// until the first write; the parent directory is created lazily.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            _record: PhantomData,
        }
    }

    /// Page number owning the given zero-based catalog index.
    pub fn page_for(index: u32) -> u32 {
        index / PAGE_SIZE
    }

    /// Path of a page segment: base path with the page number spliced in
    /// before the extension.
    pub fn page_path(&self, page: u32) -> PathBuf {
        self.spliced_path(page, "")
    }

    /// Path of a page's name-index segment.
    pub fn names_path(&self, page: u32) -> PathBuf {
        self.spliced_path(page, "-names")
    }

    fn spliced_path(&self, page: u32, suffix: &str) -> PathBuf {
        let stem = self
            .base_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .base_path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "json".to_string());
        self.base_path
            .with_file_name(format!("{stem}{page}{suffix}.{ext}"))
    }

    /// Loads every record cached in the given page.
    ///
    /// An absent page file is an empty page; a present-but-undecodable
    /// file is a [`StoreError::Corrupt`].
    pub fn load_page(&self, page: u32) -> Result<Vec<R>, StoreError> {
        Ok(load_json(&self.page_path(page))?.unwrap_or_default())
    }

    /// Loads the name-index segment for the given page, or `None` if the
    /// segment file does not exist.
    pub fn load_names(&self, page: u32) -> Result<Option<Vec<NameIndexEntry>>, StoreError> {
        load_json(&self.names_path(page))
    }

    /// Records from the owning page whose zero-based index (`id - 1`)
    /// falls within `[min_index, max_index]`, ascending by identity.
    pub fn records_in_range(&self, min_index: u32, max_index: u32) -> Result<Vec<R>, StoreError> {
        let mut records: Vec<R> = self
            .load_page(Self::page_for(min_index))?
            .into_iter()
            .filter(|record| {
                let index = record.id() - 1;
                index >= min_index && index <= max_index
            })
            .collect();
        records.sort_by_key(CatalogRecord::id);
        Ok(records)
    }

    /// Point lookup through the page owning the identity.
    pub fn record_by_id(&self, id: u32) -> Result<Option<R>, StoreError> {
        let page = Self::page_for(id - 1);
        Ok(self
            .load_page(page)?
            .into_iter()
            .find(|record| record.id() == id))
    }

    /// Searches the name-index segments linearly, segment by segment in
    /// ascending page order. First matching name wins (catalog names are
    /// globally unique).
    pub fn lookup_name(&self, name: &str) -> Result<Option<NameIndexEntry>, StoreError> {
        for page in self.name_segments()? {
            if let Some(entries) = self.load_names(page)? {
                if let Some(entry) = entries.into_iter().find(|entry| entry.name == name) {
                    return Ok(Some(entry));
                }
            }
        }
        Ok(None)
    }

    /// Page numbers of every name-index segment on disk, ascending.
    ///
    /// Pages are enumerated from the directory rather than counted up
    /// from zero: a record fetched by name can land in a late page while
    /// earlier pages are still cold, and it must stay discoverable.
    fn name_segments(&self) -> Result<Vec<u32>, StoreError> {
        let Some(parent) = self.base_path.parent() else {
            return Ok(Vec::new());
        };
        let dir = match fs::read_dir(parent) {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::Io(err)),
        };

        let stem = self
            .base_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suffix = format!(
            "-names.{}",
            self.base_path
                .extension()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "json".to_string())
        );

        let mut pages = Vec::new();
        for entry in dir {
            let file_name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(page) = file_name
                .strip_prefix(&stem)
                .and_then(|rest| rest.strip_suffix(&suffix))
                .and_then(|digits| digits.parse::<u32>().ok())
            {
                pages.push(page);
            }
        }
        pages.sort_unstable();
        Ok(pages)
    }

    /// Merges `new_records` into the given page and persists it.
    ///
    /// Read-modify-write: existing records are loaded (a corrupt page is
    /// fatal, never overwritten), new records appended, and the result
    /// deduplicated by identity with later records superseding earlier
    /// ones. When `update_name_index` is set, the page's name-index
    /// segment is rewritten from the merged contents.
    pub fn merge_page(
        &self,
        page: u32,
        new_records: Vec<R>,
        update_name_index: bool,
    ) -> Result<(), StoreError> {
        let mut by_id: BTreeMap<u32, R> = BTreeMap::new();
        for record in self.load_page(page)? {
            by_id.insert(record.id(), record);
        }
        for record in new_records {
            by_id.insert(record.id(), record);
        }

        let records: Vec<R> = by_id.into_values().collect();
        debug!(page, records = records.len(), "persisting page segment");
        write_json(&self.page_path(page), &records)?;

        if update_name_index {
            let names: Vec<NameIndexEntry> = records
                .iter()
                .map(|record| NameIndexEntry {
                    name: record.name().to_string(),
                    id: record.id(),
                })
                .collect();
            write_json(&self.names_path(page), &names)?;
        }

        Ok(())
    }
}

/// Reads and decodes a JSON file, distinguishing "absent" (`None`) from
/// read failures and corrupt contents (errors).
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StoreError::Io(err)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

/// Encodes `value` as JSON and writes it, creating the parent directory
/// if it does not yet exist.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
    fs::write(path, json)?;
    Ok(())
}
