//! In-memory channel table loaded from, and saved back to, a single CSV file.
//!
//! The whole file is read up front and rewritten on every save. Saves go to a
//! sibling temp file that is renamed over the target, so an interrupted run
//! leaves either the old table or the new one on disk, never a partial file.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use ytscout_core::{ChannelAnalytics, ChannelRecord, ALL_COLUMNS};

use crate::error::StoreError;

#[derive(Debug)]
pub struct ChannelTable {
    path: PathBuf,
    rows: Vec<ChannelRecord>,
}

impl ChannelTable {
    /// Load the table at `path`, or start an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Csv`] if any row fails to parse.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            tracing::info!(path = %path.display(), "creating new channel database");
            return Ok(Self {
                path,
                rows: Vec::new(),
            });
        }
        Self::load(path)
    }

    /// Load an existing table. Missing columns are filled with empty values
    /// and unknown columns are ignored.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if `path` does not exist.
    /// - [`StoreError::Io`] if the file cannot be opened.
    /// - [`StoreError::Csv`] if any row fails to parse. Nothing is dropped
    ///   silently, since the next save would otherwise lose those rows.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Err(StoreError::NotFound { path });
        }

        let file = File::open(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for (idx, result) in reader.deserialize::<ChannelRecord>().enumerate() {
            let row = result.map_err(|source| StoreError::Csv {
                path: path.clone(),
                row: idx + 2,
                source,
            })?;
            rows.push(row);
        }

        tracing::info!(path = %path.display(), channels = rows.len(), "loaded channel database");
        Ok(Self { path, rows })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[ChannelRecord] {
        &self.rows
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChannelRecord> {
        self.rows.get(index)
    }

    /// Index of the first row that is the same channel, by username
    /// (case-insensitive) or exact channel URL.
    #[must_use]
    pub fn find_existing(&self, username: &str, channel_url: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.matches(username, channel_url))
    }

    /// Merge `niche` into the row at `index`. Returns `true` if the row changed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowOutOfRange`] for an invalid index.
    pub fn merge_niche(&mut self, index: usize, niche: &str) -> Result<bool, StoreError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(StoreError::RowOutOfRange { index, len })?;
        Ok(row.add_niche(niche))
    }

    /// Append a new row and return its index.
    ///
    /// Callers are expected to have checked [`Self::find_existing`] first.
    pub fn insert(&mut self, record: ChannelRecord) -> usize {
        self.rows.push(record);
        self.rows.len() - 1
    }

    /// Indices of rows the enrichment pass has not processed yet, in table order.
    #[must_use]
    pub fn pending_enrichment(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.needs_enrichment())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Overwrite the analytics columns of the row at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowOutOfRange`] for an invalid index.
    pub fn apply_analytics(
        &mut self,
        index: usize,
        analytics: ChannelAnalytics,
    ) -> Result<(), StoreError> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(StoreError::RowOutOfRange { index, len })?;
        row.apply_analytics(analytics);
        Ok(())
    }

    /// Write every row to disk under the fixed column header.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::Csv`] if the temp file
    /// cannot be written or renamed into place.
    pub fn save(&self) -> Result<(), StoreError> {
        let tmp_path = temp_path_for(&self.path);
        let io_err = |source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(&tmp_path).map_err(io_err)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        writer
            .write_record(ALL_COLUMNS)
            .map_err(|source| StoreError::Csv {
                path: tmp_path.clone(),
                row: 1,
                source,
            })?;
        for (idx, row) in self.rows.iter().enumerate() {
            writer.serialize(row).map_err(|source| StoreError::Csv {
                path: tmp_path.clone(),
                row: idx + 2,
                source,
            })?;
        }
        writer.flush().map_err(io_err)?;
        drop(writer);

        std::fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), channels = self.rows.len(), "channel database saved");
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "channels.csv".into(), |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_hidden_sibling() {
        assert_eq!(
            temp_path_for(Path::new("/data/channels.csv")),
            PathBuf::from("/data/.channels.csv.tmp")
        );
        assert_eq!(
            temp_path_for(Path::new("channels.csv")),
            PathBuf::from(".channels.csv.tmp")
        );
    }

    #[test]
    fn merge_niche_rejects_bad_index() {
        let mut table = ChannelTable {
            path: PathBuf::from("unused.csv"),
            rows: Vec::new(),
        };
        let err = table.merge_niche(3, "gaming").unwrap_err();
        assert!(matches!(err, StoreError::RowOutOfRange { index: 3, len: 0 }));
    }
}
