use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("channel database not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {} (row {row}): {source}", path.display())]
    Csv {
        path: PathBuf,
        /// 1-based data row, counting the header as row 1.
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("row index {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: usize, len: usize },
}
