use std::path::PathBuf;

use crate::Va;

/// An error that can occur while translating addresses or recording a trace.
#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    /// A page-table metadata source or trace file could not be opened.
    #[error("Cannot open {}: {source}", path.display())]
    Open {
        /// The path that failed to open.
        path: PathBuf,

        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Seeking to the page-table entry of a virtual address failed.
    #[error("Failed to seek to the pagemap entry of {va}: {source}")]
    Seek {
        /// The virtual address being translated.
        va: Va,

        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The page-table reader has already been closed.
    #[error("Page-table reader is closed")]
    Closed,

    /// The page size is not usable for translation.
    #[error("Invalid page size: {0}")]
    InvalidPageSize(u64),

    /// The physical address of a virtual address does not fit into 64 bits.
    #[error("Physical address of {0} overflows")]
    AddressOverflow(Va),

    /// A trace ended in the middle of a record.
    #[error("Trace ends with a truncated record ({len} bytes)")]
    TruncatedRecord {
        /// The number of bytes of the incomplete record.
        len: usize,
    },

    /// An error reported by an instrumentation source.
    #[error(transparent)]
    Source(Box<dyn std::error::Error + Send + Sync>),
}

impl TraceError {
    /// Creates an error for a path that could not be opened.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
