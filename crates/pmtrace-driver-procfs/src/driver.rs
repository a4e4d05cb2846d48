use std::{
    fs::File,
    path::{Path, PathBuf},
};

use pmtrace_core::{AddressTranslator, PageTableReader, TraceError};

use crate::Error;

/// Page-table metadata of the current process.
pub const SELF_PAGEMAP: &str = "/proc/self/pagemap";

/// Driver for the procfs pagemap interface.
#[derive(Debug, Clone)]
pub struct ProcfsDriver {
    path: PathBuf,
    page_size: u64,
}

impl ProcfsDriver {
    /// Creates a driver for the pagemap of the current process.
    pub fn new() -> Result<Self, Error> {
        Self::with_path(SELF_PAGEMAP)
    }

    /// Creates a driver for the pagemap of another process.
    ///
    /// Reading it requires ptrace access to that process.
    pub fn for_pid(pid: u32) -> Result<Self, Error> {
        Self::with_path(format!("/proc/{pid}/pagemap"))
    }

    /// Creates a driver for the pagemap file at `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let page_size = page_size()?;

        tracing::debug!(path = %path.display(), page_size, "procfs driver");
        Ok(Self { path, page_size })
    }

    /// Returns the path of the pagemap file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the page size of the host.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Opens the pagemap file.
    pub fn open_reader(&self) -> Result<PageTableReader<File>, TraceError> {
        PageTableReader::open(&self.path)
    }

    /// Opens the pagemap file and creates a translator over it.
    pub fn open_translator(&self) -> Result<AddressTranslator<File>, TraceError> {
        AddressTranslator::new(self.open_reader()?, self.page_size)
    }
}

/// Queries the page size of the host.
pub fn page_size() -> Result<u64, Error> {
    // SAFETY: `sysconf` has no preconditions.
    let value = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    match u64::try_from(value) {
        Ok(page_size) if page_size > 0 => Ok(page_size),
        _ => Err(Error::PageSize(std::io::Error::last_os_error())),
    }
}
