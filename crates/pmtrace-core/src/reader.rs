use std::{
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom},
    path::Path,
};

use crate::{Endianness, PagemapEntry, TraceError, Va};

/// Reader of per-process page-table metadata.
///
/// The source is a dense array of [`PagemapEntry`] values indexed by virtual
/// page number.
pub struct PageTableReader<Source>
where
    Source: Read + Seek,
{
    source: Option<Source>,
    endianness: Endianness,
}

impl PageTableReader<File> {
    /// Opens a page-table metadata file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| TraceError::open(path, err))?;

        tracing::debug!(path = %path.display(), "opened page-table metadata");
        Ok(Self::new(file))
    }
}

impl<Source> PageTableReader<Source>
where
    Source: Read + Seek,
{
    /// Creates a reader over a source produced by this host.
    pub fn new(source: Source) -> Self {
        Self::with_endianness(source, Endianness::NATIVE)
    }

    /// Creates a reader over a source stored in the given byte order.
    pub fn with_endianness(source: Source, endianness: Endianness) -> Self {
        Self {
            source: Some(source),
            endianness,
        }
    }

    /// Reads the entry describing the page that contains `va`.
    ///
    /// Returns `Ok(None)` if the source has no entry for the page.
    pub fn read_entry(
        &mut self,
        va: Va,
        page_size: u64,
    ) -> Result<Option<PagemapEntry>, TraceError> {
        if page_size == 0 {
            return Err(TraceError::InvalidPageSize(page_size));
        }

        let source = self.source.as_mut().ok_or(TraceError::Closed)?;
        let offset = va
            .page_number(page_size)
            .checked_mul(PagemapEntry::SIZE)
            .ok_or(TraceError::AddressOverflow(va))?;

        source
            .seek(SeekFrom::Start(offset))
            .map_err(|source| TraceError::Seek { va, source })?;

        let mut bytes = [0u8; PagemapEntry::SIZE as usize];
        match source.read_exact(&mut bytes) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                tracing::trace!(%va, offset, "pagemap exhausted");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }

        let entry = PagemapEntry::from_bytes(bytes, self.endianness);
        if entry.swapped() {
            tracing::debug!(%va, "page swapped");
        }

        Ok(Some(entry))
    }

    /// Checks if the reader has been closed.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Releases the underlying source.
    ///
    /// Closing an already closed reader does nothing.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            tracing::trace!("page-table reader closed");
        }
    }
}
