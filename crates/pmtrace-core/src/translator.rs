use std::io::{Read, Seek};

use crate::{
    Pa, PageTableReader, TraceError, Va,
    record::{NOT_PRESENT, TRANSLATION_FAILED},
};

/// Outcome of resolving a virtual address for the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TracedAddress {
    /// The page is present and backed by the given physical address.
    Mapped(Pa),

    /// The page has no physical frame (unmapped, swapped out, or beyond the
    /// end of the page-table metadata).
    NotPresent,

    /// The page-table metadata could not be read.
    Failed,
}

impl TracedAddress {
    /// Returns the value stored in the physical address field of a record.
    pub fn to_raw(self) -> u64 {
        match self {
            Self::Mapped(pa) => pa.0,
            Self::NotPresent => NOT_PRESENT,
            Self::Failed => TRANSLATION_FAILED,
        }
    }

    /// Interprets the physical address field of a record.
    ///
    /// A mapped physical address of zero cannot be told apart from
    /// [`TracedAddress::NotPresent`].
    pub fn from_raw(value: u64) -> Self {
        match value {
            NOT_PRESENT => Self::NotPresent,
            TRANSLATION_FAILED => Self::Failed,
            value => Self::Mapped(Pa(value)),
        }
    }

    /// Returns the physical address, if the page is mapped.
    pub fn pa(self) -> Option<Pa> {
        match self {
            Self::Mapped(pa) => Some(pa),
            _ => None,
        }
    }
}

/// Translator of virtual addresses of a process into physical addresses.
pub struct AddressTranslator<Source>
where
    Source: Read + Seek,
{
    reader: PageTableReader<Source>,
    page_size: u64,
    warned_zero_pfn: bool,
}

impl<Source> AddressTranslator<Source>
where
    Source: Read + Seek,
{
    /// Creates a translator that reads entries through `reader`.
    ///
    /// The page size is fixed for the lifetime of the translator.
    pub fn new(reader: PageTableReader<Source>, page_size: u64) -> Result<Self, TraceError> {
        if page_size == 0 {
            return Err(TraceError::InvalidPageSize(page_size));
        }

        Ok(Self {
            reader,
            page_size,
            warned_zero_pfn: false,
        })
    }

    /// Returns the page size used for translation.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Translates a virtual address into a physical address.
    ///
    /// Returns `Ok(None)` if the page is not present.
    pub fn translate(&mut self, va: Va) -> Result<Option<Pa>, TraceError> {
        let entry = match self.reader.read_entry(va, self.page_size)? {
            Some(entry) if entry.present() => entry,
            _ => return Ok(None),
        };

        let pfn = entry.pfn();
        if pfn.0 == 0 && !self.warned_zero_pfn {
            self.warned_zero_pfn = true;
            tracing::warn!(
                %va,
                "present page reports frame 0, physical addresses require CAP_SYS_ADMIN"
            );
        }

        // The all-ones address is reserved for failed translations.
        Pa::from_pfn(pfn, self.page_size, va.page_offset(self.page_size))
            .filter(|pa| pa.0 != TRANSLATION_FAILED)
            .map(Some)
            .ok_or(TraceError::AddressOverflow(va))
    }

    /// Resolves a virtual address, absorbing translation failures.
    pub fn resolve(&mut self, va: Va) -> TracedAddress {
        match self.translate(va) {
            Ok(Some(pa)) => TracedAddress::Mapped(pa),
            Ok(None) => TracedAddress::NotPresent,
            Err(err) => {
                tracing::warn!(%va, %err, "translation failed");
                TracedAddress::Failed
            }
        }
    }

    /// Releases the page-table metadata source.
    pub fn close(&mut self) {
        self.reader.close();
    }
}
