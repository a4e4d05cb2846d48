//! Page-table metadata entries.
//!
//! The kernel exposes one 64-bit entry per virtual page of a process in
//! `/proc/<pid>/pagemap`. Entries are stored in the byte order of the host
//! that produced them.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Pfn;

/// Byte order of a page-table metadata source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Most significant byte first.
    Big,

    /// Least significant byte first.
    Little,
}

impl Endianness {
    /// The byte order of the host this code runs on.
    pub const NATIVE: Self = if cfg!(target_endian = "big") {
        Self::Big
    } else {
        Self::Little
    };
}

/// A single entry of the page-table metadata source.
#[repr(transparent)]
#[derive(Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct PagemapEntry(pub u64);

impl PagemapEntry {
    /// Size of an entry in bytes.
    pub const SIZE: u64 = 8;

    const PFN_BITS: u32 = 55;
    const PFN_MASK: u64 = (1 << Self::PFN_BITS) - 1;

    /// Assembles an entry from raw bytes stored in the given byte order.
    ///
    /// The logical value is identical on every host as long as `endianness`
    /// describes the producer of `bytes`.
    pub fn from_bytes(bytes: [u8; 8], endianness: Endianness) -> Self {
        match endianness {
            Endianness::Big => Self(u64::from_be_bytes(bytes)),
            Endianness::Little => Self(u64::from_le_bytes(bytes)),
        }
    }

    /// Checks if the page is backed by a physical frame (bit 63).
    pub fn present(self) -> bool {
        (self.0 >> 63) & 1 != 0
    }

    /// Checks if the page resides in swap storage (bit 62).
    ///
    /// Only meaningful when the page is not present.
    pub fn swapped(self) -> bool {
        (self.0 >> 62) & 1 != 0
    }

    /// Checks if the page is file-mapped or shared anonymous (bit 61).
    pub fn file_page(self) -> bool {
        (self.0 >> 61) & 1 != 0
    }

    /// Checks if the page is exclusively mapped (bit 56).
    pub fn exclusive(self) -> bool {
        (self.0 >> 56) & 1 != 0
    }

    /// Checks if the page table entry is soft-dirty (bit 55).
    pub fn soft_dirty(self) -> bool {
        (self.0 >> 55) & 1 != 0
    }

    /// Extracts the page frame number (bits 0-54).
    ///
    /// Only meaningful when the page is present.
    pub fn pfn(self) -> Pfn {
        Pfn(self.0 & Self::PFN_MASK)
    }
}

impl std::fmt::Debug for PagemapEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PagemapEntry")
            .field("present", &self.present())
            .field("swapped", &self.swapped())
            .field("file_page", &self.file_page())
            .field("exclusive", &self.exclusive())
            .field("soft_dirty", &self.soft_dirty())
            .field("pfn", &self.pfn())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENT_FRAME_5: u64 = 0x8000_0000_0000_0005;

    #[test]
    fn decode_present_entry() {
        let entry = PagemapEntry(PRESENT_FRAME_5);
        assert!(entry.present());
        assert!(!entry.swapped());
        assert_eq!(entry.pfn(), Pfn(5));
    }

    #[test]
    fn decode_swapped_entry() {
        let entry = PagemapEntry(1 << 62);
        assert!(!entry.present());
        assert!(entry.swapped());
    }

    #[test]
    fn pfn_ignores_flag_bits() {
        let entry = PagemapEntry(0xffff_ffff_ffff_ffff);
        assert_eq!(entry.pfn(), Pfn((1 << 55) - 1));
        assert!(entry.soft_dirty());
        assert!(entry.exclusive());
        assert!(entry.file_page());
    }

    #[test]
    fn same_entry_on_big_and_little_endian_hosts() {
        let from_big = PagemapEntry::from_bytes(PRESENT_FRAME_5.to_be_bytes(), Endianness::Big);
        let from_little =
            PagemapEntry::from_bytes(PRESENT_FRAME_5.to_le_bytes(), Endianness::Little);

        assert_eq!(from_big, from_little);
        assert_eq!(
            (from_big.present(), from_big.swapped(), from_big.pfn()),
            (true, false, Pfn(5))
        );
    }

    #[test]
    fn native_endianness_matches_host() {
        let bytes = PRESENT_FRAME_5.to_ne_bytes();
        assert_eq!(
            PagemapEntry::from_bytes(bytes, Endianness::NATIVE),
            PagemapEntry(PRESENT_FRAME_5)
        );
        assert_eq!(
            PagemapEntry::read_from_bytes(&bytes).ok(),
            Some(PagemapEntry(PRESENT_FRAME_5))
        );
    }
}
