use super::macros::impl_address;

impl_address!(Pfn, "Page Frame Number");
impl_address!(Pa, "Physical Address");
impl_address!(Va, "Virtual Address");

impl Va {
    /// Creates a virtual address from a pointer in the current process.
    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr.cast::<u8>() as usize as u64)
    }

    /// Returns the index of the virtual page containing this address.
    pub fn page_number(self, page_size: u64) -> u64 {
        self / page_size
    }

    /// Returns the offset of this address within its page.
    pub fn page_offset(self, page_size: u64) -> u64 {
        self % page_size
    }
}

impl Pa {
    /// Composes a physical address from a frame number and an offset within
    /// the frame.
    ///
    /// Returns `None` if the result does not fit into 64 bits.
    pub fn from_pfn(pfn: Pfn, page_size: u64, offset: u64) -> Option<Self> {
        pfn.0
            .checked_mul(page_size)
            .and_then(|base| base.checked_add(offset))
            .map(Self)
    }
}
