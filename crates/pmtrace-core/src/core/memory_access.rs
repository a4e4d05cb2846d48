bitflags::bitflags! {
    /// Direction of a memory operand access.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryAccess: u8 {
        /// The operand is read.
        const R = 1 << 0;

        /// The operand is written.
        const W = 1 << 1;

        /// The operand is both read and written.
        const RW = Self::R.bits() | Self::W.bits();
    }
}

impl std::fmt::Display for MemoryAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let read = if self.contains(Self::R) { 'r' } else { '-' };
        let write = if self.contains(Self::W) { 'w' } else { '-' };

        write!(f, "{read}{write}")
    }
}
