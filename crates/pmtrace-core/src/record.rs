//! Binary trace records.
//!
//! Records are fixed-width tuples of `u64` fields in host byte order,
//! written back to back with no header or footer.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::TracedAddress;

/// Physical address field of a record whose page was not present.
pub const NOT_PRESENT: u64 = 0;

/// Physical address field of a record whose translation failed.
pub const TRANSLATION_FAILED: u64 = u64::MAX;

/// A fixed-width record of a trace.
pub trait TraceRecord: Copy + FromBytes + IntoBytes + Immutable + KnownLayout {
    /// Size of the encoded record in bytes.
    const SIZE: usize = size_of::<Self>();
}

/// Direction of a traced memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum Direction {
    /// The memory was written.
    Write = 0,

    /// The memory was read.
    Read = 1,
}

impl TryFrom<u64> for Direction {
    type Error = u64;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Write),
            1 => Ok(Self::Read),
            value => Err(value),
        }
    }
}

/// A record of a single memory read or write.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct MemoryAccessRecord {
    /// `1` for a read, `0` for a write.
    pub direction: u64,

    /// Physical address of the accessed memory.
    pub physical_address: u64,
}

impl MemoryAccessRecord {
    /// Creates a record of an access in the given direction.
    pub fn new(direction: Direction, address: TracedAddress) -> Self {
        Self {
            direction: direction as u64,
            physical_address: address.to_raw(),
        }
    }

    /// Returns the direction of the access, if the field is valid.
    pub fn direction(&self) -> Option<Direction> {
        Direction::try_from(self.direction).ok()
    }

    /// Returns the decoded physical address field.
    pub fn address(&self) -> TracedAddress {
        TracedAddress::from_raw(self.physical_address)
    }
}

impl TraceRecord for MemoryAccessRecord {}

/// A record of a single executed instruction.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct InstructionRecord {
    /// Physical address of the instruction.
    pub physical_address: u64,
}

impl InstructionRecord {
    /// Creates a record of an instruction at the given address.
    pub fn new(address: TracedAddress) -> Self {
        Self {
            physical_address: address.to_raw(),
        }
    }

    /// Returns the decoded physical address field.
    pub fn address(&self) -> TracedAddress {
        TracedAddress::from_raw(self.physical_address)
    }
}

impl TraceRecord for InstructionRecord {}
