mod address;
pub(crate) mod macros;
mod memory_access;

pub use self::{
    address::{Pa, Pfn, Va},
    memory_access::MemoryAccess,
};
