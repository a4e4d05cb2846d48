//! Physical memory access and instruction-pointer tracing.
//!
//! `pmtrace` translates the virtual addresses touched by a monitored program
//! into physical addresses through the Linux pagemap interface, and records
//! them as a compact binary trace. Two tracer variants are provided:
//!
//! * [`MemoryAccessTracer`] records one `(direction, physical address)` pair
//!   per memory operand access (`pinatrace.out` by default).
//! * [`InstructionTracer`] records the physical address of every executed
//!   instruction (`itrace.out` by default).
//!
//! This crate re-exports the core types and, depending on the enabled
//! features, the procfs driver and the instrumentation sources.

pub use pmtrace_core::*;

#[cfg(all(feature = "driver-procfs", feature = "utils"))]
pub mod cli;

/// Pagemap backends.
pub mod driver {
    /// Linux procfs pagemap backend.
    #[cfg(feature = "driver-procfs")]
    pub mod procfs {
        pub use pmtrace_driver_procfs::*;
    }
}

/// Instrumentation sources.
#[cfg(feature = "utils")]
pub mod utils {
    pub use pmtrace_utils::*;
}
