//! Core pagemap translation and trace recording.
//!
//! The crate translates virtual addresses of the traced process into
//! physical addresses by reading its page-table metadata, and records the
//! results as a compact binary trace:
//!
//! * [`PageTableReader`] reads [`PagemapEntry`] values from the metadata
//!   source.
//! * [`AddressTranslator`] turns entries into physical addresses.
//! * [`TraceRecorder`] appends fixed-width [`TraceRecord`]s to a stream, and
//!   [`TraceReader`] decodes them again.
//! * [`MemoryAccessTracer`] and [`InstructionTracer`] are the two
//!   [`TraceHandler`]s that an [`InstrumentationSource`] drives through a
//!   [`TraceSession`].

mod core;
mod error;
mod handler;
pub mod pagemap;
mod reader;
pub mod record;
mod recorder;
mod session;
mod source;
mod trace_reader;
mod translator;
pub mod tracer;

pub use self::{
    core::{MemoryAccess, Pa, Pfn, Va},
    error::TraceError,
    handler::TraceHandler,
    pagemap::{Endianness, PagemapEntry},
    reader::PageTableReader,
    record::{Direction, InstructionRecord, MemoryAccessRecord, TraceRecord},
    recorder::TraceRecorder,
    session::{TraceOutcome, TraceSession},
    source::{InstructionEvent, InstrumentationSource, MemoryOperand, MemoryOperands},
    trace_reader::{TraceReader, read_trace},
    tracer::{InstructionTracer, MemoryAccessTracer, TraceCore, TraceOutput, TraceSummary},
    translator::{AddressTranslator, TracedAddress},
};
