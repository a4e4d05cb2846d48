use std::io::{Read, Seek, Write};

use super::{TraceCore, TraceOutput};
use crate::{
    AddressTranslator, Direction, InstructionEvent, MemoryAccess, MemoryAccessRecord,
    TraceError, TraceHandler, TraceRecorder,
};

/// Tracer of memory reads and writes.
///
/// Every memory operand of an executed instruction produces one
/// [`MemoryAccessRecord`] per direction. An operand that is both read and
/// written produces a read record followed by a write record.
pub struct MemoryAccessTracer<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    core: TraceCore<Source, W>,
}

impl<Source, W> MemoryAccessTracer<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    /// Default name of the trace file.
    pub const DEFAULT_OUTPUT: &'static str = "pinatrace.out";

    /// Creates a new memory access tracer.
    pub fn new(translator: AddressTranslator<Source>, recorder: TraceRecorder<W>) -> Self {
        Self {
            core: TraceCore::new(translator, recorder),
        }
    }

    /// Returns the shared translation and recording core.
    pub fn core(&self) -> &TraceCore<Source, W> {
        &self.core
    }
}

impl<Source, W> TraceHandler for MemoryAccessTracer<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    type Output = TraceOutput<W>;

    fn handle_instruction(&self, event: &InstructionEvent) {
        for operand in event.operands() {
            if operand.access.contains(MemoryAccess::R) {
                self.core.record(operand.address, |address| {
                    MemoryAccessRecord::new(Direction::Read, address)
                });
            }

            if operand.access.contains(MemoryAccess::W) {
                self.core.record(operand.address, |address| {
                    MemoryAccessRecord::new(Direction::Write, address)
                });
            }
        }
    }

    fn finalize(self) -> Result<Self::Output, TraceError> {
        self.core.finalize()
    }
}
