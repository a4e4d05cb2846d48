use std::io::{Read, Seek, Write};

use super::{TraceCore, TraceOutput};
use crate::{
    AddressTranslator, InstructionEvent, InstructionRecord, TraceError, TraceHandler,
    TraceRecorder,
};

/// Tracer of executed instruction pointers.
///
/// Every executed instruction produces one [`InstructionRecord`] holding the
/// physical address of the instruction.
pub struct InstructionTracer<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    core: TraceCore<Source, W>,
}

impl<Source, W> InstructionTracer<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    /// Default name of the trace file.
    pub const DEFAULT_OUTPUT: &'static str = "itrace.out";

    /// Creates a new instruction tracer.
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

impl<Source, W> TraceHandler for InstructionTracer<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    type Output = TraceOutput<W>;

    fn handle_instruction(&self, event: &InstructionEvent) {
        self.core.record(event.ip(), InstructionRecord::new);
    }

    fn finalize(self) -> Result<Self::Output, TraceError> {
        self.core.finalize()
    }
}
