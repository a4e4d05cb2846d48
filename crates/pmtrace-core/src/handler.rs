use crate::{InstructionEvent, TraceError};

/// A trait for handling executed instructions.
///
/// A handler implementing this trait is passed to [`TraceSession::handle`],
/// which feeds it every instruction reported by the instrumentation source
/// and finalizes it once the monitored program exits.
///
/// [`TraceSession::handle`]: crate::TraceSession::handle
pub trait TraceHandler {
    /// The output type of the handler.
    type Output;

    /// Handles an executed instruction.
    ///
    /// Must not fail: problems are absorbed into the trace.
    fn handle_instruction(&self, event: &InstructionEvent);

    /// Flushes and releases everything the handler owns.
    fn finalize(self) -> Result<Self::Output, TraceError>
    where
        Self: Sized;
}
