//! Tracer variants built on a shared translation and recording core.

mod instruction;
mod memory;

use std::{
    io::{Read, Seek, Write},
    sync::{Mutex, MutexGuard, PoisonError},
};

pub use self::{instruction::InstructionTracer, memory::MemoryAccessTracer};
use crate::{AddressTranslator, TraceError, TraceRecord, TraceRecorder, TracedAddress, Va};

/// Counters collected while tracing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraceSummary {
    /// Records written to the trace.
    pub records: u64,

    /// Records whose page was not present.
    pub not_present: u64,

    /// Records whose translation failed.
    pub failed: u64,

    /// Records that could not be written.
    pub dropped: u64,
}

/// Output of a finalized tracer.
#[derive(Debug)]
pub struct TraceOutput<W> {
    /// The flushed trace writer.
    pub writer: W,

    /// Counters collected while tracing.
    pub summary: TraceSummary,
}

struct TraceState<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    translator: AddressTranslator<Source>,
    recorder: TraceRecorder<W>,
    summary: TraceSummary,
}

/// Translator and recorder shared by the tracer variants.
///
/// Translation and the append of the resulting record happen under a single
/// lock, so the core may be driven from several monitored threads at once.
pub struct TraceCore<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    state: Mutex<TraceState<Source, W>>,
}

impl<Source, W> TraceCore<Source, W>
where
    Source: Read + Seek,
    W: Write,
{
    /// Creates a new core from a translator and a recorder.
    pub fn new(translator: AddressTranslator<Source>, recorder: TraceRecorder<W>) -> Self {
        Self {
            state: Mutex::new(TraceState {
                translator,
                recorder,
                summary: TraceSummary::default(),
            }),
        }
    }

    /// Translates `va` and appends the record built from the result.
    pub fn record<R>(&self, va: Va, build: impl FnOnce(TracedAddress) -> R)
    where
        R: TraceRecord,
    {
        let mut state = self.lock();
        let state = &mut *state;

        let address = state.translator.resolve(va);
        match address {
            TracedAddress::Mapped(_) => {}
            TracedAddress::NotPresent => state.summary.not_present += 1,
            TracedAddress::Failed => state.summary.failed += 1,
        }

        match state.recorder.append(&build(address)) {
            Ok(()) => state.summary.records += 1,
            Err(err) => {
                state.summary.dropped += 1;
                tracing::warn!(%va, %err, "failed to append record");
            }
        }
    }

    /// Returns the counters collected so far.
    pub fn summary(&self) -> TraceSummary {
        self.lock().summary
    }

    /// Closes the page-table source and flushes the trace.
    pub fn finalize(self) -> Result<TraceOutput<W>, TraceError> {
        let TraceState {
            mut translator,
            recorder,
            summary,
        } = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        translator.close();
        let writer = recorder.finalize()?;

        tracing::info!(
            records = summary.records,
            not_present = summary.not_present,
            failed = summary.failed,
            dropped = summary.dropped,
            "trace finalized"
        );

        Ok(TraceOutput { writer, summary })
    }

    fn lock(&self) -> MutexGuard<'_, TraceState<Source, W>> {
        // A panic on one monitored thread must not stop the others.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
