//! Instrumentation source replaying a prepared instruction stream.

use pmtrace_core::{InstructionEvent, InstrumentationSource, TraceError};

/// An instruction of a script together with the outcome of its predicate.
#[derive(Debug, Clone)]
struct ScriptedInstruction {
    event: InstructionEvent,
    executed: bool,
}

/// Instrumentation source that replays a fixed sequence of instructions.
///
/// Instructions whose predicate does not hold are part of the script but
/// are never reported, mirroring predicated instrumentation.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    script: Vec<ScriptedInstruction>,
    exit_code: i32,
}

impl ScriptedSource {
    /// Creates a source that reports `events` in order and then exits with
    /// `exit_code`.
    pub fn new(events: impl IntoIterator<Item = InstructionEvent>, exit_code: i32) -> Self {
        Self {
            script: events
                .into_iter()
                .map(|event| ScriptedInstruction {
                    event,
                    executed: true,
                })
                .collect(),
            exit_code,
        }
    }

    /// Appends an executed instruction.
    pub fn push(&mut self, event: InstructionEvent) {
        self.script.push(ScriptedInstruction {
            event,
            executed: true,
        });
    }

    /// Appends an instruction whose predicate is false.
    pub fn push_skipped(&mut self, event: InstructionEvent) {
        self.script.push(ScriptedInstruction {
            event,
            executed: false,
        });
    }

    /// Returns the number of instructions that will be reported.
    pub fn executed(&self) -> usize {
        self.script.iter().filter(|insn| insn.executed).count()
    }
}

impl InstrumentationSource for ScriptedSource {
    fn run<F>(&mut self, callback: F) -> Result<i32, TraceError>
    where
        F: Fn(&InstructionEvent) + Sync,
    {
        for insn in &self.script {
            if !insn.executed {
                tracing::trace!(ip = %insn.event.ip(), "predicate false");
                continue;
            }

            callback(&insn.event);
        }

        Ok(self.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pmtrace_core::{
        AddressTranslator, InstructionRecord, InstructionTracer, MemoryAccess, MemoryAccessRecord,
        MemoryAccessTracer, PageTableReader, TraceReader, TraceRecorder, TraceSession, Va,
    };

    use super::*;

    fn translator() -> AddressTranslator<Cursor<Vec<u8>>> {
        let bytes = [0u64, 0x8000_0000_0000_0005]
            .iter()
            .flat_map(|entry| entry.to_ne_bytes())
            .collect();

        AddressTranslator::new(PageTableReader::new(Cursor::new(bytes)), 4096).unwrap()
    }

    #[test]
    fn skipped_instructions_are_not_traced() {
        let mut source = ScriptedSource::new([InstructionEvent::new(Va(0x1000))], 0);
        source.push_skipped(InstructionEvent::new(Va(0x1004)));
        source.push(InstructionEvent::new(Va(0x1008)));
        assert_eq!(source.executed(), 2);

        let tracer = InstructionTracer::new(translator(), TraceRecorder::new(Vec::new()));
        let outcome = TraceSession::new(source).handle(tracer).unwrap();

        let records = TraceReader::<_, InstructionRecord>::new(outcome.output.writer.as_slice())
            .map(|record| record.unwrap().physical_address)
            .collect::<Vec<_>>();
        assert_eq!(records, vec![0x5000, 0x5008]);
    }

    #[test]
    fn exit_code_is_forwarded() {
        let source = ScriptedSource::new(
            [InstructionEvent::new(Va(0x1000)).with_operand(Va(0x1010), MemoryAccess::RW)],
            7,
        );

        let tracer = MemoryAccessTracer::new(translator(), TraceRecorder::new(Vec::new()));
        let outcome = TraceSession::new(source).handle(tracer).unwrap();
        assert_eq!(outcome.exit_code, 7);

        let records = TraceReader::<_, MemoryAccessRecord>::new(outcome.output.writer.as_slice())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records.len(), 2);
    }
}
