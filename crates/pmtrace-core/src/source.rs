use smallvec::SmallVec;

use crate::{MemoryAccess, TraceError, Va};

/// A memory operand of an executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryOperand {
    /// Effective virtual address of the operand.
    pub address: Va,

    /// Whether the operand is read, written, or both.
    pub access: MemoryAccess,
}

/// Memory operands of a single instruction.
pub type MemoryOperands = SmallVec<[MemoryOperand; 2]>;

/// An instruction that has been executed by the monitored program.
///
/// Instrumentation sources only report instructions whose predicate held,
/// never instructions that were fetched but skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionEvent {
    ip: Va,
    operands: MemoryOperands,
}

impl InstructionEvent {
    /// Creates an event for an instruction without memory operands.
    pub fn new(ip: Va) -> Self {
        Self {
            ip,
            operands: MemoryOperands::new(),
        }
    }

    /// Adds a memory operand to the event.
    pub fn with_operand(mut self, address: Va, access: MemoryAccess) -> Self {
        self.operands.push(MemoryOperand { address, access });
        self
    }

    /// Returns the instruction pointer.
    pub fn ip(&self) -> Va {
        self.ip
    }

    /// Returns the memory operands in operand order.
    pub fn operands(&self) -> &[MemoryOperand] {
        &self.operands
    }
}

/// A host facility that runs the monitored program and reports its
/// executed instructions.
///
/// The source decides which instructions are observed and when the program
/// exits. The callback may be invoked concurrently from several threads of
/// the monitored program.
pub trait InstrumentationSource {
    /// Runs the monitored program to completion, invoking `callback` for
    /// every executed instruction.
    ///
    /// Returns the exit code of the monitored program.
    fn run<F>(&mut self, callback: F) -> Result<i32, TraceError>
    where
        F: Fn(&InstructionEvent) + Sync;
}
