//! In-process instrumentation host running a memory workload.
//!
//! The host owns the monitored "program": a small kernel that walks heap
//! buffers. Every load or store it executes is reported to the tracer with
//! its real virtual address, and the instruction pointer of each step is the
//! address of the function that performs it.

use std::{
    hint::black_box,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use pmtrace_core::{InstructionEvent, InstrumentationSource, MemoryAccess, TraceError, Va};

/// Memory access pattern of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    /// Increments every word of the buffer in order.
    Sequential,

    /// Loads one word every `stride` bytes.
    Strided,

    /// Copies the first half of the buffer into the second half.
    Copy,
}

/// Error returned when parsing an unknown workload name.
#[derive(thiserror::Error, Debug)]
#[error("Unknown workload `{0}` (expected sequential, strided or copy)")]
pub struct ParseWorkloadError(String);

impl FromStr for Workload {
    type Err = ParseWorkloadError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sequential" => Ok(Self::Sequential),
            "strided" => Ok(Self::Strided),
            "copy" => Ok(Self::Copy),
            _ => Err(ParseWorkloadError(value.to_owned())),
        }
    }
}

/// Parameters of a workload run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadConfig {
    /// The access pattern.
    pub workload: Workload,

    /// Size of the buffer of each thread in bytes.
    pub size: usize,

    /// Distance between loads of the strided workload in bytes.
    pub stride: usize,

    /// Number of passes over the buffer.
    pub passes: usize,

    /// Number of threads running the workload.
    pub threads: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            workload: Workload::Sequential,
            size: 64 * 1024,
            stride: 4096,
            passes: 1,
            threads: 1,
        }
    }
}

/// Instrumentation source that runs a memory workload in this process.
pub struct WorkloadSource {
    config: WorkloadConfig,
    terminate: Arc<AtomicBool>,
}

impl WorkloadSource {
    /// Creates a new workload host.
    pub fn new(config: WorkloadConfig) -> Self {
        Self {
            config,
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Uses `flag` to stop the workload early.
    ///
    /// The workload exits normally once the flag is raised.
    pub fn with_terminate_flag(self, flag: Arc<AtomicBool>) -> Self {
        Self {
            terminate: flag,
            ..self
        }
    }

    /// Returns the workload parameters.
    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    fn worker<F>(&self, thread: usize, callback: &F)
    where
        F: Fn(&InstructionEvent) + Sync,
    {
        let words = (self.config.size / size_of::<u64>()).max(2);
        let stride = (self.config.stride / size_of::<u64>()).max(1);
        let mut buffer = vec![0u64; words];

        tracing::debug!(thread, words, "worker started");

        for pass in 0..self.config.passes {
            if self.terminate.load(Ordering::Relaxed) {
                tracing::info!(thread, pass, "workload terminated");
                break;
            }

            match self.config.workload {
                Workload::Sequential => {
                    for word in buffer.iter_mut() {
                        callback(
                            &InstructionEvent::new(ip(increment as usize))
                                .with_operand(Va::from_ptr(word), MemoryAccess::RW),
                        );
                        increment(word);
                    }
                }
                Workload::Strided => {
                    for word in buffer.iter().step_by(stride) {
                        callback(
                            &InstructionEvent::new(ip(load as usize))
                                .with_operand(Va::from_ptr(word), MemoryAccess::R),
                        );
                        black_box(load(word));
                    }
                }
                Workload::Copy => {
                    let (source, destination) = buffer.split_at_mut(words / 2);
                    for (source, destination) in source.iter().zip(destination.iter_mut()) {
                        callback(
                            &InstructionEvent::new(ip(copy as usize))
                                .with_operand(Va::from_ptr(source), MemoryAccess::R)
                                .with_operand(Va::from_ptr(destination), MemoryAccess::W),
                        );
                        copy(source, destination);
                    }
                }
            }
        }

        black_box(&buffer);
    }
}

impl InstrumentationSource for WorkloadSource {
    fn run<F>(&mut self, callback: F) -> Result<i32, TraceError>
    where
        F: Fn(&InstructionEvent) + Sync,
    {
        tracing::info!(?self.config, "running workload");

        let this = &*self;
        let callback = &callback;
        std::thread::scope(|scope| {
            for thread in 1..this.config.threads.max(1) {
                scope.spawn(move || this.worker(thread, callback));
            }

            this.worker(0, callback);
        });

        Ok(0)
    }
}

/// Entry address of a workload step.
fn ip(function: usize) -> Va {
    Va(function as u64)
}

#[inline(never)]
fn increment(word: &mut u64) {
    *word = black_box(*word).wrapping_add(1);
}

#[inline(never)]
fn load(word: &u64) -> u64 {
    black_box(*word)
}

#[inline(never)]
fn copy(source: &u64, destination: &mut u64) {
    *destination = black_box(*source);
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn collect(config: WorkloadConfig) -> Vec<InstructionEvent> {
        let events = Mutex::new(Vec::new());
        let exit_code = WorkloadSource::new(config)
            .run(|event| events.lock().unwrap().push(event.clone()))
            .unwrap();

        assert_eq!(exit_code, 0);
        events.into_inner().unwrap()
    }

    #[test]
    fn parse_workload() {
        assert_eq!("copy".parse::<Workload>().unwrap(), Workload::Copy);
        assert!("random".parse::<Workload>().is_err());
    }

    #[test]
    fn sequential_reports_read_write_operands() {
        let events = collect(WorkloadConfig {
            size: 256,
            ..Default::default()
        });

        assert_eq!(events.len(), 32);
        for pair in events.windows(2) {
            assert_eq!(pair[0].ip(), pair[1].ip());
            assert_eq!(
                pair[1].operands()[0].address.0 - pair[0].operands()[0].address.0,
                8
            );
        }
        assert!(
            events
                .iter()
                .all(|event| event.operands()[0].access == MemoryAccess::RW)
        );
    }

    #[test]
    fn strided_loads() {
        let events = collect(WorkloadConfig {
            workload: Workload::Strided,
            size: 64 * 1024,
            stride: 4096,
            passes: 2,
            ..Default::default()
        });

        assert_eq!(events.len(), 2 * 16);
        assert!(
            events
                .iter()
                .all(|event| event.operands().len() == 1
                    && event.operands()[0].access == MemoryAccess::R)
        );
    }

    #[test]
    fn copy_reports_source_and_destination() {
        let events = collect(WorkloadConfig {
            workload: Workload::Copy,
            size: 128,
            ..Default::default()
        });

        assert_eq!(events.len(), 8);
        for event in &events {
            let operands = event.operands();
            assert_eq!(operands.len(), 2);
            assert_eq!(operands[0].access, MemoryAccess::R);
            assert_eq!(operands[1].access, MemoryAccess::W);
            assert_eq!(operands[1].address.0 - operands[0].address.0, 64);
        }
    }

    #[test]
    fn threads_share_the_callback() {
        let events = collect(WorkloadConfig {
            size: 256,
            threads: 3,
            ..Default::default()
        });

        assert_eq!(events.len(), 3 * 32);
    }

    #[test]
    fn raised_flag_stops_before_first_pass() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut source = WorkloadSource::new(WorkloadConfig::default()).with_terminate_flag(flag);

        let count = Mutex::new(0usize);
        let exit_code = source.run(|_| *count.lock().unwrap() += 1).unwrap();

        assert_eq!(exit_code, 0);
        assert_eq!(count.into_inner().unwrap(), 0);
    }
}
