use std::{fs::File, io::ErrorKind};

use pmtrace_core::{
    AddressTranslator, InstructionRecord, InstructionTracer, MemoryAccessRecord,
    MemoryAccessTracer, TraceError, TraceReader, TraceRecorder, TraceSession, TracedAddress,
};
use pmtrace_driver_procfs::ProcfsDriver;
use pmtrace_utils::workload::{Workload, WorkloadConfig, WorkloadSource};

/// Opens the pagemap of this process, or `None` when the host does not
/// expose it to us.
fn translator() -> Option<(AddressTranslator<File>, u64)> {
    let driver = ProcfsDriver::new().unwrap();

    match driver.open_translator() {
        Ok(translator) => Some((translator, driver.page_size())),
        Err(TraceError::Open { source, .. })
            if matches!(
                source.kind(),
                ErrorKind::NotFound | ErrorKind::PermissionDenied
            ) =>
        {
            None
        }
        Err(err) => panic!("{err}"),
    }
}

#[test]
fn copy_workload_on_own_pagemap() {
    let Some((translator, _)) = translator() else {
        return;
    };

    let source = WorkloadSource::new(WorkloadConfig {
        workload: Workload::Copy,
        size: 4 * 4096,
        passes: 2,
        ..Default::default()
    });

    let tracer = MemoryAccessTracer::new(translator, TraceRecorder::new(Vec::new()));
    let outcome = TraceSession::new(source).handle(tracer).unwrap();
    assert_eq!(outcome.exit_code, 0);

    let summary = outcome.output.summary;
    assert_eq!(summary.records, 2 * 2 * (4 * 4096 / 16));
    assert_eq!(summary.failed, 0);

    let records = TraceReader::<_, MemoryAccessRecord>::new(outcome.output.writer.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len() as u64, summary.records);

    // Frame numbers read as zero without CAP_SYS_ADMIN, the word alignment
    // of the page offset survives either way.
    for record in records {
        if let TracedAddress::Mapped(pa) = record.address() {
            assert_eq!(pa.0 % 8, 0);
        }
    }
}

#[test]
fn instruction_workload_on_own_pagemap() {
    let Some((translator, _)) = translator() else {
        return;
    };

    let source = WorkloadSource::new(WorkloadConfig {
        workload: Workload::Strided,
        size: 64 * 1024,
        stride: 4096,
        threads: 2,
        ..Default::default()
    });

    let tracer = InstructionTracer::new(translator, TraceRecorder::new(Vec::new()));
    let outcome = TraceSession::new(source).handle(tracer).unwrap();

    let records = TraceReader::<_, InstructionRecord>::new(outcome.output.writer.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len(), 2 * 16);

    // Every step runs the same function, so all records share one page.
    let first = records[0].address();
    assert!(records.iter().all(|record| record.address() == first));
}
