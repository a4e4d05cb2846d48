use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use zerocopy::IntoBytes;

use crate::{TraceError, TraceRecord};

/// Writer of fixed-width binary trace records.
pub struct TraceRecorder<W>
where
    W: Write,
{
    writer: W,
    records: u64,
}

impl TraceRecorder<BufWriter<File>> {
    /// Creates (or truncates) a trace file for writing.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|err| TraceError::open(path, err))?;

        tracing::debug!(path = %path.display(), "created trace file");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W> TraceRecorder<W>
where
    W: Write,
{
    /// Creates a recorder that appends records to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    /// Appends a record to the trace.
    pub fn append<R>(&mut self, record: &R) -> Result<(), TraceError>
    where
        R: TraceRecord,
    {
        self.writer.write_all(record.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    /// Returns the number of records appended so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flushes the trace and returns the underlying writer.
    pub fn finalize(mut self) -> Result<W, TraceError> {
        self.writer.flush()?;
        tracing::debug!(records = self.records, "trace finalized");
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, InstructionRecord, MemoryAccessRecord, Pa, TracedAddress};

    #[test]
    fn appends_records_in_order() {
        let mut recorder = TraceRecorder::new(Vec::new());
        recorder
            .append(&MemoryAccessRecord::new(
                Direction::Read,
                TracedAddress::Mapped(Pa(0x5000)),
            ))
            .unwrap();
        recorder
            .append(&MemoryAccessRecord::new(Direction::Write, TracedAddress::Failed))
            .unwrap();

        assert_eq!(recorder.records(), 2);

        let bytes = recorder.finalize().unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0..8], 1u64.to_ne_bytes());
        assert_eq!(bytes[8..16], 0x5000u64.to_ne_bytes());
        assert_eq!(bytes[16..24], 0u64.to_ne_bytes());
        assert_eq!(bytes[24..32], u64::MAX.to_ne_bytes());
    }

    #[test]
    fn instruction_records_are_eight_bytes() {
        let mut recorder = TraceRecorder::new(Vec::new());
        for pa in [0x1000, 0x1004, 0x1008] {
            recorder
                .append(&InstructionRecord::new(TracedAddress::Mapped(Pa(pa))))
                .unwrap();
        }

        assert_eq!(recorder.finalize().unwrap().len(), 24);
    }

    #[test]
    fn create_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("trace.out");

        match TraceRecorder::create(&path) {
            Err(TraceError::Open { path: failed, .. }) => assert_eq!(failed, path),
            _ => panic!("expected an open error"),
        }
    }
}
