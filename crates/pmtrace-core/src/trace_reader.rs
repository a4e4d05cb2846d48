use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read},
    marker::PhantomData,
    path::Path,
};

use zerocopy::{FromZeros, IntoBytes};

use crate::{TraceError, TraceRecord};

/// Iterator over the records of a binary trace.
pub struct TraceReader<R, Rec>
where
    R: Read,
    Rec: TraceRecord,
{
    reader: R,
    done: bool,
    _marker: PhantomData<Rec>,
}

impl<R, Rec> TraceReader<R, Rec>
where
    R: Read,
    Rec: TraceRecord,
{
    /// Creates a reader that decodes records from `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
            _marker: PhantomData,
        }
    }

    fn read_record(&mut self) -> Result<Option<Rec>, TraceError> {
        let mut record = Rec::new_zeroed();
        let buf = record.as_mut_bytes();

        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }

        match filled {
            0 => Ok(None),
            len if len < Rec::SIZE => Err(TraceError::TruncatedRecord { len }),
            _ => Ok(Some(record)),
        }
    }
}

impl<R, Rec> Iterator for TraceReader<R, Rec>
where
    R: Read,
    Rec: TraceRecord,
{
    type Item = Result<Rec, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.read_record().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }

        result
    }
}

/// Reads every record of a trace file.
pub fn read_trace<Rec>(path: impl AsRef<Path>) -> Result<Vec<Rec>, TraceError>
where
    Rec: TraceRecord,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| TraceError::open(path, err))?;

    TraceReader::<_, Rec>::new(BufReader::new(file)).collect()
}
