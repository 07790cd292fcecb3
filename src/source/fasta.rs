use std::io::Read;
use std::path::Path;

use seq_io::fasta::{self, Record};

use crate::{Result, SequenceRecord, SourceError};

use super::SequenceSource;

/// A [`SequenceSource`] reading FASTA records
///
/// Parsing is delegated to [`seq_io::fasta`]. Multi-line sequences are joined and
/// the identifier is the header up to the first whitespace.
pub struct FastaSource<R: Read> {
    inner: fasta::Reader<R>,
    n_processed: usize,
    finished: bool,
}
impl FastaSource<Box<dyn Read + Send>> {
    /// Opens a FASTA file, transparently decompressing gzip, bzip2, xz or zstd input
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (handle, _format) = niffler::send::from_path(path)?;
        Ok(Self::new(handle))
    }
}
impl<R: Read> FastaSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: fasta::Reader::new(inner),
            n_processed: 0,
            finished: false,
        }
    }

    fn next_fasta(&mut self) -> Option<std::result::Result<SequenceRecord, SourceError>> {
        let position = self.n_processed;
        let record = match self.inner.next()? {
            Ok(record) => record,
            Err(fasta::Error::Io(source)) => return Some(Err(SourceError::Io { position, source })),
            Err(e) => {
                return Some(Err(SourceError::Malformed {
                    position,
                    message: e.to_string(),
                }))
            }
        };

        let Ok(id) = record.id() else {
            return Some(Err(SourceError::InvalidIdentifier { position }));
        };
        let record = SequenceRecord::new(id, record.full_seq().into_owned());

        self.n_processed += 1;
        Some(Ok(record))
    }
}
impl<R: Read> SequenceSource for FastaSource<R> {
    fn next_record(&mut self) -> Option<std::result::Result<SequenceRecord, SourceError>> {
        if self.finished {
            return None;
        }
        let next = self.next_fasta();
        if next.is_none() {
            self.finished = true;
        }
        next
    }

    fn n_processed(&self) -> usize {
        self.n_processed
    }
}
