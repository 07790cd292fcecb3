//! Sequence sources feeding the pipeline.
//!
//! A source is a lazy, finite, forward-only stream of [`SequenceRecord`]s. The
//! pipeline pulls from it exactly once, on the producer thread.

mod fasta;
mod iter;

pub use fasta::FastaSource;
pub use iter::IterSource;

use crate::{SequenceRecord, SourceError};

/// Core trait for all sequence sources
pub trait SequenceSource {
    /// Returns the next record in the source
    ///
    /// `None` marks the end of the source. An error is fatal for the run.
    fn next_record(&mut self) -> Option<Result<SequenceRecord, SourceError>>;

    /// Returns the number of records yielded so far
    fn n_processed(&self) -> usize;
}

impl<S: SequenceSource + ?Sized> SequenceSource for Box<S> {
    fn next_record(&mut self) -> Option<Result<SequenceRecord, SourceError>> {
        (**self).next_record()
    }

    fn n_processed(&self) -> usize {
        (**self).n_processed()
    }
}
