use crate::{SequenceRecord, SourceError};

use super::SequenceSource;

/// A [`SequenceSource`] over any iterator of records
///
/// Useful for in-memory data and for wrapping other readers.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    inner: I,
    n_processed: usize,
    finished: bool,
}
impl<I> IterSource<I>
where
    I: Iterator<Item = Result<SequenceRecord, SourceError>>,
{
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            n_processed: 0,
            finished: false,
        }
    }

    /// Returns true once the iterator has been exhausted
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
impl IterSource<std::vec::IntoIter<Result<SequenceRecord, SourceError>>> {
    /// Builds a source from `(identifier, residues)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let records: Vec<_> = pairs
            .into_iter()
            .map(|(id, residues)| Ok(SequenceRecord::new(id, residues)))
            .collect();
        Self::new(records.into_iter())
    }
}
impl<I> SequenceSource for IterSource<I>
where
    I: Iterator<Item = Result<SequenceRecord, SourceError>>,
{
    fn next_record(&mut self) -> Option<Result<SequenceRecord, SourceError>> {
        if self.finished {
            return None;
        }
        match self.inner.next() {
            Some(Ok(record)) => {
                self.n_processed += 1;
                Some(Ok(record))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                self.finished = true;
                None
            }
        }
    }

    fn n_processed(&self) -> usize {
        self.n_processed
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_from_pairs() -> anyhow::Result<()> {
        let mut source = IterSource::from_pairs([("s1", "AVILM"), ("s2", "STNQY")]);
        let first = source.next_record().unwrap()?;
        assert_eq!(first, SequenceRecord::new("s1", "AVILM"));
        assert_eq!(source.n_processed(), 1);
        assert!(source.next_record().is_some());
        assert!(source.next_record().is_none());
        assert!(source.is_finished());
        assert!(source.next_record().is_none());
        assert_eq!(source.n_processed(), 2);
        Ok(())
    }

    #[test]
    fn test_errors_are_passed_through() {
        let items = vec![
            Ok(SequenceRecord::new("s1", "A")),
            Err(SourceError::Malformed {
                position: 1,
                message: "truncated".to_string(),
            }),
        ];
        let mut source = IterSource::new(items.into_iter());
        assert!(matches!(source.next_record(), Some(Ok(_))));
        assert!(matches!(
            source.next_record(),
            Some(Err(SourceError::Malformed { position: 1, .. }))
        ));
        assert_eq!(source.n_processed(), 1);
    }
}
