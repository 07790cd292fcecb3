//! Physicochemical classification of protein sequence residues.
//!
//! Sequences are pulled from a [`SequenceSource`], classified residue by residue
//! into a fixed set of [`Category`]s by a pool of workers, and merged into a
//! [`Report`] holding the global tally, per-sequence counts and the run time.
//!
//! ```
//! use aminotally::{analyze, Category, IterSource, PipelineConfig};
//!
//! let source = IterSource::from_pairs([("s1", "AVILM"), ("s2", "STNQY"), ("s3", "ZZZ")]);
//! let report = analyze(source, PipelineConfig::new().with_workers(2)).unwrap();
//!
//! assert_eq!(report.total[Category::Hydrophobic], 5);
//! assert_eq!(report.total[Category::NonStandard], 3);
//! assert_eq!(report.n_sequences(), 3);
//! ```

mod category;
mod classifier;
mod error;
pub mod pipeline;
mod policy;
pub mod prelude;
mod record;
mod report;
mod source;
mod table;

pub use category::{Category, CategoryCounts};
pub use classifier::{classify, Classify, ResidueClassifier};
pub use error::{ConfigError, Error, PipelineError, Result, SourceError, TaskError};
pub use pipeline::{Backend, Pipeline, PipelineConfig, PipelineState};
pub use policy::Policy;
pub use record::{SequenceRecord, SequenceResult, Task, TaskFailure};
pub use report::{Report, RunStats};
pub use source::{FastaSource, IterSource, SequenceSource};
pub use table::ClassificationTable;

/// Classifies every sequence of `source` with the default classifier
///
/// Convenience wrapper around [`Pipeline::new`] and [`Pipeline::analyze`].
pub fn analyze<S>(source: S, config: PipelineConfig) -> Result<Report>
where
    S: SequenceSource + Send + 'static,
{
    Pipeline::new(config)?.analyze(source)
}
