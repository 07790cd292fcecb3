use crate::{Category, PipelineState};

/// Custom Result type for aminotally operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the aminotally library, encompassing every failure that
/// can abort a classification run.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while iterating a sequence source
    SourceError(#[from] SourceError),
    /// Invalid pipeline or classification table configuration
    ConfigError(#[from] ConfigError),
    /// Errors in the coordination of producer, workers and aggregator
    PipelineError(#[from] PipelineError),
    /// Standard I/O errors from the Rust standard library
    IoError(#[from] std::io::Error),
    /// Errors while serializing a report
    JsonError(#[from] serde_json::Error),
    /// Errors while opening (possibly compressed) input files
    NifflerError(#[from] niffler::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Fatal errors raised while reading records from a [`SequenceSource`](crate::SequenceSource)
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The underlying reader failed
    ///
    /// # Fields
    /// * `position` - Zero-based index of the record being read
    #[error("I/O failure while reading record #{position}: {source}")]
    Io {
        position: usize,
        #[source]
        source: std::io::Error,
    },

    /// The record could not be parsed
    ///
    /// # Fields
    /// * `position` - Zero-based index of the record being read
    /// * `message` - Description of the problem, including the identifier when known
    #[error("Malformed record #{position}: {message}")]
    Malformed { position: usize, message: String },

    /// The record identifier is not valid UTF-8
    #[error("Identifier of record #{position} is not valid UTF-8")]
    InvalidIdentifier { position: usize },
}

/// Errors confined to a single sequence.
///
/// These never abort a run: the failing sequence is left out of the totals and
/// recorded in [`Report::failures`](crate::Report::failures).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The sequence contains a byte that is not a printable ASCII residue
    #[error("Invalid residue byte 0x{byte:02x} at position {position} in sequence '{sequence_id}'")]
    InvalidResidue {
        sequence_id: String,
        byte: u8,
        position: usize,
    },

    /// The classifier panicked while processing the sequence
    #[error("Classifier panicked on sequence '{sequence_id}': {message}")]
    Panicked {
        sequence_id: String,
        message: String,
    },

    /// A custom classifier rejected the sequence
    #[error("Classification of sequence '{sequence_id}' failed: {message}")]
    Custom {
        sequence_id: String,
        message: String,
    },
}
impl TaskError {
    /// Identifier of the sequence the error belongs to
    #[must_use]
    pub fn sequence_id(&self) -> &str {
        match self {
            Self::InvalidResidue { sequence_id, .. }
            | Self::Panicked { sequence_id, .. }
            | Self::Custom { sequence_id, .. } => sequence_id,
        }
    }
}

/// Invalid configuration, detected before any component is started
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Worker count must be positive")]
    ZeroWorkers,

    #[error("Task channel capacity must be positive")]
    ZeroTaskCapacity,

    #[error("Result channel capacity must be positive when bounded")]
    ZeroResultCapacity,

    #[error("Chunk size must be positive")]
    ZeroChunkSize,

    /// Non-standard residues are defined as everything outside the table
    #[error("Residues cannot be assigned to the non_standard category explicitly")]
    NonStandardGroup,

    /// A residue was assigned to two categories
    ///
    /// # Fields
    /// * `residue` - The residue (uppercase)
    /// * `first` - The category it was first assigned to
    /// * `second` - The conflicting category
    #[error("Residue '{residue}' assigned to both {first} and {second}")]
    DuplicateResidue {
        residue: char,
        first: Category,
        second: Category,
    },

    #[error("Residue byte 0x{0:02x} is not a printable ASCII character")]
    NonAsciiResidue(u8),
}

/// Errors in the coordination of the pipeline itself
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("Worker {worker} panicked outside of task processing")]
    WorkerPanicked { worker: usize },

    #[error("Producer thread panicked")]
    ProducerPanicked,

    /// Every result sender was dropped before all completion markers arrived
    #[error("Result channel closed after {completed} of {expected} workers completed")]
    Disconnected { completed: usize, expected: usize },

    /// Every worker exited while the producer still had tasks to dispatch
    #[error("Task channel closed before record #{position} could be dispatched")]
    TaskChannelClosed { position: usize },

    #[error("Invalid pipeline state transition: {from} -> {to}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },
}
