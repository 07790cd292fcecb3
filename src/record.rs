use crate::{CategoryCounts, TaskError};

/// A single record yielded by a [`SequenceSource`](crate::SequenceSource)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Sequence identifier
    pub id: String,

    /// Raw residues, as read from the source
    pub residues: Vec<u8>,
}
impl SequenceRecord {
    pub fn new(id: impl Into<String>, residues: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            residues: residues.into(),
        }
    }
}

/// Unit of work: one sequence awaiting classification
///
/// Owned by exactly one worker once dequeued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Position of the record in the source
    pub index: u64,
    pub sequence_id: String,
    pub residues: Vec<u8>,
}
impl Task {
    #[must_use]
    pub fn new(index: u64, record: SequenceRecord) -> Self {
        Self {
            index,
            sequence_id: record.id,
            residues: record.residues,
        }
    }
}

/// Classification output for a single sequence
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SequenceResult {
    #[serde(skip)]
    pub index: u64,

    #[serde(rename = "id")]
    pub sequence_id: String,

    #[serde(flatten)]
    pub counts: CategoryCounts,
}
impl SequenceResult {
    #[must_use]
    pub fn new(index: u64, sequence_id: String, counts: CategoryCounts) -> Self {
        Self {
            index,
            sequence_id,
            counts,
        }
    }
}

/// A sequence that could not be classified
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskFailure {
    #[serde(skip)]
    pub index: u64,

    #[serde(rename = "id")]
    pub sequence_id: String,

    #[serde(serialize_with = "crate::report::serialize_display")]
    pub error: TaskError,
}
impl TaskFailure {
    #[must_use]
    pub fn new(index: u64, error: TaskError) -> Self {
        Self {
            index,
            sequence_id: error.sequence_id().to_string(),
            error,
        }
    }
}
