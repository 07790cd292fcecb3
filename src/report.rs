//! Final run report and its JSON representation.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use serde::Serializer;

use crate::pipeline::{Aggregate, Backend, ProducerStats};
use crate::{CategoryCounts, Result, SequenceResult, TaskFailure};

/// Runtime counters of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RunStats {
    pub backend: Backend,
    pub workers: usize,
    pub records_read: usize,
    /// Producer sends that blocked on a full task channel
    pub blocked_sends: usize,
    /// Time the producer spent blocked on a full task channel
    #[serde(rename = "send_wait_seconds", serialize_with = "serialize_secs")]
    pub send_wait: Duration,
}

/// The finalized result of a completed run
///
/// Serializes to the layout
/// `{"execution_time_seconds", "total_statistics", "sequences", "failures", "stats"}`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Report {
    /// Wall-clock time from `Running` to `Completed`
    #[serde(rename = "execution_time_seconds", serialize_with = "serialize_secs")]
    pub elapsed: Duration,

    /// The global tally
    #[serde(rename = "total_statistics")]
    pub total: CategoryCounts,

    /// One entry per successfully classified sequence
    #[serde(rename = "sequences")]
    pub per_sequence: Vec<SequenceResult>,

    /// Sequences that failed classification; absent from `total` and `per_sequence`
    pub failures: Vec<TaskFailure>,

    pub stats: RunStats,
}
impl Report {
    pub(crate) fn new(
        elapsed: Duration,
        aggregate: Aggregate,
        producer: ProducerStats,
        backend: Backend,
        workers: usize,
    ) -> Self {
        Self {
            elapsed,
            total: aggregate.total,
            per_sequence: aggregate.per_sequence,
            failures: aggregate.failures,
            stats: RunStats {
                backend,
                workers,
                records_read: producer.records,
                blocked_sends: producer.blocked_sends,
                send_wait: producer.send_wait,
            },
        }
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Number of successfully classified sequences
    #[must_use]
    pub fn n_sequences(&self) -> usize {
        self.per_sequence.len()
    }

    /// Looks up the result of a sequence by identifier
    #[must_use]
    pub fn get(&self, sequence_id: &str) -> Option<&SequenceResult> {
        self.per_sequence
            .iter()
            .find(|result| result.sequence_id == sequence_id)
    }

    /// Writes the report as indented JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Writes the report as single-line JSON
    pub fn write_json_compact<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Writes the report as indented JSON to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = File::create(path).map(BufWriter::new)?;
        self.write_json(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

fn serialize_secs<S: Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

pub(crate) fn serialize_display<T: Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
