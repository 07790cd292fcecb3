use crossbeam_channel::Receiver;
use log::debug;

use crate::{CategoryCounts, PipelineError, SequenceResult, TaskFailure};

use super::message::WorkerMessage;
use super::reorder::ReorderBuffer;

/// Everything the aggregator collected during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub total: CategoryCounts,
    pub per_sequence: Vec<SequenceResult>,
    pub failures: Vec<TaskFailure>,
}

#[derive(Debug)]
enum Outcome {
    Completed(SequenceResult),
    Failed(TaskFailure),
}
impl Outcome {
    fn index(&self) -> u64 {
        match self {
            Self::Completed(result) => result.index,
            Self::Failed(failure) => failure.index,
        }
    }
}

/// Sole owner of the global tally and the per-sequence collection
pub(crate) struct Aggregator {
    expected: usize,
    completed: usize,
    aggregate: Aggregate,
    reorder: Option<ReorderBuffer<Outcome>>,
}
impl Aggregator {
    /// Creates an aggregator waiting for `expected` completion markers
    pub fn new(expected: usize, preserve_order: bool) -> Self {
        Self {
            expected,
            completed: 0,
            aggregate: Aggregate::default(),
            reorder: preserve_order.then(ReorderBuffer::new),
        }
    }

    /// Consumes the result channel until every worker has reported completion
    pub fn run(mut self, rx: &Receiver<WorkerMessage>) -> Result<Aggregate, PipelineError> {
        while !self.is_complete() {
            match rx.recv() {
                Ok(message) => self.accept(message),
                Err(_) => {
                    return Err(PipelineError::Disconnected {
                        completed: self.completed,
                        expected: self.expected,
                    })
                }
            }
        }
        Ok(self.finish())
    }

    /// Returns true once all completion markers have been received
    pub fn is_complete(&self) -> bool {
        self.completed >= self.expected
    }

    pub fn accept(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Completed(result) => self.route(Outcome::Completed(result)),
            WorkerMessage::Failed(failure) => self.route(Outcome::Failed(failure)),
            WorkerMessage::Done { worker, processed } => {
                self.completed += 1;
                debug!(
                    "Worker {worker} completed {processed} tasks ({}/{} workers done)",
                    self.completed, self.expected
                );
            }
        }
    }

    fn route(&mut self, outcome: Outcome) {
        let Some(reorder) = self.reorder.as_mut() else {
            Self::merge(&mut self.aggregate, outcome);
            return;
        };
        reorder.insert(outcome.index(), outcome);
        while let Some(ready) = reorder.pop_ready() {
            Self::merge(&mut self.aggregate, ready);
        }
    }

    fn merge(aggregate: &mut Aggregate, outcome: Outcome) {
        match outcome {
            Outcome::Completed(result) => {
                aggregate.total += &result.counts;
                aggregate.per_sequence.push(result);
            }
            Outcome::Failed(failure) => aggregate.failures.push(failure),
        }
    }

    /// Finalizes the aggregate
    pub fn finish(mut self) -> Aggregate {
        if let Some(mut reorder) = self.reorder.take() {
            for outcome in reorder.drain_all() {
                Self::merge(&mut self.aggregate, outcome);
            }
        }
        self.aggregate
    }

    /// The running tally
    #[cfg(test)]
    pub fn total(&self) -> CategoryCounts {
        self.aggregate.total
    }
}
