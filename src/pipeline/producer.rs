use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Sender, TrySendError};
use log::{debug, error};

use crate::{Error, PipelineError, PipelineState, Result, SequenceSource, Task};

use super::message::TaskMessage;
use super::state::{CancelToken, StateCell};

/// Counters collected by the producer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Records pulled from the source
    pub records: usize,
    /// Sends that found the task channel full and had to block
    pub blocked_sends: usize,
    /// Total time spent blocked on a full task channel
    pub send_wait: Duration,
}

/// Pulls records from a source and feeds the task channel
pub(crate) struct Producer<S> {
    source: S,
    tx: Sender<TaskMessage>,
    n_workers: usize,
    chunk_size: Option<usize>,
    state: Arc<StateCell>,
    cancel: CancelToken,
    stats: ProducerStats,
}
impl<S: SequenceSource> Producer<S> {
    pub fn new(
        source: S,
        tx: Sender<TaskMessage>,
        n_workers: usize,
        chunk_size: Option<usize>,
        state: Arc<StateCell>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            source,
            tx,
            n_workers,
            chunk_size,
            state,
            cancel,
            stats: ProducerStats::default(),
        }
    }

    /// Dispatches the whole source, then sends one termination signal per worker
    ///
    /// The termination signals are sent whether or not dispatching succeeded, so no
    /// worker is left waiting on the task channel.
    pub fn run(mut self) -> Result<ProducerStats> {
        let outcome = self.dispatch();
        match &outcome {
            Ok(()) => {
                self.state
                    .transition(PipelineState::Running, PipelineState::Draining)?;
                debug!(
                    "Producer finished after {} records ({} blocked sends)",
                    self.stats.records, self.stats.blocked_sends
                );
            }
            Err(e) => {
                error!("Producer stopped at record #{}: {e}", self.stats.records);
                self.cancel.cancel();
            }
        }

        for _ in 0..self.n_workers {
            // every worker is gone if this fails
            if self.tx.send(TaskMessage::Terminate).is_err() {
                break;
            }
        }

        outcome.map(|()| self.stats)
    }

    fn dispatch(&mut self) -> Result<()> {
        let mut chunk = Vec::with_capacity(self.chunk_size.unwrap_or(0));
        while let Some(record) = self.source.next_record() {
            if self.cancel.is_cancelled() {
                break;
            }
            let task = Task::new(self.stats.records as u64, record?);
            self.stats.records += 1;

            match self.chunk_size {
                None => self.send(TaskMessage::Task(task))?,
                Some(size) => {
                    chunk.push(task);
                    if chunk.len() >= size {
                        let full = std::mem::replace(&mut chunk, Vec::with_capacity(size));
                        self.send(TaskMessage::Chunk(full))?;
                    }
                }
            }
        }
        if !chunk.is_empty() {
            self.send(TaskMessage::Chunk(chunk))?;
        }
        Ok(())
    }

    /// Sends a message, blocking while the channel is full
    fn send(&mut self, message: TaskMessage) -> Result<()> {
        let closed = || -> Error {
            PipelineError::TaskChannelClosed {
                position: self.stats.records.saturating_sub(1),
            }
            .into()
        };
        match self.tx.try_send(message) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(closed()),
            Err(TrySendError::Full(message)) => {
                let start = Instant::now();
                self.tx.send(message).map_err(|_| closed())?;
                self.stats.blocked_sends += 1;
                self.stats.send_wait += start.elapsed();
                Ok(())
            }
        }
    }
}
