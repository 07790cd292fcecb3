use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};

use crate::{Classify, SequenceResult, Task, TaskError, TaskFailure};

use super::message::{TaskMessage, WorkerMessage};
use super::state::CancelToken;

/// Classifies a single task, turning errors and panics into a [`TaskFailure`]
pub(crate) fn process<C: Classify>(classifier: &mut C, task: Task) -> WorkerMessage {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| classifier.classify(&task)));
    let error = match outcome {
        Ok(Ok(counts)) => {
            return WorkerMessage::Completed(SequenceResult::new(
                task.index,
                task.sequence_id,
                counts,
            ))
        }
        Ok(Err(error)) => error,
        Err(payload) => TaskError::Panicked {
            sequence_id: task.sequence_id,
            message: panic_message(payload.as_ref()),
        },
    };
    warn!("Skipping sequence #{}: {error}", task.index);
    WorkerMessage::Failed(TaskFailure::new(task.index, error))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// A long-lived pool member
pub(crate) struct Worker<C> {
    id: usize,
    classifier: C,
    rx: Receiver<TaskMessage>,
    tx: Sender<WorkerMessage>,
    cancel: CancelToken,
    processed: usize,
}
impl<C: Classify> Worker<C> {
    pub fn new(
        id: usize,
        mut classifier: C,
        rx: Receiver<TaskMessage>,
        tx: Sender<WorkerMessage>,
        cancel: CancelToken,
    ) -> Self {
        classifier.set_tid(id);
        Self {
            id,
            classifier,
            rx,
            tx,
            cancel,
            processed: 0,
        }
    }

    /// Processes tasks until a termination signal arrives, then reports completion
    pub fn run(mut self) {
        loop {
            let keep_going = match self.rx.recv() {
                Ok(TaskMessage::Task(task)) => self.handle(task),
                Ok(TaskMessage::Chunk(tasks)) => tasks.into_iter().all(|task| self.handle(task)),
                // a closed channel means the producer is gone without signalling
                Ok(TaskMessage::Terminate) | Err(_) => break,
            };
            if !keep_going {
                debug!("Worker {} lost its result channel", self.id);
                return;
            }
        }
        debug!("Worker {} done after {} tasks", self.id, self.processed);
        let _ = self.tx.send(WorkerMessage::Done {
            worker: self.id,
            processed: self.processed,
        });
    }

    /// Returns false if the result channel is closed
    fn handle(&mut self, task: Task) -> bool {
        if self.cancel.is_cancelled() {
            return true;
        }
        let message = process(&mut self.classifier, task);
        self.processed += 1;
        self.tx.send(message).is_ok()
    }
}
