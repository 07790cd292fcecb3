use crate::{SequenceResult, Task, TaskFailure};

/// Messages on the task channel (producer -> workers)
#[derive(Debug)]
pub enum TaskMessage {
    Task(Task),
    Chunk(Vec<Task>),
    /// No more tasks; sent exactly once per worker
    Terminate,
}

/// Messages on the result channel (workers -> aggregator)
#[derive(Debug)]
pub enum WorkerMessage {
    Completed(SequenceResult),
    Failed(TaskFailure),
    /// The worker has stopped; sent exactly once per worker
    Done { worker: usize, processed: usize },
}
