//! The bounded concurrent classification pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  bounded   ┌─────────────┐  results  ┌────────────┐
//! │ Producer │───────────>│ N Workers   │──────────>│ Aggregator │──> Report
//! │ (source) │  tasks     │ (classify)  │           │ (caller)   │
//! └──────────┘            └─────────────┘           └────────────┘
//! ```
//!
//! The producer blocks when the task channel is full. After the source is
//! exhausted it sends one [`TaskMessage::Terminate`] per worker; each worker
//! answers with one [`WorkerMessage::Done`], and the aggregator stops once it has
//! counted all of them.

mod aggregator;
mod config;
mod controller;
mod message;
mod producer;
mod reorder;
mod state;
mod worker;

pub use aggregator::Aggregate;
pub use config::{Backend, PipelineConfig, DEFAULT_CHUNK_SIZE, DEFAULT_TASK_CAPACITY};
pub use controller::Pipeline;
pub use message::{TaskMessage, WorkerMessage};
pub use producer::ProducerStats;
pub use reorder::ReorderBuffer;
pub use state::{CancelToken, PipelineState, StateCell};
