pub use super::{Classify, SequenceSource};

pub use crate::pipeline::{Backend, Pipeline, PipelineConfig};
pub use crate::{Category, CategoryCounts, Policy, Report};
