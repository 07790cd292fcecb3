use crate::ConfigError;

/// Default capacity of the bounded task channel
pub const DEFAULT_TASK_CAPACITY: usize = 2000;

/// Default number of tasks per message for [`Backend::Chunked`]
pub const DEFAULT_CHUNK_SIZE: usize = 50;

/// How work is distributed to the classifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Producer, classifier and aggregator run inline on the calling thread
    Sequential,
    /// A pool of worker threads, one task per channel message
    #[default]
    Threads,
    /// A pool of worker threads receiving tasks in chunks of `chunk_size`
    Chunked { chunk_size: usize },
}
impl Backend {
    /// Number of tasks per channel message, if tasks are chunked
    #[must_use]
    pub fn chunk_size(&self) -> Option<usize> {
        match self {
            Self::Chunked { chunk_size } => Some(*chunk_size),
            _ => None,
        }
    }
}

/// Configuration of a [`Pipeline`](crate::Pipeline) run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of workers (default: available parallelism)
    pub worker_count: usize,

    /// Capacity of the bounded task channel
    pub task_capacity: usize,

    /// Capacity of the result channel, unbounded if `None`
    pub result_capacity: Option<usize>,

    pub backend: Backend,

    /// Emit per-sequence results in source order
    pub preserve_order: bool,
}
impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            task_capacity: DEFAULT_TASK_CAPACITY,
            result_capacity: None,
            backend: Backend::default(),
            preserve_order: false,
        }
    }
}
impl PipelineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker count
    ///
    /// Zero is kept as-is and rejected by [`PipelineConfig::validate`].
    #[must_use]
    pub fn with_workers(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    #[must_use]
    pub fn with_task_capacity(mut self, task_capacity: usize) -> Self {
        self.task_capacity = task_capacity;
        self
    }

    #[must_use]
    pub fn with_result_capacity(mut self, result_capacity: Option<usize>) -> Self {
        self.result_capacity = result_capacity;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn preserve_order(mut self, preserve_order: bool) -> Self {
        self.preserve_order = preserve_order;
        self
    }

    /// Checks that every size is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.task_capacity == 0 {
            return Err(ConfigError::ZeroTaskCapacity);
        }
        if self.result_capacity == Some(0) {
            return Err(ConfigError::ZeroResultCapacity);
        }
        if self.backend.chunk_size() == Some(0) {
            return Err(ConfigError::ZeroChunkSize);
        }
        Ok(())
    }

    /// Number of workers actually spawned by the configured backend
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        match self.backend {
            Backend::Sequential => 1,
            _ => self.worker_count,
        }
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.worker_count >= 1);
        assert_eq!(config.task_capacity, DEFAULT_TASK_CAPACITY);
        assert_eq!(config.result_capacity, None);
        assert_eq!(config.backend, Backend::Threads);
        assert!(!config.preserve_order);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let base = PipelineConfig::new().with_workers(4);
        assert_eq!(
            base.clone().with_workers(0).validate(),
            Err(ConfigError::ZeroWorkers)
        );
        assert_eq!(
            base.clone().with_task_capacity(0).validate(),
            Err(ConfigError::ZeroTaskCapacity)
        );
        assert_eq!(
            base.clone().with_result_capacity(Some(0)).validate(),
            Err(ConfigError::ZeroResultCapacity)
        );
        assert_eq!(
            base.with_backend(Backend::Chunked { chunk_size: 0 }).validate(),
            Err(ConfigError::ZeroChunkSize)
        );
    }

    #[test]
    fn test_effective_workers() {
        let config = PipelineConfig::new().with_workers(8);
        assert_eq!(config.effective_workers(), 8);
        assert_eq!(
            config.with_backend(Backend::Sequential).effective_workers(),
            1
        );
    }
}
