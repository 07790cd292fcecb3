use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, unbounded};
use log::{debug, error};

use crate::{
    Classify, PipelineError, PipelineState, Report, ResidueClassifier, Result, SequenceSource,
    Task,
};

use super::aggregator::{Aggregate, Aggregator};
use super::config::{Backend, PipelineConfig};
use super::message::WorkerMessage;
use super::producer::{Producer, ProducerStats};
use super::state::{CancelToken, StateCell};
use super::worker::{self, Worker};

/// Owns the lifecycle of a classification run
///
/// A pipeline can be run any number of times; each call to [`Pipeline::analyze`]
/// starts from `Idle` with a fresh tally.
pub struct Pipeline<C = ResidueClassifier> {
    config: PipelineConfig,
    classifier: C,
    state: Arc<StateCell>,
}
impl Pipeline<ResidueClassifier> {
    /// Creates a pipeline with the default classifier
    ///
    /// Fails with a [`ConfigError`](crate::ConfigError) before anything is started if
    /// the configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_classifier(config, ResidueClassifier::default())
    }
}
impl<C: Classify + 'static> Pipeline<C> {
    pub fn with_classifier(config: PipelineConfig, classifier: C) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            classifier,
            state: Arc::new(StateCell::new()),
        })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// State of the current or last run
    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    /// Classifies every sequence of `source`
    ///
    /// Returns the complete report, or the first fatal error. A partial report is
    /// never returned.
    pub fn analyze<S>(&mut self, source: S) -> Result<Report>
    where
        S: SequenceSource + Send + 'static,
    {
        self.state.reset()?;
        self.state
            .transition(PipelineState::Idle, PipelineState::Running)?;
        let start = Instant::now();
        debug!(
            "Starting {:?} pipeline with {} workers",
            self.config.backend,
            self.config.effective_workers()
        );

        let outcome = match self.config.backend {
            Backend::Sequential => self.run_sequential(source),
            Backend::Threads | Backend::Chunked { .. } => self.run_parallel(source),
        };

        let outcome = outcome.and_then(|(aggregate, stats)| {
            self.state
                .transition(PipelineState::Draining, PipelineState::Completed)?;
            Ok(Report::new(
                start.elapsed(),
                aggregate,
                stats,
                self.config.backend,
                self.config.effective_workers(),
            ))
        });
        if let Err(e) = &outcome {
            self.state.fail();
            error!("Pipeline failed: {e}");
        }
        outcome
    }

    fn run_sequential<S: SequenceSource>(
        &self,
        mut source: S,
    ) -> Result<(Aggregate, ProducerStats)> {
        let mut classifier = self.classifier.clone();
        classifier.set_tid(0);
        let mut aggregator = Aggregator::new(1, self.config.preserve_order);
        let mut stats = ProducerStats::default();

        while let Some(record) = source.next_record() {
            let task = Task::new(stats.records as u64, record?);
            stats.records += 1;
            aggregator.accept(worker::process(&mut classifier, task));
        }
        self.state
            .transition(PipelineState::Running, PipelineState::Draining)?;
        aggregator.accept(WorkerMessage::Done {
            worker: 0,
            processed: stats.records,
        });

        Ok((aggregator.finish(), stats))
    }

    fn run_parallel<S>(&self, source: S) -> Result<(Aggregate, ProducerStats)>
    where
        S: SequenceSource + Send + 'static,
    {
        let n_workers = self.config.worker_count;
        let (task_tx, task_rx) = bounded(self.config.task_capacity);
        let (result_tx, result_rx) = match self.config.result_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let cancel = CancelToken::default();

        // Dropping the task sender on an early return releases any spawned worker
        let mut handles = Vec::with_capacity(n_workers);
        for id in 0..n_workers {
            let worker = Worker::new(
                id,
                self.classifier.clone(),
                task_rx.clone(),
                result_tx.clone(),
                cancel.clone(),
            );
            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker.run())?;
            handles.push(handle);
        }
        drop(task_rx);
        drop(result_tx);

        let producer = Producer::new(
            source,
            task_tx,
            n_workers,
            self.config.backend.chunk_size(),
            Arc::clone(&self.state),
            cancel.clone(),
        );
        let producer_handle = thread::Builder::new()
            .name("producer".to_string())
            .spawn(move || producer.run())?;

        let aggregated = Aggregator::new(n_workers, self.config.preserve_order).run(&result_rx);
        if aggregated.is_err() {
            cancel.cancel();
        }
        // unblocks any worker still sending results
        drop(result_rx);

        let produced = producer_handle.join();
        let mut panicked = None;
        for (id, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                panicked.get_or_insert(id);
            }
        }

        let stats = produced.map_err(|_| PipelineError::ProducerPanicked)??;
        if let Some(worker) = panicked {
            return Err(PipelineError::WorkerPanicked { worker }.into());
        }
        Ok((aggregated?, stats))
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::{CategoryCounts, ConfigError, Error, IterSource};

    fn scenario() -> impl SequenceSource + Send + 'static {
        IterSource::from_pairs([("s1", "AVILM"), ("s2", "STNQY"), ("s3", "ZZZ")])
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let result = Pipeline::new(PipelineConfig::new().with_workers(0));
        assert!(matches!(
            result,
            Err(Error::ConfigError(ConfigError::ZeroWorkers))
        ));
    }

    #[test]
    fn test_state_after_run() -> anyhow::Result<()> {
        for backend in [
            Backend::Sequential,
            Backend::Threads,
            Backend::Chunked { chunk_size: 2 },
        ] {
            let mut pipeline =
                Pipeline::new(PipelineConfig::new().with_workers(2).with_backend(backend))?;
            assert_eq!(pipeline.state(), PipelineState::Idle);
            let report = pipeline.analyze(scenario())?;
            assert_eq!(pipeline.state(), PipelineState::Completed);
            assert_eq!(report.total, CategoryCounts::from([5, 5, 0, 0, 3]));
            assert_eq!(report.stats.records_read, 3);
        }
        Ok(())
    }

    #[test]
    fn test_rerun_resets_tally() -> anyhow::Result<()> {
        let mut pipeline = Pipeline::new(PipelineConfig::new().with_workers(3))?;
        let first = pipeline.analyze(scenario())?;
        let second = pipeline.analyze(scenario())?;
        assert_eq!(first.total, second.total);
        assert_eq!(second.n_sequences(), 3);
        Ok(())
    }
}
