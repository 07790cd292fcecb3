use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver};
use parking_lot::Mutex;
use rand::{rngs::SmallRng, Rng, SeedableRng};

use aminotally::{
    analyze, Backend, CategoryCounts, Classify, Error, IterSource, Pipeline, PipelineConfig,
    PipelineState, Policy, Report, ResidueClassifier, SequenceRecord, SequenceSource, SourceError,
    Task, TaskError,
};

const RESIDUES: &[u8] = b"ACDEFGHIKLMNPQRSTVWYXBZ-*acdefghik";

fn random_records(n: usize, seed: u64) -> Vec<(String, Vec<u8>)> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let len = rng.random_range(0..120);
            let residues = (0..len)
                .map(|_| RESIDUES[rng.random_range(0..RESIDUES.len())])
                .collect();
            (format!("seq{i}"), residues)
        })
        .collect()
}

fn sorted_results(report: &Report) -> Vec<(String, CategoryCounts)> {
    let mut results: Vec<_> = report
        .per_sequence
        .iter()
        .map(|r| (r.sequence_id.clone(), r.counts))
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

/// Runs `f` on another thread and fails if it does not finish in time
fn within<T: Send + 'static>(limit: Duration, f: impl FnOnce() -> T + Send + 'static) -> T {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(limit)
        .expect("pipeline did not terminate in time")
}

#[test]
fn test_tally_invariant_across_workers_and_capacities() -> Result<()> {
    let records = random_records(500, 7);
    let reference = analyze(
        IterSource::from_pairs(records.clone()),
        PipelineConfig::new().with_backend(Backend::Sequential),
    )?;
    let expected: CategoryCounts = reference.per_sequence.iter().map(|r| &r.counts).sum();
    assert_eq!(reference.total, expected);
    assert_eq!(
        reference.total.total(),
        records.iter().map(|(_, s)| s.len() as u64).sum::<u64>()
    );

    for workers in [1, 2, 4, 8, 16] {
        for capacity in [1, 3, 2000] {
            for backend in [Backend::Threads, Backend::Chunked { chunk_size: 7 }] {
                let config = PipelineConfig::new()
                    .with_workers(workers)
                    .with_task_capacity(capacity)
                    .with_backend(backend);
                let report = analyze(IterSource::from_pairs(records.clone()), config)?;

                let summed: CategoryCounts = report.per_sequence.iter().map(|r| &r.counts).sum();
                assert_eq!(report.total, summed);
                assert_eq!(report.total, reference.total);
                assert_eq!(sorted_results(&report), sorted_results(&reference));
                assert_eq!(report.stats.workers, workers);
            }
        }
    }
    Ok(())
}

#[test]
fn test_bounded_result_channel() -> Result<()> {
    let records = random_records(300, 11);
    let config = PipelineConfig::new()
        .with_workers(4)
        .with_task_capacity(2)
        .with_result_capacity(Some(1));
    let report = analyze(IterSource::from_pairs(records), config)?;
    assert_eq!(report.n_sequences(), 300);
    Ok(())
}

#[test]
fn test_idempotent_runs() -> Result<()> {
    let records = random_records(200, 3);
    let mut pipeline = Pipeline::new(PipelineConfig::new().with_workers(4))?;
    let first = pipeline.analyze(IterSource::from_pairs(records.clone()))?;
    let second = pipeline.analyze(IterSource::from_pairs(records))?;
    assert_eq!(first.total, second.total);
    assert_eq!(sorted_results(&first), sorted_results(&second));
    Ok(())
}

#[test]
fn test_preserve_order() -> Result<()> {
    let records = random_records(300, 5);
    let config = PipelineConfig::new()
        .with_workers(8)
        .with_task_capacity(4)
        .preserve_order(true);
    let report = analyze(IterSource::from_pairs(records.clone()), config)?;
    let ids: Vec<_> = report
        .per_sequence
        .iter()
        .map(|r| r.sequence_id.as_str())
        .collect();
    let expected: Vec<_> = records.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, expected);
    Ok(())
}

#[test]
fn test_failing_source_terminates() {
    for backend in [
        Backend::Sequential,
        Backend::Threads,
        Backend::Chunked { chunk_size: 4 },
    ] {
        let (result, state) = within(Duration::from_secs(10), move || {
            let items = (0..1000).map(|i| {
                if i == 500 {
                    Err(SourceError::Malformed {
                        position: i,
                        message: "truncated record".to_string(),
                    })
                } else {
                    Ok(SequenceRecord::new(format!("s{i}"), "AVILMSTNQY"))
                }
            });
            let config = PipelineConfig::new()
                .with_workers(4)
                .with_task_capacity(2)
                .with_backend(backend);
            let mut pipeline = Pipeline::new(config).unwrap();
            let result = pipeline.analyze(IterSource::new(items));
            (result, pipeline.state())
        });

        assert!(matches!(
            result,
            Err(Error::SourceError(SourceError::Malformed { position: 500, .. }))
        ));
        assert_eq!(state, PipelineState::Failed);
    }
}

#[test]
fn test_slow_source_terminates() -> Result<()> {
    let report = within(Duration::from_secs(10), || {
        let items = (0..20).map(|i| {
            thread::sleep(Duration::from_millis(5));
            Ok(SequenceRecord::new(format!("s{i}"), "KRHDE"))
        });
        analyze(IterSource::new(items), PipelineConfig::new().with_workers(16))
    })?;
    assert_eq!(report.n_sequences(), 20);
    assert_eq!(report.total, CategoryCounts::from([0, 0, 60, 40, 0]));
    Ok(())
}

/// Blocks every task until the gate's sender is dropped
#[derive(Clone)]
struct GatedClassifier {
    inner: ResidueClassifier,
    gate: Receiver<()>,
}
impl Classify for GatedClassifier {
    fn classify(&mut self, task: &Task) -> Result<CategoryCounts, TaskError> {
        let _ = self.gate.recv();
        self.inner.classify(task)
    }
}

#[test]
fn test_backpressure_bounds_reads() -> Result<()> {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let items = (0..50).map(move |i| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(SequenceRecord::new(format!("s{i}"), "AVILM"))
    });

    let (release, gate) = unbounded::<()>();
    let classifier = GatedClassifier {
        inner: ResidueClassifier::default(),
        gate,
    };
    let config = PipelineConfig::new().with_workers(1).with_task_capacity(1);
    let mut pipeline = Pipeline::with_classifier(config, classifier)?;
    let handle = thread::spawn(move || pipeline.analyze(IterSource::new(items)));

    thread::sleep(Duration::from_millis(200));
    // one task held by the worker, one queued, one waiting in the producer's send
    assert!(pulled.load(Ordering::SeqCst) <= 3);

    drop(release);
    let report = handle.join().expect("analyze panicked")?;
    assert_eq!(pulled.load(Ordering::SeqCst), 50);
    assert_eq!(report.n_sequences(), 50);
    assert!(report.stats.blocked_sends >= 1);
    assert!(report.stats.send_wait > Duration::ZERO);
    Ok(())
}

#[test]
fn test_unusual_residues_count_as_non_standard() -> Result<()> {
    let source = IterSource::from_pairs([("s1", "AV IL"), ("s2", "ACDÅ")]);
    let report = analyze(source, PipelineConfig::new().with_workers(2))?;

    assert_eq!(report.n_sequences(), 2);
    assert!(report.failures.is_empty());
    assert_eq!(
        report.get("s1").map(|r| r.counts),
        Some(CategoryCounts::from([4, 0, 0, 0, 1]))
    );
    assert_eq!(
        report.get("s2").map(|r| r.counts),
        Some(CategoryCounts::from([2, 0, 0, 1, 1]))
    );
    assert_eq!(report.total, CategoryCounts::from([6, 0, 0, 1, 2]));
    Ok(())
}

#[test]
fn test_rejected_residues_do_not_stop_the_pool() -> Result<()> {
    let source = IterSource::from_pairs([
        ("ok1", "AVILM"),
        ("bad", "AV IL"),
        ("ok2", "STNQY"),
    ]);
    let classifier = ResidueClassifier::with_policy(Policy::Reject);
    let mut pipeline =
        Pipeline::with_classifier(PipelineConfig::new().with_workers(2), classifier)?;
    let report = pipeline.analyze(source)?;

    assert_eq!(report.n_sequences(), 2);
    assert_eq!(report.total, CategoryCounts::from([5, 5, 0, 0, 0]));
    assert!(report.get("bad").is_none());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].sequence_id, "bad");
    assert!(matches!(
        report.failures[0].error,
        TaskError::InvalidResidue {
            byte: b' ',
            position: 2,
            ..
        }
    ));
    Ok(())
}

/// Panics on a specific sequence and records which worker saw what
#[derive(Clone)]
struct FlakyClassifier {
    inner: ResidueClassifier,
    seen: Arc<Mutex<Vec<(usize, String)>>>,
    tid: usize,
}
impl Classify for FlakyClassifier {
    fn classify(&mut self, task: &Task) -> Result<CategoryCounts, TaskError> {
        self.seen.lock().push((self.tid, task.sequence_id.clone()));
        if task.sequence_id == "s13" {
            panic!("corrupted task");
        }
        self.inner.classify(task)
    }

    fn set_tid(&mut self, tid: usize) {
        self.tid = tid;
    }

    fn get_tid(&self) -> Option<usize> {
        Some(self.tid)
    }
}

#[test]
fn test_panicking_classifier_is_absorbed() -> Result<()> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let classifier = FlakyClassifier {
        inner: ResidueClassifier::default(),
        seen: Arc::clone(&seen),
        tid: usize::MAX,
    };
    let pairs: Vec<_> = (0..40).map(|i| (format!("s{i}"), "DE")).collect();
    let mut pipeline =
        Pipeline::with_classifier(PipelineConfig::new().with_workers(3), classifier)?;
    let report = pipeline.analyze(IterSource::from_pairs(pairs))?;

    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(report.n_sequences(), 39);
    assert_eq!(report.total, CategoryCounts::from([0, 0, 0, 78, 0]));
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0].error,
        TaskError::Panicked { sequence_id, message }
            if sequence_id == "s13" && message == "corrupted task"
    ));

    let seen = seen.lock();
    assert_eq!(seen.len(), 40);
    assert!(seen.iter().all(|(tid, _)| *tid < 3));
    Ok(())
}

#[test]
fn test_fasta_end_to_end() -> Result<()> {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, ">s1 hydrophobic\nAVI\nLM\n>s2\nSTNQY\n>s3\nZZZ\n")?;
    file.flush()?;

    let source = aminotally::FastaSource::from_path(file.path())?;
    assert_eq!(source.n_processed(), 0);
    let report = analyze(
        source,
        PipelineConfig::new()
            .with_workers(2)
            .with_backend(Backend::Chunked { chunk_size: 2 }),
    )?;

    assert_eq!(report.total, CategoryCounts::from([5, 5, 0, 0, 3]));
    assert_eq!(
        report.get("s1").map(|r| r.counts),
        Some(CategoryCounts::from([5, 0, 0, 0, 0]))
    );
    assert_eq!(report.stats.records_read, 3);
    Ok(())
}
