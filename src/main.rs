use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::info;

use aminotally::pipeline::{DEFAULT_CHUNK_SIZE, DEFAULT_TASK_CAPACITY};
use aminotally::{
    Backend, Category, FastaSource, Pipeline, PipelineConfig, Policy, ResidueClassifier,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendKind {
    /// Classify on the calling thread
    Sequential,
    /// Worker pool, one sequence per task message
    Threads,
    /// Worker pool, sequences shipped in chunks
    Chunked,
}

/// Classify protein residues into physicochemical categories
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Input FASTA file (optionally gzip/bzip2/xz/zstd compressed)
    input: PathBuf,

    /// Output JSON report [default: stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of worker threads (0: all available cores)
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Capacity of the bounded task channel
    #[arg(short = 'c', long, default_value_t = DEFAULT_TASK_CAPACITY)]
    capacity: usize,

    /// Capacity of the result channel [default: unbounded]
    #[arg(long)]
    result_capacity: Option<usize>,

    /// Work distribution strategy
    #[arg(short, long, value_enum, default_value_t = BackendKind::Threads)]
    backend: BackendKind,

    /// Sequences per chunk for the chunked backend
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Report sequences in input order
    #[arg(long)]
    ordered: bool,

    /// Handling of whitespace, control and non-ASCII bytes in sequences
    #[arg(long, value_enum, default_value_t = Policy::CountNonStandard)]
    policy: Policy,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,
}
impl Args {
    fn config(&self) -> PipelineConfig {
        let worker_count = if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        };
        let backend = match self.backend {
            BackendKind::Sequential => Backend::Sequential,
            BackendKind::Threads => Backend::Threads,
            BackendKind::Chunked => Backend::Chunked {
                chunk_size: self.chunk_size,
            },
        };
        PipelineConfig::new()
            .with_workers(worker_count)
            .with_task_capacity(self.capacity)
            .with_result_capacity(self.result_capacity)
            .with_backend(backend)
            .preserve_order(self.ordered)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let classifier = ResidueClassifier::with_policy(args.policy);
    let mut pipeline = Pipeline::with_classifier(args.config(), classifier)?;
    let source = FastaSource::from_path(&args.input)?;
    info!(
        "Classifying {} with {:?} ({} workers)",
        args.input.display(),
        pipeline.config().backend,
        pipeline.config().effective_workers()
    );

    let report = pipeline.analyze(source)?;
    info!(
        "Classified {} sequences in {:.3}s ({} failed)",
        report.n_sequences(),
        report.elapsed_seconds(),
        report.failures.len()
    );
    for category in Category::ALL {
        info!("  {category}: {}", report.total[category]);
    }
    if report.stats.blocked_sends > 0 {
        info!(
            "Producer blocked {} times ({:.3}s) on a full task channel",
            report.stats.blocked_sends,
            report.stats.send_wait.as_secs_f64()
        );
    }

    let handle: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(handle);
    if args.compact {
        report.write_json_compact(&mut out)?;
    } else {
        report.write_json(&mut out)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
