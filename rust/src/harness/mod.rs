//! The driver: the same produce/consume workload run once inline and once as
//! a two-thread pipeline over a [`BoundedBuffer`].

use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

use crate::bounded_buffer::BoundedBuffer;
use crate::bst::expected_height;
use crate::config::{ConfigError, HarnessConfig};
use crate::pipeline::{PipelineError, Producer, SerializedTree, Validation, consume};
use crate::random::RandomSource;
use crate::record::{Cd, RecordError, RecordOrder, RecordStore};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Records(#[from] RecordError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Sequential,
    Parallel,
}

/// Timing and outcome of one phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub items: usize,
    pub invalid: usize,
    pub elapsed: Duration,
}

impl PhaseReport {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    // trees per second
    pub fn throughput(&self) -> f64 {
        if self.elapsed.is_zero() {
            0.0
        } else {
            self.items as f64 / self.seconds()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub records: usize,
    pub expected_height: isize,
    pub buffer_size: usize,
    pub num_trees: usize,
    pub sequential: PhaseReport,
    pub parallel: PhaseReport,
}

impl RunReport {
    /// Sequential time over parallel time.
    pub fn speedup(&self) -> f64 {
        if self.parallel.elapsed.is_zero() {
            0.0
        } else {
            self.sequential.seconds() / self.parallel.seconds()
        }
    }
}

fn check(validation: Validation, item: usize) -> bool {
    if validation.is_valid() {
        return true;
    }
    warn!(
        item,
        sorted = validation.sorted,
        height = validation.height,
        expected = validation.expected_height,
        balanced = validation.balanced,
        "invalid complete binary tree"
    );
    false
}

/// Produces and consumes `num_trees` trees one after another on this thread.
pub fn run_sequential<R>(
    store: &RecordStore<R>,
    order: RecordOrder<R>,
    config: &HarnessConfig,
    rand: &mut RandomSource,
) -> Result<PhaseReport, HarnessError> {
    config.validate()?;
    let producer = Producer::new(store, order, config.fault_policy())?;

    let start = Instant::now();
    let mut invalid = 0;
    for item in 0..config.num_trees {
        let tree = producer.produce(rand);
        if !check(consume(tree, order), item) {
            invalid += 1;
        }
    }
    let report = PhaseReport {
        phase: Phase::Sequential,
        items: config.num_trees,
        invalid,
        elapsed: start.elapsed(),
    };
    info!(seconds = report.seconds(), invalid, "sequential phase done");
    Ok(report)
}

/// Runs the same workload with a producer thread and a consumer thread
/// joined by a `config.buffer_size`-slot buffer.
pub fn run_parallel<R>(
    store: &RecordStore<R>,
    order: RecordOrder<R>,
    config: &HarnessConfig,
    rand: &mut RandomSource,
) -> Result<PhaseReport, HarnessError>
where
    R: Sync,
{
    config.validate()?;
    let producer = Producer::new(store, order, config.fault_policy())?;
    let buffer: BoundedBuffer<SerializedTree<'_, R>> = BoundedBuffer::new(config.buffer_size);
    let num_trees = config.num_trees;
    let mut producer_rand = rand.fork();

    let start = Instant::now();
    let invalid = thread::scope(|s| {
        info!(buffer_size = buffer.capacity(), "starting producer");
        let producer_thread = s.spawn(|| {
            for _ in 0..num_trees {
                buffer.put(producer.produce(&mut producer_rand));
            }
        });
        info!("starting consumer");
        let consumer_thread = s.spawn(|| {
            let mut invalid = 0;
            for item in 0..num_trees {
                if !check(consume(buffer.get(), order), item) {
                    invalid += 1;
                }
            }
            invalid
        });

        buffer.wait_until_drained(num_trees);
        if let Err(panic) = producer_thread.join() {
            std::panic::resume_unwind(panic);
        }
        match consumer_thread.join() {
            Ok(invalid) => invalid,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    });

    let report = PhaseReport {
        phase: Phase::Parallel,
        items: num_trees,
        invalid,
        elapsed: start.elapsed(),
    };
    info!(seconds = report.seconds(), invalid, "parallel phase done");
    Ok(report)
}

/// Loads the configured CD file and runs both phases over it.
pub fn run(config: &HarnessConfig) -> Result<RunReport, HarnessError> {
    config.validate()?;
    let store = RecordStore::load(&config.records_path)?;
    run_with_store(&store, Cd::order(), config)
}

pub fn run_with_store<R>(
    store: &RecordStore<R>,
    order: RecordOrder<R>,
    config: &HarnessConfig,
) -> Result<RunReport, HarnessError>
where
    R: Sync,
{
    if store.is_empty() {
        return Err(PipelineError::EmptyRecordSet.into());
    }
    let mut rand = match config.seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::from_entropy(),
    };
    let expected = expected_height(store.size());
    info!(records = store.size(), expected_height = expected, "loaded records");

    let sequential = run_sequential(store, order, config, &mut rand)?;
    let parallel = run_parallel(store, order, config, &mut rand)?;
    Ok(RunReport {
        records: store.size(),
        expected_height: expected,
        buffer_size: config.buffer_size,
        num_trees: config.num_trees,
        sequential,
        parallel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    fn cmp(a: &u32, b: &u32) -> Ordering {
        a.cmp(b)
    }

    fn order() -> RecordOrder<u32> {
        RecordOrder { items: cmp, keys: cmp }
    }

    fn config(buffer_size: usize, num_trees: usize, error_rate: usize) -> HarnessConfig {
        HarnessConfig {
            buffer_size,
            num_trees,
            error_rate,
            seed: Some(1234),
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn test_sequential_no_faults() {
        let store = RecordStore::from_records((0..63).collect());
        let mut rand = RandomSource::seeded(1);
        let report = run_sequential(&store, order(), &config(1, 50, 1), &mut rand).unwrap();
        assert_eq!(report.phase, Phase::Sequential);
        assert_eq!(report.items, 50);
        assert_eq!(report.invalid, 0);
    }

    #[test]
    fn test_parallel_all_faults() {
        let store = RecordStore::from_records((0..20).collect());
        let mut rand = RandomSource::seeded(2);
        // every draw from [1, 40] is below 41
        let report = run_parallel(&store, order(), &config(2, 40, 41), &mut rand).unwrap();
        assert_eq!(report.phase, Phase::Parallel);
        assert_eq!(report.items, 40);
        assert_eq!(report.invalid, 40);
    }

    #[test]
    fn test_rejects_bad_config_and_empty_store() {
        let store = RecordStore::from_records((0..5).collect());
        let mut rand = RandomSource::seeded(3);
        let err = run_parallel(&store, order(), &config(0, 10, 1), &mut rand).unwrap_err();
        assert!(matches!(err, HarnessError::Config(ConfigError::ZeroBufferSize)));

        let empty: RecordStore<u32> = RecordStore::from_records(Vec::new());
        let err = run_with_store(&empty, order(), &config(1, 10, 1)).unwrap_err();
        assert!(matches!(err, HarnessError::Pipeline(PipelineError::EmptyRecordSet)));
    }

    #[test]
    fn test_run_with_store_report() {
        let store = RecordStore::from_records((0..15).collect());
        let report = run_with_store(&store, order(), &config(3, 25, 1)).unwrap();
        assert_eq!(report.records, 15);
        assert_eq!(report.expected_height, 3);
        assert_eq!(report.sequential.invalid, 0);
        assert_eq!(report.parallel.invalid, 0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["parallel"]["phase"], "parallel");
        assert_eq!(json["num_trees"], 25);
    }
}
