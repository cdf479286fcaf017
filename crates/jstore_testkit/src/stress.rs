//! Stress helpers for jstore backends.
//!
//! These drive a store from many threads at once and report what happened,
//! leaving assertions to the caller.

use jstore_core::{EntityId, Store, StoreError};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Writes rejected by the optimistic version check.
    pub conflicted_ops: usize,
    /// Operations that failed for any other reason.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, conflicted: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + conflicted + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            conflicted_ops: conflicted,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Conflicted: {}", self.conflicted_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of operations to perform, split across threads.
    pub operations: usize,
    /// Number of concurrent threads. At least one.
    pub threads: usize,
    /// Number of distinct documents. At least one.
    pub document_count: usize,
}

impl StressConfig {
    fn check(&self) {
        assert!(self.threads >= 1, "stress config needs at least one thread");
        assert!(
            self.document_count >= 1,
            "stress config needs at least one document"
        );
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            document_count: 1_000,
        }
    }
}

#[derive(Default)]
struct Counters {
    successful: AtomicUsize,
    conflicted: AtomicUsize,
    failed: AtomicUsize,
}

impl Counters {
    fn record<T>(&self, result: &Result<T, StoreError>) {
        let counter = match result {
            Ok(_) => &self.successful,
            Err(err) if err.is_optimistic_locking() => &self.conflicted,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self, start: Instant) -> StressTestResult {
        StressTestResult::new(
            self.successful.load(Ordering::Relaxed),
            self.conflicted.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
            start.elapsed(),
        )
    }
}

fn document_id(project: &str, index: usize) -> EntityId {
    EntityId::new(project, "stress", format!("doc-{index}"))
}

/// Runs unversioned saves from one thread.
///
/// # Panics
///
/// Panics if `config` has no threads or no documents.
pub fn stress_sequential_writes<S: Store + ?Sized>(
    store: &S,
    project: &str,
    config: &StressConfig,
) -> StressTestResult {
    config.check();
    let counters = Counters::default();
    let start = Instant::now();

    for i in 0..config.operations {
        let id = document_id(project, i % config.document_count);
        let body = json!({ "seq": i }).to_string();
        counters.record(&store.save(&id, &body));
    }

    counters.finish(start)
}

/// Runs id lookups from many threads over a pre-populated collection.
///
/// Seed writes that fail count as failed operations.
///
/// # Panics
///
/// Panics if `config` has no threads or no documents.
pub fn stress_concurrent_reads<S: Store + ?Sized + 'static>(
    store: Arc<S>,
    project: &str,
    config: &StressConfig,
) -> StressTestResult {
    config.check();
    let counters = Arc::new(Counters::default());
    for i in 0..config.document_count {
        let seeded = store.save(&document_id(project, i), &json!({ "seq": i }).to_string());
        if seeded.is_err() {
            counters.record(&seeded);
        }
    }

    let ops_per_thread = config.operations / config.threads;
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let store = Arc::clone(&store);
            let counters = Arc::clone(&counters);
            let project = project.to_string();
            let document_count = config.document_count;

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let idx = (t * ops_per_thread + i) % document_count;
                    counters.record(&store.get(&document_id(&project, idx)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    counters.finish(start)
}

/// Increments one counter document from many threads with read, then
/// version-checked write.
///
/// Every attempt either succeeds or is rejected as a conflict. With an
/// atomic check-and-increment the final `count` equals the number of
/// successful writes, and the document's version is one higher (the seed
/// write is version 1). Returns the run result and the final counter
/// document.
///
/// # Panics
///
/// Panics if `config` has no threads, or if the counter cannot be seeded.
pub fn stress_versioned_increments<S: Store + ?Sized + 'static>(
    store: Arc<S>,
    project: &str,
    config: &StressConfig,
) -> (StressTestResult, jstore_core::Entity) {
    config.check();
    let counter_id = EntityId::new(project, "stress", "counter");
    store
        .save(&counter_id, &json!({ "count": 0 }).to_string())
        .expect("seed counter");

    let counters = Arc::new(Counters::default());
    let attempts_per_thread = config.operations / config.threads;
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|_| {
            let store = Arc::clone(&store);
            let counters = Arc::clone(&counters);
            let counter_id = counter_id.clone();

            thread::spawn(move || {
                for _ in 0..attempts_per_thread {
                    let result = store.get(&counter_id).and_then(|current| {
                        let count = current.value()?["count"].as_i64().unwrap_or_default();
                        let body = json!({ "count": count + 1 }).to_string();
                        store.save(&current.id, &body)
                    });
                    counters.record(&result);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let result = counters.finish(start);
    let last = store.get(&counter_id).expect("counter still present");
    (result, last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jstore_core::{Entity, QueryOption, StoreResult};

    #[test]
    fn result_totals() {
        let result = StressTestResult::new(6, 3, 1, Duration::from_secs(2));
        assert_eq!(result.total_ops, 10);
        assert!((result.ops_per_second - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_duration_has_no_throughput() {
        let result = StressTestResult::new(1, 0, 0, Duration::ZERO);
        assert_eq!(result.ops_per_second, 0.0);
    }

    #[test]
    fn counters_classify_errors() {
        let counters = Counters::default();
        let id = EntityId::new("p", "t", "x");
        counters.record(&Ok::<(), StoreError>(()));
        counters.record::<()>(&Err(StoreError::optimistic_locking(&id, 2.into())));
        counters.record::<()>(&Err(StoreError::NotFound));

        let result = counters.finish(Instant::now());
        assert_eq!(result.successful_ops, 1);
        assert_eq!(result.conflicted_ops, 1);
        assert_eq!(result.failed_ops, 1);
    }

    struct Unavailable;

    impl Store for Unavailable {
        fn save(&self, _id: &EntityId, _json: &str) -> StoreResult<EntityId> {
            Err(StoreError::backend(503, "unavailable"))
        }

        fn delete(&self, _id: &EntityId) -> StoreResult<()> {
            Err(StoreError::backend(503, "unavailable"))
        }

        fn find_n(
            &self,
            _project: &str,
            _document_type: &str,
            _max_results: usize,
            _options: &[QueryOption],
        ) -> StoreResult<Vec<Entity>> {
            Err(StoreError::backend(503, "unavailable"))
        }

        fn health_check(&self) -> StoreResult<()> {
            Err(StoreError::backend(503, "unavailable"))
        }
    }

    #[test]
    fn failed_seeding_is_counted() {
        let config = StressConfig {
            operations: 8,
            threads: 2,
            document_count: 3,
        };
        let result = stress_concurrent_reads(Arc::new(Unavailable), "seed", &config);
        assert_eq!(result.successful_ops, 0);
        assert_eq!(result.failed_ops, 3 + 8);
    }

    #[test]
    #[should_panic(expected = "at least one thread")]
    fn zero_threads_is_rejected() {
        let config = StressConfig {
            threads: 0,
            ..StressConfig::default()
        };
        stress_concurrent_reads(Arc::new(Unavailable), "none", &config);
    }

    #[test]
    #[should_panic(expected = "at least one document")]
    fn zero_documents_is_rejected() {
        let config = StressConfig {
            document_count: 0,
            ..StressConfig::default()
        };
        stress_sequential_writes(&Unavailable, "none", &config);
    }
}
