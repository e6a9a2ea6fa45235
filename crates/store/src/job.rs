//! Job repository: pending/historical partitions and the priority pop.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use jobq_core::{JobId, SerializedJob, StoreError};

/// Job repository abstraction.
///
/// A job added through [`add_job`](JobStore::add_job) is *pending*; a pop
/// moves it to the *historical* partition, exactly once, irreversibly. At all
/// times a job occupies exactly one of the two partitions.
pub trait JobStore: Send + Sync {
    /// True iff the job exists in either partition. Historical (already
    /// popped) jobs count as existing, so statuses and results can still be
    /// recorded against a consumed job.
    fn job_exists(&self, job_id: &JobId) -> Result<bool, StoreError>;

    /// Insert into the pending partition. Re-adding an existing ID is
    /// last-write-wins.
    fn add_job(&self, job: SerializedJob) -> Result<(), StoreError>;

    /// Look up across both partitions, pending first.
    fn get_job(&self, job_id: &JobId) -> Result<Option<SerializedJob>, StoreError>;

    /// All jobs, pending and historical. Order is not guaranteed.
    fn list_jobs(&self) -> Result<Vec<SerializedJob>, StoreError>;

    /// Pop the pending job with the numerically smallest `nice` among those
    /// matching the type filter (`None` matches any type). Ties on `nice` are
    /// broken FIFO by `created_time`, then by `job_id` for determinism. The
    /// selected job moves to the historical partition as a single unit.
    /// Returns `None` if nothing matches.
    fn pop_highest_priority_job(
        &self,
        job_type: Option<&str>,
    ) -> Result<Option<SerializedJob>, StoreError>;

    /// Order-stable view of both partitions (sorted by `job_id`), used by the
    /// snapshot format.
    fn snapshot(&self) -> Result<JobStoreState, StoreError>;

    /// Fully replace the current state: clear, then repopulate.
    fn restore(&self, state: JobStoreState) -> Result<(), StoreError>;
}

/// Full state of a job repository, sorted by `job_id` for reproducibility.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStoreState {
    pub queue: Vec<SerializedJob>,
    pub history: Vec<SerializedJob>,
}

/// Sort key of the priority pop: smallest `nice` first, FIFO within equal
/// `nice`, `job_id` as the final deterministic tie-break.
pub(crate) fn pop_order_key(job: &SerializedJob) -> (i32, chrono::DateTime<chrono::Utc>, JobId) {
    (job.nice, job.created_time, job.job_id.clone())
}

#[derive(Debug, Default)]
struct Partitions {
    queue: HashMap<JobId, SerializedJob>,
    history: HashMap<JobId, SerializedJob>,
}

/// In-memory job repository. Non-persistent; state is owned by the instance
/// (no ambient globals) and guarded by a lock.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    inner: RwLock<Partitions>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryJobStore {
    fn job_exists(&self, job_id: &JobId) -> Result<bool, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.queue.contains_key(job_id) || inner.history.contains_key(job_id))
    }

    fn add_job(&self, job: SerializedJob) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        debug!(job_id = %job.job_id, job_type = %job.job_type, nice = job.nice, "enqueue job");
        inner.queue.insert(job.job_id.clone(), job);
        Ok(())
    }

    fn get_job(&self, job_id: &JobId) -> Result<Option<SerializedJob>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .queue
            .get(job_id)
            .or_else(|| inner.history.get(job_id))
            .cloned())
    }

    fn list_jobs(&self) -> Result<Vec<SerializedJob>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .queue
            .values()
            .chain(inner.history.values())
            .cloned()
            .collect())
    }

    fn pop_highest_priority_job(
        &self,
        job_type: Option<&str>,
    ) -> Result<Option<SerializedJob>, StoreError> {
        // Select and move under one write lock so two pops cannot race on the
        // same candidate.
        let mut inner = self.inner.write().unwrap();
        let candidate = inner
            .queue
            .values()
            .filter(|job| job_type.map_or(true, |t| job.job_type == t))
            .min_by_key(|job| pop_order_key(job))
            .map(|job| job.job_id.clone());
        let Some(job_id) = candidate else {
            return Ok(None);
        };
        let Some(job) = inner.queue.remove(&job_id) else {
            return Ok(None);
        };
        inner.history.insert(job_id.clone(), job.clone());
        debug!(job_id = %job_id, job_type = %job.job_type, "popped job");
        Ok(Some(job))
    }

    fn snapshot(&self) -> Result<JobStoreState, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut queue: Vec<_> = inner.queue.values().cloned().collect();
        let mut history: Vec<_> = inner.history.values().cloned().collect();
        queue.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        history.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(JobStoreState { queue, history })
    }

    fn restore(&self, state: JobStoreState) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.queue.clear();
        inner.history.clear();
        for job in state.queue {
            inner.queue.insert(job.job_id.clone(), job);
        }
        for job in state.history {
            inner.history.insert(job.job_id.clone(), job);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use jobq_core::time;

    use super::*;

    pub(crate) fn test_job(job_type: &str, nice: i32) -> SerializedJob {
        SerializedJob {
            job_id: JobId::random(),
            job_type: job_type.to_string(),
            job_body_serialized: b"{}".to_vec(),
            nice,
            created_time: time::now(),
        }
    }

    /// Contract suite run against both backends (see `disk::tests`).
    pub(crate) fn assert_job_store_contract(store: &dyn JobStore) {
        // Empty store: nothing exists, nothing pops.
        let ghost = JobId::from("no-such-job");
        assert!(!store.job_exists(&ghost).unwrap());
        assert!(store.get_job(&ghost).unwrap().is_none());
        assert!(store.pop_highest_priority_job(None).unwrap().is_none());

        // Priority order: nice 3, 1, 2 added in that order pop as 1, 2, 3.
        let jobs: Vec<_> = [3, 1, 2]
            .into_iter()
            .map(|nice| {
                let job = test_job("math", nice);
                store.add_job(job.clone()).unwrap();
                job
            })
            .collect();
        for expected_nice in [1, 2, 3] {
            let popped = store.pop_highest_priority_job(Some("math")).unwrap().unwrap();
            assert_eq!(popped.nice, expected_nice);
        }
        assert!(store.pop_highest_priority_job(Some("math")).unwrap().is_none());

        // Popped jobs remain visible: they exist, resolve by ID, and list.
        for job in &jobs {
            assert!(store.job_exists(&job.job_id).unwrap());
            assert_eq!(store.get_job(&job.job_id).unwrap().unwrap(), *job);
        }
        assert_eq!(store.list_jobs().unwrap().len(), 3);

        // Type filter: a pop for another type misses pending jobs of "alpha".
        let alpha = test_job("alpha", 0);
        store.add_job(alpha.clone()).unwrap();
        assert!(store.pop_highest_priority_job(Some("beta")).unwrap().is_none());
        let popped = store.pop_highest_priority_job(None).unwrap().unwrap();
        assert_eq!(popped.job_id, alpha.job_id);
    }

    #[test]
    fn memory_store_contract() {
        assert_job_store_contract(&MemoryJobStore::new());
    }

    #[test]
    fn equal_nice_pops_fifo() {
        let store = MemoryJobStore::new();
        let mut first = test_job("t", 5);
        let mut second = test_job("t", 5);
        second.created_time = first.created_time + chrono::Duration::microseconds(1);
        // Insertion order deliberately reversed relative to creation order.
        store.add_job(second.clone()).unwrap();
        store.add_job(first.clone()).unwrap();

        let popped = store.pop_highest_priority_job(Some("t")).unwrap().unwrap();
        assert_eq!(popped.job_id, first.job_id);
        let popped = store.pop_highest_priority_job(Some("t")).unwrap().unwrap();
        assert_eq!(popped.job_id, second.job_id);
    }

    #[test]
    fn pending_and_historical_are_exclusive() {
        let store = MemoryJobStore::new();
        let job = test_job("t", 0);
        store.add_job(job.clone()).unwrap();

        let state = store.snapshot().unwrap();
        assert_eq!(state.queue.len(), 1);
        assert!(state.history.is_empty());

        store.pop_highest_priority_job(None).unwrap().unwrap();
        let state = store.snapshot().unwrap();
        assert!(state.queue.is_empty());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].job_id, job.job_id);
    }

    #[test]
    fn duplicate_add_is_last_write_wins() {
        let store = MemoryJobStore::new();
        let job = test_job("t", 0);
        store.add_job(job.clone()).unwrap();
        let replacement = SerializedJob {
            nice: 9,
            ..job.clone()
        };
        store.add_job(replacement.clone()).unwrap();

        assert_eq!(store.get_job(&job.job_id).unwrap().unwrap().nice, 9);
        assert_eq!(store.list_jobs().unwrap().len(), 1);
    }

    #[test]
    fn restore_replaces_existing_state() {
        let store = MemoryJobStore::new();
        store.add_job(test_job("old", 0)).unwrap();

        let replacement = test_job("new", 0);
        store
            .restore(JobStoreState {
                queue: vec![replacement.clone()],
                history: vec![],
            })
            .unwrap();

        let jobs = store.list_jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_id, replacement.job_id);
    }

    #[test]
    fn concurrent_pops_take_distinct_jobs() {
        use std::sync::Arc;

        let store = Arc::new(MemoryJobStore::new());
        for _ in 0..32 {
            store.add_job(test_job("t", 0)).unwrap();
        }

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                let mut seen = Vec::new();
                while let Some(job) = store.pop_highest_priority_job(None).unwrap() {
                    seen.push(job.job_id);
                }
                seen
            }));
        }

        let mut all: Vec<JobId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 32, "each job must be popped at most once");
    }
}
