//! Status/result repository: append-only per-job histories.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use jobq_core::{JobId, JobResult, SerializedJobStatus, StoreError};

/// Status/result repository abstraction.
///
/// Both histories are independently append-only per job; nothing is ever
/// updated or deleted. Listing order is `(issue_time, id)` ascending, which
/// every backend can reproduce (fresh IDs are time-ordered, so this follows
/// insertion order for system-stamped records).
pub trait StatusStore: Send + Sync {
    /// Append one status report.
    fn add_status(&self, status: SerializedJobStatus) -> Result<(), StoreError>;

    /// Full status history for a job, `(issue_time, status_id)` ascending.
    /// Empty if the job has no recorded statuses.
    fn list_status(&self, job_id: &JobId) -> Result<Vec<SerializedJobStatus>, StoreError>;

    /// The status with the maximum `issue_time` (ties: larger `status_id`
    /// wins). `None` if no status was ever recorded.
    fn get_latest_status(&self, job_id: &JobId) -> Result<Option<SerializedJobStatus>, StoreError> {
        Ok(self.list_status(job_id)?.pop())
    }

    /// Append one uploaded result.
    fn add_result(&self, result: JobResult) -> Result<(), StoreError>;

    /// Full result history for a job, `(issue_time, result_id)` ascending.
    fn list_results(&self, job_id: &JobId) -> Result<Vec<JobResult>, StoreError>;

    /// Order-stable view of both histories, used by the snapshot format.
    fn snapshot(&self) -> Result<StatusStoreState, StoreError>;

    /// Fully replace the current state: clear, then repopulate.
    fn restore(&self, state: StatusStoreState) -> Result<(), StoreError>;
}

/// Full state of a status/result repository. Map keys and per-job lists are
/// sorted (by job ID and record ID respectively) for reproducible snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusStoreState {
    pub status_history: BTreeMap<JobId, Vec<SerializedJobStatus>>,
    pub result_history: BTreeMap<JobId, Vec<JobResult>>,
}

pub(crate) fn sort_statuses(statuses: &mut [SerializedJobStatus]) {
    statuses.sort_by(|a, b| {
        a.issue_time
            .cmp(&b.issue_time)
            .then_with(|| a.status_id.cmp(&b.status_id))
    });
}

pub(crate) fn sort_results(results: &mut [JobResult]) {
    results.sort_by(|a, b| {
        a.issue_time
            .cmp(&b.issue_time)
            .then_with(|| a.result_id.cmp(&b.result_id))
    });
}

#[derive(Debug, Default)]
struct Histories {
    statuses: HashMap<JobId, Vec<SerializedJobStatus>>,
    results: HashMap<JobId, Vec<JobResult>>,
}

/// In-memory status/result repository.
#[derive(Debug, Default)]
pub struct MemoryStatusStore {
    inner: RwLock<Histories>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusStore for MemoryStatusStore {
    fn add_status(&self, status: SerializedJobStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        debug!(job_id = %status.job_id, status = %status.status, "append status");
        inner
            .statuses
            .entry(status.job_id.clone())
            .or_default()
            .push(status);
        Ok(())
    }

    fn list_status(&self, job_id: &JobId) -> Result<Vec<SerializedJobStatus>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut statuses = inner.statuses.get(job_id).cloned().unwrap_or_default();
        sort_statuses(&mut statuses);
        Ok(statuses)
    }

    fn add_result(&self, result: JobResult) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        debug!(job_id = %result.job_id, result_id = %result.result_id, "append result");
        inner
            .results
            .entry(result.job_id.clone())
            .or_default()
            .push(result);
        Ok(())
    }

    fn list_results(&self, job_id: &JobId) -> Result<Vec<JobResult>, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut results = inner.results.get(job_id).cloned().unwrap_or_default();
        sort_results(&mut results);
        Ok(results)
    }

    fn snapshot(&self) -> Result<StatusStoreState, StoreError> {
        let inner = self.inner.read().unwrap();
        let mut state = StatusStoreState::default();
        for (job_id, statuses) in &inner.statuses {
            let mut statuses = statuses.clone();
            statuses.sort_by(|a, b| a.status_id.cmp(&b.status_id));
            state.status_history.insert(job_id.clone(), statuses);
        }
        for (job_id, results) in &inner.results {
            let mut results = results.clone();
            results.sort_by(|a, b| a.result_id.cmp(&b.result_id));
            state.result_history.insert(job_id.clone(), results);
        }
        Ok(state)
    }

    fn restore(&self, state: StatusStoreState) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.statuses = state.status_history.into_iter().collect();
        inner.results = state.result_history.into_iter().collect();
        Ok(())
    }
}
