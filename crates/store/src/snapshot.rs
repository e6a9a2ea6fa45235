//! Full-state snapshot: one msgpack blob covering both repositories.
//!
//! The blob is a map with four sections — `queue`, `history`,
//! `status_history`, `result_history` — each sorted by record ID, so
//! `dump` → `load` → `dump` is byte-identical and a snapshot taken from one
//! backend loads into the other without changing any query result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use jobq_core::{JobId, JobResult, SerializedJob, SerializedJobStatus, StoreError, codec};

use crate::job::JobStore;
use crate::status::StatusStore;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Snapshot {
    queue: Vec<SerializedJob>,
    history: Vec<SerializedJob>,
    status_history: BTreeMap<JobId, Vec<SerializedJobStatus>>,
    result_history: BTreeMap<JobId, Vec<JobResult>>,
}

/// Serialize the full state of both repositories into one blob.
///
/// Not safe under concurrent mutators; callers snapshot quiescent stores.
pub fn dump(jobs: &dyn JobStore, statuses: &dyn StatusStore) -> Result<Vec<u8>, StoreError> {
    let job_state = jobs.snapshot()?;
    let status_state = statuses.snapshot()?;
    codec::encode(&Snapshot {
        queue: job_state.queue,
        history: job_state.history,
        status_history: status_state.status_history,
        result_history: status_state.result_history,
    })
}

/// Replace the full state of both repositories with a previously dumped blob.
pub fn load(
    raw: &[u8],
    jobs: &dyn JobStore,
    statuses: &dyn StatusStore,
) -> Result<(), StoreError> {
    let snapshot: Snapshot = codec::decode(raw)?;
    info!(
        pending = snapshot.queue.len(),
        historical = snapshot.history.len(),
        "loading snapshot"
    );
    jobs.restore(crate::job::JobStoreState {
        queue: snapshot.queue,
        history: snapshot.history,
    })?;
    statuses.restore(crate::status::StatusStoreState {
        status_history: snapshot.status_history,
        result_history: snapshot.result_history,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use jobq_core::StatusKind;

    use crate::disk::{DiskJobStore, DiskStatusStore};
    use crate::job::MemoryJobStore;
    use crate::job::tests::test_job;
    use crate::status::MemoryStatusStore;
    use crate::status::tests::{test_result, test_status};

    use super::*;

    fn populate(jobs: &dyn JobStore, statuses: &dyn StatusStore) {
        let mut kept = Vec::new();
        for i in 0..10 {
            let job = test_job(if i % 2 == 0 { "even" } else { "odd" }, i);
            kept.push(job.job_id.clone());
            jobs.add_job(job).unwrap();
        }
        for _ in 0..3 {
            jobs.pop_highest_priority_job(None).unwrap().unwrap();
        }
        for job_id in kept.iter().take(3) {
            for kind in [StatusKind::Pending, StatusKind::Running, StatusKind::Completed] {
                statuses.add_status(test_status(job_id, kind)).unwrap();
            }
            statuses.add_result(test_result(job_id, b"partial output")).unwrap();
        }
    }

    #[test]
    fn dump_load_dump_is_byte_identical() {
        let jobs = MemoryJobStore::new();
        let statuses = MemoryStatusStore::new();
        populate(&jobs, &statuses);

        let first = dump(&jobs, &statuses).unwrap();
        load(&first, &jobs, &statuses).unwrap();
        let second = dump(&jobs, &statuses).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn load_discards_preexisting_state() {
        let jobs = MemoryJobStore::new();
        let statuses = MemoryStatusStore::new();
        let empty = dump(&jobs, &statuses).unwrap();

        populate(&jobs, &statuses);
        load(&empty, &jobs, &statuses).unwrap();

        assert!(jobs.list_jobs().unwrap().is_empty());
        assert_eq!(dump(&jobs, &statuses).unwrap(), empty);
    }

    fn assert_transfer(
        src_jobs: &dyn JobStore,
        src_statuses: &dyn StatusStore,
        dst_jobs: &dyn JobStore,
        dst_statuses: &dyn StatusStore,
    ) {
        populate(src_jobs, src_statuses);
        let blob = dump(src_jobs, src_statuses).unwrap();
        load(&blob, dst_jobs, dst_statuses).unwrap();

        // Same bytes back out of the destination backend.
        assert_eq!(dump(dst_jobs, dst_statuses).unwrap(), blob);

        // And identical query results on both sides.
        for job in src_jobs.list_jobs().unwrap() {
            assert_eq!(
                dst_jobs.get_job(&job.job_id).unwrap().unwrap(),
                job,
                "job must survive the transfer unchanged"
            );
            assert_eq!(
                dst_statuses.get_latest_status(&job.job_id).unwrap(),
                src_statuses.get_latest_status(&job.job_id).unwrap()
            );
            assert_eq!(
                dst_statuses.list_results(&job.job_id).unwrap(),
                src_statuses.list_results(&job.job_id).unwrap()
            );
        }

        // The popped/pending split carries over: popping the destination
        // yields the same next job as popping the source.
        let src_next = src_jobs.pop_highest_priority_job(None).unwrap().unwrap();
        let dst_next = dst_jobs.pop_highest_priority_job(None).unwrap().unwrap();
        assert_eq!(src_next.job_id, dst_next.job_id);
    }

    #[test]
    fn transfer_memory_to_disk() {
        let dir = TempDir::new().unwrap();
        assert_transfer(
            &MemoryJobStore::new(),
            &MemoryStatusStore::new(),
            &DiskJobStore::new(dir.path()).unwrap(),
            &DiskStatusStore::new(dir.path()).unwrap(),
        );
    }

    #[test]
    fn transfer_disk_to_memory() {
        let dir = TempDir::new().unwrap();
        assert_transfer(
            &DiskJobStore::new(dir.path()).unwrap(),
            &DiskStatusStore::new(dir.path()).unwrap(),
            &MemoryJobStore::new(),
            &MemoryStatusStore::new(),
        );
    }

    #[test]
    fn disk_dump_equals_memory_dump_for_the_same_state() {
        let dir = TempDir::new().unwrap();
        let mem_jobs = MemoryJobStore::new();
        let mem_statuses = MemoryStatusStore::new();
        populate(&mem_jobs, &mem_statuses);

        let disk_jobs = DiskJobStore::new(dir.path()).unwrap();
        let disk_statuses = DiskStatusStore::new(dir.path()).unwrap();
        let blob = dump(&mem_jobs, &mem_statuses).unwrap();
        load(&blob, &disk_jobs, &disk_statuses).unwrap();

        assert_eq!(dump(&disk_jobs, &disk_statuses).unwrap(), blob);
    }
}
