//! Result service: the upload channel for job output.

use std::sync::Arc;

use tracing::info;

use jobq_core::{
    JobBody, JobId, JobResult, NewJobResultRequest, QueueResult, ResultId, time,
};
use jobq_store::StatusStore;

use crate::job_queue::JobQueueService;

/// Records and queries uploaded results. Results arrive pre-serialized;
/// deserialization is an optional step on the way out, keyed by the job's
/// recorded type.
pub struct ResultService {
    jobs: Arc<JobQueueService>,
    store: Arc<dyn StatusStore>,
}

impl ResultService {
    pub fn new(jobs: Arc<JobQueueService>, store: Arc<dyn StatusStore>) -> Self {
        Self { jobs, store }
    }

    /// Record one uploaded result. `issue_time` defaults to now. Fails with
    /// `JobNotFound` before mutating anything when the job was never created.
    pub fn add_job_result(&self, request: NewJobResultRequest) -> QueueResult<JobResult> {
        self.jobs.check_job_exists(&request.job_id)?;
        let result = JobResult {
            result_id: ResultId::random(),
            job_id: request.job_id,
            issue_time: request.issue_time.unwrap_or_else(time::now),
            result_serialized: request.result_bytes,
        };
        self.store.add_result(result.clone())?;
        info!(job_id = %result.job_id, result_id = %result.result_id, "result uploaded");
        Ok(result)
    }

    /// The `k`-th result by signed 1-based recency index:
    ///
    /// * `k = 1` is the most recent, `k = 2` the second most recent, …
    /// * `k = -1` is the oldest, `k = -2` the second oldest, …
    /// * `k = 0`, or `|k|` beyond the number of results, yields `None`.
    pub fn get_kth_latest_result(&self, job_id: &JobId, k: i64) -> QueueResult<Option<JobResult>> {
        self.jobs.check_job_exists(job_id)?;
        // list_results is (issue_time, result_id) ascending.
        let results = self.store.list_results(job_id)?;
        let index = match k {
            0 => return Ok(None),
            k if k > 0 => {
                let back = usize::try_from(k).unwrap_or(usize::MAX);
                match results.len().checked_sub(back) {
                    Some(i) => i,
                    None => return Ok(None),
                }
            }
            k => {
                let forward = usize::try_from(-(k + 1)).unwrap_or(usize::MAX);
                if forward >= results.len() {
                    return Ok(None);
                }
                forward
            }
        };
        Ok(results.into_iter().nth(index))
    }

    /// The most recent result, or `None` if no result was ever uploaded.
    pub fn get_latest_result(&self, job_id: &JobId) -> QueueResult<Option<JobResult>> {
        self.get_kth_latest_result(job_id, 1)
    }

    /// Deserialize an uploaded result through the registry, keyed by the
    /// job's recorded type.
    pub fn deserialize_result(&self, result: &JobResult) -> QueueResult<JobBody> {
        let job = self.jobs.get_job(&result.job_id)?;
        let serializer = self.jobs.registry().get(&job.job_type)?;
        serializer.deserialize_result(&result.result_serialized)
    }

    /// The full append-only result history for a job.
    pub fn list_job_results(&self, job_id: &JobId) -> QueueResult<Vec<JobResult>> {
        Ok(self.store.list_results(job_id)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use serde_json::json;

    use jobq_core::{NewJobRequest, QueueError};
    use jobq_store::{MemoryJobStore, MemoryStatusStore};

    use crate::registry::{JsonJobSerializer, SerializerRegistry};

    use super::*;

    fn services() -> (Arc<JobQueueService>, ResultService) {
        let registry = SerializerRegistry::new();
        registry.register("math", Arc::new(JsonJobSerializer));
        let jobs = Arc::new(JobQueueService::new(
            Arc::new(MemoryJobStore::new()),
            Arc::new(registry),
        ));
        let svc = ResultService::new(jobs.clone(), Arc::new(MemoryStatusStore::new()));
        (jobs, svc)
    }

    fn job_with_results(
        jobs: &JobQueueService,
        svc: &ResultService,
        payloads: &[&[u8]],
    ) -> JobId {
        let job = jobs.add_job(NewJobRequest::new("math", json!({}))).unwrap();
        let t0 = time::now();
        for (i, payload) in payloads.iter().enumerate() {
            svc.add_job_result(
                NewJobResultRequest::new(job.job_id.clone(), payload.to_vec())
                    .at(t0 + Duration::seconds(i as i64)),
            )
            .unwrap();
        }
        job.job_id
    }

    #[test]
    fn upload_against_unknown_job_fails() {
        let (_, svc) = services();
        let err = svc
            .add_job_result(NewJobResultRequest::new(
                JobId::from("never-created"),
                b"out".to_vec(),
            ))
            .unwrap_err();
        assert!(matches!(err, QueueError::JobNotFound(_)));
    }

    #[test]
    fn latest_result_is_none_without_uploads() {
        let (jobs, svc) = services();
        let job_id = job_with_results(&jobs, &svc, &[]);
        assert!(svc.get_latest_result(&job_id).unwrap().is_none());
    }

    #[test]
    fn signed_index_counts_from_both_ends() {
        let (jobs, svc) = services();
        let job_id = job_with_results(&jobs, &svc, &[b"first", b"second", b"third"]);

        let at = |k: i64| {
            svc.get_kth_latest_result(&job_id, k)
                .unwrap()
                .map(|r| r.result_serialized)
        };
        assert_eq!(at(1).unwrap(), b"third");
        assert_eq!(at(2).unwrap(), b"second");
        assert_eq!(at(3).unwrap(), b"first");
        assert_eq!(at(-1).unwrap(), b"first");
        assert_eq!(at(-3).unwrap(), b"third");
        assert_eq!(at(0), None);
        assert_eq!(at(4), None);
        assert_eq!(at(-4), None);
    }

    #[test]
    fn results_can_be_uploaded_for_a_consumed_job() {
        let (jobs, svc) = services();
        let job_id = job_with_results(&jobs, &svc, &[b"progress"]);
        jobs.get_next_job(Some("math")).unwrap();

        svc.add_job_result(NewJobResultRequest::new(job_id.clone(), b"final".to_vec()))
            .unwrap();
        assert_eq!(svc.list_job_results(&job_id).unwrap().len(), 2);
    }

    #[test]
    fn deserialize_result_uses_the_jobs_serializer() {
        let (jobs, svc) = services();
        let payload = serde_json::to_vec(&json!({"answer": 42})).unwrap();
        let job_id = job_with_results(&jobs, &svc, &[&payload]);

        let result = svc.get_latest_result(&job_id).unwrap().unwrap();
        assert_eq!(svc.deserialize_result(&result).unwrap(), json!({"answer": 42}));
    }

    #[test]
    fn empty_upload_is_a_result_not_an_absence() {
        let (jobs, svc) = services();
        let job_id = job_with_results(&jobs, &svc, &[b""]);
        let latest = svc.get_latest_result(&job_id).unwrap().unwrap();
        assert!(latest.result_serialized.is_empty());
    }
}
