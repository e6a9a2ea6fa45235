//! Status service: lifecycle reports per job.

use std::sync::Arc;

use tracing::info;

use jobq_core::{
    JobId, JobStatus, NewJobStatusRequest, QueueResult, SerializedJobStatus, StatusId, time,
};
use jobq_store::StatusStore;

use crate::job_queue::JobQueueService;

/// Records and queries status transitions. Every operation is gated on the
/// job existing in the job repository.
pub struct StatusService {
    jobs: Arc<JobQueueService>,
    store: Arc<dyn StatusStore>,
}

impl StatusService {
    pub fn new(jobs: Arc<JobQueueService>, store: Arc<dyn StatusStore>) -> Self {
        Self { jobs, store }
    }

    fn deserialize_status(&self, s_status: SerializedJobStatus) -> QueueResult<JobStatus> {
        let result = match &s_status.result_serialized {
            None => None,
            Some(raw) => {
                let job = self.jobs.get_job(&s_status.job_id)?;
                let serializer = self.jobs.registry().get(&job.job_type)?;
                Some(serializer.deserialize_result(raw)?)
            }
        };
        Ok(JobStatus {
            status_id: s_status.status_id,
            job_id: s_status.job_id,
            issue_time: s_status.issue_time,
            status: s_status.status,
            detail: s_status.detail,
            result,
        })
    }

    /// Record one status transition. `issue_time` defaults to now; an
    /// attached result is serialized through the registry keyed by the job's
    /// recorded type. Fails with `JobNotFound` before mutating anything when
    /// the job was never created.
    pub fn add_job_status(&self, request: NewJobStatusRequest) -> QueueResult<JobStatus> {
        self.jobs.check_job_exists(&request.job_id)?;

        let result_serialized = match &request.result {
            None => None,
            Some(result) => {
                let job = self.jobs.get_job(&request.job_id)?;
                let serializer = self.jobs.registry().get(&job.job_type)?;
                Some(serializer.serialize_result(result)?)
            }
        };

        let status = JobStatus {
            status_id: StatusId::random(),
            job_id: request.job_id,
            issue_time: request.issue_time.unwrap_or_else(time::now),
            status: request.status,
            detail: request.detail,
            result: request.result,
        };
        self.store.add_status(SerializedJobStatus {
            status_id: status.status_id.clone(),
            job_id: status.job_id.clone(),
            issue_time: status.issue_time,
            status: status.status,
            detail: status.detail.clone(),
            result_serialized,
        })?;
        info!(job_id = %status.job_id, status = %status.status, "status recorded");
        Ok(status)
    }

    /// The most recent status by `issue_time`, in serialized form. `None`
    /// when no status was ever recorded — a valid state for a freshly created
    /// job, not an error.
    pub fn get_latest_status(&self, job_id: &JobId) -> QueueResult<Option<SerializedJobStatus>> {
        self.jobs.check_job_exists(job_id)?;
        Ok(self.store.get_latest_status(job_id)?)
    }

    /// As [`get_latest_status`](Self::get_latest_status), with the attached
    /// result (if any) deserialized through the registry.
    pub fn get_latest_status_deserialized(&self, job_id: &JobId) -> QueueResult<Option<JobStatus>> {
        match self.get_latest_status(job_id)? {
            None => Ok(None),
            Some(s_status) => Ok(Some(self.deserialize_status(s_status)?)),
        }
    }

    /// The full append-only status history for a job.
    pub fn list_job_status(&self, job_id: &JobId) -> QueueResult<Vec<SerializedJobStatus>> {
        Ok(self.store.list_status(job_id)?)
    }
}
