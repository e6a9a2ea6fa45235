//! Job queue service: submission, lookup, and the worker-facing pop.

use std::sync::Arc;

use tracing::info;

use jobq_core::{
    Job, JobId, NewJobRequest, NewSerializedJobRequest, QueueError, QueueResult, SerializedJob,
    time,
};
use jobq_store::JobStore;

use crate::registry::SerializerRegistry;

/// Stateless orchestrator over the job repository and the serializer
/// registry.
pub struct JobQueueService {
    store: Arc<dyn JobStore>,
    registry: Arc<SerializerRegistry>,
}

impl JobQueueService {
    pub fn new(store: Arc<dyn JobStore>, registry: Arc<SerializerRegistry>) -> Self {
        Self { store, registry }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &dyn JobStore {
        self.store.as_ref()
    }

    pub(crate) fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    fn deserialize_job(&self, sjob: SerializedJob) -> QueueResult<Job> {
        let serializer = self.registry.get(&sjob.job_type)?;
        Ok(Job {
            job_id: sjob.job_id,
            job_body: serializer.deserialize(&sjob.job_body_serialized)?,
            job_type: sjob.job_type,
            nice: sjob.nice,
            created_time: sjob.created_time,
        })
    }

    /// Serialize and enqueue a new job. Returns the domain-level job echoing
    /// the original body (not a round-tripped copy).
    ///
    /// Fails with [`QueueError::SerializerNotFound`] at submission time when
    /// the job type has no registered serializer.
    pub fn add_job(&self, request: NewJobRequest) -> QueueResult<Job> {
        let serializer = self.registry.get(&request.job_type)?;
        let job = Job {
            job_id: JobId::random(),
            job_type: request.job_type,
            job_body: request.job_body,
            nice: request.nice,
            created_time: time::now(),
        };
        let sjob = SerializedJob {
            job_id: job.job_id.clone(),
            job_type: job.job_type.clone(),
            job_body_serialized: serializer.serialize(&job.job_body)?,
            nice: job.nice,
            created_time: job.created_time,
        };
        self.store.add_job(sjob)?;
        info!(job_id = %job.job_id, job_type = %job.job_type, "job submitted");
        Ok(job)
    }

    /// Enqueue a job whose body is already serialized, skipping the registry.
    pub fn add_serialized_job(
        &self,
        request: NewSerializedJobRequest,
    ) -> QueueResult<SerializedJob> {
        let sjob = SerializedJob {
            job_id: JobId::random(),
            job_type: request.job_type,
            job_body_serialized: request.job_body_serialized,
            nice: request.nice,
            created_time: time::now(),
        };
        self.store.add_job(sjob.clone())?;
        info!(job_id = %sjob.job_id, job_type = %sjob.job_type, "serialized job submitted");
        Ok(sjob)
    }

    /// Fetch a job (pending or historical) in serialized form.
    pub fn get_job(&self, job_id: &JobId) -> QueueResult<SerializedJob> {
        self.store
            .get_job(job_id)?
            .ok_or_else(|| QueueError::JobNotFound(job_id.clone()))
    }

    /// Fetch a job and deserialize its body through the registry.
    pub fn get_job_deserialized(&self, job_id: &JobId) -> QueueResult<Job> {
        let sjob = self.get_job(job_id)?;
        self.deserialize_job(sjob)
    }

    /// All jobs, pending and historical, in serialized form.
    pub fn list_jobs(&self) -> QueueResult<Vec<SerializedJob>> {
        Ok(self.store.list_jobs()?)
    }

    /// All jobs with bodies deserialized through the registry.
    pub fn list_jobs_deserialized(&self) -> QueueResult<Vec<Job>> {
        self.store
            .list_jobs()?
            .into_iter()
            .map(|sjob| self.deserialize_job(sjob))
            .collect()
    }

    /// Pop the next job for a worker: smallest `nice` wins, FIFO within equal
    /// `nice`. `None` pops across all job types. Fails with
    /// [`QueueError::EmptyQueue`] when nothing matches.
    pub fn get_next_job(&self, job_type: Option<&str>) -> QueueResult<SerializedJob> {
        self.store
            .pop_highest_priority_job(job_type)?
            .ok_or_else(|| QueueError::EmptyQueue {
                job_type: job_type.map(str::to_string),
            })
    }

    /// Pop the next job and deserialize its body through the registry.
    pub fn get_next_job_deserialized(&self, job_type: Option<&str>) -> QueueResult<Job> {
        let sjob = self.get_next_job(job_type)?;
        self.deserialize_job(sjob)
    }

    /// Precondition gate used before recording anything against a job ID.
    /// Historical (already popped) jobs still count as existing.
    pub fn check_job_exists(&self, job_id: &JobId) -> QueueResult<()> {
        if self.store.job_exists(job_id)? {
            Ok(())
        } else {
            Err(QueueError::JobNotFound(job_id.clone()))
        }
    }
}
