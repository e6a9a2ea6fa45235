//! One function per subcommand, over a shared [`Ctx`].
//!
//! The functions return data and leave all printing to `main`, so they can
//! be exercised directly in tests.

use std::sync::Arc;

use anyhow::Result;

use jobq_core::{
    JobBody, JobId, JobResult, JobStatus, NewJobRequest, NewJobStatusRequest,
    NewJobResultRequest, NewSerializedJobRequest, SerializedJob, SerializedJobStatus, StatusKind,
};
use jobq_service::{JobQueueService, JsonJobSerializer, ResultService, SerializerRegistry, StatusService};
use jobq_store::{JobStore, StatusStore, StoreConfig, build_stores, snapshot};

pub(crate) struct Ctx {
    pub(crate) jobs: Arc<JobQueueService>,
    pub(crate) statuses: StatusService,
    pub(crate) results: ResultService,
    registry: Arc<SerializerRegistry>,
    job_store: Arc<dyn JobStore>,
    status_store: Arc<dyn StatusStore>,
}

impl Ctx {
    pub(crate) fn new(config: &StoreConfig) -> Result<Self> {
        let (job_store, status_store) = build_stores(config)?;
        let registry = Arc::new(SerializerRegistry::new());
        let jobs = Arc::new(JobQueueService::new(job_store.clone(), registry.clone()));
        Ok(Self {
            statuses: StatusService::new(jobs.clone(), status_store.clone()),
            results: ResultService::new(jobs.clone(), status_store.clone()),
            jobs,
            registry,
            job_store,
            status_store,
        })
    }
}

/// Serialize a JSON body and enqueue it.
pub(crate) fn submit(ctx: &Ctx, job_type: &str, body: JobBody, nice: i32) -> Result<JobId> {
    ctx.registry.register(job_type, Arc::new(JsonJobSerializer));
    let job = ctx
        .jobs
        .add_job(NewJobRequest::new(job_type, body).with_nice(nice))?;
    Ok(job.job_id)
}

/// Enqueue already-serialized body bytes, bypassing the registry.
pub(crate) fn submit_raw(ctx: &Ctx, job_type: &str, raw: Vec<u8>, nice: i32) -> Result<JobId> {
    let job = ctx
        .jobs
        .add_serialized_job(NewSerializedJobRequest::new(job_type, raw).with_nice(nice))?;
    Ok(job.job_id)
}

/// Pop the next job in serialized form.
pub(crate) fn pop(ctx: &Ctx, job_type: Option<&str>) -> Result<SerializedJob> {
    Ok(ctx.jobs.get_next_job(job_type)?)
}

pub(crate) fn post_status(
    ctx: &Ctx,
    job_id: JobId,
    status: StatusKind,
    detail: String,
) -> Result<JobStatus> {
    Ok(ctx
        .statuses
        .add_job_status(NewJobStatusRequest::new(job_id, status, detail))?)
}

pub(crate) fn latest_status(ctx: &Ctx, job_id: &JobId) -> Result<Option<SerializedJobStatus>> {
    Ok(ctx.statuses.get_latest_status(job_id)?)
}

pub(crate) fn upload(ctx: &Ctx, job_id: JobId, raw: Vec<u8>) -> Result<JobResult> {
    Ok(ctx
        .results
        .add_job_result(NewJobResultRequest::new(job_id, raw))?)
}

/// The `k`-th most recent result; negative `k` counts from the oldest.
pub(crate) fn download(ctx: &Ctx, job_id: &JobId, k: i64) -> Result<Option<JobResult>> {
    Ok(ctx.results.get_kth_latest_result(job_id, k)?)
}

pub(crate) fn list(ctx: &Ctx) -> Result<Vec<SerializedJob>> {
    Ok(ctx.jobs.list_jobs()?)
}

pub(crate) fn export(ctx: &Ctx) -> Result<Vec<u8>> {
    Ok(snapshot::dump(
        ctx.job_store.as_ref(),
        ctx.status_store.as_ref(),
    )?)
}

pub(crate) fn import(ctx: &Ctx, raw: &[u8]) -> Result<()> {
    snapshot::load(raw, ctx.job_store.as_ref(), ctx.status_store.as_ref())?;
    Ok(())
}
